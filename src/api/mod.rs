use std::sync::Arc;

use axum::{
    error_handling::HandleErrorLayer,
    extract::{Request, State},
    http::{HeaderValue, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    BoxError, Json, Router,
};
use tower::timeout::TimeoutLayer;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::Instrument;

use crate::errors::ApiError;
use crate::middleware::auth::require_account_token;
use crate::AppState;

pub mod handlers;

/// Build the full HTTP application: routes, token gate, and the
/// tracing / request-id / timeout stack.
pub fn app(state: Arc<AppState>) -> Router {
    let timeout = state.config.request_timeout();

    Router::new()
        // Account-scoped routes: token must be bound to the path account
        .route(
            "/account/:id",
            get(handlers::get_account).delete(handlers::delete_account),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_account_token,
        ))
        .route("/login", post(handlers::login))
        .route(
            "/account",
            get(handlers::list_accounts)
                .post(handlers::create_account)
                .delete(handlers::delete_account_without_id),
        )
        .route("/transfer", post(handlers::transfer))
        // Health endpoints (no auth)
        .route("/healthz", get(|| async { "ok" }))
        .route("/readyz", get(readiness_check))
        .fallback(fallback_404)
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(handle_timeout_error))
                .layer(TimeoutLayer::new(timeout)),
        )
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(request_id_middleware))
}

async fn fallback_404() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(ApiError {
            error: "not found".into(),
        }),
    )
}

async fn readiness_check(State(state): State<Arc<AppState>>) -> Result<&'static str, StatusCode> {
    state.store.ping().await.map_err(|e| {
        tracing::error!("readiness check failed: {}", e);
        StatusCode::SERVICE_UNAVAILABLE
    })?;
    Ok("ok")
}

async fn handle_timeout_error(err: BoxError) -> (StatusCode, Json<ApiError>) {
    if err.is::<tower::timeout::error::Elapsed>() {
        tracing::warn!("request timed out");
        (
            StatusCode::REQUEST_TIMEOUT,
            Json(ApiError {
                error: "request timed out".into(),
            }),
        )
    } else {
        tracing::error!("unhandled middleware error: {}", err);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiError {
                error: "internal error".into(),
            }),
        )
    }
}

/// Middleware: injects a unique X-Request-Id into every response.
/// This allows clients to correlate errors with server logs.
async fn request_id_middleware(req: Request, next: Next) -> Response {
    let req_id = uuid::Uuid::new_v4().to_string();
    let span = tracing::info_span!("request", request_id = %req_id);

    let mut resp = next.run(req).instrument(span).await;
    if let Ok(val) = HeaderValue::from_str(&req_id) {
        resp.headers_mut().insert("x-request-id", val);
    }
    resp
}
