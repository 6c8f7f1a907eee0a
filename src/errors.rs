use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use crate::auth::password::HashingError;
use crate::auth::token::AuthError;
use crate::store::StoreError;

/// Wire shape of every error response: `{"Error": "<message>"}`.
#[derive(Debug, Serialize)]
pub struct ApiError {
    #[serde(rename = "Error")]
    pub error: String,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("not authenticated")]
    Unauthorized,

    #[error("permission denied")]
    Forbidden,

    #[error("{0}")]
    Token(#[from] AuthError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("hashing error: {0}")]
    Hashing(#[from] HashingError),
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Forbidden => StatusCode::FORBIDDEN,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let msg = match &self {
            AppError::Store(e) => {
                tracing::error!("Store error: {}", e);
                "internal error".to_string()
            }
            AppError::Hashing(e) => {
                tracing::error!("Hashing error: {}", e);
                "internal error".to_string()
            }
            other => other.to_string(),
        };

        (status, Json(ApiError { error: msg })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(resp: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_forbidden_is_403_with_envelope() {
        let resp = AppError::Forbidden.into_response();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
        let body = body_json(resp).await;
        assert_eq!(body, serde_json::json!({"Error": "permission denied"}));
    }

    #[tokio::test]
    async fn test_handler_errors_are_400() {
        for err in [
            AppError::Validation("Invalid ID given abc".into()),
            AppError::NotFound("Account 7 not found".into()),
            AppError::Unauthorized,
        ] {
            let expected = err.to_string();
            let resp = err.into_response();
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
            assert_eq!(body_json(resp).await["Error"], expected);
        }
    }

    #[tokio::test]
    async fn test_store_errors_are_masked() {
        let err = AppError::Store(StoreError::Backend("connection reset by peer".into()));
        let resp = err.into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(resp).await["Error"], "internal error");
    }
}
