//! Authorization gate for account-scoped routes (`/account/:id`).
//!
//! A request passes only if, in order:
//! 1. it carries an `x-jwt-token` header,
//! 2. the token validates,
//! 3. the `id` path parameter parses as an integer,
//! 4. that account exists,
//! 5. the account's number equals the token's `accountNumber` claim.
//!
//! Every failure answers 403 `{"Error": "permission denied"}`. The reason is
//! only logged.

use std::sync::Arc;

use axum::extract::rejection::RawPathParamsRejection;
use axum::extract::{RawPathParams, Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::auth::{AuthError, TokenService};
use crate::errors::AppError;
use crate::models::account::Account;
use crate::store::{AccountStore, StoreError};
use crate::AppState;

pub const TOKEN_HEADER: &str = "x-jwt-token";

/// Why a request was turned away. Never sent to the client.
#[derive(Debug, Error)]
pub enum Denial {
    #[error("missing x-jwt-token header")]
    MissingToken,

    #[error("invalid token: {0}")]
    InvalidToken(#[from] AuthError),

    #[error("invalid account id in path: {0:?}")]
    InvalidAccountId(Option<String>),

    #[error("account {0} not found")]
    AccountNotFound(i64),

    #[error("store lookup failed: {0}")]
    Store(#[from] StoreError),

    #[error("token bound to account number {claimed}, path account has {actual}")]
    AccountMismatch { claimed: i64, actual: i64 },
}

/// Run the five checks and return the authorized account.
pub async fn authorize(
    store: &dyn AccountStore,
    tokens: &TokenService,
    token: Option<&str>,
    raw_id: Option<&str>,
) -> Result<Account, Denial> {
    let token = token
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(Denial::MissingToken)?;

    let claims = tokens.validate(token)?;

    let id: i64 = raw_id
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| Denial::InvalidAccountId(raw_id.map(String::from)))?;

    let account = store
        .get_account_by_id(id)
        .await?
        .ok_or(Denial::AccountNotFound(id))?;

    if account.number != claims.account_number {
        return Err(Denial::AccountMismatch {
            claimed: claims.account_number,
            actual: account.number,
        });
    }

    Ok(account)
}

/// Axum middleware wrapping [`authorize`]. Mount with `route_layer` so the
/// path parameters are already matched.
pub async fn require_account_token(
    State(state): State<Arc<AppState>>,
    params: Result<RawPathParams, RawPathParamsRejection>,
    req: Request,
    next: Next,
) -> Response {
    let token = req
        .headers()
        .get(TOKEN_HEADER)
        .and_then(|v| v.to_str().ok());

    let raw_id = params.as_ref().ok().and_then(|p| {
        p.iter()
            .find(|(key, _)| *key == "id")
            .map(|(_, value)| value.to_string())
    });

    match authorize(state.store.as_ref(), &state.tokens, token, raw_id.as_deref()).await {
        Ok(account) => {
            tracing::debug!(account_id = account.id, "authorized account request");
            next.run(req).await
        }
        Err(denial) => {
            tracing::warn!(
                method = %req.method(),
                path = %req.uri().path(),
                "permission denied: {}",
                denial
            );
            AppError::Forbidden.into_response()
        }
    }
}
