use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::Json;

use crate::errors::AppError;
use crate::models::account::{
    Account, AccountView, CreateAccountRequest, DeleteResponse, LoginRequest, LoginResponse,
    NewAccount, TransferRequest,
};
use crate::store::StoreError;
use crate::AppState;

/// How many account numbers to draw before giving up on a collision streak.
const MAX_NUMBER_ATTEMPTS: usize = 5;

const MAX_FIRST_NAME_LEN: usize = 30;
const MAX_LAST_NAME_LEN: usize = 50;

// ── Helpers ──────────────────────────────────────────────────

fn parse_id(raw: &str) -> Result<i64, AppError> {
    raw.trim()
        .parse()
        .map_err(|_| AppError::Validation(format!("Invalid ID given {}", raw)))
}

fn path_id(path: Result<Path<String>, PathRejection>) -> Result<i64, AppError> {
    let Path(raw) = path.map_err(|e| AppError::Validation(e.body_text()))?;
    parse_id(&raw)
}

fn validate_name(field: &str, value: &str, max_len: usize) -> Result<String, AppError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::Validation(format!("{} is required", field)));
    }
    if value.chars().count() > max_len {
        return Err(AppError::Validation(format!(
            "{} must be at most {} characters",
            field, max_len
        )));
    }
    Ok(value.to_string())
}

/// Hash the password, generate number and opening balance, and persist.
/// Number collisions are retried with a fresh draw.
pub async fn open_account(
    state: &AppState,
    first_name: &str,
    last_name: &str,
    password: &str,
) -> Result<Account, AppError> {
    let first_name = validate_name("firstName", first_name, MAX_FIRST_NAME_LEN)?;
    let last_name = validate_name("lastName", last_name, MAX_LAST_NAME_LEN)?;
    if password.is_empty() {
        return Err(AppError::Validation("password is required".into()));
    }

    let encrypted_password = state.passwords.hash_blocking(password.to_string()).await?;
    let mut new_account = NewAccount::generate(&first_name, &last_name, encrypted_password);

    for attempt in 1..=MAX_NUMBER_ATTEMPTS {
        match state.store.insert_account(&new_account).await {
            Ok(account) => {
                tracing::info!(
                    account_id = account.id,
                    number = account.number,
                    "account created"
                );
                return Ok(account);
            }
            Err(StoreError::DuplicateNumber(number)) => {
                tracing::debug!(number, attempt, "account number collision, redrawing");
                new_account.renumber();
            }
            Err(e) => return Err(e.into()),
        }
    }

    Err(StoreError::Backend(format!(
        "no free account number after {} attempts",
        MAX_NUMBER_ATTEMPTS
    ))
    .into())
}

// ── Handlers ─────────────────────────────────────────────────

/// POST /login: exchange account number + password for a bearer token
pub async fn login(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, AppError> {
    let Json(req) = payload?;

    let account = state
        .store
        .get_account_by_number(req.number)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!("Account with number [{}] not found", req.number))
        })?;

    if !state
        .passwords
        .verify_blocking(account.encrypted_password.clone(), req.password)
        .await
    {
        tracing::warn!(number = account.number, "login failed: wrong password");
        return Err(AppError::Unauthorized);
    }

    let token = state.tokens.issue(&account)?;
    tracing::info!(account_id = account.id, "login succeeded");

    Ok(Json(LoginResponse {
        number: account.number,
        token,
    }))
}

/// GET /account: list all accounts
pub async fn list_accounts(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<AccountView>>, AppError> {
    let accounts = state.store.list_accounts().await?;
    Ok(Json(accounts.into_iter().map(AccountView::from).collect()))
}

/// POST /account: open a new account
pub async fn create_account(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateAccountRequest>, JsonRejection>,
) -> Result<Json<AccountView>, AppError> {
    let Json(req) = payload?;
    let account = open_account(&state, &req.first_name, &req.last_name, &req.password).await?;
    Ok(Json(account.into()))
}

/// DELETE /account: there is no id to delete on the collection path
pub async fn delete_account_without_id() -> Result<Json<DeleteResponse>, AppError> {
    Err(AppError::Validation(
        "Invalid ID given: use DELETE /account/{id}".into(),
    ))
}

/// GET /account/:id: fetch one account (behind the token gate)
pub async fn get_account(
    State(state): State<Arc<AppState>>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<AccountView>, AppError> {
    let id = path_id(path)?;
    let account = state
        .store
        .get_account_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Account {} not found", id)))?;
    Ok(Json(account.into()))
}

/// DELETE /account/:id: remove an account (behind the token gate)
pub async fn delete_account(
    State(state): State<Arc<AppState>>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<DeleteResponse>, AppError> {
    let id = path_id(path)?;
    if !state.store.delete_account(id).await? {
        return Err(AppError::NotFound(format!("Account {} not found", id)));
    }
    tracing::info!(account_id = id, "account deleted");
    Ok(Json(DeleteResponse { delete: id }))
}

/// POST /transfer: credit `amount` to the destination account.
/// Only the destination is touched; no source account is debited.
pub async fn transfer(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<TransferRequest>, JsonRejection>,
) -> Result<Json<i64>, AppError> {
    let Json(req) = payload?;
    if req.amount <= 0 {
        return Err(AppError::Validation(format!(
            "amount must be positive, got {}",
            req.amount
        )));
    }

    let balance = state
        .store
        .credit_balance(req.to_account, req.amount)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Account {} not found", req.to_account)))?;

    tracing::info!(
        account_id = req.to_account,
        amount = req.amount,
        balance,
        "balance credited"
    );
    Ok(Json(balance))
}
