pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::account::{Account, NewAccount};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("account number {0} is already taken")]
    DuplicateNumber(i64),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("{0}")]
    Backend(String),
}

/// Abstraction over persisted account records.
/// Implementations: PgStore (PostgreSQL), MemoryStore (in-process).
///
/// All balance mutation goes through [`AccountStore::credit_balance`], which
/// must apply the change atomically so concurrent credits never lose updates.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Persist a new account and return it with its assigned id.
    async fn insert_account(&self, account: &NewAccount) -> Result<Account, StoreError>;

    async fn get_account_by_id(&self, id: i64) -> Result<Option<Account>, StoreError>;

    async fn get_account_by_number(&self, number: i64) -> Result<Option<Account>, StoreError>;

    /// All accounts, ordered by id.
    async fn list_accounts(&self) -> Result<Vec<Account>, StoreError>;

    /// Returns false when no account had that id.
    async fn delete_account(&self, id: i64) -> Result<bool, StoreError>;

    /// Add `amount` to the balance of account `id` and return the new balance,
    /// or `None` if the account does not exist.
    async fn credit_balance(&self, id: i64, amount: i64) -> Result<Option<i64>, StoreError>;

    /// Cheap liveness probe for readiness checks.
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
