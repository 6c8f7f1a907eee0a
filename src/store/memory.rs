use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{AccountStore, StoreError};
use crate::models::account::{Account, NewAccount};

/// In-process account store. Used by tests and `serve --in-memory`.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    next_id: i64,
    accounts: BTreeMap<i64, Account>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccountStore for MemoryStore {
    async fn insert_account(&self, account: &NewAccount) -> Result<Account, StoreError> {
        let mut inner = self.inner.write().await;
        if inner.accounts.values().any(|a| a.number == account.number) {
            return Err(StoreError::DuplicateNumber(account.number));
        }

        inner.next_id += 1;
        let stored = Account {
            id: inner.next_id,
            first_name: account.first_name.clone(),
            last_name: account.last_name.clone(),
            number: account.number,
            encrypted_password: account.encrypted_password.clone(),
            balance: account.balance,
            created_at: account.created_at,
        };
        inner.accounts.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn get_account_by_id(&self, id: i64) -> Result<Option<Account>, StoreError> {
        Ok(self.inner.read().await.accounts.get(&id).cloned())
    }

    async fn get_account_by_number(&self, number: i64) -> Result<Option<Account>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.accounts.values().find(|a| a.number == number).cloned())
    }

    async fn list_accounts(&self) -> Result<Vec<Account>, StoreError> {
        Ok(self.inner.read().await.accounts.values().cloned().collect())
    }

    async fn delete_account(&self, id: i64) -> Result<bool, StoreError> {
        Ok(self.inner.write().await.accounts.remove(&id).is_some())
    }

    async fn credit_balance(&self, id: i64, amount: i64) -> Result<Option<i64>, StoreError> {
        let mut inner = self.inner.write().await;
        let Some(account) = inner.accounts.get_mut(&id) else {
            return Ok(None);
        };
        account.balance = account
            .balance
            .checked_add(amount)
            .ok_or_else(|| StoreError::Backend(format!("balance overflow on account {}", id)))?;
        Ok(Some(account.balance))
    }
}
