use std::ops::RangeInclusive;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Public account numbers are six digits.
pub const ACCOUNT_NUMBER_RANGE: RangeInclusive<i64> = 100_000..=999_999;

/// Opening balance assigned to a new account.
pub const OPENING_BALANCE_RANGE: RangeInclusive<i64> = 0..=9_999;

/// A persisted account record. Holds the password hash, so it is never
/// serialized directly; responses go through [`AccountView`].
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Account {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub number: i64,
    pub encrypted_password: String,
    pub balance: i64,
    pub created_at: DateTime<Utc>,
}

/// An account that has not been stored yet. The store assigns the id.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub first_name: String,
    pub last_name: String,
    pub number: i64,
    pub encrypted_password: String,
    pub balance: i64,
    pub created_at: DateTime<Utc>,
}

impl NewAccount {
    /// Assemble a new account with a random number and opening balance.
    pub fn generate(first_name: &str, last_name: &str, encrypted_password: String) -> Self {
        let mut rng = rand::thread_rng();
        Self {
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            number: rng.gen_range(ACCOUNT_NUMBER_RANGE),
            encrypted_password,
            balance: rng.gen_range(OPENING_BALANCE_RANGE),
            created_at: Utc::now(),
        }
    }

    /// Draw a fresh account number after a uniqueness collision.
    pub fn renumber(&mut self) {
        self.number = rand::thread_rng().gen_range(ACCOUNT_NUMBER_RANGE);
    }
}

/// Externally visible projection of an [`Account`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountView {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub number: i64,
    pub balance: i64,
    pub created_at: DateTime<Utc>,
}

impl From<Account> for AccountView {
    fn from(acc: Account) -> Self {
        Self {
            id: acc.id,
            first_name: acc.first_name,
            last_name: acc.last_name,
            number: acc.number,
            balance: acc.balance,
            created_at: acc.created_at,
        }
    }
}

// ── Request / Response DTOs ──────────────────────────────────

#[derive(Debug, Deserialize, Serialize)]
pub struct LoginRequest {
    pub number: i64,
    pub password: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct LoginResponse {
    pub number: i64,
    pub token: String,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAccountRequest {
    pub first_name: String,
    /// Older clients send `LastName`.
    #[serde(alias = "LastName")]
    pub last_name: String,
    pub password: String,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferRequest {
    pub to_account: i64,
    pub amount: i64,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct DeleteResponse {
    #[serde(rename = "Delete")]
    pub delete: i64,
}
