//! PgStore against a live database.
//!
//! **Requirements:**
//! - PostgreSQL running at DATABASE_URL
//! - Or run via `docker run -e POSTGRES_PASSWORD=pw -p 5432:5432 postgres` then
//!   `DATABASE_URL=postgres://postgres:pw@localhost/postgres cargo test --test postgres_store`
//!
//! These tests are ignored by default; run them with
//! `cargo test --test postgres_store -- --ignored`.

use std::sync::Arc;

use chrono::Utc;
use rand::Rng;
use tokio_test::{assert_err, assert_ok};

use bankd::models::account::NewAccount;
use bankd::store::postgres::PgStore;
use bankd::store::{AccountStore, StoreError};

async fn connect() -> PgStore {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for PgStore tests");
    let store = PgStore::connect(&url).await.expect("DATABASE_URL is unreachable");
    store.migrate().await.expect("migrations failed");
    store
}

/// Random number well outside the generated range so parallel runs do not clash.
fn unique_number() -> i64 {
    rand::thread_rng().gen_range(10_000_000..9_000_000_000)
}

fn new_account(number: i64, balance: i64) -> NewAccount {
    NewAccount {
        first_name: "Pg".into(),
        last_name: "Test".into(),
        number,
        encrypted_password: "hash".into(),
        balance,
        created_at: Utc::now(),
    }
}

#[tokio::test]
#[ignore = "requires PostgreSQL at DATABASE_URL"]
async fn test_insert_get_delete() {
    let store = connect().await;
    let number = unique_number();

    let created = assert_ok!(store.insert_account(&new_account(number, 50)).await);
    assert!(created.id > 0);

    let by_id = assert_ok!(store.get_account_by_id(created.id).await).unwrap();
    assert_eq!(by_id.number, number);
    assert_eq!(by_id.balance, 50);

    let by_number = assert_ok!(store.get_account_by_number(number).await).unwrap();
    assert_eq!(by_number.id, created.id);

    assert!(assert_ok!(store.delete_account(created.id).await));
    assert!(!assert_ok!(store.delete_account(created.id).await));
    assert!(assert_ok!(store.get_account_by_id(created.id).await).is_none());
}

#[tokio::test]
#[ignore = "requires PostgreSQL at DATABASE_URL"]
async fn test_duplicate_number_maps_to_store_error() {
    let store = connect().await;
    let number = unique_number();

    let first = assert_ok!(store.insert_account(&new_account(number, 0)).await);
    let err = assert_err!(store.insert_account(&new_account(number, 0)).await);
    assert!(matches!(err, StoreError::DuplicateNumber(n) if n == number));

    store.delete_account(first.id).await.unwrap();
}

#[tokio::test]
#[ignore = "requires PostgreSQL at DATABASE_URL"]
async fn test_concurrent_credits_are_atomic() {
    let store = connect().await;
    let store = Arc::new(store);
    let account = assert_ok!(store.insert_account(&new_account(unique_number(), 0)).await);

    let mut handles = Vec::new();
    for _ in 0..20 {
        let store = store.clone();
        let id = account.id;
        handles.push(tokio::spawn(async move { store.credit_balance(id, 100).await }));
    }
    for h in handles {
        assert_ok!(h.await.unwrap());
    }

    let stored = assert_ok!(store.get_account_by_id(account.id).await).unwrap();
    assert_eq!(stored.balance, 2_000);
    assert_eq!(assert_ok!(store.credit_balance(-1, 5).await), None);

    store.delete_account(account.id).await.unwrap();
}

#[tokio::test]
#[ignore = "requires PostgreSQL at DATABASE_URL"]
async fn test_ping() {
    let store = connect().await;
    assert_ok!(store.ping().await);
}
