//! bankd: account management HTTP service.
//!
//! Library crate shared by the `bankd` binary and the integration tests in `tests/`.

use std::sync::Arc;

pub mod api;
pub mod auth;
pub mod cli;
pub mod config;
pub mod errors;
pub mod middleware;
pub mod models;
pub mod store;

use auth::{PasswordService, TokenService};
use config::Config;
use store::AccountStore;

/// Shared application state passed to handlers and middleware.
pub struct AppState {
    pub store: Arc<dyn AccountStore>,
    pub tokens: TokenService,
    pub passwords: PasswordService,
    pub config: Config,
}

impl AppState {
    pub fn new(config: Config, store: Arc<dyn AccountStore>) -> anyhow::Result<Self> {
        let tokens = TokenService::from_config(&config);
        let passwords = PasswordService::new(config.password_cost)?;
        Ok(Self {
            store,
            tokens,
            passwords,
            config,
        })
    }
}
