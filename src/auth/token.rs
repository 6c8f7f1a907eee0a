//! Token Service: issues and validates HS256-signed bearer tokens.
//!
//! A token binds an account number and an expiry (`expiresAt`, unix seconds).
//! Tokens are stateless: validity is signature + claim inspection only.

use chrono::Utc;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::Config;
use crate::models::account::Account;

/// The only accepted signing algorithm.
const SIGNING_ALGORITHM: Algorithm = Algorithm::HS256;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub account_number: i64,
    pub expires_at: i64,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("token signature is invalid")]
    InvalidSignature,

    #[error("token uses an unexpected signing algorithm")]
    UnexpectedAlgorithm,

    #[error("token is expired")]
    Expired,

    #[error("token is malformed")]
    Malformed,

    #[error("token could not be signed")]
    Signing,
}

#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl_secs: i64,
}

impl TokenService {
    pub fn new(secret: &[u8], ttl_secs: i64) -> Self {
        let mut validation = Validation::new(SIGNING_ALGORITHM);
        // Expiry lives in the custom `expiresAt` claim and is checked below.
        validation.required_spec_claims.clear();
        validation.validate_exp = false;
        validation.validate_aud = false;

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            ttl_secs,
        }
    }

    pub fn from_config(cfg: &Config) -> Self {
        Self::new(cfg.jwt_secret.as_bytes(), cfg.token_ttl_secs)
    }

    pub fn issue(&self, account: &Account) -> Result<String, AuthError> {
        let expires_at = Utc::now()
            .timestamp()
            .checked_add(self.ttl_secs)
            .ok_or_else(|| {
                tracing::error!(ttl_secs = self.ttl_secs, "token expiry overflows");
                AuthError::Signing
            })?;
        let claims = Claims {
            account_number: account.number,
            expires_at,
        };
        encode(&Header::new(SIGNING_ALGORITHM), &claims, &self.encoding).map_err(|e| {
            tracing::error!("token signing failed: {}", e);
            AuthError::Signing
        })
    }

    pub fn validate(&self, token: &str) -> Result<Claims, AuthError> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation).map_err(|e| {
            match e.kind() {
                ErrorKind::InvalidSignature => AuthError::InvalidSignature,
                ErrorKind::InvalidAlgorithm | ErrorKind::InvalidAlgorithmName => {
                    AuthError::UnexpectedAlgorithm
                }
                _ => AuthError::Malformed,
            }
        })?;

        if data.claims.expires_at <= Utc::now().timestamp() {
            return Err(AuthError::Expired);
        }
        Ok(data.claims)
    }
}
