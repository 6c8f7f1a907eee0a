//! Credential Service: salted one-way password hashing with Argon2id.
//!
//! Hashes are stored in PHC string format (`$argon2id$v=19$m=..,t=..,p=..$salt$hash`),
//! so verification always uses the parameters a hash was created with. Raising
//! the configured cost only affects new hashes.

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use rand::rngs::OsRng;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("password hashing failed: {0}")]
pub struct HashingError(String);

#[derive(Clone)]
pub struct PasswordService {
    argon2: Argon2<'static>,
}

impl PasswordService {
    /// `cost` is the Argon2 time cost (number of passes over memory).
    pub fn new(cost: u32) -> Result<Self, HashingError> {
        let params = Params::new(Params::DEFAULT_M_COST, cost, Params::DEFAULT_P_COST, None)
            .map_err(|e| HashingError(e.to_string()))?;
        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }

    pub fn hash(&self, password: &str) -> Result<String, HashingError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| HashingError(e.to_string()))?;
        Ok(hash.to_string())
    }

    /// [`PasswordService::hash`] on the blocking pool; Argon2 is CPU bound.
    pub async fn hash_blocking(&self, password: String) -> Result<String, HashingError> {
        let svc = self.clone();
        tokio::task::spawn_blocking(move || svc.hash(&password))
            .await
            .map_err(|e| HashingError(e.to_string()))?
    }

    /// [`PasswordService::verify`] on the blocking pool.
    pub async fn verify_blocking(&self, hashed: String, candidate: String) -> bool {
        let svc = self.clone();
        tokio::task::spawn_blocking(move || svc.verify(&hashed, &candidate))
            .await
            .unwrap_or(false)
    }

    /// Constant-time check of `candidate` against a stored hash.
    /// A malformed stored hash simply fails verification.
    pub fn verify(&self, hashed: &str, candidate: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(hashed) else {
            tracing::warn!("stored password hash is not a valid PHC string");
            return false;
        };
        self.argon2
            .verify_password(candidate.as_bytes(), &parsed)
            .is_ok()
    }
}
