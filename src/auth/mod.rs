//! Credential and token services used by the login flow and the
//! authorization middleware.

pub mod password;
pub mod token;

pub use password::{HashingError, PasswordService};
pub use token::{AuthError, Claims, TokenService};
