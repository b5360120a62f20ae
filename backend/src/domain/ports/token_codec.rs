//! Port for issuing and verifying signed access tokens.

use chrono::{DateTime, Utc};

use crate::domain::Principal;

use super::define_port_error;

define_port_error! {
    /// Token failures. Adapters must not leak signature details.
    pub enum TokenError {
        /// The token was missing, malformed, forged or expired.
        Invalid { message: String } => "invalid token: {message}",
        /// A token could not be signed.
        Signing { message: String } => "token signing failed: {message}",
    }
}

/// Signed token returned on login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

#[cfg_attr(test, mockall::automock)]
pub trait TokenCodec: Send + Sync {
    /// Sign a token for `principal`.
    fn issue(&self, principal: Principal) -> Result<IssuedToken, TokenError>;

    /// Verify a token's signature and expiry and return its principal.
    fn verify(&self, token: &str) -> Result<Principal, TokenError>;
}
