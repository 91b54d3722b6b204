//! Sign-in gate for gallery mutations.
//!
//! Uploading, editing and deleting photos (and changing the filter) require
//! a signed-in session. Listing does not. The gate is a trait so the
//! pipeline can be exercised without credentials.
//!
//! [`TokenGate`] is the command-line flavour: the configuration holds the
//! SHA-256 hex digest of an admin token, and the session is signed in when
//! the token presented on the command line (or `FRIENDSTA_TOKEN`) hashes to
//! it. The plain token never has to live in the config file.

use sha2::{Digest, Sha256};
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum AuthError {
    #[error("Not signed in: this action needs a valid admin token")]
    SignedOut,
}

/// Answers whether the current session may mutate the gallery.
pub trait AuthGate {
    fn is_signed_in(&self) -> bool;
}

/// Fail with [`AuthError::SignedOut`] unless the gate is open.
pub fn require_signed_in(gate: &dyn AuthGate) -> Result<(), AuthError> {
    if gate.is_signed_in() {
        Ok(())
    } else {
        Err(AuthError::SignedOut)
    }
}

/// Lowercase hex SHA-256 of a token.
pub fn token_digest(token: &str) -> String {
    format!("{:x}", Sha256::digest(token.as_bytes()))
}

/// Compares a presented token against a configured digest.
#[derive(Debug, Clone)]
pub struct TokenGate {
    expected_sha256: Option<String>,
    presented: Option<String>,
}

impl TokenGate {
    /// `expected_sha256` of `None` means no admin is configured, so nobody
    /// can sign in.
    pub fn new(expected_sha256: Option<&str>, presented: Option<&str>) -> Self {
        Self {
            expected_sha256: expected_sha256.map(|d| d.trim().to_ascii_lowercase()),
            presented: presented.map(str::to_owned),
        }
    }
}

impl AuthGate for TokenGate {
    fn is_signed_in(&self) -> bool {
        match (&self.expected_sha256, &self.presented) {
            (Some(expected), Some(token)) if !token.is_empty() => {
                token_digest(token) == *expected
            }
            _ => false,
        }
    }
}

/// Always signed in.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenGate;

impl AuthGate for OpenGate {
    fn is_signed_in(&self) -> bool {
        true
    }
}

/// Never signed in.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClosedGate;

impl AuthGate for ClosedGate {
    fn is_signed_in(&self) -> bool {
        false
    }
}
