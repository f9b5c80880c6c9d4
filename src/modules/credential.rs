//! Token validation
//!
//! A single process-wide secret; the comparison sits behind
//! [`CredentialVerifier`] so hashed or rotated credentials can replace it
//! without touching the gate.

use thiserror::Error;

/// Why a presented credential was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CredentialError {
    #[error("credential missing")]
    Missing,
    #[error("credential invalid")]
    Invalid,
}

/// Credential comparison strategy
pub trait CredentialVerifier: Send + Sync {
    /// `true` if `presented` is an accepted credential
    fn verify(&self, presented: &str) -> bool;
}

/// Exact, case-sensitive equality against one configured secret
#[derive(Debug, Clone)]
pub struct SharedSecret {
    secret: String,
}

impl SharedSecret {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }
}

impl CredentialVerifier for SharedSecret {
    fn verify(&self, presented: &str) -> bool {
        presented == self.secret
    }
}

/// Validate an optional credential. Absent and empty both count as missing.
pub fn validate_token(
    verifier: &dyn CredentialVerifier,
    presented: Option<&str>,
) -> Result<(), CredentialError> {
    match presented {
        None | Some("") => Err(CredentialError::Missing),
        Some(token) if verifier.verify(token) => Ok(()),
        Some(_) => Err(CredentialError::Invalid),
    }
}
