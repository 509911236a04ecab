//! Login error types.

use std::fmt;

use shibauth_core::error::ShibauthError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoginError {
    #[error("cannot decode attribute '{attribute}': {reason}")]
    Decoding { attribute: String, reason: String },

    #[error("store error: {0}")]
    Store(#[from] ShibauthError),
}

impl LoginError {
    pub fn kind(&self) -> FailureKind {
        match self {
            LoginError::Decoding { .. } => FailureKind::Decoding,
            LoginError::Store(_) => FailureKind::Store,
        }
    }
}

/// Broad class of a failed login, for callers that map it to a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Decoding,
    Store,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::Decoding => f.write_str("decoding"),
            FailureKind::Store => f.write_str("store"),
        }
    }
}

/// A login that could neither establish an identity nor abstain.
#[derive(Debug, Error)]
#[error("SSO login failed ({kind}): {source}")]
pub struct LoginFailure {
    pub kind: FailureKind,
    pub source: LoginError,
}

impl From<LoginError> for LoginFailure {
    fn from(source: LoginError) -> Self {
        Self {
            kind: source.kind(),
            source,
        }
    }
}
