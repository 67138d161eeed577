//! Identity collaborator seam.
//!
//! The prediction service only needs a bearer token for the current session.
//! Sign-in, refresh and storage are the identity provider's business.

use std::fmt;
use std::future::Future;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CredentialError {
    #[error("User is not logged in. Please log in to use this feature.")]
    NotLoggedIn,

    #[error("Could not obtain an ID token: {0}")]
    TokenUnavailable(String),
}

/// An ID token sent as `Authorization: Bearer <token>`.
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken(String);

impl BearerToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BearerToken(***)")
    }
}

/// Source of the current session's token.
pub trait CredentialProvider: Send + Sync {
    /// Token for the signed-in user, or why there is none.
    fn current_token(&self) -> impl Future<Output = Result<BearerToken, CredentialError>> + Send;
}

/// A fixed token (or no session at all).
#[derive(Debug, Clone, Default)]
pub struct StaticCredentials {
    token: Option<BearerToken>,
}

impl StaticCredentials {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: Some(BearerToken::new(token)),
        }
    }

    /// No signed-in user.
    pub fn anonymous() -> Self {
        Self { token: None }
    }

    /// Blank tokens count as signed out.
    pub fn from_optional(token: Option<String>) -> Self {
        match token.filter(|t| !t.trim().is_empty()) {
            Some(t) => Self::new(t),
            None => Self::anonymous(),
        }
    }
}

impl CredentialProvider for StaticCredentials {
    async fn current_token(&self) -> Result<BearerToken, CredentialError> {
        self.token.clone().ok_or(CredentialError::NotLoggedIn)
    }
}
