// auth/mod.rs - Identity resolution for bearer credentials
//
// A bearer token is only trusted after the auth provider has confirmed it and
// returned the canonical user it belongs to. Tokens are never decoded locally.

pub mod bearer;
pub mod resolver;

use thiserror::Error;

use crate::types::UserId;

pub use bearer::bearer_token;
pub use resolver::{AuthProvider, IdentityResolver, ProviderError, ProviderUser};

/// Authenticated user context attached to a request by the bearer middleware
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: UserId,
    pub email: Option<String>,
}

/// Reasons a request could not be tied to a user
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("Missing Authorization header")]
    MissingCredentials,

    #[error("Malformed Authorization header: {0}")]
    MalformedCredentials(&'static str),

    #[error("Credential rejected by auth provider (status {0})")]
    Rejected(u16),

    #[error("Auth provider returned a user without an id")]
    MissingSubject,

    #[error("Auth provider unavailable: {0}")]
    ProviderUnavailable(String),
}

impl AuthError {
    /// True for every kind that means "this credential is not acceptable",
    /// as opposed to "we could not check it right now"
    pub fn is_unauthorized(&self) -> bool {
        !matches!(self, AuthError::ProviderUnavailable(_))
    }
}
