use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

use super::{AuthError, AuthUser};
use crate::types::UserId;

/// Canonical user record returned by the auth provider for a valid token
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProviderUser {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProviderError {
    /// The provider looked at the token and refused it
    #[error("token rejected with status {0}")]
    Rejected(u16),

    /// The provider could not be reached or answered with something unusable
    #[error("{0}")]
    Unavailable(String),
}

/// The "get user for token" operation of the hosted auth service
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn get_user(&self, token: &str) -> Result<ProviderUser, ProviderError>;
}

/// Maps a raw bearer credential to a trusted user identity.
///
/// Every credential is checked with the auth provider, which validates the
/// signature, expiry and revocation state. Resolution is read-only.
pub struct IdentityResolver {
    provider: Arc<dyn AuthProvider>,
}

impl IdentityResolver {
    pub fn new(provider: Arc<dyn AuthProvider>) -> Self {
        Self { provider }
    }

    pub async fn resolve(&self, credential: &str) -> Result<AuthUser, AuthError> {
        let token = credential.trim();
        if token.is_empty() {
            return Err(AuthError::MalformedCredentials("empty bearer token"));
        }
        if token.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(AuthError::MalformedCredentials("token contains whitespace"));
        }

        let user = self.provider.get_user(token).await.map_err(|e| match e {
            ProviderError::Rejected(status) => AuthError::Rejected(status),
            ProviderError::Unavailable(reason) => AuthError::ProviderUnavailable(reason),
        })?;

        let user_id = UserId::new(user.id).map_err(|_| AuthError::MissingSubject)?;

        Ok(AuthUser {
            user_id,
            email: user.email,
        })
    }
}
