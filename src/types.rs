//! Shared types used across the codebase

use std::fmt;

/// Identifier of an authenticated user as issued by the auth provider.
///
/// Always non-empty. Handlers only ever receive one from the identity
/// resolver, never from a request body.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UserId(String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("user id must not be empty")]
pub struct EmptyUserId;

impl UserId {
    pub fn new(value: impl Into<String>) -> Result<Self, EmptyUserId> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(EmptyUserId);
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
