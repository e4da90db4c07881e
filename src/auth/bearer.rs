use axum::http::{header::AUTHORIZATION, HeaderMap};

use super::AuthError;

/// Extract the bearer token from the Authorization header.
///
/// The scheme is matched case-insensitively and surrounding whitespace is
/// trimmed from the token.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let auth_header = headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingCredentials)?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| AuthError::MalformedCredentials("header is not valid ASCII"))?
        .trim();

    let (scheme, token) = auth_str
        .split_once(' ')
        .ok_or(AuthError::MalformedCredentials("expected 'Bearer <token>'"))?;

    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AuthError::MalformedCredentials("scheme must be Bearer"));
    }

    let token = token.trim();
    if token.is_empty() {
        return Err(AuthError::MalformedCredentials("empty bearer token"));
    }

    Ok(token)
}
