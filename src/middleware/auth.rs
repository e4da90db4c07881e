use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::app::AppState;
use crate::auth::bearer_token;
use crate::error::ApiError;

pub use crate::auth::AuthUser;

/// Bearer authentication middleware: resolves the caller through the auth
/// provider and injects `AuthUser` into the request. Handlers behind it
/// read the owner of their data from that extension and nothing else.
pub async fn bearer_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(request.headers())?.to_string();

    let auth_user = state.identity.resolve(&token).await.map_err(|e| {
        if e.is_unauthorized() {
            tracing::warn!("Authentication failed for {} {}", request.method(), request.uri().path());
        }
        ApiError::from(e)
    })?;

    tracing::debug!(
        user_id = %auth_user.user_id,
        email = auth_user.email.as_deref().unwrap_or("-"),
        "Request authenticated"
    );
    request.extensions_mut().insert(auth_user);

    Ok(next.run(request).await)
}
