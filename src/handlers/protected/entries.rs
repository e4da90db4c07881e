use axum::{
    extract::{rejection::JsonRejection, Extension, State},
    Json,
};
use serde::Deserialize;

use crate::app::AppState;
use crate::error::ApiResult;
use crate::middleware::AuthUser;
use crate::store::models::{JournalEntry, JournalEntrySummary};

/// Body of `POST /entries`. Any other field, including a `user_id`, is
/// ignored: the owner always comes from the bearer token.
#[derive(Debug, Deserialize)]
pub struct CreateEntryRequest {
    pub content: String,
}

/// POST /entries - Create a journal entry for the authenticated user
pub async fn create(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    body: Result<Json<CreateEntryRequest>, JsonRejection>,
) -> ApiResult<JournalEntry> {
    let Json(body) = body?;
    let entry = state
        .entries
        .create_entry(&auth_user.user_id, body.content)
        .await?;
    Ok(Json(entry))
}

/// GET /entries - List the authenticated user's entries, newest first
pub async fn list(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> ApiResult<Vec<JournalEntrySummary>> {
    let entries = state.entries.list_entries(&auth_user.user_id).await?;
    Ok(Json(entries))
}
