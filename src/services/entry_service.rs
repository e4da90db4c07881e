use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;

use crate::store::models::{JournalEntry, JournalEntrySummary, NewJournalEntry};
use crate::store::{EntryStore, StoreError};
use crate::types::UserId;

#[derive(Debug, Error)]
pub enum EntryServiceError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Store did not confirm the inserted entry")]
    EmptyConfirmation,

    #[error("Store confirmed an entry owned by '{actual}' for user '{expected}'")]
    OwnershipMismatch { expected: String, actual: String },
}

/// Create and list journal entries on behalf of a resolved user.
///
/// The owner of every entry comes from the `UserId` argument, which only the
/// identity resolver produces.
pub struct EntryService {
    store: Arc<dyn EntryStore>,
}

impl EntryService {
    pub fn new(store: Arc<dyn EntryStore>) -> Self {
        Self { store }
    }

    /// Persist a new entry stamped with the current time
    pub async fn create_entry(
        &self,
        user_id: &UserId,
        content: String,
    ) -> Result<JournalEntry, EntryServiceError> {
        let new_entry = NewJournalEntry {
            user_id: user_id.as_str().to_string(),
            content,
            created_at: Utc::now(),
        };

        let confirmed = self.store.insert_entry(&new_entry).await?;
        let entry = confirmed
            .into_iter()
            .next()
            .ok_or(EntryServiceError::EmptyConfirmation)?;

        if entry.user_id != user_id.as_str() {
            return Err(EntryServiceError::OwnershipMismatch {
                expected: user_id.to_string(),
                actual: entry.user_id,
            });
        }

        tracing::info!(user_id = %user_id, entry_id = %entry.id, "Journal entry created");
        Ok(entry)
    }

    /// Entries owned by `user_id`, newest first
    pub async fn list_entries(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<JournalEntrySummary>, EntryServiceError> {
        let entries = self.store.list_entries(user_id).await?;
        tracing::debug!(user_id = %user_id, count = entries.len(), "Journal entries listed");
        Ok(entries)
    }
}
