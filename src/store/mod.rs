// store/mod.rs - Data store ports and adapters
//
// The journal itself lives in a hosted Supabase project. This module defines
// the narrow interface the service needs from it and the HTTP client that
// implements that interface.

pub mod models;
pub mod retry;
pub mod supabase;

use async_trait::async_trait;
use thiserror::Error;

use crate::types::UserId;
use models::{JournalEntry, JournalEntrySummary, NewJournalEntry};

pub use retry::RetryingEntryStore;
pub use supabase::SupabaseClient;

/// Errors from the external data store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Store client error: {0}")]
    Client(String),

    #[error("Store request failed: {0}")]
    Transport(String),

    #[error("Store rejected request ({status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("Unexpected store response: {0}")]
    Decode(String),
}

impl StoreError {
    /// Whether repeating the same request could reasonably succeed
    pub fn is_transient(&self) -> bool {
        match self {
            StoreError::Transport(_) => true,
            StoreError::Rejected { status, .. } => *status >= 500 || *status == 429,
            StoreError::Client(_) | StoreError::Decode(_) => false,
        }
    }
}

/// Persistence operations for journal entries
#[async_trait]
pub trait EntryStore: Send + Sync {
    /// Insert one entry and return whatever rows the store confirms.
    /// An empty vector means the write was not confirmed.
    async fn insert_entry(&self, entry: &NewJournalEntry) -> Result<Vec<JournalEntry>, StoreError>;

    /// All entries owned by `user_id`, newest first
    async fn list_entries(&self, user_id: &UserId) -> Result<Vec<JournalEntrySummary>, StoreError>;
}
