use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use super::models::{JournalEntry, JournalEntrySummary, NewJournalEntry};
use super::{EntryStore, StoreError};
use crate::types::UserId;

/// Bounded retry around the read path of another store.
///
/// Only `list_entries` is retried, and only on transient failures. Inserts
/// go straight through since a repeated insert could create a duplicate.
pub struct RetryingEntryStore {
    inner: Arc<dyn EntryStore>,
    max_retries: u32,
    backoff: Duration,
}

impl RetryingEntryStore {
    pub fn new(inner: Arc<dyn EntryStore>, max_retries: u32, backoff: Duration) -> Self {
        Self {
            inner,
            max_retries,
            backoff,
        }
    }
}

#[async_trait]
impl EntryStore for RetryingEntryStore {
    async fn insert_entry(&self, entry: &NewJournalEntry) -> Result<Vec<JournalEntry>, StoreError> {
        self.inner.insert_entry(entry).await
    }

    async fn list_entries(&self, user_id: &UserId) -> Result<Vec<JournalEntrySummary>, StoreError> {
        let mut attempt = 0;
        loop {
            match self.inner.list_entries(user_id).await {
                Err(e) if e.is_transient() && attempt < self.max_retries => {
                    attempt += 1;
                    tracing::warn!(
                        attempt,
                        max_retries = self.max_retries,
                        "Transient store error listing entries, retrying: {}",
                        e
                    );
                    tokio::time::sleep(self.backoff).await;
                }
                result => return result,
            }
        }
    }
}
