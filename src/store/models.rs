//! Row types shared between this service and the `journal_entries` collection.
//!
//! The collection is expected to have the columns
//! `id`, `user_id`, `content` and `created_at`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default collection name for journal entries
pub const JOURNAL_ENTRIES_TABLE: &str = "journal_entries";

/// Columns returned by the list projection
pub const SUMMARY_COLUMNS: &str = "id,created_at,content";

/// Insert payload. `id` is assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewJournalEntry {
    pub user_id: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// A persisted journal entry, as confirmed by the store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    #[serde(deserialize_with = "row_id::deserialize")]
    pub id: String,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub created_at: DateTime<Utc>,
    pub user_id: String,
    pub content: String,
}

/// List projection of a journal entry. `user_id` is left out on purpose:
/// callers only ever list their own entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntrySummary {
    #[serde(deserialize_with = "row_id::deserialize")]
    pub id: String,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub created_at: DateTime<Utc>,
    pub content: String,
}

impl From<JournalEntry> for JournalEntrySummary {
    fn from(entry: JournalEntry) -> Self {
        Self {
            id: entry.id,
            created_at: entry.created_at,
            content: entry.content,
        }
    }
}

/// Row ids are uuids in the default schema but bigint identity columns are
/// just as common, so accept either and keep them opaque.
mod row_id {
    use serde::{de, Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(i64),
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        match RawId::deserialize(deserializer)? {
            RawId::Text(s) if s.is_empty() => Err(de::Error::custom("empty row id")),
            RawId::Text(s) => Ok(s),
            RawId::Number(n) => Ok(n.to_string()),
        }
    }
}

/// `timestamptz` columns come back with an offset, plain `timestamp` columns
/// without one. The latter are taken as UTC.
mod timestamp {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{de, Deserialize, Deserializer};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).map_err(de::Error::custom)
    }

    pub(super) fn parse(raw: &str) -> Result<DateTime<Utc>, String> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Ok(dt.with_timezone(&Utc));
        }
        // Postgres renders `+00` rather than `+00:00`
        if let Ok(dt) = DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f%#z") {
            return Ok(dt.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .map(|naive| naive.and_utc())
            .map_err(|e| format!("invalid timestamp '{}': {}", raw, e))
    }
}
