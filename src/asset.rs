use chrono::{DateTime, TimeZone, Utc};
use uuid::Uuid;

/// Metadata record describing one stored audio file and its language tag
#[derive(Debug, Clone, PartialEq)]
pub struct AudioAsset {
    /// Document identifier, returned to clients as `documentId`
    pub id: String,
    pub language: String,
    /// Public relative URL of the stored file
    pub url: String,
    /// Sanitized, timestamp-prefixed on-disk name
    pub file_name: String,
    /// Filename as sent by the client (untrusted)
    pub original_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl AudioAsset {
    /// Build a new record with a fresh id and the current time
    pub fn new(
        language: String,
        url: String,
        file_name: String,
        original_name: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            language,
            url,
            file_name,
            original_name,
            created_at: Utc::now(),
        }
    }

    pub fn created_at_ms(&self) -> i64 {
        self.created_at.timestamp_millis()
    }

    /// Rebuild a record from its stored columns
    pub fn from_row(
        id: String,
        language: String,
        url: String,
        file_name: String,
        original_name: Option<String>,
        created_at_ms: i64,
    ) -> Self {
        let created_at = Utc
            .timestamp_millis_opt(created_at_ms)
            .single()
            .unwrap_or_default();
        Self {
            id,
            language,
            url,
            file_name,
            original_name,
            created_at,
        }
    }
}
