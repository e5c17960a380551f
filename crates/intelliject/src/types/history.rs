//! Upload history records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Display format used by the history endpoint, e.g. "05 Mar, 2024 02:15 PM"
pub const HISTORY_TIMESTAMP_FORMAT: &str = "%d %b, %Y %I:%M %p";

/// A recorded PDF upload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadRecord {
    pub id: i64,
    /// Original filename as uploaded
    pub filename: String,
    /// Subject selected for the upload
    pub subject: String,
    /// Upload time (UTC)
    pub timestamp: DateTime<Utc>,
}

impl UploadRecord {
    /// Timestamp formatted for display
    pub fn display_timestamp(&self) -> String {
        self.timestamp.format(HISTORY_TIMESTAMP_FORMAT).to_string()
    }
}
