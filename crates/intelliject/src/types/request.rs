//! Request bodies for the HTTP API

use serde::{Deserialize, Serialize};

/// Body of `POST /match-notes`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchNotesRequest {
    /// Free-text notes
    pub text: String,
    /// Restrict matches to one subject; all subjects when absent or blank
    #[serde(default)]
    pub subject: Option<String>,
    /// Sentences per chunk (defaults to the configured value)
    #[serde(default)]
    pub max_sentences: Option<usize>,
}
