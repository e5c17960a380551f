//! Previous year question (PYQ) records

use serde::{Deserialize, Serialize};

/// A stored previous year exam question
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pyq {
    /// Row ID
    pub id: i64,
    /// Subject the question belongs to (e.g. "Cyber Security")
    pub subject: String,
    /// Subtopic label assigned at import time
    pub sub_topic: String,
    /// Question text
    pub question: String,
    /// Marks (fractional marks such as 2.5 exist)
    pub marks: f64,
    /// Exam year
    pub year: String,
    pub semester: Option<String>,
    pub branch: Option<String>,
    pub unit: Option<String>,
}

/// One raw question record as found in an import file
///
/// Every field is optional; records without a question are dropped on insert.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewPyq {
    #[serde(default)]
    pub question: Option<String>,
    #[serde(default)]
    pub sub_topic: Option<String>,
    #[serde(default)]
    pub marks: Option<f64>,
    #[serde(default)]
    pub year: Option<String>,
    #[serde(default)]
    pub semester: Option<String>,
    #[serde(default)]
    pub branch: Option<String>,
    #[serde(default)]
    pub unit: Option<String>,
}

impl NewPyq {
    /// Convenience constructor for a record with just a question
    pub fn question(text: impl Into<String>) -> Self {
        Self {
            question: Some(text.into()),
            ..Default::default()
        }
    }

    /// Question text if present and non-blank
    pub fn valid_question(&self) -> Option<&str> {
        self.question
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
    }
}

/// A question returned by similarity search
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredPyq {
    /// The matched question
    pub pyq: Pyq,
    /// Cosine similarity to the query (higher is more similar)
    pub similarity: f32,
}
