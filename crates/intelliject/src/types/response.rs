//! Response types for the HTTP API

use serde::{Deserialize, Serialize};

use super::history::UploadRecord;
use super::question::ScoredPyq;

/// Shown when no excerpt could be extracted for a question
pub const NO_ANSWER_PLACEHOLDER: &str = "(No direct answer found)";

/// Shown when a question has no subtopic
pub const MISSING_SUBTOPIC: &str = "N/A";

/// A matched question with its extracted answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionMatch {
    pub question: String,
    pub sub_topic: String,
    pub marks: f64,
    pub year: String,
    /// Excerpt from the chunk, or the placeholder; omitted for note matches
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub answer: String,
    /// Cosine similarity of the question to the chunk
    pub similarity: f32,
}

impl QuestionMatch {
    /// Build from a retrieval hit and the (possibly empty) extracted answer
    pub fn from_scored(scored: &ScoredPyq, answer: &str) -> Self {
        let pyq = &scored.pyq;
        let sub_topic = if pyq.sub_topic.trim().is_empty() {
            MISSING_SUBTOPIC.to_string()
        } else {
            pyq.sub_topic.clone()
        };
        let answer = if answer.trim().is_empty() {
            NO_ANSWER_PLACEHOLDER.to_string()
        } else {
            answer.to_string()
        };

        Self {
            question: pyq.question.clone(),
            sub_topic,
            marks: pyq.marks,
            year: pyq.year.clone(),
            answer,
            similarity: scored.similarity,
        }
    }

    /// Build from a retrieval hit when no answer extraction was attempted
    pub fn without_answer(scored: &ScoredPyq) -> Self {
        Self {
            answer: String::new(),
            ..Self::from_scored(scored, "")
        }
    }
}

/// Result for one page of the uploaded PDF
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkData {
    /// 0-based page index
    pub chunk_index: usize,
    pub subtopic: String,
    pub questions: Vec<QuestionMatch>,
    /// Base64 PNG of the highlighted page, empty when rendering failed
    pub highlighted_image: String,
    /// Answer sentences highlighted on the page, in question order
    pub answers_highlighted: Vec<String>,
}

/// Matches for one chunk of free-text notes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteMatch {
    pub chunk: String,
    pub subtopic: String,
    pub matches: Vec<QuestionMatch>,
}

/// Response from `/upload-pdf`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PdfResponse {
    pub success: bool,
    pub message: String,
    pub chunks_count: usize,
}

/// Response from `/process-pdf`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessedPdfResponse {
    pub success: bool,
    pub message: String,
    pub total_chunks: usize,
    pub chunk_data: Vec<ChunkData>,
}

/// Response from `/match-notes`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotesResponse {
    pub success: bool,
    pub chunks: Vec<NoteMatch>,
}

/// One entry of the upload history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryItem {
    pub filename: String,
    pub subject: String,
    pub timestamp: String,
}

impl From<&UploadRecord> for HistoryItem {
    fn from(record: &UploadRecord) -> Self {
        Self {
            filename: record.filename.clone(),
            subject: record.subject.clone(),
            timestamp: record.display_timestamp(),
        }
    }
}

/// Response from `/history`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub success: bool,
    pub history: Vec<HistoryItem>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Pyq;

    fn scored(sub_topic: &str) -> ScoredPyq {
        ScoredPyq {
            pyq: Pyq {
                id: 7,
                subject: "Environmental Sciences".to_string(),
                sub_topic: sub_topic.to_string(),
                question: "What is BOD?".to_string(),
                marks: 2.5,
                year: "2022".to_string(),
                semester: None,
                branch: None,
                unit: None,
            },
            similarity: 0.82,
        }
    }

    #[test]
    fn test_question_match_fallbacks() {
        let m = QuestionMatch::from_scored(&scored(""), "  ");
        assert_eq!(m.sub_topic, MISSING_SUBTOPIC);
        assert_eq!(m.answer, NO_ANSWER_PLACEHOLDER);
        assert_eq!(m.marks, 2.5);
    }

    #[test]
    fn test_question_match_keeps_values() {
        let m = QuestionMatch::from_scored(&scored("Water Pollution"), "BOD is oxygen demand.");
        assert_eq!(m.sub_topic, "Water Pollution");
        assert_eq!(m.answer, "BOD is oxygen demand.");
        assert_eq!(m.year, "2022");
    }

    #[test]
    fn test_without_answer_omits_field() {
        let m = QuestionMatch::without_answer(&scored("Water Pollution"));
        let json = serde_json::to_value(&m).unwrap();
        assert!(json.get("answer").is_none());
        assert_eq!(json["marks"], 2.5);
    }

    #[test]
    fn test_chunk_data_field_names() {
        let chunk = ChunkData {
            chunk_index: 0,
            subtopic: "General".to_string(),
            questions: vec![],
            highlighted_image: String::new(),
            answers_highlighted: vec![],
        };
        let json = serde_json::to_value(&chunk).unwrap();
        for key in ["chunk_index", "subtopic", "questions", "highlighted_image", "answers_highlighted"] {
            assert!(json.get(key).is_some(), "missing {}", key);
        }
    }
}
