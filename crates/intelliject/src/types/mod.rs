//! Core types for IntelliJect

pub mod history;
pub mod question;
pub mod request;
pub mod response;

pub use history::UploadRecord;
pub use question::{NewPyq, Pyq, ScoredPyq};
pub use request::MatchNotesRequest;
pub use response::{
    ChunkData, HistoryItem, HistoryResponse, NoteMatch, NotesResponse, PdfResponse,
    ProcessedPdfResponse, QuestionMatch, MISSING_SUBTOPIC, NO_ANSWER_PLACEHOLDER,
};
