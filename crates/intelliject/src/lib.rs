//! IntelliJect: match study-note PDFs to previous year exam questions
//!
//! Each page of an uploaded PDF becomes a chunk. For every chunk the service
//! infers a subtopic with an LLM, retrieves the most similar previous year
//! questions (PYQs) by embedding similarity, asks the LLM for the sentences
//! of the page that answer each question, and renders the page with those
//! sentences highlighted.

pub mod config;
pub mod document;
pub mod error;
pub mod generation;
pub mod pipeline;
pub mod providers;
pub mod retrieval;
pub mod server;
pub mod storage;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use config::AppConfig;
pub use document::{DocumentRenderer, LopdfRenderer, RenderOptions};
pub use error::{Error, Result};
pub use pipeline::MatchingPipeline;
pub use retrieval::QuestionRetriever;
pub use server::IntelliJectServer;
pub use storage::RecordStore;
pub use types::{ChunkData, NoteMatch, Pyq, QuestionMatch, ScoredPyq};
