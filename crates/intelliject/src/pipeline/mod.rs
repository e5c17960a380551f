//! Notes-to-questions matching pipeline

mod matcher;
mod sentences;

pub use matcher::MatchingPipeline;
pub use sentences::{chunk_by_sentences, split_sentences};
