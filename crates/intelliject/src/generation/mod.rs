//! Prompt construction and model output cleanup

pub mod prompt;

pub use prompt::{clean_answer, clean_subtopic, PromptBuilder};
