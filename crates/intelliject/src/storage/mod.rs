//! Storage module for persistent data storage
//!
//! Provides SQLite-based persistence for questions, upload history and
//! cached question embeddings.

mod database;

pub use database::{RecordStore, StoreStats};
