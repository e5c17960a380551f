//! Question retrieval by embedding similarity

mod index;
mod retriever;

pub use index::{cosine_similarity, QuestionIndex};
pub use retriever::QuestionRetriever;
