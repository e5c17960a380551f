//! Related-question lookup backed by the record store

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::providers::EmbeddingProvider;
use crate::storage::RecordStore;
use crate::types::{Pyq, ScoredPyq};

use super::index::QuestionIndex;

/// Finds the stored questions most similar to a piece of text
///
/// Question vectors are embedded once per model and cached in the store.
#[derive(Clone)]
pub struct QuestionRetriever {
    store: RecordStore,
    embedder: Arc<dyn EmbeddingProvider>,
}

impl QuestionRetriever {
    pub fn new(store: RecordStore, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self { store, embedder }
    }

    /// Up to `k` questions for `subject` (all subjects when `None`) ranked by
    /// similarity to `query`
    pub async fn relevant_pyqs(
        &self,
        query: &str,
        subject: Option<&str>,
        k: usize,
    ) -> Result<Vec<ScoredPyq>> {
        let store = self.store.clone();
        let subject_filter = subject.map(str::to_string);
        let pyqs = tokio::task::spawn_blocking(move || match subject_filter {
            Some(subject) => store.pyqs_by_subject(&subject),
            None => store.all_pyqs(),
        })
        .await??;

        if pyqs.is_empty() || k == 0 {
            tracing::debug!("No questions to search for subject {:?}", subject);
            return Ok(Vec::new());
        }

        let vectors = self.question_vectors(&pyqs).await?;
        let query_vector = self.embedder.embed(query).await?;

        let index: QuestionIndex = pyqs
            .into_iter()
            .filter_map(|pyq| vectors.get(&pyq.id).cloned().map(|v| (pyq, v)))
            .collect();

        Ok(index.search(&query_vector, k))
    }

    /// Cached vectors for `pyqs`, embedding and persisting any that are missing
    async fn question_vectors(&self, pyqs: &[Pyq]) -> Result<HashMap<i64, Vec<f32>>> {
        let model = self.embedder.model().to_string();
        let ids: Vec<i64> = pyqs.iter().map(|p| p.id).collect();

        let store = self.store.clone();
        let lookup_model = model.clone();
        let mut vectors =
            tokio::task::spawn_blocking(move || store.embeddings_for(&lookup_model, &ids)).await??;

        let missing: Vec<&Pyq> = pyqs.iter().filter(|p| !vectors.contains_key(&p.id)).collect();
        if missing.is_empty() {
            return Ok(vectors);
        }

        tracing::info!(
            "Embedding {} question(s) with {} ({})",
            missing.len(),
            self.embedder.name(),
            model
        );

        let texts: Vec<String> = missing.iter().map(|p| p.question.clone()).collect();
        let embedded = self.embedder.embed_batch(&texts).await?;
        if embedded.len() != missing.len() {
            return Err(Error::embedding(format!(
                "Expected {} embeddings, got {}",
                missing.len(),
                embedded.len()
            )));
        }

        let new_vectors: Vec<(i64, Vec<f32>)> =
            missing.iter().map(|p| p.id).zip(embedded).collect();

        let store = self.store.clone();
        let to_store = new_vectors.clone();
        tokio::task::spawn_blocking(move || -> Result<()> {
            for (id, vector) in &to_store {
                store.store_embedding(*id, &model, vector)?;
            }
            Ok(())
        })
        .await??;

        vectors.extend(new_vectors);
        Ok(vectors)
    }
}
