//! Application state for the IntelliJect server

use parking_lot::RwLock;
use std::sync::Arc;

use crate::config::{AppConfig, BackendProvider};
use crate::document::{default_renderer, DocumentRenderer};
use crate::error::Result;
use crate::pipeline::MatchingPipeline;
use crate::providers::{ollama, openai, EmbeddingProvider, LlmProvider};
use crate::retrieval::QuestionRetriever;
use crate::storage::RecordStore;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AppConfig,
    store: RecordStore,
    embedding_provider: Arc<dyn EmbeddingProvider>,
    llm_provider: Arc<dyn LlmProvider>,
    pipeline: MatchingPipeline,
    ready: RwLock<bool>,
}

impl AppState {
    /// Open the record store and connect the configured providers
    pub async fn new(config: AppConfig) -> Result<Self> {
        tracing::info!(
            "Initializing IntelliJect state (backend: {:?})...",
            config.backend
        );

        let db_path = config.database.path.clone();
        let store = tokio::task::spawn_blocking(move || RecordStore::open(db_path)).await??;
        let stats = store.stats()?;
        tracing::info!(
            "Record store opened at {} ({} questions, {} uploads)",
            config.database.path.display(),
            stats.pyqs,
            stats.uploads
        );

        let (embedding_provider, llm_provider): (Arc<dyn EmbeddingProvider>, Arc<dyn LlmProvider>) =
            match config.backend {
                BackendProvider::OpenAi => {
                    let (embedder, llm) = openai::providers(&config.openai)?;
                    (Arc::new(embedder), Arc::new(llm))
                }
                BackendProvider::Ollama => {
                    let (embedder, llm) = ollama::providers(&config.ollama)?;
                    (Arc::new(embedder), Arc::new(llm))
                }
            };
        tracing::info!(
            "Providers ready (embedding: {}/{}, llm: {}/{})",
            embedding_provider.name(),
            embedding_provider.model(),
            llm_provider.name(),
            llm_provider.model()
        );

        let renderer = default_renderer();
        tracing::info!("Document renderer: {}", renderer.name());

        let state = Self::from_parts(config, store, embedding_provider, llm_provider, renderer);
        // Not ready until the provider probe has run
        state.set_ready(false);
        Ok(state)
    }

    /// Assemble state from already-built components
    pub fn from_parts(
        config: AppConfig,
        store: RecordStore,
        embedding_provider: Arc<dyn EmbeddingProvider>,
        llm_provider: Arc<dyn LlmProvider>,
        renderer: Arc<dyn DocumentRenderer>,
    ) -> Self {
        let retriever = QuestionRetriever::new(store.clone(), Arc::clone(&embedding_provider));
        let pipeline = MatchingPipeline::new(
            Arc::clone(&llm_provider),
            retriever,
            renderer,
            config.pipeline.clone(),
        );

        Self {
            inner: Arc::new(AppStateInner {
                config,
                store,
                embedding_provider,
                llm_provider,
                pipeline,
                ready: RwLock::new(true),
            }),
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    pub fn store(&self) -> &RecordStore {
        &self.inner.store
    }

    pub fn embedding_provider(&self) -> &Arc<dyn EmbeddingProvider> {
        &self.inner.embedding_provider
    }

    pub fn llm_provider(&self) -> &Arc<dyn LlmProvider> {
        &self.inner.llm_provider
    }

    pub fn pipeline(&self) -> &MatchingPipeline {
        &self.inner.pipeline
    }

    /// Check if the server is ready
    pub fn is_ready(&self) -> bool {
        *self.inner.ready.read()
    }

    /// Set ready state
    pub fn set_ready(&self, ready: bool) {
        *self.inner.ready.write() = ready;
    }

    /// Probe both providers, then mark the server ready
    ///
    /// Unreachable providers only log a warning: the pipeline degrades per
    /// stage, so requests are still served.
    pub async fn check_providers(&self) {
        let llm = self.llm_provider();
        match llm.health_check().await {
            Ok(true) => tracing::info!("LLM {} is reachable", llm.name()),
            _ => tracing::warn!(
                "LLM {} is not reachable; subtopics will fall back to the default",
                llm.name()
            ),
        }

        let embedder = self.embedding_provider();
        match embedder.health_check().await {
            Ok(true) => tracing::info!("Embedding provider {} is reachable", embedder.name()),
            _ => tracing::warn!(
                "Embedding provider {} is not reachable; pages will have no related questions",
                embedder.name()
            ),
        }

        self.set_ready(true);
    }
}
