//! Per-page matching of notes against previous year questions

use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::sync::Arc;

use crate::config::PipelineConfig;
use crate::document::{DocumentRenderer, RenderOptions};
use crate::error::{Error, Result};
use crate::generation::{clean_answer, clean_subtopic, PromptBuilder};
use crate::providers::LlmProvider;
use crate::retrieval::QuestionRetriever;
use crate::types::{ChunkData, NoteMatch, QuestionMatch, ScoredPyq};

use super::sentences::{chunk_by_sentences, split_sentences};

/// Blank subjects search every subject
fn subject_filter(subject: &str) -> Option<&str> {
    let subject = subject.trim();
    (!subject.is_empty()).then_some(subject)
}

/// Orchestrates subtopic inference, retrieval, answer extraction and
/// highlighting for uploaded notes
///
/// Stage failures inside a chunk degrade that chunk's result; only an
/// unreadable PDF fails the whole request.
#[derive(Clone)]
pub struct MatchingPipeline {
    llm: Arc<dyn LlmProvider>,
    retriever: QuestionRetriever,
    renderer: Arc<dyn DocumentRenderer>,
    config: PipelineConfig,
}

impl MatchingPipeline {
    pub fn new(
        llm: Arc<dyn LlmProvider>,
        retriever: QuestionRetriever,
        renderer: Arc<dyn DocumentRenderer>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            llm,
            retriever,
            renderer,
            config,
        }
    }

    pub fn renderer(&self) -> &Arc<dyn DocumentRenderer> {
        &self.renderer
    }

    /// Short subtopic label for a chunk, or the configured default
    pub async fn infer_subtopic(&self, chunk: &str) -> String {
        let prompt = PromptBuilder::subtopic_prompt(chunk);
        match self.llm.complete(&prompt).await {
            Ok(raw) => clean_subtopic(&raw).unwrap_or_else(|| {
                tracing::warn!("Empty subtopic from {}, using default", self.llm.name());
                self.config.default_subtopic.clone()
            }),
            Err(e) => {
                tracing::warn!("Subtopic inference failed: {}", e);
                self.config.default_subtopic.clone()
            }
        }
    }

    /// Most similar questions for a chunk; empty on retrieval failure
    pub async fn relevant_questions(&self, chunk: &str, subject: &str) -> Vec<ScoredPyq> {
        match self
            .retriever
            .relevant_pyqs(chunk, subject_filter(subject), self.config.top_k)
            .await
        {
            Ok(hits) => hits,
            Err(e) => {
                tracing::warn!("Question retrieval failed: {}", e);
                Vec::new()
            }
        }
    }

    /// Excerpt of `chunk` answering `question`; empty on failure
    pub async fn extract_answer(&self, chunk: &str, question: &str) -> String {
        let prompt = PromptBuilder::answer_extraction_prompt(chunk, question);
        match self.llm.complete(&prompt).await {
            Ok(raw) => clean_answer(&raw),
            Err(e) => {
                tracing::warn!("Answer extraction failed: {}", e);
                String::new()
            }
        }
    }

    /// Sentences of an answer, each highlighted separately on the page
    pub fn answer_fragments(answer: &str) -> Vec<String> {
        split_sentences(answer)
    }

    /// Extract one text chunk per page
    pub async fn page_texts(&self, pdf: Arc<[u8]>) -> Result<Vec<String>> {
        let renderer = Arc::clone(&self.renderer);
        tokio::task::spawn_blocking(move || renderer.page_texts(&pdf)).await?
    }

    /// Run the full pipeline over every page of a PDF
    pub async fn process_pdf(&self, pdf: Arc<[u8]>, subject: &str) -> Result<Vec<ChunkData>> {
        let chunks = self.page_texts(Arc::clone(&pdf)).await?;
        if chunks.is_empty() {
            return Err(Error::NoContent);
        }

        let renderer = Arc::clone(&self.renderer);
        let count_pdf = Arc::clone(&pdf);
        let page_count = match tokio::task::spawn_blocking(move || renderer.page_count(&count_pdf))
            .await?
        {
            Ok(count) => count,
            Err(e) => {
                tracing::warn!("Could not count pages, skipping images: {}", e);
                0
            }
        };

        tracing::info!(
            "Processing {} chunk(s) across {} page(s) with {}",
            chunks.len(),
            page_count,
            self.renderer.name()
        );

        let mut results = Vec::with_capacity(chunks.len());
        for (index, chunk) in chunks.iter().enumerate() {
            tracing::debug!("Processing chunk {}/{}", index + 1, chunks.len());
            results.push(self.process_chunk(&pdf, index, page_count, chunk, subject).await);
        }

        Ok(results)
    }

    async fn process_chunk(
        &self,
        pdf: &Arc<[u8]>,
        index: usize,
        page_count: usize,
        chunk: &str,
        subject: &str,
    ) -> ChunkData {
        let subtopic = self.infer_subtopic(chunk).await;
        let related = self.relevant_questions(chunk, subject).await;
        tracing::debug!(
            "Chunk {}: subtopic {:?}, {} related question(s)",
            index,
            subtopic,
            related.len()
        );

        let mut fragments = Vec::new();
        let mut questions = Vec::with_capacity(related.len());
        for scored in &related {
            let answer = self.extract_answer(chunk, &scored.pyq.question).await;
            fragments.extend(Self::answer_fragments(&answer));
            questions.push(QuestionMatch::from_scored(scored, &answer));
        }

        let highlighted_image = if index < page_count {
            self.highlighted_page(pdf, index, &fragments).await
        } else {
            String::new()
        };

        ChunkData {
            chunk_index: index,
            subtopic,
            questions,
            highlighted_image,
            answers_highlighted: fragments,
        }
    }

    /// Base64 PNG of a highlighted page, empty if rendering fails
    async fn highlighted_page(&self, pdf: &Arc<[u8]>, index: usize, fragments: &[String]) -> String {
        let renderer = Arc::clone(&self.renderer);
        let pdf = Arc::clone(pdf);
        let fragments = fragments.to_vec();
        let options = RenderOptions::with_dpi(self.config.render_dpi);

        let rendered = tokio::task::spawn_blocking(move || {
            renderer.render_highlighted(&pdf, index, &fragments, &options)
        })
        .await
        .map_err(Error::from)
        .and_then(|result| result);

        match rendered {
            Ok(png) => STANDARD.encode(png),
            Err(e) => {
                tracing::warn!("Highlight rendering failed for page {}: {}", index, e);
                String::new()
            }
        }
    }

    /// Match free-text notes, grouped into chunks of `max_sentences`
    pub async fn match_notes(
        &self,
        text: &str,
        subject: &str,
        max_sentences: Option<usize>,
    ) -> Vec<NoteMatch> {
        let max_sentences = max_sentences.unwrap_or(self.config.note_sentences_per_chunk);
        let chunks = chunk_by_sentences(text, max_sentences);

        let mut results = Vec::with_capacity(chunks.len());
        for chunk in chunks {
            let subtopic = self.infer_subtopic(&chunk).await;
            let matches = self
                .relevant_questions(&chunk, subject)
                .await
                .iter()
                .map(QuestionMatch::without_answer)
                .collect();
            results.push(NoteMatch {
                chunk,
                subtopic,
                matches,
            });
        }
        results
    }
}
