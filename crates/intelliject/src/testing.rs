//! In-crate mock providers for pipeline and router tests

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::document::{DocumentRenderer, RenderOptions};
use crate::error::{Error, Result};
use crate::providers::{EmbeddingProvider, LlmProvider};

const MOCK_DIMENSIONS: usize = 64;

/// Deterministic bag-of-words embedder: texts sharing words are similar
#[derive(Default)]
pub struct MockEmbedder {
    embedded: AtomicUsize,
    fail: bool,
}

impl MockEmbedder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    /// Number of texts embedded so far
    pub fn embedded_count(&self) -> usize {
        self.embedded.load(Ordering::SeqCst)
    }

    pub fn vector_for(text: &str) -> Vec<f32> {
        let mut vector = vec![0.0; MOCK_DIMENSIONS];
        for word in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| w.len() > 2)
        {
            let mut hasher = DefaultHasher::new();
            word.to_lowercase().hash(&mut hasher);
            vector[(hasher.finish() as usize) % MOCK_DIMENSIONS] += 1.0;
        }
        vector
    }
}

#[async_trait]
impl EmbeddingProvider for MockEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        if self.fail {
            return Err(Error::embedding("mock embedder failure"));
        }
        self.embedded.fetch_add(1, Ordering::SeqCst);
        Ok(Self::vector_for(text))
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(!self.fail)
    }

    fn name(&self) -> &str {
        "mock"
    }

    fn model(&self) -> &str {
        "mock-embed"
    }
}

type Responder = Box<dyn Fn(&str) -> Result<String> + Send + Sync>;

/// LLM returning canned responses and recording prompts
pub struct MockLlm {
    responder: Responder,
    prompts: Mutex<Vec<String>>,
}

impl MockLlm {
    pub fn new<F>(responder: F) -> Self
    where
        F: Fn(&str) -> Result<String> + Send + Sync + 'static,
    {
        Self {
            responder: Box::new(responder),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Answers subtopic prompts with `subtopic` and extraction prompts with `answer`
    pub fn fixed(subtopic: &str, answer: &str) -> Self {
        let subtopic = subtopic.to_string();
        let answer = answer.to_string();
        Self::new(move |prompt| {
            if prompt.trim_end().ends_with("Subtopic:") {
                Ok(subtopic.clone())
            } else {
                Ok(answer.clone())
            }
        })
    }

    pub fn failing() -> Self {
        Self::new(|_| Err(Error::llm("mock llm unavailable")))
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().clone()
    }
}

#[async_trait]
impl LlmProvider for MockLlm {
    async fn complete(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().push(prompt.to_string());
        (self.responder)(prompt)
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }

    fn name(&self) -> &str {
        "mock"
    }

    fn model(&self) -> &str {
        "mock-llm"
    }
}

/// Renderer with fixed page texts; renders a fake PNG or fails
pub struct MockRenderer {
    pages: Vec<String>,
    can_render: bool,
    renders: Mutex<Vec<(usize, Vec<String>)>>,
}

/// Bytes returned by a successful mock render
pub const MOCK_PNG: &[u8] = b"\x89PNG\r\n\x1a\nmock";

impl MockRenderer {
    pub fn new(pages: &[&str]) -> Self {
        Self {
            pages: pages.iter().map(|p| p.to_string()).collect(),
            can_render: true,
            renders: Mutex::new(Vec::new()),
        }
    }

    pub fn text_only(pages: &[&str]) -> Self {
        Self {
            can_render: false,
            ..Self::new(pages)
        }
    }

    /// `(page_index, fragments)` for every render call
    pub fn renders(&self) -> Vec<(usize, Vec<String>)> {
        self.renders.lock().clone()
    }
}

impl DocumentRenderer for MockRenderer {
    fn page_texts(&self, pdf: &[u8]) -> Result<Vec<String>> {
        if !pdf.starts_with(b"%PDF") {
            return Err(Error::PdfParse("missing PDF header".to_string()));
        }
        Ok(self.pages.clone())
    }

    fn page_count(&self, pdf: &[u8]) -> Result<usize> {
        self.page_texts(pdf).map(|pages| pages.len())
    }

    fn render_highlighted(
        &self,
        _pdf: &[u8],
        page_index: usize,
        fragments: &[String],
        _options: &RenderOptions,
    ) -> Result<Vec<u8>> {
        self.renders.lock().push((page_index, fragments.to_vec()));
        if !self.can_render {
            return Err(Error::render("mock renderer cannot rasterise"));
        }
        if page_index >= self.pages.len() {
            return Err(Error::render("page out of range"));
        }
        Ok(MOCK_PNG.to_vec())
    }

    fn name(&self) -> &str {
        "mock"
    }
}
