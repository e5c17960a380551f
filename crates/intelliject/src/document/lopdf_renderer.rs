//! Text-only renderer backed by lopdf

use lopdf::Document;

use super::text::clean_page_text;
use super::{DocumentRenderer, RenderOptions};
use crate::error::{Error, Result};

/// Extracts page text with lopdf; cannot rasterise pages
#[derive(Debug, Default, Clone, Copy)]
pub struct LopdfRenderer;

impl LopdfRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl DocumentRenderer for LopdfRenderer {
    fn page_texts(&self, pdf: &[u8]) -> Result<Vec<String>> {
        let doc = Document::load_mem(pdf)?;
        let pages = doc.get_pages();

        let mut texts = Vec::with_capacity(pages.len());
        for page_number in pages.keys() {
            let text = match doc.extract_text(&[*page_number]) {
                Ok(text) => clean_page_text(&text),
                Err(e) => {
                    tracing::debug!("No text extracted from page {}: {}", page_number, e);
                    String::new()
                }
            };
            texts.push(text);
        }

        Ok(texts)
    }

    fn page_count(&self, pdf: &[u8]) -> Result<usize> {
        Ok(Document::load_mem(pdf)?.get_pages().len())
    }

    fn render_highlighted(
        &self,
        pdf: &[u8],
        page_index: usize,
        _fragments: &[String],
        _options: &RenderOptions,
    ) -> Result<Vec<u8>> {
        let count = self.page_count(pdf)?;
        if page_index >= count {
            return Err(Error::render(format!(
                "Page {} out of range ({} pages)",
                page_index, count
            )));
        }
        Err(Error::render(
            "Page rasterisation requires the `mupdf` feature",
        ))
    }

    fn name(&self) -> &str {
        "lopdf"
    }
}
