//! PDF page text extraction and highlighted page rendering
//!
//! The pipeline talks to a [`DocumentRenderer`]. `MupdfRenderer` (default
//! feature `mupdf`) rasterises pages and locates answer fragments on them;
//! builds with `--no-default-features` fall back to [`LopdfRenderer`], which
//! only reads text.

mod highlight;
mod lopdf_renderer;
#[cfg(feature = "mupdf")]
mod mupdf_renderer;
mod text;

pub use highlight::{blend_highlights, encode_png, HighlightRect};
pub use lopdf_renderer::LopdfRenderer;
#[cfg(feature = "mupdf")]
pub use mupdf_renderer::MupdfRenderer;
pub use text::clean_page_text;

use std::sync::Arc;

use crate::error::Result;

/// Yellow, as used for answer highlights
pub const HIGHLIGHT_YELLOW: [u8; 3] = [255, 255, 0];

/// Options for rendering a highlighted page
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderOptions {
    /// Output resolution
    pub dpi: u32,
    /// Highlight color (RGB)
    pub color: [u8; 3],
    /// Blend strength in `0.0..=1.0`
    pub opacity: f32,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            dpi: 150,
            color: HIGHLIGHT_YELLOW,
            opacity: 1.0,
        }
    }
}

impl RenderOptions {
    /// Options at a given resolution with the default highlight style
    pub fn with_dpi(dpi: u32) -> Self {
        Self {
            dpi,
            ..Default::default()
        }
    }

    /// Pixels per PDF point
    pub fn scale(&self) -> f32 {
        self.dpi as f32 / 72.0
    }
}

/// Reads PDF pages and renders them with highlighted text
///
/// All methods are blocking; async callers run them on the blocking pool.
pub trait DocumentRenderer: Send + Sync {
    /// Plain text of every page, in page order (blank pages yield `""`)
    fn page_texts(&self, pdf: &[u8]) -> Result<Vec<String>>;

    /// Number of pages
    fn page_count(&self, pdf: &[u8]) -> Result<usize>;

    /// Render one page (0-based) to PNG with every occurrence of every
    /// non-empty fragment highlighted
    fn render_highlighted(
        &self,
        pdf: &[u8],
        page_index: usize,
        fragments: &[String],
        options: &RenderOptions,
    ) -> Result<Vec<u8>>;

    /// Renderer name for logging
    fn name(&self) -> &str;
}

/// Best renderer compiled into this build
#[cfg(feature = "mupdf")]
pub fn default_renderer() -> Arc<dyn DocumentRenderer> {
    Arc::new(MupdfRenderer::new())
}

/// Best renderer compiled into this build
#[cfg(not(feature = "mupdf"))]
pub fn default_renderer() -> Arc<dyn DocumentRenderer> {
    Arc::new(LopdfRenderer::new())
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_options_scale() {
        assert_eq!(RenderOptions::with_dpi(72).scale(), 1.0);
        assert_eq!(RenderOptions::default().scale(), 150.0 / 72.0);
        assert_eq!(RenderOptions::default().color, HIGHLIGHT_YELLOW);
    }

    #[test]
    fn test_default_renderer_reads_text() {
        let renderer = default_renderer();
        let pdf = fixtures::pdf_with_pages(&["Firewalls filter packets"]);
        assert_eq!(renderer.page_count(&pdf).unwrap(), 1);
    }

    #[cfg(feature = "mupdf")]
    #[test]
    fn test_default_renderer_highlights_pages() {
        let renderer = default_renderer();
        assert_eq!(renderer.name(), "mupdf");

        let pdf = fixtures::pdf_with_pages(&["Firewalls filter packets"]);
        let fragments = vec!["Firewalls filter packets".to_string()];
        let png = renderer
            .render_highlighted(&pdf, 0, &fragments, &RenderOptions::with_dpi(72))
            .unwrap();
        assert!(png.starts_with(b"\x89PNG"));
    }

    #[cfg(not(feature = "mupdf"))]
    #[test]
    fn test_text_only_build_falls_back_to_lopdf() {
        assert_eq!(default_renderer().name(), "lopdf");
    }
}
