//! Rasterising renderer backed by MuPDF

use image::RgbaImage;
use mupdf::{Colorspace, Document, Matrix, Page, Pixmap};

use super::highlight::{blend_highlights, encode_png, HighlightRect};
use super::text::clean_page_text;
use super::{DocumentRenderer, RenderOptions};
use crate::error::{Error, Result};

const PDF_MIME: &str = "application/pdf";

/// Upper bound on search hits per fragment
const MAX_HITS_PER_FRAGMENT: u32 = 64;

fn parse_err(err: mupdf::Error) -> Error {
    Error::PdfParse(err.to_string())
}

fn render_err(err: mupdf::Error) -> Error {
    Error::render(err.to_string())
}

/// Renders pages and locates highlight fragments with MuPDF text search
#[derive(Debug, Default, Clone, Copy)]
pub struct MupdfRenderer;

impl MupdfRenderer {
    pub fn new() -> Self {
        Self
    }

    fn open(pdf: &[u8]) -> Result<Document> {
        Document::from_bytes(pdf, PDF_MIME).map_err(parse_err)
    }

    /// Bounding boxes of every occurrence of every non-empty fragment
    fn fragment_rects(page: &Page, fragments: &[String]) -> Vec<HighlightRect> {
        let mut rects = Vec::new();
        for fragment in fragments {
            let needle = fragment.trim();
            if needle.is_empty() {
                continue;
            }
            match page.search(needle, MAX_HITS_PER_FRAGMENT) {
                Ok(quads) => rects.extend(quads.into_iter().map(|q| {
                    HighlightRect::new(
                        q.ul.x.min(q.ll.x),
                        q.ul.y.min(q.ur.y),
                        q.ur.x.max(q.lr.x),
                        q.ll.y.max(q.lr.y),
                    )
                })),
                Err(e) => tracing::debug!("Search for fragment failed: {}", e),
            }
        }
        rects
    }
}

/// Copy pixmap samples into an RGBA buffer
fn pixmap_to_rgba(pixmap: &Pixmap) -> Result<RgbaImage> {
    let width = pixmap.width() as u32;
    let height = pixmap.height() as u32;
    let samples = pixmap.samples();
    let n = pixmap.n() as usize;

    let mut rgba = Vec::with_capacity(width as usize * height as usize * 4);
    for y in 0..height as usize {
        for x in 0..width as usize {
            let offset = (y * width as usize + x) * n;
            let r = samples.get(offset).copied().unwrap_or(0);
            let g = samples.get(offset + 1).copied().unwrap_or(0);
            let b = samples.get(offset + 2).copied().unwrap_or(0);
            let a = if n >= 4 {
                samples.get(offset + 3).copied().unwrap_or(255)
            } else {
                255
            };
            rgba.extend_from_slice(&[r, g, b, a]);
        }
    }

    RgbaImage::from_raw(width, height, rgba)
        .ok_or_else(|| Error::render("Pixmap size does not match its samples"))
}

impl DocumentRenderer for MupdfRenderer {
    fn page_texts(&self, pdf: &[u8]) -> Result<Vec<String>> {
        let doc = Self::open(pdf)?;
        let count = doc.page_count().map_err(parse_err)?;

        let mut texts = Vec::with_capacity(count.max(0) as usize);
        for index in 0..count {
            let text = doc
                .load_page(index)
                .and_then(|page| page.to_text())
                .map(|text| clean_page_text(&text))
                .unwrap_or_else(|e| {
                    tracing::debug!("No text extracted from page {}: {}", index + 1, e);
                    String::new()
                });
            texts.push(text);
        }
        Ok(texts)
    }

    fn page_count(&self, pdf: &[u8]) -> Result<usize> {
        let doc = Self::open(pdf)?;
        Ok(doc.page_count().map_err(parse_err)?.max(0) as usize)
    }

    fn render_highlighted(
        &self,
        pdf: &[u8],
        page_index: usize,
        fragments: &[String],
        options: &RenderOptions,
    ) -> Result<Vec<u8>> {
        let doc = Self::open(pdf)?;
        let count = doc.page_count().map_err(parse_err)?.max(0) as usize;
        if page_index >= count {
            return Err(Error::render(format!(
                "Page {} out of range ({} pages)",
                page_index, count
            )));
        }

        let page = doc.load_page(page_index as i32).map_err(render_err)?;
        let rects = Self::fragment_rects(&page, fragments);

        let scale = options.scale();
        let matrix = Matrix::new_scale(scale, scale);
        let pixmap = page
            .to_pixmap(&matrix, &Colorspace::device_rgb(), false, true)
            .map_err(render_err)?;

        let mut image = pixmap_to_rgba(&pixmap)?;
        blend_highlights(&mut image, &rects, scale, options.color, options.opacity);

        tracing::debug!(
            "Rendered page {} at {} dpi with {} highlight(s)",
            page_index,
            options.dpi,
            rects.len()
        );

        encode_png(&image)
    }

    fn name(&self) -> &str {
        "mupdf"
    }
}
