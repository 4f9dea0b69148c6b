//! PDF decomposition with OCR fallback
//!
//! Pages are walked in order. A page whose text layer yields anything other
//! than whitespace is used as-is; otherwise the page's raster content is sent
//! to the [`ImageTextExtractor`]. Parsing happens on a blocking worker thread,
//! OCR calls are awaited one page at a time.

use lopdf::{Document, ObjectId};
use std::fmt::Write as _;
use tracing::{debug, info, warn};

use super::client::{ImageTextExtractor, OcrError};
use super::image::png_from_raw_samples;
use crate::error::ErrorKind;

#[derive(Debug, thiserror::Error)]
pub enum PdfError {
    #[error("Error processing PDF: {0}")]
    Parse(String),

    #[error("OCR failed on page {page}: {source}")]
    PageOcr {
        page: u32,
        #[source]
        source: OcrError,
    },

    #[error("PDF worker failed: {0}")]
    Worker(String),
}

impl PdfError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Parse(_) => ErrorKind::UserInput,
            Self::PageOcr { source, .. } => source.kind(),
            Self::Worker(_) => ErrorKind::Internal,
        }
    }
}

/// What the scanner found on a single page
#[derive(Debug, Clone)]
pub enum PageContent {
    /// Non-blank text layer
    Text(String),
    /// No usable text; the page raster if one could be recovered
    Raster(Option<Vec<u8>>),
}

#[derive(Debug, Clone)]
pub struct PageScan {
    /// 1-based page number
    pub number: u32,
    pub content: PageContent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageSource {
    TextLayer,
    Ocr,
}

#[derive(Debug, Clone)]
pub struct PageSection {
    pub number: u32,
    pub source: PageSource,
    pub text: String,
}

impl PageSection {
    pub fn heading(&self) -> String {
        match self.source {
            PageSource::TextLayer => format!("--- Page {} ---", self.number),
            PageSource::Ocr => format!("--- Page {} (OCR) ---", self.number),
        }
    }
}

/// Extracted text of a whole document, one section per page
#[derive(Debug, Clone, Default)]
pub struct PdfExtraction {
    pub sections: Vec<PageSection>,
}

impl PdfExtraction {
    pub fn page_count(&self) -> usize {
        self.sections.len()
    }

    pub fn ocr_page_count(&self) -> usize {
        self.sections
            .iter()
            .filter(|s| s.source == PageSource::Ocr)
            .count()
    }

    /// Render every section under its page heading, in page order
    pub fn text(&self) -> String {
        let mut out = String::new();
        for section in &self.sections {
            let _ = write!(out, "\n{}\n{}\n", section.heading(), section.text);
        }
        out
    }
}

/// Extract the text of every page, falling back to OCR for pages without a text layer
pub async fn extract_text_from_pdf(
    bytes: Vec<u8>,
    extractor: &dyn ImageTextExtractor,
) -> Result<PdfExtraction, PdfError> {
    let scans = tokio::task::spawn_blocking(move || scan_pages(&bytes))
        .await
        .map_err(|e| PdfError::Worker(e.to_string()))??;

    assemble(scans, extractor).await
}

/// Turn page scans into sections, calling the extractor for raster pages in order
pub async fn assemble(
    scans: Vec<PageScan>,
    extractor: &dyn ImageTextExtractor,
) -> Result<PdfExtraction, PdfError> {
    let mut extraction = PdfExtraction::default();

    for scan in scans {
        let section = match scan.content {
            PageContent::Text(text) => PageSection {
                number: scan.number,
                source: PageSource::TextLayer,
                text,
            },
            PageContent::Raster(Some(image)) => {
                debug!("Page {} has no text layer, running OCR", scan.number);
                let text = extractor
                    .extract_text(&image)
                    .await
                    .map_err(|source| PdfError::PageOcr {
                        page: scan.number,
                        source,
                    })?;
                PageSection {
                    number: scan.number,
                    source: PageSource::Ocr,
                    text,
                }
            }
            PageContent::Raster(None) => {
                warn!("Page {} has neither text nor raster content", scan.number);
                PageSection {
                    number: scan.number,
                    source: PageSource::Ocr,
                    text: String::new(),
                }
            }
        };
        extraction.sections.push(section);
    }

    info!(
        "PDF extracted: {} pages, {} via OCR",
        extraction.page_count(),
        extraction.ocr_page_count()
    );

    Ok(extraction)
}

/// Parse a PDF and classify each page
pub fn scan_pages(bytes: &[u8]) -> Result<Vec<PageScan>, PdfError> {
    let doc = Document::load_mem(bytes).map_err(|e| PdfError::Parse(e.to_string()))?;
    let pages = doc.get_pages();

    if pages.is_empty() {
        return Err(PdfError::Parse("document has no pages".to_string()));
    }

    let scans = pages
        .into_iter()
        .map(|(number, page_id)| {
            let text = doc.extract_text(&[number]).unwrap_or_else(|e| {
                warn!("Text layer extraction failed on page {}: {}", number, e);
                String::new()
            });

            let content = if text.trim().is_empty() {
                PageContent::Raster(page_raster(&doc, page_id))
            } else {
                PageContent::Text(text)
            };

            PageScan { number, content }
        })
        .collect();

    Ok(scans)
}

/// Recover the dominant raster image of a page.
///
/// Scanned pages are a single full-page image; the largest image XObject is
/// taken. JPEG streams pass through untouched, raw 8-bit RGB or gray samples
/// are re-encoded to PNG.
fn page_raster(doc: &Document, page_id: ObjectId) -> Option<Vec<u8>> {
    let images = doc.get_page_images(page_id).ok()?;
    let largest = images
        .into_iter()
        .max_by_key(|img| img.width.saturating_mul(img.height))?;

    let filters = largest.filters.clone().unwrap_or_default();
    if filters.iter().any(|f| f == "DCTDecode") {
        return Some(largest.content.to_vec());
    }

    if largest.bits_per_component.unwrap_or(8) != 8 {
        debug!("Unsupported bit depth on page image {:?}", largest.id);
        return None;
    }

    let stream = doc.get_object(largest.id).ok()?.as_stream().ok()?;
    let samples = if filters.is_empty() {
        stream.content.clone()
    } else {
        stream.decompressed_content().ok()?
    };

    let width = u32::try_from(largest.width).ok()?;
    let height = u32::try_from(largest.height).ok()?;
    let color_space = largest.color_space.as_deref().unwrap_or("DeviceRGB");

    png_from_raw_samples(samples, width, height, color_space)
}
