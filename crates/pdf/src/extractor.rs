//! PDF document extractor.

use slide_core::{DocumentResult, Error, Result, SlideRecord, StructureDetector};
use std::path::Path;

use crate::source::{LopdfSource, PageSource};

/// Extracts slide records from PDF documents, one record per page.
#[derive(Debug, Clone, Default)]
pub struct PdfExtractor {
    detector: StructureDetector,
}

impl PdfExtractor {
    /// Create a new PDF extractor.
    pub fn new() -> Self {
        Self {
            detector: StructureDetector::new(),
        }
    }

    /// Extract a PDF file. Failures are reported in the result, never raised.
    pub fn extract_path(&self, path: impl AsRef<Path>) -> DocumentResult {
        let path = path.as_ref();
        log::debug!("Opening PDF {}", path.display());

        match LopdfSource::open(path) {
            Ok(source) => self.extract_source(&source).into(),
            Err(e) => e.into(),
        }
    }

    /// Extract a PDF held in memory.
    pub fn extract_bytes(&self, bytes: &[u8]) -> DocumentResult {
        match LopdfSource::from_bytes(bytes) {
            Ok(source) => self.extract_source(&source).into(),
            Err(e) => e.into(),
        }
    }

    /// Run page extraction and structure detection over a page source.
    ///
    /// Encrypted documents are rejected up front. A page whose text cannot be
    /// extracted is left out; the call only fails as a whole when no page
    /// produced a record.
    pub fn extract_source<S: PageSource>(&self, source: &S) -> Result<Vec<SlideRecord>> {
        if source.is_encrypted() {
            return Err(Error::Encrypted);
        }

        let page_count = source.page_count();
        let mut slides = Vec::with_capacity(page_count);

        for index in 1..=page_count {
            let text = match source.page_text(index) {
                Ok(text) => text,
                Err(e) => {
                    log::debug!("Skipping page {}: {}", index, e);
                    continue;
                }
            };

            if text.trim().is_empty() {
                slides.push(SlideRecord::empty(index));
                continue;
            }

            slides.push(self.detector.detect(&text).into_record(index));
        }

        log::debug!("Extracted {} of {} pages", slides.len(), page_count);

        if slides.is_empty() {
            return Err(Error::NoExtractableText);
        }

        Ok(slides)
    }
}
