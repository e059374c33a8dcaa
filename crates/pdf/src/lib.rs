//! PDF backend for slide content extraction.
//!
//! Reads a PDF page by page and turns each page's text into a slide record
//! using the structure detector from `slide-core`.

pub mod extractor;
pub mod source;

#[cfg(test)]
mod test_support;

pub use extractor::PdfExtractor;
pub use source::{LopdfSource, PageSource};
