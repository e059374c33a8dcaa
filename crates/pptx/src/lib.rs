//! PPTX (Office Open XML) backend for slide content extraction.
//!
//! Parses .pptx files, which are ZIP archives containing XML parts, and maps
//! each slide's text shapes and notes page onto a slide record.

pub mod extractor;
pub mod parser;

pub use extractor::PptxExtractor;
pub use parser::PptxParser;
