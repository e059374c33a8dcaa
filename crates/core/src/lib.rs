//! Core slide record types, error handling, and page structure detection
//! for slide content extraction.

pub mod error;
pub mod structure;
pub mod types;

pub use error::{Error, Result};
pub use structure::{detect_structure, LineMatcher, PageStructure, StructureDetector};
pub use types::{DocumentFormat, DocumentResult, SlideRecord};
