//! PPTX document extractor.

use slide_core::{DocumentResult, Error, Result, SlideRecord};
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use crate::parser::PptxParser;

/// Extracts slide records from PPTX decks.
#[derive(Default)]
pub struct PptxExtractor {
    parser: PptxParser,
}

impl PptxExtractor {
    /// Create a new PPTX extractor.
    pub fn new() -> Self {
        Self {
            parser: PptxParser::new(),
        }
    }

    /// Extract a PPTX file. A deck that cannot be opened or parsed yields an
    /// error result, same as an unreadable PDF.
    pub fn extract_path(&self, path: impl AsRef<Path>) -> DocumentResult {
        let path = path.as_ref();
        log::debug!("Opening PPTX {}", path.display());

        let result = File::open(path)
            .map_err(Error::from)
            .and_then(|file| self.extract_reader(BufReader::new(file)));

        result.map_err(read_failure).into()
    }

    /// Extract a PPTX package from any seekable reader.
    pub fn extract_reader<R: Read + Seek>(&self, reader: R) -> Result<Vec<SlideRecord>> {
        self.parser.parse(reader)
    }
}

/// Wrap any failure as a PPTX read failure.
fn read_failure(e: Error) -> Error {
    match e {
        Error::PptxParseError(_) => e,
        Error::Io(io) => Error::PptxParseError(io.to_string()),
        other => Error::PptxParseError(other.to_string()),
    }
}
