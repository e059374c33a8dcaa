//! Domain types for representing extracted slide content.

use serde::{Deserialize, Serialize};
use serde_json::ser::Formatter;
use std::io;

use crate::Error;

/// A single extracted slide or PDF page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlideRecord {
    /// 1-based position of the slide/page in the source document.
    pub index: usize,

    /// Best-effort first heading line. Empty when nothing was found.
    pub title: String,

    /// Content lines in document order.
    pub bullets: Vec<String>,

    /// Speaker notes. Always empty for PDF sources.
    pub notes: String,
}

impl SlideRecord {
    /// Record for a page or slide that carries no text.
    pub fn empty(index: usize) -> Self {
        Self {
            index,
            title: String::new(),
            bullets: Vec::new(),
            notes: String::new(),
        }
    }

    /// Build a record from ordered texts: the first becomes the title,
    /// the rest become bullets.
    pub fn from_texts(index: usize, texts: Vec<String>) -> Self {
        let mut texts = texts.into_iter();
        let title = texts.next().unwrap_or_default();

        Self {
            index,
            title,
            bullets: texts.collect(),
            notes: String::new(),
        }
    }

    /// Set the speaker notes.
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }
}

/// Top-level output envelope: either the extracted slides or an error message.
///
/// Serializes as `{"slides": [...]}` or `{"error": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentResult {
    /// Extraction succeeded.
    Slides(Vec<SlideRecord>),
    /// Extraction failed; the message is meant for the caller.
    Error(String),
}

impl DocumentResult {
    /// Successful result.
    pub fn slides(slides: Vec<SlideRecord>) -> Self {
        Self::Slides(slides)
    }

    /// Error result with the given message.
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error(message.into())
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    /// The extracted slides, if this is a success.
    pub fn as_slides(&self) -> Option<&[SlideRecord]> {
        match self {
            Self::Slides(slides) => Some(slides),
            Self::Error(_) => None,
        }
    }

    /// The error message, if this is an error.
    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Error(message) => Some(message),
            Self::Slides(_) => None,
        }
    }

    /// Write as a single line of JSON, without the trailing newline.
    ///
    /// Separators are `", "` and `": "`; non-ASCII characters are written as
    /// UTF-8, not escaped.
    pub fn write_json<W: io::Write>(&self, writer: W) -> serde_json::Result<()> {
        let mut serializer = serde_json::Serializer::with_formatter(writer, SpacedFormatter);
        self.serialize(&mut serializer)
    }

    /// Serialize as a single line of JSON. See [`DocumentResult::write_json`].
    pub fn to_json_line(&self) -> String {
        let mut buf = Vec::new();
        match self.write_json(&mut buf) {
            Ok(()) => String::from_utf8_lossy(&buf).into_owned(),
            // Only reachable if serde_json rejects a plain string, which it does not.
            Err(e) => format!("{{\"error\": {:?}}}", e.to_string()),
        }
    }
}

/// Single-line formatter with a space after every `,` and `:`.
struct SpacedFormatter;

impl Formatter for SpacedFormatter {
    fn begin_array_value<W: ?Sized + io::Write>(&mut self, writer: &mut W, first: bool) -> io::Result<()> {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_key<W: ?Sized + io::Write>(&mut self, writer: &mut W, first: bool) -> io::Result<()> {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        writer.write_all(b": ")
    }
}

impl From<Error> for DocumentResult {
    fn from(error: Error) -> Self {
        Self::Error(error.to_string())
    }
}

impl From<crate::Result<Vec<SlideRecord>>> for DocumentResult {
    fn from(result: crate::Result<Vec<SlideRecord>>) -> Self {
        match result {
            Ok(slides) => Self::Slides(slides),
            Err(e) => e.into(),
        }
    }
}

/// The format of a source document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentFormat {
    /// Portable Document Format.
    Pdf,
    /// Modern PPTX (Office Open XML).
    Pptx,
}

impl DocumentFormat {
    /// Detect format from file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "pdf" => Some(Self::Pdf),
            "pptx" => Some(Self::Pptx),
            _ => None,
        }
    }

    /// Detect format from file magic bytes.
    pub fn from_magic(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < 4 {
            return None;
        }

        // PDF header (%PDF-)
        if bytes.starts_with(b"%PDF-") {
            return Some(Self::Pdf);
        }

        // PPTX is a ZIP file (PK\x03\x04)
        if bytes.starts_with(&[0x50, 0x4B, 0x03, 0x04]) {
            return Some(Self::Pptx);
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slides_json_shape() {
        let slide = SlideRecord::from_texts(
            1,
            vec!["Agenda".into(), "Point A".into(), "Point B".into()],
        )
        .with_notes("remember X");
        let result = DocumentResult::slides(vec![slide]);

        assert_eq!(
            result.to_json_line(),
            r#"{"slides": [{"index": 1, "title": "Agenda", "bullets": ["Point A", "Point B"], "notes": "remember X"}]}"#
        );
    }

    #[test]
    fn test_error_json_shape() {
        let result = DocumentResult::error("missing pdf path");
        assert_eq!(result.to_json_line(), r#"{"error": "missing pdf path"}"#);
        assert!(result.is_error());
        assert_eq!(result.error_message(), Some("missing pdf path"));
        assert!(result.as_slides().is_none());
    }

    #[test]
    fn test_non_ascii_left_unescaped() {
        let result = DocumentResult::slides(vec![SlideRecord::from_texts(
            1,
            vec!["Überblick".into(), "• naïve café".into()],
        )]);
        let json = result.to_json_line();

        assert!(json.contains("Überblick"));
        assert!(json.contains("naïve café"));
        assert!(!json.contains('\n'));
    }

    #[test]
    fn test_empty_record_has_empty_bullets() {
        let result = DocumentResult::slides(vec![SlideRecord::empty(3)]);
        assert_eq!(
            result.to_json_line(),
            r#"{"slides": [{"index": 3, "title": "", "bullets": [], "notes": ""}]}"#
        );
    }

    #[test]
    fn test_from_texts_without_texts() {
        let slide = SlideRecord::from_texts(2, Vec::new());
        assert_eq!(slide.title, "");
        assert!(slide.bullets.is_empty());
    }

    #[test]
    fn test_error_converts_to_result() {
        let result: DocumentResult = Error::Encrypted.into();
        assert_eq!(
            result,
            DocumentResult::error(
                "Cannot process encrypted PDF. Please provide an unencrypted file."
            )
        );
    }

    #[test]
    fn test_format_from_magic() {
        assert_eq!(
            DocumentFormat::from_magic(b"%PDF-1.7\n"),
            Some(DocumentFormat::Pdf)
        );
        assert_eq!(
            DocumentFormat::from_magic(&[0x50, 0x4B, 0x03, 0x04, 0x14, 0x00]),
            Some(DocumentFormat::Pptx)
        );
        assert_eq!(DocumentFormat::from_magic(b"hello world"), None);
        assert_eq!(DocumentFormat::from_magic(b"PK"), None);
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(DocumentFormat::from_extension("PDF"), Some(DocumentFormat::Pdf));
        assert_eq!(DocumentFormat::from_extension("pptx"), Some(DocumentFormat::Pptx));
        assert_eq!(DocumentFormat::from_extension("ppt"), None);
    }
}
