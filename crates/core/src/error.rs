//! Error types for slide content extraction.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while extracting slides from a document.
///
/// The `Display` text of each variant is what ends up in the `error` field
/// of the JSON document result, so the wording is part of the output contract.
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to open or read the input file.
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),

    /// The file format is not supported or could not be detected.
    #[error("Unsupported or unrecognized file format: {0}")]
    UnsupportedFormat(String),

    /// The PDF could not be opened or parsed.
    #[error("Failed to read PDF: {0}")]
    PdfError(String),

    /// The PDF is encrypted; no unlock is attempted.
    #[error("Cannot process encrypted PDF. Please provide an unencrypted file.")]
    Encrypted,

    /// Every page failed extraction, or the document has no pages.
    #[error("No text could be extracted from the PDF. It may be image-only.")]
    NoExtractableText,

    /// The PPTX package could not be opened or parsed.
    #[error("Failed to read PPTX: {0}")]
    PptxParseError(String),

    /// ZIP archive error (for PPTX).
    #[error("ZIP error: {0}")]
    ZipError(String),

    /// XML parsing error (for PPTX).
    #[error("XML parsing error: {0}")]
    XmlError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_messages() {
        assert_eq!(
            Error::Encrypted.to_string(),
            "Cannot process encrypted PDF. Please provide an unencrypted file."
        );
        assert_eq!(
            Error::NoExtractableText.to_string(),
            "No text could be extracted from the PDF. It may be image-only."
        );
    }

    #[test]
    fn test_interpolated_messages() {
        assert_eq!(
            Error::PdfError("invalid file header".into()).to_string(),
            "Failed to read PDF: invalid file header"
        );
        assert_eq!(
            Error::PptxParseError("ZIP error: invalid Zip archive".into()).to_string(),
            "Failed to read PPTX: ZIP error: invalid Zip archive"
        );
    }
}
