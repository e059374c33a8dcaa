//! Page text sources.
//!
//! [`PageSource`] is the seam between the extractor's aggregation rules and
//! the PDF library doing the actual parsing.

use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, ObjectId};
use slide_core::{Error, Result};
use std::collections::BTreeMap;
use std::path::Path;

/// Something that yields the raw text of a document's pages.
pub trait PageSource {
    /// Whether the document declares encryption.
    fn is_encrypted(&self) -> bool;

    /// Number of pages in the document.
    fn page_count(&self) -> usize;

    /// Raw text of a page, by 1-based position.
    fn page_text(&self, page: usize) -> Result<String>;
}

/// [`PageSource`] backed by an `lopdf` document.
pub struct LopdfSource {
    document: Document,
    /// Page objects in page-tree order.
    page_ids: Vec<ObjectId>,
}

impl LopdfSource {
    /// Open a PDF file.
    pub fn open(path: &Path) -> Result<Self> {
        let document = Document::load(path).map_err(load_error)?;
        Ok(Self::from_document(document))
    }

    /// Open a PDF held in memory.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let document = Document::load_mem(bytes).map_err(load_error)?;
        Ok(Self::from_document(document))
    }

    /// Wrap an already loaded document.
    pub fn from_document(document: Document) -> Self {
        let page_ids = document.get_pages().into_values().collect();
        Self { document, page_ids }
    }
}

impl PageSource for LopdfSource {
    fn is_encrypted(&self) -> bool {
        // `Document::is_encrypted` only follows an indirect /Encrypt; an
        // inline dictionary in the trailer counts too.
        self.document.trailer.get(b"Encrypt").is_ok()
    }

    fn page_count(&self) -> usize {
        self.page_ids.len()
    }

    fn page_text(&self, page: usize) -> Result<String> {
        let page_id = page
            .checked_sub(1)
            .and_then(|i| self.page_ids.get(i))
            .ok_or_else(|| Error::PdfError(format!("page {} out of range", page)))?;

        self.read_page(*page_id)
            .map_err(|e| Error::PdfError(format!("page {}: {}", page, e)))
    }
}

impl LopdfSource {
    fn read_page(&self, page_id: ObjectId) -> lopdf::Result<String> {
        let encodings: BTreeMap<Vec<u8>, &str> = self
            .document
            .get_page_fonts(page_id)
            .into_iter()
            .map(|(name, font)| (name, font.get_font_encoding()))
            .collect();
        let content = Content::decode(&self.document.get_page_content(page_id)?)?;

        let mut writer = TextWriter::new(&encodings);
        for operation in &content.operations {
            writer.apply(operation);
        }
        Ok(writer.finish())
    }
}

/// Replays text-showing operators into plain text, one line per text line.
///
/// Line boundaries come from `T*`, `'`, `"`, a `Td`/`TD` with a vertical
/// offset, a `Tm` that moves to a new baseline, and `ET`.
struct TextWriter<'a> {
    encodings: &'a BTreeMap<Vec<u8>, &'a str>,
    encoding: Option<&'a str>,
    baseline: Option<f32>,
    text: String,
}

impl<'a> TextWriter<'a> {
    fn new(encodings: &'a BTreeMap<Vec<u8>, &'a str>) -> Self {
        Self {
            encodings,
            encoding: None,
            baseline: None,
            text: String::new(),
        }
    }

    fn apply(&mut self, operation: &Operation) {
        let operands = &operation.operands;
        match operation.operator.as_str() {
            "Tf" => {
                if let Some(name) = operands.first().and_then(|o| o.as_name().ok()) {
                    self.encoding = self.encodings.get(name).copied();
                }
            }
            "Tj" | "TJ" => self.show(operands),
            "T*" => self.new_line(),
            "'" => {
                self.new_line();
                self.show(operands);
            }
            "\"" => {
                self.new_line();
                if let Some(string) = operands.get(2) {
                    self.show(std::slice::from_ref(string));
                }
            }
            "Td" | "TD" => {
                if operands.get(1).and_then(|o| o.as_float().ok()).unwrap_or(0.0) != 0.0 {
                    self.new_line();
                }
            }
            "Tm" => {
                let y = operands.get(5).and_then(|o| o.as_float().ok());
                if y.is_some() && self.baseline.is_some() && y != self.baseline {
                    self.new_line();
                }
                self.baseline = y;
            }
            "ET" => self.new_line(),
            _ => {}
        }
    }

    fn show(&mut self, operands: &[Object]) {
        for operand in operands {
            match operand {
                Object::String(bytes, _) => {
                    self.text.push_str(&Document::decode_text(self.encoding, bytes));
                }
                Object::Array(items) => self.show(items),
                // Large negative kerning inside TJ is a word gap.
                Object::Integer(i) if *i < -100 => self.text.push(' '),
                Object::Real(r) if *r < -100.0 => self.text.push(' '),
                _ => {}
            }
        }
    }

    fn new_line(&mut self) {
        if !self.text.is_empty() && !self.text.ends_with('\n') {
            self.text.push('\n');
        }
    }

    fn finish(self) -> String {
        self.text
    }
}

/// Map a load failure. Some encrypted files already fail at load time; those
/// get the encrypted-document error rather than a generic read failure.
fn load_error(e: lopdf::Error) -> Error {
    let message = e.to_string();
    let lower = message.to_lowercase();
    if lower.contains("encrypt") || lower.contains("password") {
        Error::Encrypted
    } else {
        Error::PdfError(message)
    }
}
