//! Title and bullet detection for raw PDF page text.
//!
//! PDF text extraction loses layout, so the outline of a page is recovered
//! from whitespace and punctuation alone: the first non-empty line is the
//! title, and each following line either starts a new bullet or continues
//! the previous one.
//!
//! Bullet-start detection is an ordered list of [`LineMatcher`]s. The first
//! matcher that accepts a line decides; a line no matcher accepts is a
//! continuation.

use regex::Regex;
use std::sync::LazyLock;

use crate::SlideRecord;

/// Glyphs that mark the start of a bullet.
pub const BULLET_GLYPHS: &[char] = &['•', '-', '*', '○', '▪', '●', '◦', '■', '□'];

/// Numbered list item: `1. ` or `12) `.
static NUMBERED_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+[.)]\s").unwrap());

/// Lettered list item: `a. ` or `B) `.
static LETTERED_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z][.)]\s").unwrap());

/// Leading glyph plus any whitespace after it.
static GLYPH_MARKER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[•\-*○▪●◦■□]\s*").unwrap());

/// Leading number marker plus any whitespace after it.
static NUMBERED_MARKER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+[.)]\s*").unwrap());

/// Leading letter marker plus any whitespace after it.
static LETTERED_MARKER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z][.)]\s*").unwrap());

/// A predicate that recognizes a bullet-start line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineMatcher {
    /// Trimmed line starts with one of [`BULLET_GLYPHS`].
    Glyph,
    /// Trimmed line matches `^\d+[.)]\s`.
    Numbered,
    /// Trimmed line matches `^[a-zA-Z][.)]\s`.
    Lettered,
    /// Untrimmed line starts with two spaces or a tab.
    Indented,
}

/// Matchers in priority order.
pub const MATCHERS: [LineMatcher; 4] = [
    LineMatcher::Glyph,
    LineMatcher::Numbered,
    LineMatcher::Lettered,
    LineMatcher::Indented,
];

impl LineMatcher {
    /// Check a line. `original` is the line as extracted, `trimmed` the same
    /// line with surrounding whitespace removed.
    pub fn matches(self, original: &str, trimmed: &str) -> bool {
        match self {
            Self::Glyph => trimmed.starts_with(BULLET_GLYPHS),
            Self::Numbered => NUMBERED_REGEX.is_match(trimmed),
            Self::Lettered => LETTERED_REGEX.is_match(trimmed),
            Self::Indented => original.starts_with("  ") || original.starts_with('\t'),
        }
    }
}

/// Return the first matcher accepting `line`, or `None` for a continuation line.
pub fn classify_line(line: &str) -> Option<LineMatcher> {
    let trimmed = line.trim();
    MATCHERS
        .iter()
        .copied()
        .find(|matcher| matcher.matches(line, trimmed))
}

/// Remove a leading bullet marker from a trimmed line.
///
/// Glyph, number and letter markers are removed in that order, each only if
/// present, so `"- 1. Item"` becomes `"Item"`.
pub fn strip_marker(trimmed: &str) -> String {
    let cleaned = GLYPH_MARKER_REGEX.replace(trimmed, "");
    let cleaned = NUMBERED_MARKER_REGEX.replace(&cleaned, "");
    let cleaned = LETTERED_MARKER_REGEX.replace(&cleaned, "");
    cleaned.trim().to_string()
}

/// Title and bullets detected on one page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageStructure {
    pub title: String,
    pub bullets: Vec<String>,
}

impl PageStructure {
    /// Turn into a slide record with empty notes.
    pub fn into_record(self, index: usize) -> SlideRecord {
        SlideRecord {
            index,
            title: self.title,
            bullets: self.bullets,
            notes: String::new(),
        }
    }
}

/// Detects title and bullets in raw page text.
#[derive(Debug, Clone, Default)]
pub struct StructureDetector;

impl StructureDetector {
    pub fn new() -> Self {
        Self
    }

    /// Detect the structure of one page. Never fails; degenerate input gives
    /// an empty title and no bullets.
    pub fn detect(&self, page_text: &str) -> PageStructure {
        let mut lines = page_text.split('\n').filter(|line| !line.trim().is_empty());

        let Some(first) = lines.next() else {
            return PageStructure::default();
        };

        let mut structure = PageStructure {
            title: first.trim().to_string(),
            bullets: Vec::new(),
        };

        for line in lines {
            let trimmed = line.trim();

            match classify_line(line) {
                Some(matcher) => {
                    log::trace!("bullet ({:?}): {}", matcher, trimmed);
                    structure.bullets.push(strip_marker(trimmed));
                }
                None => match structure.bullets.last_mut() {
                    Some(last) => {
                        last.push(' ');
                        last.push_str(trimmed);
                    }
                    // First content line without a marker still counts.
                    None => structure.bullets.push(trimmed.to_string()),
                },
            }
        }

        structure
    }
}

/// Shorthand for `StructureDetector::new().detect(page_text)`.
pub fn detect_structure(page_text: &str) -> PageStructure {
    StructureDetector::new().detect(page_text)
}
