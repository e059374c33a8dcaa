//! PPTX package reader.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use slide_core::{Error, Result, SlideRecord};
use std::io::{Read, Seek};
use zip::ZipArchive;

const PRESENTATION_PATH: &str = "ppt/presentation.xml";
const PRESENTATION_RELS_PATH: &str = "ppt/_rels/presentation.xml.rels";

/// Line break inside a paragraph (`<a:br/>`).
const LINE_BREAK: char = '\u{b}';

/// Parser for PPTX (Office Open XML) packages.
pub struct PptxParser;

impl PptxParser {
    /// Create a new PPTX parser.
    pub fn new() -> Self {
        Self
    }

    /// Parse a PPTX package into slide records, in presentation order.
    pub fn parse<R: Read + Seek>(&self, reader: R) -> Result<Vec<SlideRecord>> {
        let mut archive =
            ZipArchive::new(reader).map_err(|e| Error::ZipError(format!("Failed to open ZIP: {}", e)))?;

        let slide_order = self.get_slide_order(&mut archive)?;
        log::debug!("Found {} slides", slide_order.len());

        let mut slides = Vec::with_capacity(slide_order.len());
        for (idx, slide_path) in slide_order.iter().enumerate() {
            slides.push(self.parse_slide(&mut archive, slide_path, idx + 1)?);
        }

        Ok(slides)
    }

    /// Get the ordered list of slide part paths.
    ///
    /// `<p:sldIdLst>` in presentation.xml is authoritative. Packages without it
    /// fall back to the slide relationships ordered by the number in their id.
    fn get_slide_order<R: Read + Seek>(&self, archive: &mut ZipArchive<R>) -> Result<Vec<String>> {
        let rels_content = read_file_from_archive(archive, PRESENTATION_RELS_PATH)?;
        let slide_rels: Vec<Relationship> = parse_relationships(&rels_content)?
            .into_iter()
            .filter(|rel| rel.is_slide())
            .collect();

        let listed_ids = match read_file_from_archive(archive, PRESENTATION_PATH) {
            Ok(content) => parse_slide_id_list(&content)?,
            Err(e) => {
                log::debug!("No presentation part, ordering slides by relationship: {}", e);
                Vec::new()
            }
        };

        if !listed_ids.is_empty() {
            let mut paths = Vec::with_capacity(listed_ids.len());
            for id in &listed_ids {
                match slide_rels.iter().find(|rel| &rel.id == id) {
                    Some(rel) => paths.push(resolve_target("ppt", &rel.target)),
                    None => log::warn!("Slide id list references unknown relationship {}", id),
                }
            }
            return Ok(paths);
        }

        let mut slides: Vec<(String, Option<usize>)> = slide_rels
            .iter()
            .map(|rel| {
                let order_num =
                    extract_slide_number(&rel.id).or_else(|| extract_slide_number(&rel.target));
                (resolve_target("ppt", &rel.target), order_num)
            })
            .collect();

        slides.sort_by(|a, b| match (a.1, b.1) {
            (Some(na), Some(nb)) => na.cmp(&nb),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => a.0.cmp(&b.0),
        });

        Ok(slides.into_iter().map(|(path, _)| path).collect())
    }

    /// Parse a single slide from the archive.
    fn parse_slide<R: Read + Seek>(
        &self,
        archive: &mut ZipArchive<R>,
        slide_path: &str,
        slide_number: usize,
    ) -> Result<SlideRecord> {
        let content = read_file_from_archive(archive, slide_path)?;

        let texts: Vec<String> = extract_shapes_from_xml(&content)?
            .into_iter()
            .map(|shape| shape.text)
            .filter(|text| !text.is_empty())
            .collect();

        let notes = match self.read_notes(archive, slide_path) {
            Ok(notes) => notes.unwrap_or_default(),
            Err(e) => {
                log::debug!("Ignoring notes for slide {}: {}", slide_number, e);
                String::new()
            }
        };

        log::debug!(
            "Slide {} ({}): {} text shapes",
            slide_number,
            slide_path,
            texts.len()
        );

        Ok(SlideRecord::from_texts(slide_number, texts).with_notes(notes))
    }

    /// Read the body placeholder text of a slide's notes page, if it has one.
    fn read_notes<R: Read + Seek>(
        &self,
        archive: &mut ZipArchive<R>,
        slide_path: &str,
    ) -> Result<Option<String>> {
        let (dir, file) = slide_path.rsplit_once('/').unwrap_or(("", slide_path));
        let rels_path = format!("{}/_rels/{}.rels", dir, file);

        // A slide without a rels part has no notes.
        if archive.by_name(&rels_path).is_err() {
            return Ok(None);
        }

        let rels_content = read_file_from_archive(archive, &rels_path)?;
        let Some(notes_rel) = parse_relationships(&rels_content)?
            .into_iter()
            .find(Relationship::is_notes_slide)
        else {
            return Ok(None);
        };

        let notes_path = resolve_target(dir, &notes_rel.target);
        let content = read_file_from_archive(archive, &notes_path)?;

        Ok(extract_shapes_from_xml(&content)?
            .into_iter()
            .find(|shape| shape.placeholder_type.as_deref() == Some("body"))
            .map(|shape| shape.text))
    }
}

impl Default for PptxParser {
    fn default() -> Self {
        Self::new()
    }
}

/// A package relationship (`<Relationship>` element of a .rels part).
#[derive(Debug, Clone, PartialEq, Eq)]
struct Relationship {
    id: String,
    rel_type: String,
    target: String,
    external: bool,
}

impl Relationship {
    fn is_slide(&self) -> bool {
        !self.external && self.rel_type.ends_with("/slide")
    }

    fn is_notes_slide(&self) -> bool {
        !self.external && self.rel_type.ends_with("/notesSlide")
    }
}

/// Information about a top-level shape on a slide.
#[derive(Debug, Default)]
struct ShapeInfo {
    /// Paragraphs joined with `\n`, trimmed.
    text: String,
    /// `type` of the shape's `<p:ph>`, if it is a placeholder.
    placeholder_type: Option<String>,
}

/// Text collected while inside a shape's text body.
#[derive(Debug, Default)]
struct ShapeBuilder {
    paragraphs: Vec<String>,
    paragraph: Option<String>,
    placeholder_type: Option<String>,
    in_text_body: bool,
    in_text_run: bool,
}

impl ShapeBuilder {
    fn finish(self) -> ShapeInfo {
        ShapeInfo {
            text: self.paragraphs.join("\n").trim().to_string(),
            placeholder_type: self.placeholder_type,
        }
    }

    fn capture_placeholder(&mut self, e: &BytesStart) {
        // An untyped placeholder is an object placeholder.
        let placeholder_type = attribute(e, b"type").unwrap_or_else(|| "obj".to_string());
        self.placeholder_type = Some(placeholder_type);
    }
}

/// Extract the top-level `p:sp` shapes of a slide or notes page, in
/// document order. Shapes nested in groups or other containers are skipped,
/// as are pictures, connectors and graphic frames, which carry no text frame.
fn extract_shapes_from_xml(xml_content: &str) -> Result<Vec<ShapeInfo>> {
    let mut shapes = Vec::new();
    let mut reader = Reader::from_str(xml_content);

    let mut depth = 0usize;
    let mut tree_depth: Option<usize> = None;
    let mut current: Option<ShapeBuilder> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                depth += 1;
                let name = e.name();

                match local_name(name.as_ref()) {
                    b"spTree" if tree_depth.is_none() => tree_depth = Some(depth),
                    b"sp" if tree_depth.map(|d| d + 1) == Some(depth) => {
                        current = Some(ShapeBuilder::default());
                    }
                    local => {
                        if let Some(shape) = current.as_mut() {
                            match local {
                                b"txBody" => shape.in_text_body = true,
                                b"p" if shape.in_text_body => shape.paragraph = Some(String::new()),
                                b"t" if shape.paragraph.is_some() => shape.in_text_run = true,
                                b"br" => {
                                    if let Some(paragraph) = shape.paragraph.as_mut() {
                                        paragraph.push(LINE_BREAK);
                                    }
                                }
                                b"ph" if !shape.in_text_body => shape.capture_placeholder(e),
                                _ => {}
                            }
                        }
                    }
                }
            }
            Ok(Event::Empty(ref e)) => {
                if let Some(shape) = current.as_mut() {
                    let name = e.name();
                    match local_name(name.as_ref()) {
                        b"p" if shape.in_text_body => shape.paragraphs.push(String::new()),
                        b"br" => {
                            if let Some(paragraph) = shape.paragraph.as_mut() {
                                paragraph.push(LINE_BREAK);
                            }
                        }
                        b"ph" if !shape.in_text_body => shape.capture_placeholder(e),
                        _ => {}
                    }
                }
            }
            Ok(Event::Text(ref e)) => {
                if let Some(shape) = current.as_mut() {
                    if shape.in_text_run {
                        if let Some(paragraph) = shape.paragraph.as_mut() {
                            paragraph.push_str(&e.unescape().unwrap_or_default());
                        }
                    }
                }
            }
            Ok(Event::End(ref e)) => {
                let name = e.name();
                let local = local_name(name.as_ref());

                if local == b"sp" && tree_depth.map(|d| d + 1) == Some(depth) {
                    if let Some(shape) = current.take() {
                        shapes.push(shape.finish());
                    }
                } else if local == b"spTree" && tree_depth == Some(depth) {
                    tree_depth = None;
                } else if let Some(shape) = current.as_mut() {
                    match local {
                        b"txBody" => shape.in_text_body = false,
                        b"t" => shape.in_text_run = false,
                        b"p" => {
                            if let Some(paragraph) = shape.paragraph.take() {
                                shape.paragraphs.push(paragraph);
                            }
                        }
                        _ => {}
                    }
                }

                depth = depth.saturating_sub(1);
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::XmlError(format!(
                    "Error at position {}: {}",
                    reader.buffer_position(),
                    e
                )));
            }
            _ => {}
        }
    }

    Ok(shapes)
}

/// Parse the `<Relationship>` elements of a .rels part.
fn parse_relationships(xml_content: &str) -> Result<Vec<Relationship>> {
    let mut relationships = Vec::new();
    let mut reader = Reader::from_str(xml_content);
    reader.trim_text(true);

    loop {
        match reader.read_event() {
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e))
                if local_name(e.name().as_ref()) == b"Relationship" =>
            {
                relationships.push(Relationship {
                    id: attribute(e, b"Id").unwrap_or_default(),
                    rel_type: attribute(e, b"Type").unwrap_or_default(),
                    target: attribute(e, b"Target").unwrap_or_default(),
                    external: attribute(e, b"TargetMode").as_deref() == Some("External"),
                });
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::XmlError(format!(
                    "Error parsing relationships: {}",
                    e
                )));
            }
            _ => {}
        }
    }

    Ok(relationships)
}

/// Relationship ids of `<p:sldId>` entries, in presentation order.
fn parse_slide_id_list(xml_content: &str) -> Result<Vec<String>> {
    let mut ids = Vec::new();
    let mut reader = Reader::from_str(xml_content);
    reader.trim_text(true);

    loop {
        match reader.read_event() {
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e))
                if local_name(e.name().as_ref()) == b"sldId" =>
            {
                // The relationship id is `r:id`; match on the local name so a
                // different prefix still resolves.
                let rel_id = e
                    .attributes()
                    .flatten()
                    .find(|attr| local_name(attr.key.as_ref()) == b"id" && attr.key.as_ref() != b"id")
                    .map(|attr| String::from_utf8_lossy(&attr.value).to_string());

                if let Some(rel_id) = rel_id {
                    ids.push(rel_id);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::XmlError(format!(
                    "Error parsing presentation: {}",
                    e
                )));
            }
            _ => {}
        }
    }

    Ok(ids)
}

/// Read a file from the ZIP archive.
fn read_file_from_archive<R: Read + Seek>(archive: &mut ZipArchive<R>, path: &str) -> Result<String> {
    let mut file = archive
        .by_name(path)
        .map_err(|e| Error::ZipError(format!("File not found in archive '{}': {}", path, e)))?;

    let mut content = String::new();
    file.read_to_string(&mut content)
        .map_err(|e| Error::ZipError(format!("Failed to read '{}': {}", path, e)))?;

    Ok(content)
}

/// Get an attribute value by exact key.
fn attribute(e: &BytesStart, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == key)
        .map(|attr| String::from_utf8_lossy(&attr.value).to_string())
}

/// Resolve a relationship target against the directory of its source part.
fn resolve_target(base_dir: &str, target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return absolute.to_string();
    }

    let mut parts: Vec<&str> = base_dir.split('/').filter(|p| !p.is_empty()).collect();
    for segment in target.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            other => parts.push(other),
        }
    }

    parts.join("/")
}

/// Extract the local name from a potentially namespaced XML element name.
fn local_name(name: &[u8]) -> &[u8] {
    if let Some(pos) = name.iter().position(|&b| b == b':') {
        &name[pos + 1..]
    } else {
        name
    }
}

/// Extract a slide number from a string like "rId2" or "slide3.xml".
fn extract_slide_number(s: &str) -> Option<usize> {
    let s = s.trim_end_matches(".xml").trim_end_matches(".rels");

    let digits: String = s.chars().rev().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    let digits: String = digits.chars().rev().collect();
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_slide_number() {
        assert_eq!(extract_slide_number("rId1"), Some(1));
        assert_eq!(extract_slide_number("rId12"), Some(12));
        assert_eq!(extract_slide_number("slides/slide123.xml"), Some(123));
        assert_eq!(extract_slide_number("nodigits"), None);
    }

    #[test]
    fn test_local_name() {
        assert_eq!(local_name(b"p:sp"), b"sp");
        assert_eq!(local_name(b"a:t"), b"t");
        assert_eq!(local_name(b"sp"), b"sp");
    }

    #[test]
    fn test_resolve_target() {
        assert_eq!(resolve_target("ppt", "slides/slide1.xml"), "ppt/slides/slide1.xml");
        assert_eq!(
            resolve_target("ppt/slides", "../notesSlides/notesSlide1.xml"),
            "ppt/notesSlides/notesSlide1.xml"
        );
        assert_eq!(resolve_target("ppt", "/ppt/slides/slide2.xml"), "ppt/slides/slide2.xml");
        assert_eq!(resolve_target("ppt", "./slides/slide3.xml"), "ppt/slides/slide3.xml");
    }

    #[test]
    fn test_parse_relationships() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster" Target="slideMasters/slideMaster1.xml"/>
  <Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide" Target="slides/slide1.xml"/>
  <Relationship Id="rId9" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink" Target="https://example.com" TargetMode="External"/>
</Relationships>"#;

        let rels = parse_relationships(xml).unwrap();
        assert_eq!(rels.len(), 3);
        assert!(!rels[0].is_slide());
        assert!(rels[1].is_slide());
        assert_eq!(rels[1].target, "slides/slide1.xml");
        assert!(rels[2].external);
    }

    #[test]
    fn test_parse_slide_id_list() {
        let xml = r#"<p:presentation xmlns:p="p" xmlns:r="r">
  <p:sldIdLst><p:sldId id="257" r:id="rId3"/><p:sldId id="256" r:id="rId2"/></p:sldIdLst>
</p:presentation>"#;

        assert_eq!(parse_slide_id_list(xml).unwrap(), vec!["rId3", "rId2"]);
    }

    #[test]
    fn test_shapes_in_document_order() {
        let xml = r#"<p:sld xmlns:p="p" xmlns:a="a"><p:cSld><p:spTree>
  <p:nvGrpSpPr/>
  <p:sp><p:nvSpPr><p:nvPr><p:ph type="title"/></p:nvPr></p:nvSpPr>
    <p:txBody><a:bodyPr/><a:p><a:r><a:t>Hello </a:t></a:r><a:r><a:t>world</a:t></a:r></a:p></p:txBody></p:sp>
  <p:sp><p:txBody><a:p><a:r><a:t>Line one</a:t></a:r></a:p><a:p/><a:p><a:r><a:t>Line</a:t></a:r><a:br/><a:r><a:t>two</a:t></a:r></a:p></p:txBody></p:sp>
  <p:sp><p:spPr/></p:sp>
</p:spTree></p:cSld></p:sld>"#;

        let shapes = extract_shapes_from_xml(xml).unwrap();
        assert_eq!(shapes.len(), 3);
        assert_eq!(shapes[0].text, "Hello world");
        assert_eq!(shapes[0].placeholder_type.as_deref(), Some("title"));
        assert_eq!(shapes[1].text, "Line one\n\nLine\u{b}two");
        assert_eq!(shapes[1].placeholder_type, None);
        assert_eq!(shapes[2].text, "");
    }

    #[test]
    fn test_group_and_graphic_frame_text_skipped() {
        let xml = r#"<p:sld xmlns:p="p" xmlns:a="a"><p:cSld><p:spTree>
  <p:grpSp><p:sp><p:txBody><a:p><a:r><a:t>Grouped</a:t></a:r></a:p></p:txBody></p:sp></p:grpSp>
  <p:graphicFrame><a:graphic><a:tbl><a:tr><a:tc><a:txBody><a:p><a:r><a:t>Cell</a:t></a:r></a:p></a:txBody></a:tc></a:tr></a:tbl></a:graphic></p:graphicFrame>
  <p:sp><p:txBody><a:p><a:r><a:t>Top level</a:t></a:r></a:p></p:txBody></p:sp>
</p:spTree></p:cSld></p:sld>"#;

        let shapes = extract_shapes_from_xml(xml).unwrap();
        assert_eq!(shapes.len(), 1);
        assert_eq!(shapes[0].text, "Top level");
    }

    #[test]
    fn test_escaped_text_unescaped() {
        let xml = r#"<p:sld xmlns:p="p" xmlns:a="a"><p:cSld><p:spTree>
  <p:sp><p:txBody><a:p><a:r><a:t>R&amp;D &lt;2025&gt;</a:t></a:r></a:p></p:txBody></p:sp>
</p:spTree></p:cSld></p:sld>"#;

        let shapes = extract_shapes_from_xml(xml).unwrap();
        assert_eq!(shapes[0].text, "R&D <2025>");
    }

    #[test]
    fn test_tab_characters_kept_in_text() {
        let xml = "<p:sld xmlns:p=\"p\" xmlns:a=\"a\"><p:cSld><p:spTree>\
  <p:sp><p:txBody><a:p><a:r><a:t>Name\tRole</a:t></a:r></a:p></p:txBody></p:sp>\
</p:spTree></p:cSld></p:sld>";

        let shapes = extract_shapes_from_xml(xml).unwrap();
        assert_eq!(shapes[0].text, "Name\tRole");
    }

    #[test]
    fn test_malformed_slide_xml() {
        let xml = r#"<p:sld><p:cSld><p:spTree><p:sp></p:spTree></p:sld>"#;
        assert!(matches!(
            extract_shapes_from_xml(xml),
            Err(Error::XmlError(_))
        ));
    }
}
