//! Read a `.docx` package back into a structural report.
//!
//! Manual ZIP + XML parsing (docx-rs is writer-only)
//!
//! Only the parts needed to describe formatting are read:
//! - `word/styles.xml`: style ids to display names, default paragraph style
//! - `word/document.xml`: body paragraphs, runs and tables
//!
//! Paragraphs inside table cells contribute to the table's cell text only,
//! not to [`DocxReport::paragraphs`].

use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::io::{Cursor, Read, Seek};
use std::path::Path;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, BytesText, Event};
use zip::ZipArchive;
use zip::result::ZipError;

use crate::block::ListKind;
use crate::error::InspectError;

const DOCUMENT_PART: &str = "word/document.xml";
const STYLES_PART: &str = "word/styles.xml";

/// One run of a paragraph and its character formatting.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunInfo {
    pub text: String,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub color: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParagraphInfo {
    /// Display name of the paragraph style.
    pub style: String,
    pub runs: Vec<RunInfo>,
    pub has_image: bool,
}

impl ParagraphInfo {
    /// Paragraph text, line breaks included as `\n`.
    pub fn text(&self) -> String {
        self.runs.iter().map(|run| run.text.as_str()).collect()
    }

    pub fn list_kind(&self) -> Option<ListKind> {
        ListKind::from_style_name(&self.style)
    }

    /// Heading level parsed from a `Heading N` style, 0 when the style has no
    /// trailing number.
    pub fn heading_level(&self) -> Option<u8> {
        if !self.style.starts_with("Heading") {
            return None;
        }
        let level = self
            .style
            .rsplit(' ')
            .next()
            .and_then(|last| last.parse().ok())
            .unwrap_or(0);
        Some(level)
    }
}

/// Everything the format checks need from a document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocxReport {
    pub paragraphs: Vec<ParagraphInfo>,
    /// Cell text per row per table.
    pub tables: Vec<Vec<Vec<String>>>,
    pub images: usize,
}

/// Read the `.docx` file at `path`.
pub fn read_docx(path: &Path) -> Result<DocxReport, InspectError> {
    let file = File::open(path)?;
    read_package(file)
}

/// Read a `.docx` package held in memory.
pub fn read_docx_bytes(bytes: &[u8]) -> Result<DocxReport, InspectError> {
    read_package(Cursor::new(bytes))
}

fn read_package<R: Read + Seek>(reader: R) -> Result<DocxReport, InspectError> {
    let mut archive = ZipArchive::new(reader)?;

    let styles = match read_part(&mut archive, STYLES_PART)? {
        Some(xml) => parse_styles(&xml)?,
        None => StyleNames::default(),
    };
    let document = read_part(&mut archive, DOCUMENT_PART)?
        .ok_or(InspectError::MissingPart(DOCUMENT_PART))?;

    walk_body(&document, &styles)
}

fn read_part<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    name: &'static str,
) -> Result<Option<String>, InspectError> {
    let mut part = match archive.by_name(name) {
        Ok(part) => part,
        Err(ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let mut content = String::new();
    part.read_to_string(&mut content)?;
    Ok(Some(content))
}

/// Extract an attribute value by key from an element
fn get_attr(e: &BytesStart, key: &[u8]) -> Option<String> {
    e.attributes()
        .find(|a| a.as_ref().ok().map(|x| x.key.as_ref()) == Some(key))
        .and_then(Result::ok)
        .map(|attr| String::from_utf8_lossy(&attr.value).to_string())
}

/// Toggle properties like `<w:b/>` are on unless `w:val` says otherwise.
fn toggle_on(e: &BytesStart) -> bool {
    !matches!(get_attr(e, b"w:val").as_deref(), Some("0" | "false" | "off"))
}

#[derive(Debug, Default)]
struct StyleNames {
    by_id: HashMap<String, String>,
    default_paragraph: Option<String>,
}

impl StyleNames {
    fn resolve(&self, style_id: Option<&str>) -> String {
        match style_id {
            Some(id) => self.by_id.get(id).cloned().unwrap_or_else(|| id.to_string()),
            None => self
                .default_paragraph
                .clone()
                .unwrap_or_else(|| "Normal".to_string()),
        }
    }
}

/// Word stores some built-in names lower-cased (`heading 1`); show them the
/// way the UI does.
fn ui_style_name(name: &str) -> String {
    match name.strip_prefix("heading ") {
        Some(rest) => format!("Heading {rest}"),
        None => name.to_string(),
    }
}

fn parse_styles(xml: &str) -> Result<StyleNames, InspectError> {
    let mut styles = StyleNames::default();
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut buf = Vec::new();
    let mut current_id: Option<String> = None;
    let mut current_is_default = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) if e.name().as_ref() == b"w:style" => {
                current_id = get_attr(&e, b"w:styleId");
                current_is_default = get_attr(&e, b"w:type").as_deref() == Some("paragraph")
                    && matches!(get_attr(&e, b"w:default").as_deref(), Some("1" | "true"));
            }
            Ok(Event::Empty(e)) if e.name().as_ref() == b"w:name" => {
                if let (Some(id), Some(name)) = (&current_id, get_attr(&e, b"w:val")) {
                    let name = ui_style_name(&name);
                    if current_is_default {
                        styles.default_paragraph = Some(name.clone());
                    }
                    styles.by_id.insert(id.clone(), name);
                }
            }
            Ok(Event::End(e)) if e.name().as_ref() == b"w:style" => {
                current_id = None;
                current_is_default = false;
            }
            Ok(Event::Eof) => break,
            Err(source) => {
                return Err(InspectError::Xml {
                    part: STYLES_PART,
                    source,
                });
            }
            _ => {}
        }
        buf.clear();
    }

    Ok(styles)
}

#[derive(Default)]
struct ParagraphBuilder {
    style_id: Option<String>,
    runs: Vec<RunInfo>,
    has_image: bool,
}

/// State for a single pass over `document.xml`.
struct BodyWalker<'a> {
    styles: &'a StyleNames,
    report: DocxReport,
    table_depth: usize,
    table: Vec<Vec<String>>,
    row: Vec<String>,
    cell_paragraphs: Vec<String>,
    paragraph: Option<ParagraphBuilder>,
    run: Option<RunInfo>,
    in_run_props: bool,
    in_text: bool,
}

impl<'a> BodyWalker<'a> {
    fn new(styles: &'a StyleNames) -> Self {
        Self {
            styles,
            report: DocxReport::default(),
            table_depth: 0,
            table: Vec::new(),
            row: Vec::new(),
            cell_paragraphs: Vec::new(),
            paragraph: None,
            run: None,
            in_run_props: false,
            in_text: false,
        }
    }

    fn handle_start(&mut self, e: &BytesStart) {
        match e.name().as_ref() {
            b"w:tbl" => {
                self.table_depth += 1;
                if self.table_depth == 1 {
                    self.table.clear();
                }
            }
            b"w:tr" if self.table_depth == 1 => self.row.clear(),
            b"w:tc" if self.table_depth == 1 => self.cell_paragraphs.clear(),
            b"w:p" => self.paragraph = Some(ParagraphBuilder::default()),
            b"w:r" if self.paragraph.is_some() => self.run = Some(RunInfo::default()),
            b"w:rPr" if self.run.is_some() => self.in_run_props = true,
            b"w:t" if self.run.is_some() => self.in_text = true,
            b"w:drawing" if self.run.is_some() => {
                self.report.images += 1;
                if let Some(paragraph) = self.paragraph.as_mut() {
                    paragraph.has_image = true;
                }
            }
            _ => self.handle_property(e),
        }
    }

    fn handle_empty(&mut self, e: &BytesStart) {
        match e.name().as_ref() {
            b"w:p" => {
                self.paragraph = Some(ParagraphBuilder::default());
                self.finish_paragraph();
            }
            _ => self.handle_property(e),
        }
    }

    /// Paragraph and run properties, which may arrive as empty or start tags.
    fn handle_property(&mut self, e: &BytesStart) {
        let name = e.name();
        if self.in_run_props {
            let Some(run) = self.run.as_mut() else {
                return;
            };
            match name.as_ref() {
                b"w:b" => run.bold = toggle_on(e),
                b"w:i" => run.italic = toggle_on(e),
                b"w:u" => run.underline = get_attr(e, b"w:val").as_deref() != Some("none"),
                b"w:color" => {
                    run.color = get_attr(e, b"w:val").filter(|value| value != "auto");
                }
                _ => {}
            }
            return;
        }

        if let Some(run) = self.run.as_mut() {
            match name.as_ref() {
                b"w:br" | b"w:cr" => run.text.push('\n'),
                b"w:tab" => run.text.push('\t'),
                _ => {}
            }
            return;
        }

        if name.as_ref() == b"w:pStyle" {
            if let Some(paragraph) = self.paragraph.as_mut() {
                paragraph.style_id = get_attr(e, b"w:val");
            }
        }
    }

    fn handle_end(&mut self, name: &[u8]) {
        match name {
            b"w:t" => self.in_text = false,
            b"w:rPr" => self.in_run_props = false,
            b"w:r" => {
                if let (Some(run), Some(paragraph)) = (self.run.take(), self.paragraph.as_mut()) {
                    paragraph.runs.push(run);
                }
            }
            b"w:p" => self.finish_paragraph(),
            b"w:tc" if self.table_depth == 1 => {
                self.row.push(self.cell_paragraphs.join("\n"));
            }
            b"w:tr" if self.table_depth == 1 => {
                self.table.push(std::mem::take(&mut self.row));
            }
            b"w:tbl" if self.table_depth > 0 => {
                self.table_depth -= 1;
                if self.table_depth == 0 {
                    self.report.tables.push(std::mem::take(&mut self.table));
                }
            }
            _ => {}
        }
    }

    fn handle_text(&mut self, text: &BytesText) -> Result<(), InspectError> {
        if !self.in_text {
            return Ok(());
        }
        if let Some(run) = self.run.as_mut() {
            let unescaped = text.unescape().map_err(|source| InspectError::Xml {
                part: DOCUMENT_PART,
                source,
            })?;
            run.text.push_str(&unescaped);
        }
        Ok(())
    }

    fn finish_paragraph(&mut self) {
        let Some(builder) = self.paragraph.take() else {
            return;
        };
        let paragraph = ParagraphInfo {
            style: self.styles.resolve(builder.style_id.as_deref()),
            runs: builder.runs,
            has_image: builder.has_image,
        };

        match self.table_depth {
            0 => self.report.paragraphs.push(paragraph),
            1 => self.cell_paragraphs.push(paragraph.text()),
            // nested tables are flattened away
            _ => {}
        }
    }
}

fn walk_body(xml: &str, styles: &StyleNames) -> Result<DocxReport, InspectError> {
    let mut walker = BodyWalker::new(styles);
    let mut reader = Reader::from_str(xml);
    // Run text keeps its own leading and trailing spaces
    reader.trim_text(false);

    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => walker.handle_start(&e),
            Ok(Event::Empty(e)) => walker.handle_empty(&e),
            Ok(Event::End(e)) => walker.handle_end(e.name().as_ref()),
            Ok(Event::Text(t)) => walker.handle_text(&t)?,
            Ok(Event::Eof) => break,
            Err(source) => {
                return Err(InspectError::Xml {
                    part: DOCUMENT_PART,
                    source,
                });
            }
            _ => {}
        }
        buf.clear();
    }

    Ok(walker.report)
}

/// Paragraph-by-paragraph formatting dump, followed by table contents.
impl fmt::Display for DocxReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, paragraph) in self.paragraphs.iter().enumerate() {
            let text = paragraph.text();
            let text = text.trim();
            if text.is_empty() {
                continue;
            }
            let runs = &paragraph.runs;
            let color = runs
                .first()
                .and_then(|run| run.color.as_deref())
                .unwrap_or("None");
            write!(
                f,
                "Paragraph {}: '{}' (Style: {}, Bold: {}, Italic: {}, Underlined: {}, Color: {}",
                i + 1,
                text,
                paragraph.style,
                runs.iter().any(|run| run.bold),
                runs.iter().any(|run| run.italic),
                runs.iter().any(|run| run.underline),
                color,
            )?;
            if let Some(kind) = paragraph.list_kind() {
                write!(f, ", List Type: {}", kind.label())?;
            }
            writeln!(f, ")")?;
        }

        for (i, table) in self.tables.iter().enumerate() {
            writeln!(f, "\nTable {}:", i + 1)?;
            for row in table {
                writeln!(f, "  Row: {row:?}")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use zip::ZipWriter;
    use zip::write::SimpleFileOptions;

    const STYLES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/></w:style>
  <w:style w:type="paragraph" w:styleId="Heading1"><w:name w:val="heading 1"/></w:style>
  <w:style w:type="paragraph" w:styleId="ListBullet"><w:name w:val="List Bullet"/></w:style>
</w:styles>"#;

    const DOCUMENT: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:body>
    <w:p><w:pPr><w:pStyle w:val="Heading1"/><w:rPr><w:b/></w:rPr></w:pPr><w:r><w:t>Title</w:t></w:r></w:p>
    <w:p>
      <w:r><w:t xml:space="preserve">Plain </w:t></w:r>
      <w:r><w:rPr><w:b/></w:rPr><w:t>strong</w:t></w:r>
      <w:r><w:rPr><w:b w:val="0"/><w:u w:val="single"/><w:color w:val="0000FF"/></w:rPr><w:t xml:space="preserve"> link &amp; more</w:t></w:r>
    </w:p>
    <w:p><w:pPr><w:pStyle w:val="ListBullet"/></w:pPr><w:r><w:t>item</w:t></w:r></w:p>
    <w:p><w:r><w:t>one</w:t><w:br/><w:t>two</w:t></w:r></w:p>
    <w:p/>
    <w:tbl>
      <w:tr><w:tc><w:p><w:r><w:t>A</w:t></w:r></w:p></w:tc><w:tc><w:p><w:r><w:t>B</w:t></w:r></w:p></w:tc></w:tr>
      <w:tr><w:tc><w:p><w:r><w:t>1</w:t></w:r></w:p></w:tc><w:tc><w:p/></w:tc></w:tr>
    </w:tbl>
  </w:body>
</w:document>"#;

    fn package(parts: &[(&str, &str)]) -> Vec<u8> {
        let mut buf = Vec::new();
        {
            let mut zip = ZipWriter::new(Cursor::new(&mut buf));
            for (name, content) in parts {
                zip.start_file(*name, SimpleFileOptions::default()).unwrap();
                zip.write_all(content.as_bytes()).unwrap();
            }
            zip.finish().unwrap();
        }
        buf
    }

    fn sample_report() -> DocxReport {
        read_docx_bytes(&package(&[(STYLES_PART, STYLES), (DOCUMENT_PART, DOCUMENT)])).unwrap()
    }

    #[test]
    fn reads_styles_runs_and_tables() {
        let report = sample_report();
        assert_eq!(report.paragraphs.len(), 5);

        let heading = &report.paragraphs[0];
        assert_eq!(heading.style, "Heading 1");
        assert_eq!(heading.heading_level(), Some(1));
        // paragraph-mark formatting is not a run
        assert!(!heading.runs[0].bold);

        let mixed = &report.paragraphs[1];
        assert_eq!(mixed.style, "Normal");
        assert_eq!(mixed.text(), "Plain strong link & more");
        assert!(mixed.runs[1].bold);
        assert!(!mixed.runs[2].bold);
        assert!(mixed.runs[2].underline);
        assert_eq!(mixed.runs[2].color.as_deref(), Some("0000FF"));

        assert_eq!(report.paragraphs[2].list_kind(), Some(ListKind::Bullet));
        assert_eq!(report.paragraphs[3].text(), "one\ntwo");
        assert_eq!(report.paragraphs[4].text(), "");

        assert_eq!(
            report.tables,
            vec![vec![
                vec!["A".to_string(), "B".to_string()],
                vec!["1".to_string(), String::new()],
            ]]
        );
    }

    #[test]
    fn format_dump_lists_non_empty_paragraphs_and_tables() {
        let dump = sample_report().to_string();
        let expected = "\
Paragraph 1: 'Title' (Style: Heading 1, Bold: false, Italic: false, Underlined: false, Color: None)
Paragraph 2: 'Plain strong link & more' (Style: Normal, Bold: true, Italic: false, Underlined: true, Color: None)
Paragraph 3: 'item' (Style: List Bullet, Bold: false, Italic: false, Underlined: false, Color: None, List Type: Bulleted)
Paragraph 4: 'one\ntwo' (Style: Normal, Bold: false, Italic: false, Underlined: false, Color: None)

Table 1:
  Row: [\"A\", \"B\"]
  Row: [\"1\", \"\"]
";
        assert_eq!(dump, expected);
    }

    #[test]
    fn missing_document_part_is_an_error() {
        let err = read_docx_bytes(&package(&[(STYLES_PART, STYLES)])).unwrap_err();
        assert!(matches!(err, InspectError::MissingPart(DOCUMENT_PART)));
    }

    #[test]
    fn not_a_zip_is_an_error() {
        let err = read_docx_bytes(b"plain text, not a package").unwrap_err();
        assert!(matches!(err, InspectError::Zip(_)));
    }
}
