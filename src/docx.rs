//! `.docx` output through `docx-rs`.

use std::fs;
use std::io::Cursor;
use std::path::Path;

use docx_rs::{
    AbstractNumbering, BreakType, Docx, IndentLevel, Level, LevelJc, LevelText, NumberFormat,
    Numbering, NumberingId, Paragraph, Pic, Run, RunFonts, SpecialIndentType, Start, Style,
    StyleType, Table, TableCell, TableRow,
};
use image::ImageFormat;

use crate::block::ListKind;
use crate::config::Config;
use crate::error::{ConvertError, ImageError};
use crate::sink::{DocumentSink, ParagraphStyle, TextRun};

const TWIPS_PER_INCH: f64 = 1440.0;
const EMU_PER_INCH: f64 = 914_400.0;
const LIST_INDENT_TWIPS: i32 = 720;
const LIST_HANGING_TWIPS: i32 = 360;

// Id 1 is left to the writer's built-in default numbering
const BULLET_NUMBERING: usize = 2;
const NESTED_BULLET_NUMBERING: usize = 3;
/// Numbered lists get fresh numbering instances from here on.
const FIRST_NUMBERED_LIST: usize = 4;

enum BodyElement {
    Paragraph(Paragraph),
    Table(Table),
}

/// Collects blocks and packs them into a Word document.
pub struct DocxSink {
    styles: Vec<Style>,
    numberings: Vec<(AbstractNumbering, Numbering)>,
    body: Vec<BodyElement>,
    image_width_inches: f64,
    /// Numbering id of the numbered list currently being continued.
    open_numbered_list: Option<usize>,
    next_numbering_id: usize,
}

impl DocxSink {
    pub fn new(config: &Config) -> Self {
        let nested_indent = inches_to_twips(config.lists.nested_indent_inches);
        Self {
            styles: document_styles(config, nested_indent),
            numberings: vec![
                bullet_numbering(BULLET_NUMBERING, LIST_INDENT_TWIPS, "•"),
                bullet_numbering(
                    NESTED_BULLET_NUMBERING,
                    LIST_INDENT_TWIPS + nested_indent,
                    "◦",
                ),
            ],
            body: Vec::new(),
            image_width_inches: config.images.width_inches,
            open_numbered_list: None,
            next_numbering_id: FIRST_NUMBERED_LIST,
        }
    }

    /// Pack the document into `.docx` bytes.
    pub fn into_bytes(self) -> Result<Vec<u8>, ConvertError> {
        let mut docx = Docx::new();
        for style in self.styles {
            docx = docx.add_style(style);
        }
        for (abstract_numbering, numbering) in self.numberings {
            docx = docx
                .add_abstract_numbering(abstract_numbering)
                .add_numbering(numbering);
        }
        for element in self.body {
            docx = match element {
                BodyElement::Paragraph(paragraph) => docx.add_paragraph(paragraph),
                BodyElement::Table(table) => docx.add_table(table),
            };
        }

        let mut buf = Vec::new();
        docx.build()
            .pack(Cursor::new(&mut buf))
            .map_err(|e| ConvertError::Package(e.to_string()))?;
        Ok(buf)
    }

    /// Pack the document and write it to `path`.
    pub fn save(self, path: &Path) -> Result<(), ConvertError> {
        let bytes = self.into_bytes()?;
        fs::write(path, bytes).map_err(|source| ConvertError::WriteOutput {
            path: path.to_path_buf(),
            source,
        })
    }

    fn push_paragraph(&mut self, paragraph: Paragraph) {
        self.body.push(BodyElement::Paragraph(paragraph));
    }

    /// Numbering id for the next numbered item. Consecutive numbered items
    /// share one list; anything in between starts a new one at 1.
    fn numbered_list_id(&mut self) -> usize {
        if let Some(id) = self.open_numbered_list {
            return id;
        }
        let id = self.next_numbering_id;
        self.next_numbering_id += 1;
        self.numberings.push(decimal_numbering(id));
        self.open_numbered_list = Some(id);
        id
    }
}

impl DocumentSink for DocxSink {
    fn add_heading(&mut self, text: &str, level: u8) {
        self.open_numbered_list = None;
        let paragraph = Paragraph::new()
            .add_run(Run::new().add_text(text))
            .style(&format!("Heading{level}"));
        self.push_paragraph(paragraph);
    }

    fn add_paragraph(&mut self, style: ParagraphStyle, runs: Vec<TextRun>) {
        let mut paragraph = Paragraph::new();
        for text_run in &runs {
            paragraph = paragraph.add_run(to_run(text_run));
        }

        paragraph = match style {
            ParagraphStyle::Normal => paragraph,
            ParagraphStyle::CodeBlock => paragraph.style("CodeBlock"),
            ParagraphStyle::List(kind) => {
                let numbering = match kind {
                    ListKind::Bullet => BULLET_NUMBERING,
                    ListKind::NestedBullet => NESTED_BULLET_NUMBERING,
                    ListKind::Numbered => self.numbered_list_id(),
                };
                paragraph
                    .style(list_style_id(kind))
                    .numbering(NumberingId::new(numbering), IndentLevel::new(0))
            }
        };
        if style != ParagraphStyle::List(ListKind::Numbered) {
            self.open_numbered_list = None;
        }
        self.push_paragraph(paragraph);
    }

    fn add_table(&mut self, headers: &[String], rows: &[Vec<String>]) {
        self.open_numbered_list = None;
        let columns = headers.len();
        let mut table_rows = vec![TableRow::new(headers.iter().map(|h| cell(h)).collect())];
        for row in rows {
            let cells = (0..columns)
                .map(|i| cell(row.get(i).map_or("", String::as_str)))
                .collect();
            table_rows.push(TableRow::new(cells));
        }
        self.body
            .push(BodyElement::Table(Table::new(table_rows).style("TableGrid")));
    }

    fn add_image(&mut self, path: &Path) -> Result<(), ImageError> {
        let bytes = fs::read(path).map_err(|source| ImageError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let decoded = image::load_from_memory(&bytes).map_err(|source| ImageError::Decode {
            path: path.to_path_buf(),
            source,
        })?;

        // Normalise to PNG so the writer never sees a format it cannot decode
        let mut png = Vec::new();
        decoded
            .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
            .map_err(|source| ImageError::Encode {
                path: path.to_path_buf(),
                source,
            })?;

        let width_emu = (self.image_width_inches * EMU_PER_INCH) as u32;
        let height_emu = (f64::from(width_emu) * f64::from(decoded.height())
            / f64::from(decoded.width().max(1))) as u32;
        let pic = Pic::new(&png).size(width_emu, height_emu);

        self.open_numbered_list = None;
        self.push_paragraph(Paragraph::new().add_run(Run::new().add_image(pic)));
        Ok(())
    }
}

fn list_style_id(kind: ListKind) -> &'static str {
    match kind {
        ListKind::Bullet => "ListBullet",
        ListKind::Numbered => "ListNumber",
        ListKind::NestedBullet => "ListBullet2",
    }
}

fn document_styles(config: &Config, nested_indent: i32) -> Vec<Style> {
    let code_font = RunFonts::new()
        .ascii(config.code.font.as_str())
        .hi_ansi(config.code.font.as_str());
    vec![
        Style::new("Heading1", StyleType::Paragraph)
            .name("Heading 1")
            .size(32)
            .bold(),
        Style::new("Heading2", StyleType::Paragraph)
            .name("Heading 2")
            .size(26)
            .bold(),
        Style::new(list_style_id(ListKind::Bullet), StyleType::Paragraph)
            .name(ListKind::Bullet.style_name()),
        Style::new(list_style_id(ListKind::Numbered), StyleType::Paragraph)
            .name(ListKind::Numbered.style_name()),
        Style::new(list_style_id(ListKind::NestedBullet), StyleType::Paragraph)
            .name(ListKind::NestedBullet.style_name())
            .indent(Some(nested_indent), None, None, None),
        Style::new("CodeBlock", StyleType::Paragraph)
            .name(ParagraphStyle::CodeBlock.name())
            .fonts(code_font)
            // half-points
            .size(config.code.size_pt as usize * 2),
        Style::new("TableGrid", StyleType::Table).name("Table Grid"),
    ]
}

fn bullet_numbering(id: usize, left: i32, glyph: &str) -> (AbstractNumbering, Numbering) {
    let level = Level::new(
        0,
        Start::new(1),
        NumberFormat::new("bullet"),
        LevelText::new(glyph),
        LevelJc::new("left"),
    )
    .indent(
        Some(left),
        Some(SpecialIndentType::Hanging(LIST_HANGING_TWIPS)),
        None,
        None,
    );
    (AbstractNumbering::new(id).add_level(level), Numbering::new(id, id))
}

fn decimal_numbering(id: usize) -> (AbstractNumbering, Numbering) {
    let level = Level::new(
        0,
        Start::new(1),
        NumberFormat::new("decimal"),
        LevelText::new("%1."),
        LevelJc::new("left"),
    )
    .indent(
        Some(LIST_INDENT_TWIPS),
        Some(SpecialIndentType::Hanging(LIST_HANGING_TWIPS)),
        None,
        None,
    );
    (AbstractNumbering::new(id).add_level(level), Numbering::new(id, id))
}

fn to_run(text_run: &TextRun) -> Run {
    let mut run = Run::new();
    for (i, line) in text_run.text.split('\n').enumerate() {
        if i > 0 {
            run = run.add_break(BreakType::TextWrapping);
        }
        run = run.add_text(line);
    }
    if text_run.bold {
        run = run.bold();
    }
    if text_run.underline {
        run = run.underline("single");
    }
    if let Some(color) = &text_run.color {
        run = run.color(color.as_str());
    }
    run
}

fn cell(text: &str) -> TableCell {
    let paragraph = if text.is_empty() {
        Paragraph::new()
    } else {
        Paragraph::new().add_run(Run::new().add_text(text))
    };
    TableCell::new().add_paragraph(paragraph)
}

fn inches_to_twips(inches: f64) -> i32 {
    (inches * TWIPS_PER_INCH).round() as i32
}
