//! The document-building capability the renderer writes into.

use std::path::Path;

use crate::block::ListKind;
use crate::error::ImageError;

/// Named paragraph styles the renderer asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParagraphStyle {
    Normal,
    List(ListKind),
    CodeBlock,
}

impl ParagraphStyle {
    /// Display name of the style as Word shows it.
    pub fn name(self) -> &'static str {
        match self {
            ParagraphStyle::Normal => "Normal",
            ParagraphStyle::List(kind) => kind.style_name(),
            ParagraphStyle::CodeBlock => "CodeBlock",
        }
    }
}

/// A span of text with one formatting treatment.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TextRun {
    pub text: String,
    pub bold: bool,
    pub underline: bool,
    /// Hex RGB without a leading `#`.
    pub color: Option<String>,
}

impl TextRun {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn bold(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bold: true,
            ..Self::default()
        }
    }
}

/// Receives blocks one at a time, in source order.
pub trait DocumentSink {
    fn add_heading(&mut self, text: &str, level: u8);

    fn add_paragraph(&mut self, style: ParagraphStyle, runs: Vec<TextRun>);

    /// `rows` may be shorter than `headers`; missing cells are left empty.
    fn add_table(&mut self, headers: &[String], rows: &[Vec<String>]);

    /// Embed the image at `path` at the configured display width.
    fn add_image(&mut self, path: &Path) -> Result<(), ImageError>;
}

#[cfg(test)]
pub(crate) mod recording {
    use super::*;
    use std::path::PathBuf;

    #[derive(Debug, Clone, PartialEq)]
    pub enum Call {
        Heading(String, u8),
        Paragraph(ParagraphStyle, Vec<TextRun>),
        Table(Vec<String>, Vec<Vec<String>>),
        Image(PathBuf),
    }

    /// Records every call; images whose path does not exist fail like a real
    /// sink would.
    #[derive(Debug, Default)]
    pub struct RecordingSink {
        pub calls: Vec<Call>,
    }

    impl DocumentSink for RecordingSink {
        fn add_heading(&mut self, text: &str, level: u8) {
            self.calls.push(Call::Heading(text.to_string(), level));
        }

        fn add_paragraph(&mut self, style: ParagraphStyle, runs: Vec<TextRun>) {
            self.calls.push(Call::Paragraph(style, runs));
        }

        fn add_table(&mut self, headers: &[String], rows: &[Vec<String>]) {
            self.calls.push(Call::Table(headers.to_vec(), rows.to_vec()));
        }

        fn add_image(&mut self, path: &Path) -> Result<(), ImageError> {
            std::fs::metadata(path).map_err(|source| ImageError::Read {
                path: path.to_path_buf(),
                source,
            })?;
            self.calls.push(Call::Image(path.to_path_buf()));
            Ok(())
        }
    }
}
