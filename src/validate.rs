//! Compare a generated document against rules derived from its markdown
//! source.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::block::{Block, ListKind, TextSegment};
use crate::inspect::DocxReport;
use crate::parser::Blocks;

/// Structural facts read back from a generated document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormatSummary {
    /// Heading text and level, in document order.
    pub headings: Vec<(String, u8)>,
    /// One entry per list paragraph.
    pub lists: Vec<ListKind>,
    /// Distinct paragraph styles, in first-seen order.
    pub styles: Vec<String>,
    pub bold_text: Vec<String>,
    pub tables: Vec<Vec<Vec<String>>>,
    pub code_blocks: Vec<String>,
    pub images: usize,
}

impl FormatSummary {
    /// Summarise the non-empty body paragraphs and the tables of `report`.
    pub fn from_report(report: &DocxReport) -> Self {
        let mut summary = FormatSummary {
            tables: report.tables.clone(),
            images: report.images,
            ..Self::default()
        };

        for paragraph in &report.paragraphs {
            let text = paragraph.text();
            let text = text.trim();
            if text.is_empty() {
                continue;
            }

            if !summary.styles.contains(&paragraph.style) {
                summary.styles.push(paragraph.style.clone());
            }
            if let Some(level) = paragraph.heading_level() {
                summary.headings.push((text.to_string(), level));
            }
            if let Some(kind) = paragraph.list_kind() {
                summary.lists.push(kind);
            }
            summary.bold_text.extend(
                paragraph
                    .runs
                    .iter()
                    .filter(|run| run.bold && !run.text.trim().is_empty())
                    .map(|run| run.text.trim().to_string()),
            );
            if paragraph.style == "CodeBlock" {
                summary.code_blocks.push(text.to_string());
            }
        }

        summary
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        let head: String = text.chars().take(max_chars).collect();
        format!("{head}...")
    } else {
        text.to_string()
    }
}

impl fmt::Display for FormatSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Document formatting summary:")?;

        writeln!(f, "- Headings: {}", self.headings.len())?;
        for (text, level) in self.headings.iter().take(3) {
            writeln!(f, "  * Level {level}: {}", truncate(text, 30))?;
        }
        if self.headings.len() > 3 {
            writeln!(f, "  * ... and {} more", self.headings.len() - 3)?;
        }

        writeln!(f, "- Lists: {}", self.lists.len())?;
        let mut counts: Vec<(ListKind, usize)> = Vec::new();
        for kind in &self.lists {
            match counts.iter_mut().find(|(seen, _)| seen == kind) {
                Some((_, count)) => *count += 1,
                None => counts.push((*kind, 1)),
            }
        }
        for (kind, count) in counts {
            writeln!(f, "  * {}: {count}", kind.style_name())?;
        }

        writeln!(f, "- Tables: {}", self.tables.len())?;
        for (i, table) in self.tables.iter().enumerate().take(2) {
            let columns = table.first().map_or(0, Vec::len);
            writeln!(
                f,
                "  * Table {}: {} rows x {columns} columns",
                i + 1,
                table.len()
            )?;
        }
        if self.tables.len() > 2 {
            writeln!(f, "  * ... and {} more", self.tables.len() - 2)?;
        }

        writeln!(f, "- Code blocks: {}", self.code_blocks.len())?;
        writeln!(f, "- Images: {}", self.images)?;
        writeln!(f, "- Bold text elements: {}", self.bold_text.len())?;
        writeln!(f, "- Styles used: {}", self.styles.join(", "))
    }
}

/// What a faithful conversion of a markdown source should contain. A `None`
/// category is not checked.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpectedRules {
    pub headings: Option<Vec<(String, u8)>>,
    pub lists: Option<Vec<ListKind>>,
    pub styles: Option<Vec<String>>,
    pub bold_text: Option<Vec<String>>,
}

impl ExpectedRules {
    /// Derive rules by classifying `markdown` the same way the converter
    /// does. Only constructs that produce visible text are expected, since
    /// the summary ignores empty paragraphs.
    pub fn from_markdown(markdown: &str) -> Self {
        let mut headings = Vec::new();
        let mut lists = Vec::new();
        let mut bold_text = Vec::new();
        let mut has_paragraph = false;
        let mut has_code = false;

        for block in Blocks::new(markdown) {
            match block {
                // a blank heading is written but leaves no visible paragraph
                Block::Heading { level, text } => {
                    if !text.trim().is_empty() {
                        headings.push((text.trim().to_string(), level));
                    }
                }
                Block::ListItem { kind, text } => {
                    if !text.trim().is_empty() && !lists.contains(&kind) {
                        lists.push(kind);
                    }
                }
                Block::CodeBlock { content, .. } => {
                    has_code |= !content.trim().is_empty();
                }
                Block::Paragraph { segments } | Block::LinkParagraph { segments } => {
                    has_paragraph |= segments.iter().any(|s| !s.text().trim().is_empty());
                    bold_text.extend(segments.iter().filter_map(|segment| match segment {
                        TextSegment::Bold(text) if !text.trim().is_empty() => {
                            Some(text.trim().to_string())
                        }
                        _ => None,
                    }));
                }
                Block::Image { .. } | Block::Table { .. } => {}
            }
        }

        lists.sort_by_key(|kind| ListKind::ALL.iter().position(|k| k == kind));

        let mut styles = Vec::new();
        if has_paragraph {
            styles.push("Normal".to_string());
        }
        if has_code {
            styles.push("CodeBlock".to_string());
        }

        ExpectedRules {
            headings: Some(headings),
            lists: Some(lists),
            styles: Some(styles),
            bold_text: Some(bold_text),
        }
    }
}

impl fmt::Display for ExpectedRules {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(headings) = &self.headings {
            writeln!(f, "headings: {headings:?}")?;
        }
        if let Some(lists) = &self.lists {
            let names: Vec<&str> = lists.iter().map(|kind| kind.style_name()).collect();
            writeln!(f, "lists: {names:?}")?;
        }
        if let Some(styles) = &self.styles {
            writeln!(f, "styles: {styles:?}")?;
        }
        if let Some(bold_text) = &self.bold_text {
            writeln!(f, "bold_text: {bold_text:?}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleCategory {
    Headings,
    Lists,
    Styles,
    BoldText,
}

impl RuleCategory {
    pub fn label(self) -> &'static str {
        match self {
            RuleCategory::Headings => "Headings",
            RuleCategory::Lists => "Lists",
            RuleCategory::Styles => "Styles",
            RuleCategory::BoldText => "Bold text",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryResult {
    pub category: RuleCategory,
    pub passed: bool,
    pub detail: String,
}

/// Per-category outcome of a validation run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub results: Vec<CategoryResult>,
}

impl ValidationReport {
    /// True when every evaluated category passed.
    pub fn passed(&self) -> bool {
        self.results.iter().all(|result| result.passed)
    }

    pub fn result(&self, category: RuleCategory) -> Option<&CategoryResult> {
        self.results.iter().find(|result| result.category == category)
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for result in &self.results {
            let (mark, verdict) = if result.passed {
                ("✓", "Passed")
            } else {
                ("✗", "Failed")
            };
            writeln!(
                f,
                "{mark} {} validation: {verdict} ({})",
                result.category.label(),
                result.detail
            )?;
        }
        let overall = if self.passed() { "Passed" } else { "Failed" };
        writeln!(f, "\nOverall validation: {overall}")
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Check `summary` against every category present in `expected`.
pub fn validate(summary: &FormatSummary, expected: &ExpectedRules) -> ValidationReport {
    let mut report = ValidationReport::default();

    if let Some(headings) = &expected.headings {
        report.results.push(check_headings(&summary.headings, headings));
    }

    if let Some(lists) = &expected.lists {
        let passed = lists.iter().all(|kind| summary.lists.contains(kind));
        report.results.push(CategoryResult {
            category: RuleCategory::Lists,
            passed,
            detail: if passed {
                "All expected list types found".to_string()
            } else {
                "Missing some expected list types".to_string()
            },
        });
    }

    if let Some(styles) = &expected.styles {
        let passed = styles.iter().all(|style| summary.styles.contains(style));
        report.results.push(CategoryResult {
            category: RuleCategory::Styles,
            passed,
            detail: if passed {
                "All expected styles found".to_string()
            } else {
                "Missing some expected styles".to_string()
            },
        });
    }

    if let Some(bold_text) = &expected.bold_text {
        let passed = bold_text.iter().all(|expected| {
            summary
                .bold_text
                .iter()
                .any(|actual| contains_ignore_case(actual, expected))
        });
        report.results.push(CategoryResult {
            category: RuleCategory::BoldText,
            passed,
            detail: if passed {
                "All expected bold text found".to_string()
            } else {
                "Missing some expected bold text".to_string()
            },
        });
    }

    report
}

fn check_headings(actual: &[(String, u8)], expected: &[(String, u8)]) -> CategoryResult {
    let fail = |detail: String| CategoryResult {
        category: RuleCategory::Headings,
        passed: false,
        detail,
    };

    if actual.len() < expected.len() {
        return fail(format!(
            "Missing headings: expected {}, found {}",
            expected.len(),
            actual.len()
        ));
    }
    for (i, ((expected_text, expected_level), (actual_text, actual_level))) in
        expected.iter().zip(actual).enumerate()
    {
        if expected_level != actual_level || !contains_ignore_case(actual_text, expected_text) {
            return fail(format!("Heading mismatch at position {}", i + 1));
        }
    }

    CategoryResult {
        category: RuleCategory::Headings,
        passed: true,
        detail: "All expected headings found".to_string(),
    }
}

/// Where the validator writes its document: next to the input, named
/// `<stem>_validated.docx`.
pub fn validated_output_path(markdown_path: &Path) -> PathBuf {
    let stem = markdown_path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());
    markdown_path.with_file_name(format!("{stem}_validated.docx"))
}
