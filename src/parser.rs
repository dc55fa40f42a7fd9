//! Line classifier for the supported markdown subset.
//!
//! The source is split into lines once and walked with an explicit cursor.
//! [`classify`] looks at the line under the cursor (and, for fences and
//! tables, the lines after it) and reports the block produced together with
//! the number of lines consumed. Headings depend on whether a heading has been
//! seen before; that state is passed in and handed back as a
//! [`HeadingCounter`] so the classifier itself holds no state.

use crate::block::{Block, ListKind};
use crate::inline;

const BOLD: &str = "**";
const FENCE: &str = "```";
const TABLE_SEPARATOR: &str = "---";

/// Nested bullet markers, matched against the untrimmed line.
const NESTED_BULLET_MARKERS: [&str; 2] = ["    *   ", "    * "];
/// Flat bullet markers, longest first.
const BULLET_MARKERS: [&str; 2] = ["*   ", "* "];

/// Tracks how many headings have been emitted. The first is the document
/// title (level 1), every later one a section heading (level 2).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HeadingCounter {
    emitted: usize,
}

impl HeadingCounter {
    pub fn next_level(self) -> u8 {
        if self.emitted == 0 { 1 } else { 2 }
    }

    pub fn advance(self) -> Self {
        Self {
            emitted: self.emitted + 1,
        }
    }

    pub fn emitted(self) -> usize {
        self.emitted
    }
}

/// Result of classifying the line under the cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classified {
    /// `None` for blank lines.
    pub block: Option<Block>,
    /// Lines consumed, always at least one.
    pub consumed: usize,
    pub headings: HeadingCounter,
}

/// Classify `lines[pos]`. `pos` must be in bounds.
pub fn classify(lines: &[&str], pos: usize, headings: HeadingCounter) -> Classified {
    let raw = lines[pos];
    let line = raw.trim();

    let single = |block: Block| Classified {
        block: Some(block),
        consumed: 1,
        headings,
    };

    if line.is_empty() {
        return Classified {
            block: None,
            consumed: 1,
            headings,
        };
    }

    if let Some(text) = heading_text(line) {
        return Classified {
            block: Some(Block::Heading {
                level: headings.next_level(),
                text: text.to_string(),
            }),
            consumed: 1,
            headings: headings.advance(),
        };
    }

    if let Some((kind, text)) = list_item(raw) {
        return single(Block::ListItem {
            kind,
            text: inline::strip_bold(text),
        });
    }

    if let Some(language) = fence_language(line) {
        let (content, consumed) = code_block_body(lines, pos);
        return Classified {
            block: Some(Block::CodeBlock { language, content }),
            consumed,
            headings,
        };
    }

    if let Some((alt, path)) = image_reference(line) {
        return single(Block::Image {
            alt: alt.to_string(),
            path: path.to_string(),
        });
    }

    if starts_table(lines, pos) {
        let (block, consumed) = table(lines, pos);
        return Classified {
            block: Some(block),
            consumed,
            headings,
        };
    }

    if looks_like_link(line) {
        return single(Block::LinkParagraph {
            segments: inline::link_segments(line),
        });
    }

    single(Block::Paragraph {
        segments: inline::bold_segments(line),
    })
}

/// Text of a heading line: the whole trimmed line wrapped in `**` with at
/// least one character inside, and not a bold bullet. Every leading and
/// trailing `*` is removed, so `***Title***` reads as `Title`.
pub fn heading_text(line: &str) -> Option<&str> {
    if line.starts_with("* **") {
        return None;
    }
    let inner = line.strip_prefix(BOLD)?.strip_suffix(BOLD)?;
    if inner.is_empty() {
        return None;
    }
    Some(line.trim_matches('*'))
}

/// Recognise a list item on an untrimmed line and return its kind and the
/// text after the marker. Markers are removed by their exact length.
pub fn list_item(raw: &str) -> Option<(ListKind, &str)> {
    let raw = raw.trim_end();
    if let Some(text) = strip_marker(raw, &NESTED_BULLET_MARKERS) {
        return Some((ListKind::NestedBullet, text));
    }

    let line = raw.trim_start();
    if let Some(text) = strip_marker(line, &BULLET_MARKERS) {
        return Some((ListKind::Bullet, text));
    }

    numbered_item_text(line).map(|text| (ListKind::Numbered, text))
}

fn strip_marker<'a>(line: &'a str, markers: &[&str]) -> Option<&'a str> {
    markers
        .iter()
        .find_map(|marker| line.strip_prefix(marker))
        .map(str::trim)
}

/// Text of a `<digits>. item` line.
fn numbered_item_text(line: &str) -> Option<&str> {
    let digits = line.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    line[digits..].strip_prefix(". ").map(str::trim)
}

/// For an opening fence line, the optional language tag after the fence.
pub fn fence_language(line: &str) -> Option<Option<String>> {
    let tag = line.strip_prefix(FENCE)?.trim();
    Some((!tag.is_empty()).then(|| tag.to_string()))
}

/// Collect the verbatim body of the fence opened at `pos`. Returns the body
/// and the number of lines consumed, including both fences. An unclosed fence
/// runs to the end of input.
fn code_block_body(lines: &[&str], pos: usize) -> (String, usize) {
    let body: Vec<&str> = lines[pos + 1..]
        .iter()
        .take_while(|line| line.trim() != FENCE)
        .copied()
        .collect();
    let closed = pos + 1 + body.len() < lines.len();
    (body.join("\n"), 1 + body.len() + usize::from(closed))
}

/// Alt text and path of an `![alt](path)` line.
pub fn image_reference(line: &str) -> Option<(&str, &str)> {
    let rest = line.strip_prefix("![")?;
    let alt_end = rest.find(']')?;
    let after_alt = &rest[alt_end + 1..];
    let path_start = after_alt.find('(')?;
    let path_and_tail = &after_alt[path_start + 1..];
    let path_end = path_and_tail.find(')')?;
    Some((&rest[..alt_end], &path_and_tail[..path_end]))
}

/// A table starts on a line containing `|` whose next line holds a separator
/// token. Column alignment syntax in the separator is not checked.
pub fn starts_table(lines: &[&str], pos: usize) -> bool {
    lines[pos].contains('|')
        && !table_cells(lines[pos]).is_empty()
        && lines
            .get(pos + 1)
            .is_some_and(|next| next.contains(TABLE_SEPARATOR))
}

/// Non-empty, trimmed pipe-delimited cells of a table line.
pub fn table_cells(line: &str) -> Vec<String> {
    line.split('|')
        .map(str::trim)
        .filter(|cell| !cell.is_empty())
        .map(str::to_string)
        .collect()
}

fn table(lines: &[&str], pos: usize) -> (Block, usize) {
    let headers = table_cells(lines[pos]);
    let rows: Vec<Vec<String>> = lines[pos + 2..]
        .iter()
        .take_while(|line| line.contains('|'))
        .map(|line| {
            let mut cells = table_cells(line);
            cells.truncate(headers.len());
            cells
        })
        .collect();
    let consumed = 2 + rows.len();
    (Block::Table { headers, rows }, consumed)
}

/// Cheap link check: the line has `[`, `](` and `)` somewhere.
pub fn looks_like_link(line: &str) -> bool {
    line.contains('[') && line.contains("](") && line.contains(')')
}

/// Iterator over the blocks of a markdown document, in source order.
pub struct Blocks<'a> {
    lines: Vec<&'a str>,
    cursor: usize,
    headings: HeadingCounter,
}

impl<'a> Blocks<'a> {
    pub fn new(markdown: &'a str) -> Self {
        Self {
            lines: markdown.lines().collect(),
            cursor: 0,
            headings: HeadingCounter::default(),
        }
    }
}

impl Iterator for Blocks<'_> {
    type Item = Block;

    fn next(&mut self) -> Option<Block> {
        while self.cursor < self.lines.len() {
            let classified = classify(&self.lines, self.cursor, self.headings);
            self.cursor += classified.consumed;
            self.headings = classified.headings;
            if let Some(block) = classified.block {
                return Some(block);
            }
        }
        None
    }
}

/// Parse markdown text into a list of blocks
pub fn parse(markdown: &str) -> Vec<Block> {
    Blocks::new(markdown).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::TextSegment;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn item(kind: ListKind, text: &str) -> Block {
        Block::ListItem {
            kind,
            text: text.to_string(),
        }
    }

    fn heading(level: u8, text: &str) -> Block {
        Block::Heading {
            level,
            text: text.to_string(),
        }
    }

    fn strings(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn report_example() {
        let blocks = parse("**Report**\n\n* first\n* second\n\n1. one\n2. two");
        assert_eq!(
            blocks,
            vec![
                heading(1, "Report"),
                item(ListKind::Bullet, "first"),
                item(ListKind::Bullet, "second"),
                item(ListKind::Numbered, "one"),
                item(ListKind::Numbered, "two"),
            ]
        );
    }

    #[test]
    fn first_heading_is_title_rest_are_sections() {
        let blocks = parse("**Name**\ntext\n**Experience**\n**Education**");
        let levels: Vec<u8> = blocks
            .iter()
            .filter_map(|b| match b {
                Block::Heading { level, .. } => Some(*level),
                _ => None,
            })
            .collect();
        assert_eq!(levels, vec![1, 2, 2]);
    }

    #[test]
    fn blank_heading_still_counts_as_the_title() {
        let levels: Vec<u8> = parse("** **\n**Real**")
            .iter()
            .filter_map(|b| match b {
                Block::Heading { level, .. } => Some(*level),
                _ => None,
            })
            .collect();
        assert_eq!(levels, vec![1, 2]);
    }

    #[test]
    fn classify_threads_heading_state() {
        let lines = ["**A**"];
        let first = classify(&lines, 0, HeadingCounter::default());
        assert_eq!(first.block, Some(heading(1, "A")));
        assert_eq!(first.headings.emitted(), 1);

        let again = classify(&lines, 0, first.headings);
        assert_eq!(again.block, Some(heading(2, "A")));
    }

    #[rstest]
    #[case("**Title**", Some("Title"))]
    #[case("  **Padded**  ", Some("Padded"))]
    #[case("****", None)]
    #[case("** **", Some(" "))]
    #[case("***Title***", Some("Title"))]
    #[case("**", None)]
    #[case("***", None)]
    #[case("**bold** then text", None)]
    #[case("* **Bold bullet**", None)]
    fn heading_detection(#[case] line: &str, #[case] expected: Option<&str>) {
        assert_eq!(heading_text(line.trim()), expected);
    }

    #[rstest]
    #[case("* item", ListKind::Bullet, "item")]
    #[case("*   spaced item", ListKind::Bullet, "spaced item")]
    #[case("12. twelfth", ListKind::Numbered, "twelfth")]
    #[case("    * nested", ListKind::NestedBullet, "nested")]
    #[case("    *   nested wide", ListKind::NestedBullet, "nested wide")]
    #[case("* **Skills:** Rust", ListKind::Bullet, "Skills: Rust")]
    fn list_items(#[case] line: &str, #[case] kind: ListKind, #[case] text: &str) {
        assert_eq!(parse(line), vec![item(kind, text)]);
    }

    #[test]
    fn nested_marker_removed_by_length() {
        assert_eq!(
            parse("    * *starred* item ends with *"),
            vec![item(ListKind::NestedBullet, "*starred* item ends with *")]
        );
    }

    #[rstest]
    #[case("*not a marker")]
    #[case("1.no space")]
    #[case("v1. release")]
    fn malformed_markers_are_plain_text(#[case] line: &str) {
        assert_eq!(
            parse(line),
            vec![Block::Paragraph {
                segments: vec![TextSegment::Text(line.to_string())],
            }]
        );
    }

    #[test]
    fn fenced_code_is_verbatim() {
        let md = "```rust\nlet x = **not bold**;\n  [a](b)\n```\nafter";
        assert_eq!(
            parse(md),
            vec![
                Block::CodeBlock {
                    language: Some("rust".to_string()),
                    content: "let x = **not bold**;\n  [a](b)".to_string(),
                },
                Block::Paragraph {
                    segments: vec![TextSegment::Text("after".to_string())],
                },
            ]
        );
    }

    #[test]
    fn fence_consumption_is_explicit() {
        let lines = ["```", "a", "b", "```", "tail"];
        let classified = classify(&lines, 0, HeadingCounter::default());
        assert_eq!(classified.consumed, 4);
    }

    #[test]
    fn unclosed_fence_runs_to_end() {
        let lines = ["```sh", "echo hi", "**x**"];
        let classified = classify(&lines, 0, HeadingCounter::default());
        assert_eq!(classified.consumed, 3);
        assert_eq!(
            classified.block,
            Some(Block::CodeBlock {
                language: Some("sh".to_string()),
                content: "echo hi\n**x**".to_string(),
            })
        );
    }

    #[test]
    fn image_line() {
        assert_eq!(
            parse("![Logo](img/logo.png)"),
            vec![Block::Image {
                alt: "Logo".to_string(),
                path: "img/logo.png".to_string(),
            }]
        );
    }

    #[test]
    fn incomplete_image_falls_through() {
        assert_eq!(
            parse("![missing path"),
            vec![Block::Paragraph {
                segments: vec![TextSegment::Text("![missing path".to_string())],
            }]
        );
    }

    #[test]
    fn table_shape_follows_header() {
        let md = "Name | Role | Team\n---|---|---\nAda | Eng | Core\nBob | Ops\nCy | QA | X | extra\n\nafter";
        let blocks = parse(md);
        assert_eq!(
            blocks[0],
            Block::Table {
                headers: strings(&["Name", "Role", "Team"]),
                rows: vec![
                    strings(&["Ada", "Eng", "Core"]),
                    strings(&["Bob", "Ops"]),
                    strings(&["Cy", "QA", "X"]),
                ],
            }
        );
        assert_eq!(blocks.len(), 2);
    }

    #[test]
    fn table_consumes_header_separator_and_rows() {
        let lines = ["| a | b |", "|:---:|---|", "| 1 | 2 |", "| 3 | 4 |", "end"];
        assert!(starts_table(&lines, 0));
        let classified = classify(&lines, 0, HeadingCounter::default());
        assert_eq!(classified.consumed, 4);
    }

    #[test]
    fn pipe_without_separator_is_a_paragraph() {
        assert_eq!(
            parse("left | right\nnext line"),
            vec![
                Block::Paragraph {
                    segments: vec![TextSegment::Text("left | right".to_string())],
                },
                Block::Paragraph {
                    segments: vec![TextSegment::Text("next line".to_string())],
                },
            ]
        );
    }

    #[test]
    fn link_paragraph() {
        let blocks = parse("Read [Docs](http://example.com/x) today");
        assert_eq!(
            blocks,
            vec![Block::LinkParagraph {
                segments: vec![
                    TextSegment::Text("Read ".to_string()),
                    TextSegment::Link {
                        text: "Docs".to_string(),
                        url: "http://example.com/x".to_string(),
                    },
                    TextSegment::Text(" today".to_string()),
                ],
            }]
        );
    }

    #[rstest]
    #[case("[a](b)", true)]
    #[case("text (with) [brackets]", false)]
    #[case("[x]( no close", false)]
    fn link_heuristic(#[case] line: &str, #[case] expected: bool) {
        assert_eq!(looks_like_link(line), expected);
    }

    #[test]
    fn blank_lines_produce_nothing() {
        assert_eq!(parse("\n   \n\t\n"), vec![]);
    }
}
