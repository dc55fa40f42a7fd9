//! Inline markup: `**bold**` spans and `[text](url)` links.

use std::sync::LazyLock;

use regex::Regex;

use crate::block::TextSegment;

static BOLD_SPAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*(.*?)\*\*").expect("Invalid bold regex"));

/// Replace every bold span with its inner text. Used where the output cannot
/// carry styled runs, such as list items.
pub fn strip_bold(text: &str) -> String {
    BOLD_SPAN.replace_all(text, "$1").into_owned()
}

/// Split `text` into alternating plain and bold segments. Empty segments are
/// dropped.
pub fn bold_segments(text: &str) -> Vec<TextSegment> {
    let mut segments = Vec::new();
    push_bold_segments(text, &mut segments);
    segments
}

fn push_bold_segments(text: &str, segments: &mut Vec<TextSegment>) {
    let mut last = 0;
    for caps in BOLD_SPAN.captures_iter(text) {
        let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        if whole.start() > last {
            segments.push(TextSegment::Text(text[last..whole.start()].to_string()));
        }
        if !inner.as_str().is_empty() {
            segments.push(TextSegment::Bold(inner.as_str().to_string()));
        }
        last = whole.end();
    }
    if last < text.len() {
        segments.push(TextSegment::Text(text[last..].to_string()));
    }
}

/// Scan `line` left to right for `[text](url)` links. Text between links goes
/// through the bold splitter; link text becomes its own segment. Anything that
/// does not complete a link is kept as literal text.
pub fn link_segments(line: &str) -> Vec<TextSegment> {
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut rest = line;

    while let Some(open) = rest.find('[') {
        let label_and_tail = &rest[open + 1..];
        let Some(close) = label_and_tail.find(']') else {
            break;
        };
        let Some(url_and_tail) = label_and_tail[close + 1..].strip_prefix('(') else {
            // `[...]` not followed by `(`: keep the bracket and look again
            literal.push_str(&rest[..=open]);
            rest = label_and_tail;
            continue;
        };
        let Some(url_end) = url_and_tail.find(')') else {
            break;
        };

        literal.push_str(&rest[..open]);
        push_bold_segments(&std::mem::take(&mut literal), &mut segments);

        let text = &label_and_tail[..close];
        if !text.is_empty() {
            segments.push(TextSegment::Link {
                text: text.to_string(),
                url: url_and_tail[..url_end].to_string(),
            });
        }
        rest = &url_and_tail[url_end + 1..];
    }

    literal.push_str(rest);
    push_bold_segments(&literal, &mut segments);
    segments
}
