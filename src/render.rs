//! Walk classified blocks and emit them into a [`DocumentSink`].

use std::path::Path;

use tracing::{debug, warn};

use crate::block::{Block, TextSegment};
use crate::config::Config;
use crate::parser::Blocks;
use crate::sink::{DocumentSink, ParagraphStyle, TextRun};

/// Counters reported after a conversion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub blocks: usize,
    pub image_failures: usize,
}

/// Classify `markdown` and emit every block into `sink`. Relative image paths
/// are resolved against `base_dir`. Image failures are downgraded to a
/// fallback paragraph and never abort the conversion.
pub fn render<S: DocumentSink>(
    markdown: &str,
    sink: &mut S,
    config: &Config,
    base_dir: &Path,
) -> RenderStats {
    let mut stats = RenderStats::default();
    for block in Blocks::new(markdown) {
        stats.blocks += 1;
        debug!(?block, "classified");
        emit_block(block, sink, config, base_dir, &mut stats);
    }
    stats
}

fn emit_block<S: DocumentSink>(
    block: Block,
    sink: &mut S,
    config: &Config,
    base_dir: &Path,
    stats: &mut RenderStats,
) {
    match block {
        Block::Heading { level, text } => {
            sink.add_heading(&text, level);
        }
        Block::ListItem { kind, text } => {
            sink.add_paragraph(ParagraphStyle::List(kind), vec![TextRun::plain(text)]);
        }
        Block::CodeBlock { language, content } => {
            debug!(language = language.as_deref().unwrap_or("none"), "code block");
            sink.add_paragraph(ParagraphStyle::CodeBlock, vec![TextRun::plain(content)]);
        }
        Block::Image { alt, path } => {
            let resolved = base_dir.join(&path);
            if let Err(e) = sink.add_image(&resolved) {
                warn!("Error adding image {path}: {e}");
                stats.image_failures += 1;
                sink.add_paragraph(
                    ParagraphStyle::Normal,
                    vec![TextRun::plain(format!("Image: {alt} - {path} (Error)"))],
                );
            }
        }
        Block::Table { headers, rows } => {
            sink.add_table(&headers, &rows);
        }
        Block::LinkParagraph { segments } | Block::Paragraph { segments } => {
            let runs = segments
                .into_iter()
                .map(|segment| segment_to_run(segment, config))
                .collect();
            sink.add_paragraph(ParagraphStyle::Normal, runs);
        }
    }
}

fn segment_to_run(segment: TextSegment, config: &Config) -> TextRun {
    match segment {
        TextSegment::Text(text) => TextRun::plain(text),
        TextSegment::Bold(text) => TextRun::bold(text),
        TextSegment::Link { text, .. } => TextRun {
            text,
            bold: false,
            underline: config.links.underline,
            color: Some(config.links.hex_color().to_string()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::ListKind;
    use crate::sink::recording::{Call, RecordingSink};
    use pretty_assertions::assert_eq;

    fn run_render(markdown: &str, base_dir: &Path) -> (RecordingSink, RenderStats) {
        let mut sink = RecordingSink::default();
        let stats = render(markdown, &mut sink, &Config::default(), base_dir);
        (sink, stats)
    }

    #[test]
    fn headings_and_lists_map_to_styles() {
        let (sink, stats) = run_render("**Report**\n\n* first\n    * inner\n1. one", Path::new("."));
        assert_eq!(stats.blocks, 4);
        assert_eq!(
            sink.calls,
            vec![
                Call::Heading("Report".to_string(), 1),
                Call::Paragraph(
                    ParagraphStyle::List(ListKind::Bullet),
                    vec![TextRun::plain("first")]
                ),
                Call::Paragraph(
                    ParagraphStyle::List(ListKind::NestedBullet),
                    vec![TextRun::plain("inner")]
                ),
                Call::Paragraph(
                    ParagraphStyle::List(ListKind::Numbered),
                    vec![TextRun::plain("one")]
                ),
            ]
        );
    }

    #[test]
    fn link_run_is_coloured_and_underlined() {
        let (sink, _) = run_render("See [Docs](http://example.com/x) now", Path::new("."));
        let Call::Paragraph(style, runs) = &sink.calls[0] else {
            panic!("expected a paragraph, got {:?}", sink.calls[0]);
        };
        assert_eq!(*style, ParagraphStyle::Normal);
        assert_eq!(runs.len(), 3);
        assert_eq!(runs[0], TextRun::plain("See "));
        assert_eq!(runs[1].text, "Docs");
        assert!(runs[1].underline);
        assert_eq!(runs[1].color.as_deref(), Some("0000FF"));
        assert_eq!(runs[2], TextRun::plain(" now"));
        assert!(runs.iter().all(|r| !r.text.contains("http")));
    }

    #[test]
    fn missing_image_becomes_fallback_paragraph() {
        let dir = tempfile::tempdir().unwrap();
        let (sink, stats) = run_render("![Chart](charts/missing.png)", dir.path());
        assert_eq!(stats.image_failures, 1);
        assert_eq!(
            sink.calls,
            vec![Call::Paragraph(
                ParagraphStyle::Normal,
                vec![TextRun::plain("Image: Chart - charts/missing.png (Error)")]
            )]
        );
    }

    #[test]
    fn image_path_is_resolved_against_base_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("pic.png"), b"stub").unwrap();
        let (sink, stats) = run_render("![Pic](pic.png)", dir.path());
        assert_eq!(stats.image_failures, 0);
        assert_eq!(sink.calls, vec![Call::Image(dir.path().join("pic.png"))]);
    }

    #[test]
    fn code_block_text_is_untouched() {
        let (sink, _) = run_render("```\n**not bold** [a](b)\nline two\n```", Path::new("."));
        assert_eq!(
            sink.calls,
            vec![Call::Paragraph(
                ParagraphStyle::CodeBlock,
                vec![TextRun::plain("**not bold** [a](b)\nline two")]
            )]
        );
    }

    #[test]
    fn plain_paragraph_carries_bold_runs() {
        let (sink, _) = run_render("A **key** point", Path::new("."));
        assert_eq!(
            sink.calls,
            vec![Call::Paragraph(
                ParagraphStyle::Normal,
                vec![
                    TextRun::plain("A "),
                    TextRun::bold("key"),
                    TextRun::plain(" point"),
                ]
            )]
        );
    }
}
