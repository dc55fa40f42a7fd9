mod block;
mod config;
mod docx;
mod error;
pub mod inline;
pub mod inspect;
pub mod logging;
pub mod parser;
mod render;
mod sink;
pub mod validate;

pub use block::{Block, ListKind, TextSegment};
pub use config::{CodeConfig, Config, ImagesConfig, LinksConfig, ListsConfig};
pub use docx::DocxSink;
pub use error::{ConfigError, ConvertError, ImageError, InspectError};
pub use render::{RenderStats, render};
pub use sink::{DocumentSink, ParagraphStyle, TextRun};

use std::fs;
use std::path::Path;

use tracing::info;

/// Parse markdown text into a vector of blocks.
pub fn parse(markdown: &str) -> Vec<Block> {
    parser::parse(markdown)
}

/// Convert markdown to `.docx` bytes. Relative image paths resolve against
/// `base_dir`.
pub fn markdown_to_docx(
    markdown: &str,
    config: &Config,
    base_dir: &Path,
) -> Result<(Vec<u8>, RenderStats), ConvertError> {
    let mut sink = DocxSink::new(config);
    let stats = render(markdown, &mut sink, config, base_dir);
    Ok((sink.into_bytes()?, stats))
}

/// Convert the markdown file at `input` and write the document to `output`.
pub fn convert_file(
    input: &Path,
    output: &Path,
    config: &Config,
) -> Result<RenderStats, ConvertError> {
    let markdown = fs::read_to_string(input).map_err(|source| ConvertError::ReadInput {
        path: input.to_path_buf(),
        source,
    })?;
    let base_dir = input.parent().unwrap_or_else(|| Path::new(""));

    let mut sink = DocxSink::new(config);
    let stats = render(&markdown, &mut sink, config, base_dir);
    sink.save(output)?;

    info!(
        blocks = stats.blocks,
        image_failures = stats.image_failures,
        "wrote {}",
        output.display()
    );
    Ok(stats)
}
