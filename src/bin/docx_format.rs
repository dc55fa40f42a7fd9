use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

#[derive(Parser)]
#[command(name = "docx-format")]
#[command(about = "Print the paragraph and table formatting of a Word document")]
struct Cli {
    /// The .docx file to inspect
    docx: PathBuf,
}

fn main() -> Result<()> {
    md2docx::logging::init("warn");
    let cli = Cli::parse();

    let report = md2docx::inspect::read_docx(&cli.docx)
        .with_context(|| format!("Failed to read {}", cli.docx.display()))?;
    print!("{report}");
    Ok(())
}
