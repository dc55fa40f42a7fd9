use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;

use md2docx::Config;

#[derive(Parser)]
#[command(name = "md2docx")]
#[command(about = "Convert Markdown files to Word documents")]
struct Cli {
    /// Input Markdown file
    input: PathBuf,

    /// Output .docx file
    output: PathBuf,

    /// TOML config file (compiled defaults when omitted or missing)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load(path).context("Failed to load config"),
        None => Ok(Config::compiled_default()),
    }
}

fn main() -> Result<()> {
    md2docx::logging::init("info");
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref())?;
    md2docx::convert_file(&cli.input, &cli.output, &config)
        .with_context(|| format!("Failed to convert {}", cli.input.display()))?;

    println!("Document successfully created: {}", cli.output.display());
    Ok(())
}
