use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing::info;

use md2docx::Config;
use md2docx::inspect::read_docx;
use md2docx::validate::{ExpectedRules, FormatSummary, validate, validated_output_path};

#[derive(Parser)]
#[command(name = "validate-md-to-docx")]
#[command(about = "Convert a Markdown file and check the formatting of the result")]
struct Cli {
    /// Input Markdown file
    input: PathBuf,

    /// Only print the rules derived from the Markdown
    #[arg(long)]
    analyze_only: bool,

    /// TOML config file used for the conversion
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn main() -> Result<ExitCode> {
    md2docx::logging::init("info");
    let cli = Cli::parse();

    if !cli.input.exists() {
        bail!("File {} does not exist.", cli.input.display());
    }

    let markdown = fs::read_to_string(&cli.input)
        .with_context(|| format!("Failed to read {}", cli.input.display()))?;
    let expected = ExpectedRules::from_markdown(&markdown);

    if cli.analyze_only {
        println!("Markdown analysis results:");
        print!("{expected}");
        return Ok(ExitCode::SUCCESS);
    }

    let config = match &cli.config {
        Some(path) => Config::load(path).context("Failed to load config")?,
        None => Config::compiled_default(),
    };

    let output = validated_output_path(&cli.input);
    println!("Step 1: Converting markdown to DOCX...");
    md2docx::convert_file(&cli.input, &output, &config)
        .with_context(|| format!("Failed to convert {}", cli.input.display()))?;
    info!("converted to {}", output.display());

    println!("\nStep 2: Analyzing DOCX formatting...");
    let report = read_docx(&output)
        .with_context(|| format!("Failed to read {}", output.display()))?;
    let summary = FormatSummary::from_report(&report);
    print!("{summary}");

    println!("\nStep 3: Validating formatting...");
    let validation = validate(&summary, &expected);
    print!("{validation}");

    println!("\nDetailed format analysis:");
    print!("{report}");

    let banner = "=".repeat(50);
    let verdict = if validation.passed() {
        "VALIDATION PASSED"
    } else {
        "VALIDATION FAILED"
    };
    println!("\n{banner}\n{verdict}\n{banner}");

    Ok(if validation.passed() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
