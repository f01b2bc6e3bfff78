//! Process command - extract identity fields from a single document image.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use tracing::{debug, info};

use idscan_core::ExtractionOutcome;

use super::output::{format_record, OutputFormat, RECORD_SEPARATOR};
use super::{build_extractor, load_config};

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input image file
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// OCR model directory
    #[arg(short, long)]
    model_dir: Option<PathBuf>,

    /// List fields that came back unknown or failed validation
    #[arg(long)]
    show_issues: bool,
}

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let mut config = load_config(config_path)?;
    if let Some(model_dir) = &args.model_dir {
        config.ocr.model_dir = model_dir.clone();
    }

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    let extractor = build_extractor(&config)?;

    info!("Processing file: {}", args.input.display());
    let file_full_name = args.input.display().to_string();
    let outcome = match fs::read(&args.input) {
        Ok(bytes) => extractor.extract(&file_full_name, &bytes).await,
        Err(e) => ExtractionOutcome::failed(&file_full_name, e.into()),
    };

    let output = format_record(outcome.record(), args.format)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        eprintln!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else if args.format == OutputFormat::Json {
        println!("{}", output);
        println!("{}", RECORD_SEPARATOR);
    } else {
        print!("{}", output);
    }

    match &outcome {
        ExtractionOutcome::Failed { error, .. } => {
            eprintln!(
                "{} Extraction failed ({}): {}",
                style("✗").red(),
                error.kind(),
                error
            );
        }
        ExtractionOutcome::Extracted { issues, .. } if args.show_issues && !issues.is_empty() => {
            eprintln!("{}", style("Field issues:").yellow());
            for issue in issues {
                eprintln!("  - {}", issue);
            }
        }
        ExtractionOutcome::Extracted { .. } => {}
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}
