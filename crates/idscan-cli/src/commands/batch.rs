//! Batch processing command for directories and glob patterns.

use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use glob::{glob, Pattern};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, warn};

use idscan_core::models::config::BatchConfig;
use idscan_core::{BatchDriver, ExtractionOutcome, ExtractionRecord, FileListSource};

use super::output::{OutputFormat, RecordWriter};
use super::{build_extractor, load_config};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Input directory or glob pattern
    #[arg(required = true)]
    input: String,

    /// Output format for the records
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Write records to a file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Also write a per-file status CSV
    #[arg(long)]
    summary: Option<PathBuf>,

    /// Documents processed concurrently (default from config)
    #[arg(short = 'j', long)]
    jobs: Option<usize>,

    /// Hide the progress bar
    #[arg(long)]
    no_progress: bool,

    /// OCR model directory
    #[arg(short, long)]
    model_dir: Option<PathBuf>,
}

/// Per-file status line of the summary CSV.
struct SummaryRow {
    record: ExtractionRecord,
    failure_kind: Option<&'static str>,
    error: Option<String>,
}

impl From<ExtractionOutcome> for SummaryRow {
    fn from(outcome: ExtractionOutcome) -> Self {
        let failure_kind = outcome.error().map(|e| e.kind().as_str());
        let error = outcome.error().map(|e| e.to_string());
        Self {
            record: outcome.into_record(),
            failure_kind,
            error,
        }
    }
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let mut config = load_config(config_path)?;
    if let Some(model_dir) = &args.model_dir {
        config.ocr.model_dir = model_dir.clone();
    }

    let files = discover_files(&args.input, &config.batch)?;
    if files.is_empty() {
        anyhow::bail!("No matching files found for: {}", args.input);
    }

    eprintln!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    // Clients are built up front so a bad setup fails before any record is written
    let extractor = build_extractor(&config)?;
    let jobs = args.jobs.unwrap_or(config.batch.jobs);

    let (out, console): (Box<dyn Write>, bool) = match &args.output {
        Some(path) => (Box::new(BufWriter::new(fs::File::create(path)?)), false),
        None => (Box::new(std::io::stdout()), true),
    };
    let mut writer = RecordWriter::new(args.format, out, console)?;

    let pb = if args.no_progress {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(files.len() as u64)
    };
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    let source = FileListSource::new(files);
    let mut rows: Vec<SummaryRow> = Vec::with_capacity(source.len());
    let mut write_error: Option<anyhow::Error> = None;

    let summary = BatchDriver::new(&extractor)
        .with_jobs(jobs)
        .run(&source, |outcome| {
            if write_error.is_none() {
                if let Err(e) = pb.suspend(|| writer.write(outcome.record())) {
                    write_error = Some(e);
                }
            }
            rows.push(outcome.into());
            pb.inc(1);
        })
        .await;

    pb.finish_and_clear();

    if let Some(e) = write_error {
        return Err(e.context("Failed to write records"));
    }
    writer.finish()?;

    if let Some(path) = &args.output {
        eprintln!(
            "{} Records written to {}",
            style("✓").green(),
            path.display()
        );
    }

    if let Some(path) = &args.summary {
        write_summary(path, &rows)?;
        eprintln!(
            "{} Summary written to {}",
            style("✓").green(),
            path.display()
        );
    }

    eprintln!();
    eprintln!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        summary.total,
        start.elapsed()
    );
    eprintln!(
        "   {} extracted, {} failed",
        style(summary.extracted).green(),
        style(summary.failed).red()
    );

    let failed: Vec<_> = rows.iter().filter(|r| r.error.is_some()).collect();
    if !failed.is_empty() {
        eprintln!();
        eprintln!("{}", style("Failed files:").red());
        for row in failed {
            eprintln!(
                "  - {} [{}]: {}",
                row.record.file_full_name,
                row.failure_kind.unwrap_or("unknown"),
                row.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    Ok(())
}

/// Expand a directory (searched recursively) or glob pattern into a sorted
/// list of accepted image files.
fn discover_files(input: &str, batch: &BatchConfig) -> anyhow::Result<Vec<PathBuf>> {
    let input_path = Path::new(input);
    let pattern = if input_path.is_dir() {
        format!(
            "{}/**/*",
            Pattern::escape(input.trim_end_matches(['/', '\\']))
        )
    } else {
        input.to_string()
    };
    debug!("Searching {}", pattern);

    let mut files: Vec<PathBuf> = glob(&pattern)?
        .filter_map(|entry| match entry {
            Ok(path) => Some(path),
            Err(e) => {
                warn!("Skipping unreadable path: {}", e);
                None
            }
        })
        .filter(|p| p.is_file() && batch.accepts(p))
        .collect();

    files.sort();
    Ok(files)
}

fn write_summary(path: &Path, rows: &[SummaryRow]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "filename",
        "status",
        "failure_kind",
        "error",
        "textLanguage",
        "Name",
        "CPF",
        "DOB",
    ])?;

    for row in rows {
        let record = &row.record;
        wtr.write_record([
            record.file_full_name.as_str(),
            if row.error.is_some() { "failed" } else { "extracted" },
            row.failure_kind.unwrap_or(""),
            row.error.as_deref().unwrap_or(""),
            &record.text_language,
            &record.name,
            &record.cpf,
            &record.dob,
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use idscan_core::error::{IdscanError, ModelError};

    fn touch(dir: &Path, name: &str) {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, b"x").unwrap();
    }

    #[test]
    fn test_discover_directory_recursive_and_sorted() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "b.jpg");
        touch(dir.path(), "a.PNG");
        touch(dir.path(), "nested/c.jpeg");
        touch(dir.path(), "notes.txt");
        touch(dir.path(), "scan.pdf");

        let files = discover_files(dir.path().to_str().unwrap(), &BatchConfig::default()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.strip_prefix(dir.path()).unwrap().to_path_buf())
            .collect();

        assert_eq!(
            names,
            vec![
                PathBuf::from("a.PNG"),
                PathBuf::from("b.jpg"),
                PathBuf::from("nested/c.jpeg"),
            ]
        );
    }

    #[test]
    fn test_discover_glob_pattern() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "01.jpg");
        touch(dir.path(), "02.gif");
        touch(dir.path(), "03.bmp");

        let pattern = format!("{}/*.jpg", dir.path().display());
        let files = discover_files(&pattern, &BatchConfig::default()).unwrap();
        assert_eq!(files, vec![dir.path().join("01.jpg")]);
    }

    #[test]
    fn test_discover_empty_directory() {
        let dir = tempfile::tempdir().unwrap();
        let files = discover_files(dir.path().to_str().unwrap(), &BatchConfig::default()).unwrap();
        assert!(files.is_empty());
    }

    #[test]
    fn test_summary_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("summary.csv");

        let rows: Vec<SummaryRow> = vec![
            ExtractionOutcome::Extracted {
                record: ExtractionRecord {
                    file_full_name: "01.jpg".to_string(),
                    text_language: "Portuguese".to_string(),
                    name: "Ana".to_string(),
                    cpf: "52998224725".to_string(),
                    dob: "1990-05-14".to_string(),
                },
                issues: vec![],
            }
            .into(),
            ExtractionOutcome::failed(
                "02.jpg",
                IdscanError::Model(ModelError::UnstructuredAnswer),
            )
            .into(),
        ];

        write_summary(&path, &rows).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();

        assert_eq!(lines[0], "filename,status,failure_kind,error,textLanguage,Name,CPF,DOB");
        assert_eq!(lines[1], "01.jpg,extracted,,,Portuguese,Ana,52998224725,1990-05-14");
        assert!(lines[2].starts_with("02.jpg,failed,upstream_service,"));
        assert!(lines[2].ends_with(",Unknown,Unknown,Unknown,Unknown"));
    }
}
