//! Suggest BLUR_MIN and brightness bounds from a folder of sample images.
//!
//! ```text
//! tune-blur --dir samples --csv out/blur_scores.csv
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;

use quality_gate::config::{DEFAULT_BRIGHT_MAX, DEFAULT_BRIGHT_MIN, DEFAULT_RESIZE_MAX_DIM};
use quality_gate::tuning::{self, TuningError};

#[derive(Parser, Debug)]
#[command(name = "tune-blur", version, about, long_about = None)]
struct Args {
    /// Folder containing images (searched recursively).
    #[arg(long)]
    dir: PathBuf,

    /// Cap on the longer image side before scoring. Use the service's RESIZE_MAX_DIM.
    #[arg(long, default_value_t = DEFAULT_RESIZE_MAX_DIM, value_parser = clap::value_parser!(u32).range(1..))]
    max_dim: u32,

    /// Optional path to write per-image CSV results.
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Current BRIGHT_MIN, shown next to the suggestion.
    #[arg(long, default_value_t = DEFAULT_BRIGHT_MIN as u8)]
    bright_min: u8,

    /// Current BRIGHT_MAX, shown next to the suggestion.
    #[arg(long, default_value_t = DEFAULT_BRIGHT_MAX as u8)]
    bright_max: u8,
}

fn main() -> ExitCode {
    let args = Args::parse();
    quality_gate::init_tracing("info", false);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) if matches!(e.downcast_ref::<TuningError>(), Some(TuningError::MissingDirectory(_))) => {
            eprintln!("--dir not found: {}", args.dir.display());
            ExitCode::from(2)
        }
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> anyhow::Result<()> {
    let report = tuning::scan_directory(&args.dir, args.max_dim)?;

    match tuning::summarize(&report.records) {
        Some(summary) => println!("\n{}", summary.report((args.bright_min, args.bright_max))),
        None => eprintln!("No images found."),
    }
    if !report.failures.is_empty() {
        eprintln!("Skipped {} unreadable file(s).", report.failures.len());
    }

    if let Some(csv_path) = &args.csv {
        tuning::write_csv(&report.records, csv_path)
            .with_context(|| format!("writing {}", csv_path.display()))?;
        println!("Wrote CSV: {}", csv_path.display());
    }

    Ok(())
}
