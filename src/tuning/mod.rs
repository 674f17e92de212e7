//! Offline threshold tuning.
//!
//! Scores a folder of representative images with the exact serving pipeline
//! and suggests `BLUR_MIN` and brightness bounds from the distribution.
//! Run with the same `max_dim` the service uses for `RESIZE_MAX_DIM`:
//! both metrics are resolution-dependent.

pub mod scan;
pub mod stats;

pub use scan::{find_images, scan_directory, score_images, write_csv, ImageRecord, ScanReport};
pub use stats::{summarize, Distribution, SummaryReport, Suggestions, TuningSummary};

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TuningError {
    #[error("directory not found: {}", .0.display())]
    MissingDirectory(PathBuf),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}
