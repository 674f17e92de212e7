//! Directory scan: find images, score them, export CSV.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use walkdir::WalkDir;

use super::TuningError;
use crate::pipeline::QualityPipeline;

/// File extensions scanned (case-insensitive). Matches the containers the
/// service decodes.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "tif", "tiff"];

/// One scored image.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageRecord {
    pub path: PathBuf,
    /// Post-orientation, post-resize dimensions.
    pub width: u32,
    pub height: u32,
    pub blur_score: f64,
    pub brightness: f64,
}

#[derive(Debug, Default)]
pub struct ScanReport {
    pub records: Vec<ImageRecord>,
    /// Files that could not be read or decoded, with the reason.
    pub failures: Vec<(PathBuf, String)>,
}

pub fn has_supported_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|ext| {
            SUPPORTED_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
        .unwrap_or(false)
}

/// Every supported image under `root`, recursively, in a stable order.
pub fn find_images(root: &Path) -> Vec<PathBuf> {
    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file() && has_supported_extension(e.path()))
        .map(|e| e.into_path())
        .collect()
}

/// Score each file with `pipeline`. Unreadable files are recorded as
/// failures and logged, never fatal.
pub fn score_images(paths: &[PathBuf], max_dim: u32, pipeline: &QualityPipeline) -> ScanReport {
    let mut report = ScanReport::default();

    for path in paths {
        let outcome = fs::read(path)
            .map_err(|e| e.to_string())
            .and_then(|bytes| pipeline.measure(&bytes, max_dim).map_err(|e| e.to_string()));

        match outcome {
            Ok(m) => report.records.push(ImageRecord {
                path: path.clone(),
                width: m.width,
                height: m.height,
                blur_score: m.blur_score,
                brightness: m.brightness,
            }),
            Err(reason) => {
                tracing::warn!(path = %path.display(), %reason, "Failed to process image");
                report.failures.push((path.clone(), reason));
            }
        }
    }

    report
}

/// Find and score every image under `root`.
pub fn scan_directory(root: &Path, max_dim: u32) -> Result<ScanReport, TuningError> {
    if !root.is_dir() {
        return Err(TuningError::MissingDirectory(root.to_path_buf()));
    }
    let paths = find_images(root);
    tracing::info!(root = %root.display(), files = paths.len(), "Scanning images");
    Ok(score_images(&paths, max_dim, &QualityPipeline::standard()))
}

#[derive(Serialize)]
struct CsvRow {
    path: String,
    width: u32,
    height: u32,
    blur_score: String,
    brightness: String,
}

/// Write `path,width,height,blur_score,brightness` rows, creating parent
/// directories as needed.
pub fn write_csv(records: &[ImageRecord], csv_path: &Path) -> Result<(), TuningError> {
    if let Some(parent) = csv_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| TuningError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let mut wtr = csv::Writer::from_path(csv_path)?;
    for r in records {
        wtr.serialize(CsvRow {
            path: r.path.display().to_string(),
            width: r.width,
            height: r.height,
            blur_score: format!("{:.4}", r.blur_score),
            brightness: format!("{:.2}", r.brightness),
        })?;
    }
    wtr.flush().map_err(|source| TuningError::Io {
        path: csv_path.to_path_buf(),
        source,
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::test_support::{black_png, checkerboard, jpeg_rgb};

    fn populate(dir: &Path) {
        fs::create_dir_all(dir.join("nested/deeper")).unwrap();
        fs::write(dir.join("a.jpg"), jpeg_rgb(checkerboard(64, 48, 4, 40, 200))).unwrap();
        fs::write(dir.join("nested/B.PNG"), black_png(20, 10)).unwrap();
        fs::write(dir.join("nested/deeper/broken.jpeg"), b"not really a jpeg").unwrap();
        fs::write(dir.join("notes.txt"), b"ignore me").unwrap();
    }

    #[test]
    fn extension_filter_is_case_insensitive() {
        assert!(has_supported_extension(Path::new("x.JPG")));
        assert!(has_supported_extension(Path::new("x.tiff")));
        assert!(!has_supported_extension(Path::new("x.gif")));
        assert!(!has_supported_extension(Path::new("README")));
    }

    #[test]
    fn finds_images_recursively_in_stable_order() {
        let tmp = tempfile::tempdir().unwrap();
        populate(tmp.path());

        let found = find_images(tmp.path());
        let names: Vec<String> = found
            .iter()
            .map(|p| p.strip_prefix(tmp.path()).unwrap().display().to_string())
            .collect();
        assert_eq!(names.len(), 3);
        assert_eq!(names, {
            let mut sorted = names.clone();
            sorted.sort();
            sorted
        });
        assert!(!names.iter().any(|n| n.ends_with("notes.txt")));
    }

    #[test]
    fn scan_scores_images_and_skips_broken_files() {
        let tmp = tempfile::tempdir().unwrap();
        populate(tmp.path());

        let report = scan_directory(tmp.path(), 1600).unwrap();
        assert_eq!(report.records.len(), 2);
        assert_eq!(report.failures.len(), 1);
        assert!(report.failures[0].0.ends_with("broken.jpeg"));

        let black = report
            .records
            .iter()
            .find(|r| r.path.ends_with("B.PNG"))
            .unwrap();
        assert_eq!((black.width, black.height), (20, 10));
        assert_eq!(black.brightness, 0.0);
    }

    #[test]
    fn scan_respects_max_dim() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("wide.png"), black_png(1000, 500)).unwrap();

        let report = scan_directory(tmp.path(), 256).unwrap();
        assert_eq!((report.records[0].width, report.records[0].height), (256, 128));
    }

    #[test]
    fn missing_directory_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let err = scan_directory(&tmp.path().join("absent"), 1600).unwrap_err();
        assert!(matches!(err, TuningError::MissingDirectory(_)));
    }

    #[test]
    fn csv_has_header_and_fixed_precision() {
        let tmp = tempfile::tempdir().unwrap();
        let csv_path = tmp.path().join("out/scores.csv");
        let records = [ImageRecord {
            path: PathBuf::from("photos/a.jpg"),
            width: 1600,
            height: 900,
            blur_score: 123.456789,
            brightness: 101.0,
        }];

        write_csv(&records, &csv_path).unwrap();

        let text = fs::read_to_string(&csv_path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "path,width,height,blur_score,brightness");
        assert_eq!(lines[1], "photos/a.jpg,1600,900,123.4568,101.00");
    }
}
