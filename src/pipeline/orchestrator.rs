use tracing::debug;

use super::decision::is_acceptable;
use super::decode::{decode_pixels, decode_upload, sniff_format, MIN_DIMENSION};
use super::grayscale::to_grayscale;
use super::metrics::compute_metrics;
use super::orientation::{ExifOrientationCorrector, OrientationCorrector};
use super::resize::resize_to_fit;
use super::types::{Measurement, Metrics, PixelGrid, QualityResult};
use super::QualityError;
use crate::config::ThresholdConfig;

/// Runs the stages in order for one image.
/// The orientation stage is a trait object so tests and tools can swap it.
pub struct QualityPipeline {
    orientation: Box<dyn OrientationCorrector>,
}

impl QualityPipeline {
    pub fn new(orientation: Box<dyn OrientationCorrector>) -> Self {
        Self { orientation }
    }

    /// EXIF-aware pipeline used by the service and the tuning CLI.
    pub fn standard() -> Self {
        Self::new(Box::new(ExifOrientationCorrector))
    }

    /// Assess one upload against `config`.
    ///
    /// Content type and size are checked before any pixel work. The result
    /// depends only on `bytes` and `config`.
    pub fn assess(
        &self,
        bytes: &[u8],
        content_type: &str,
        config: &ThresholdConfig,
    ) -> Result<QualityResult, QualityError> {
        let grid = decode_upload(bytes, content_type, config.max_upload_bytes())?;
        let measurement = self.measure_grid(bytes, grid, config.resize_max_dim)?;

        let thresholds = config.thresholds();
        let metrics = Metrics {
            blur_score: measurement.blur_score,
            brightness: measurement.brightness,
        };
        let is_ok = is_acceptable(&metrics, &thresholds);

        debug!(
            blur_score = measurement.blur_score,
            brightness = measurement.brightness,
            width = measurement.width,
            height = measurement.height,
            is_ok,
            "Quality assessed"
        );

        Ok(QualityResult {
            blur_score: measurement.blur_score,
            brightness: measurement.brightness,
            width: measurement.width,
            height: measurement.height,
            is_ok,
            thresholds,
        })
    }

    /// Metrics only, for offline tuning over files already on disk.
    ///
    /// Skips the declared-type and size checks; the container is still sniffed
    /// and decoded exactly as in `assess`.
    pub fn measure(&self, bytes: &[u8], resize_max_dim: u32) -> Result<Measurement, QualityError> {
        let format = sniff_format(bytes)?;
        let grid = decode_pixels(bytes, format)?;
        self.measure_grid(bytes, grid, resize_max_dim)
    }

    fn measure_grid(
        &self,
        raw_bytes: &[u8],
        grid: PixelGrid,
        resize_max_dim: u32,
    ) -> Result<Measurement, QualityError> {
        let upright = self.orientation.correct(raw_bytes, grid);
        let resized = resize_to_fit(upright, resize_max_dim);
        let (width, height) = resized.dimensions();
        // Extreme aspect ratios can still collapse below the decode minimum.
        if width < MIN_DIMENSION || height < MIN_DIMENSION {
            return Err(QualityError::InvalidImageData(format!(
                "image resizes to {width}x{height}; both sides must be at least {MIN_DIMENSION} pixels"
            )));
        }
        let gray = to_grayscale(resized);
        let metrics = compute_metrics(&gray);

        Ok(Measurement {
            blur_score: metrics.blur_score,
            brightness: metrics.brightness,
            width,
            height,
        })
    }
}

impl Default for QualityPipeline {
    fn default() -> Self {
        Self::standard()
    }
}

/// One-shot convenience over `QualityPipeline::standard()`.
pub fn assess_image(
    bytes: &[u8],
    content_type: &str,
    config: &ThresholdConfig,
) -> Result<QualityResult, QualityError> {
    QualityPipeline::standard().assess(bytes, content_type, config)
}
