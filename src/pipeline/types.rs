//! Request-scoped values flowing through the pipeline.

use image::{GrayImage, RgbImage};
use serde::Serialize;

use super::decision::Thresholds;

/// Decoded 8-bit pixel grid with one (luma) or three (RGB) channels.
///
/// Each stage consumes a grid and yields a new one; a grid is never shared
/// between requests.
#[derive(Debug, Clone, PartialEq)]
pub enum PixelGrid {
    Gray(GrayImage),
    Rgb(RgbImage),
}

impl PixelGrid {
    pub fn width(&self) -> u32 {
        match self {
            PixelGrid::Gray(img) => img.width(),
            PixelGrid::Rgb(img) => img.width(),
        }
    }

    pub fn height(&self) -> u32 {
        match self {
            PixelGrid::Gray(img) => img.height(),
            PixelGrid::Rgb(img) => img.height(),
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width(), self.height())
    }

    pub fn channels(&self) -> u8 {
        match self {
            PixelGrid::Gray(_) => 1,
            PixelGrid::Rgb(_) => 3,
        }
    }
}

/// The two scalar metrics computed over the resized grayscale grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Metrics {
    /// Population variance of the 4-neighbour Laplacian response. Higher = sharper.
    pub blur_score: f64,
    /// Mean grayscale intensity, 0..=255.
    pub brightness: f64,
}

/// Metrics plus the post-resize dimensions they were measured at.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Measurement {
    pub blur_score: f64,
    pub brightness: f64,
    pub width: u32,
    pub height: u32,
}

/// Complete pipeline output. This is the response body of `POST /quality`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QualityResult {
    pub blur_score: f64,
    pub brightness: f64,
    pub width: u32,
    pub height: u32,
    pub is_ok: bool,
    pub thresholds: Thresholds,
}
