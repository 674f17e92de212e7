//! Resizer: cap the longest side at `resize_max_dim`, preserving aspect ratio.
//!
//! Uses the triangle (bilinear) filter. When downscaling, `imageops::resize`
//! widens the filter support by the scale factor, so every source pixel
//! contributes: area-like averaging without nearest-neighbour aliasing,
//! and without the ringing Lanczos adds around hard edges.

use image::imageops::{self, FilterType};
use image::{ImageBuffer, Pixel};
use tracing::debug;

use super::types::PixelGrid;

/// Target dimensions for a `width x height` grid capped at `max_dim`.
///
/// If the grid already fits it is returned as-is. Otherwise the longer side
/// becomes exactly `max_dim` and the shorter side is
/// `round(shorter * max_dim / longer)`, never below 1. Integer arithmetic,
/// so the result is identical on every platform.
pub fn compute_fit_dimensions(width: u32, height: u32, max_dim: u32) -> (u32, u32) {
    let max_dim = max_dim.max(1);
    let longer = width.max(height);
    if longer <= max_dim {
        return (width, height);
    }

    let shorter = width.min(height);
    // round-half-up of shorter * max_dim / longer
    let scaled = (2 * u64::from(shorter) * u64::from(max_dim) + u64::from(longer))
        / (2 * u64::from(longer));
    let scaled = (scaled as u32).max(1);

    if width >= height {
        (max_dim, scaled)
    } else {
        (scaled, max_dim)
    }
}

/// Downsample `grid` so neither side exceeds `max_dim`. Never upscales.
pub fn resize_to_fit(grid: PixelGrid, max_dim: u32) -> PixelGrid {
    let (w, h) = grid.dimensions();
    let (new_w, new_h) = compute_fit_dimensions(w, h, max_dim);
    if (new_w, new_h) == (w, h) {
        return grid;
    }

    debug!(
        from = %format!("{w}x{h}"),
        to = %format!("{new_w}x{new_h}"),
        "Downscaling image"
    );

    match grid {
        PixelGrid::Gray(img) => PixelGrid::Gray(resize_buffer(&img, new_w, new_h)),
        PixelGrid::Rgb(img) => PixelGrid::Rgb(resize_buffer(&img, new_w, new_h)),
    }
}

fn resize_buffer<P>(img: &ImageBuffer<P, Vec<u8>>, w: u32, h: u32) -> ImageBuffer<P, Vec<u8>>
where
    P: Pixel<Subpixel = u8> + 'static,
{
    imageops::resize(img, w, h, FilterType::Triangle)
}
