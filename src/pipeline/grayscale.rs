//! Grayscale converter: ITU-R BT.601 luminance.

use image::{GrayImage, Luma, RgbImage};

use super::types::PixelGrid;

/// BT.601 luma in fixed point: `(299 R + 587 G + 114 B) / 1000`, rounded half up.
///
/// Integer arithmetic keeps the result bit-identical across platforms.
pub fn luminance(r: u8, g: u8, b: u8) -> u8 {
    let weighted = 299 * u32::from(r) + 587 * u32::from(g) + 114 * u32::from(b);
    ((weighted + 500) / 1000) as u8
}

/// Reduce a grid to a single luminance channel. Grayscale input passes through.
pub fn to_grayscale(grid: PixelGrid) -> GrayImage {
    match grid {
        PixelGrid::Gray(img) => img,
        PixelGrid::Rgb(rgb) => rgb_to_gray(&rgb),
    }
}

pub fn rgb_to_gray(rgb: &RgbImage) -> GrayImage {
    let (w, h) = rgb.dimensions();
    let mut gray = GrayImage::new(w, h);
    for (src, dst) in rgb.pixels().zip(gray.pixels_mut()) {
        let [r, g, b] = src.0;
        *dst = Luma([luminance(r, g, b)]);
    }
    gray
}
