//! Orientation normalizer: undo camera rotation/mirroring recorded in EXIF.
//!
//! Phone photos store raw sensor layout and record the display transform in
//! EXIF tag 0x0112. Without correction, a portrait photo is scored sideways,
//! which changes both the resize target and the Laplacian response.

use std::io::Cursor;

use image::imageops;
use image::{ImageBuffer, Pixel};
use tracing::debug;

use super::types::PixelGrid;

/// EXIF orientation codes 1-8.
///
/// Each variant names the transform that turns the stored pixels into the
/// upright image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// 1: stored upright.
    Normal,
    /// 2: mirror left-right.
    MirrorHorizontal,
    /// 3: rotate 180.
    Rotate180,
    /// 4: mirror top-bottom.
    MirrorVertical,
    /// 5: rotate 90 CW then mirror left-right (transpose).
    Transpose,
    /// 6: rotate 90 CW.
    Rotate90,
    /// 7: rotate 270 CW then mirror left-right (transverse).
    Transverse,
    /// 8: rotate 270 CW.
    Rotate270,
}

impl Orientation {
    pub const ALL: [Orientation; 8] = [
        Orientation::Normal,
        Orientation::MirrorHorizontal,
        Orientation::Rotate180,
        Orientation::MirrorVertical,
        Orientation::Transpose,
        Orientation::Rotate90,
        Orientation::Transverse,
        Orientation::Rotate270,
    ];

    /// Map an EXIF value to an orientation. Unknown values are `Normal`.
    pub fn from_exif(code: u32) -> Self {
        match code {
            2 => Orientation::MirrorHorizontal,
            3 => Orientation::Rotate180,
            4 => Orientation::MirrorVertical,
            5 => Orientation::Transpose,
            6 => Orientation::Rotate90,
            7 => Orientation::Transverse,
            8 => Orientation::Rotate270,
            _ => Orientation::Normal,
        }
    }

    pub fn exif_code(self) -> u32 {
        match self {
            Orientation::Normal => 1,
            Orientation::MirrorHorizontal => 2,
            Orientation::Rotate180 => 3,
            Orientation::MirrorVertical => 4,
            Orientation::Transpose => 5,
            Orientation::Rotate90 => 6,
            Orientation::Transverse => 7,
            Orientation::Rotate270 => 8,
        }
    }

    /// The transform that undoes this one.
    ///
    /// Mirrors, 180 and the two diagonal flips are their own inverse;
    /// the quarter turns swap.
    pub fn inverse(self) -> Self {
        match self {
            Orientation::Rotate90 => Orientation::Rotate270,
            Orientation::Rotate270 => Orientation::Rotate90,
            other => other,
        }
    }

    /// Whether the transform swaps width and height.
    pub fn swaps_dimensions(self) -> bool {
        matches!(
            self,
            Orientation::Transpose
                | Orientation::Rotate90
                | Orientation::Transverse
                | Orientation::Rotate270
        )
    }
}

/// Fixes pixel orientation for a decoded grid.
///
/// `raw_bytes` are the original upload bytes (metadata lives there, not in
/// the decoded pixels).
pub trait OrientationCorrector: Send + Sync {
    fn correct(&self, raw_bytes: &[u8], grid: PixelGrid) -> PixelGrid;
}

/// EXIF-based correction. Missing or unreadable metadata is the identity.
pub struct ExifOrientationCorrector;

impl OrientationCorrector for ExifOrientationCorrector {
    fn correct(&self, raw_bytes: &[u8], grid: PixelGrid) -> PixelGrid {
        let orientation = read_exif_orientation(raw_bytes);
        if orientation != Orientation::Normal {
            debug!(
                code = orientation.exif_code(),
                "Applying EXIF orientation"
            );
        }
        apply_orientation(grid, orientation)
    }
}

/// Leaves the grid untouched.
pub struct NoOpOrientationCorrector;

impl OrientationCorrector for NoOpOrientationCorrector {
    fn correct(&self, _raw_bytes: &[u8], grid: PixelGrid) -> PixelGrid {
        grid
    }
}

/// Read the EXIF orientation tag from raw container bytes.
pub fn read_exif_orientation(bytes: &[u8]) -> Orientation {
    let mut cursor = Cursor::new(bytes);
    let reader = match exif::Reader::new().read_from_container(&mut cursor) {
        Ok(r) => r,
        Err(_) => return Orientation::Normal,
    };

    reader
        .get_field(exif::Tag::Orientation, exif::In::PRIMARY)
        .and_then(|f| f.value.get_uint(0))
        .map(Orientation::from_exif)
        .unwrap_or(Orientation::Normal)
}

/// Apply an orientation transform. Never fails.
pub fn apply_orientation(grid: PixelGrid, orientation: Orientation) -> PixelGrid {
    match grid {
        PixelGrid::Gray(img) => PixelGrid::Gray(orient_buffer(img, orientation)),
        PixelGrid::Rgb(img) => PixelGrid::Rgb(orient_buffer(img, orientation)),
    }
}

fn orient_buffer<P>(img: ImageBuffer<P, Vec<u8>>, orientation: Orientation) -> ImageBuffer<P, Vec<u8>>
where
    P: Pixel<Subpixel = u8> + 'static,
{
    match orientation {
        Orientation::Normal => img,
        Orientation::MirrorHorizontal => imageops::flip_horizontal(&img),
        Orientation::Rotate180 => imageops::rotate180(&img),
        Orientation::MirrorVertical => imageops::flip_vertical(&img),
        Orientation::Transpose => imageops::flip_horizontal(&imageops::rotate90(&img)),
        Orientation::Rotate90 => imageops::rotate90(&img),
        Orientation::Transverse => imageops::flip_horizontal(&imageops::rotate270(&img)),
        Orientation::Rotate270 => imageops::rotate270(&img),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::test_support::{encode, jpeg_with_orientation};
    use image::{DynamicImage, GrayImage, ImageOutputFormat, Luma, Rgb, RgbImage};

    /// 3x2 grid with a distinct value per pixel:
    /// ```text
    /// 1 2 3
    /// 4 5 6
    /// ```
    fn asymmetric_gray() -> PixelGrid {
        PixelGrid::Gray(GrayImage::from_fn(3, 2, |x, y| Luma([(y * 3 + x + 1) as u8])))
    }

    fn gray_rows(grid: &PixelGrid) -> Vec<Vec<u8>> {
        match grid {
            PixelGrid::Gray(img) => (0..img.height())
                .map(|y| (0..img.width()).map(|x| img.get_pixel(x, y).0[0]).collect())
                .collect(),
            PixelGrid::Rgb(_) => panic!("expected grayscale grid"),
        }
    }

    // ── codes ──

    #[test]
    fn exif_codes_round_trip() {
        for o in Orientation::ALL {
            assert_eq!(Orientation::from_exif(o.exif_code()), o);
        }
    }

    #[test]
    fn unknown_codes_are_identity() {
        for code in [0, 9, 255, u32::MAX] {
            assert_eq!(Orientation::from_exif(code), Orientation::Normal);
        }
    }

    // ── transforms ──

    #[test]
    fn normal_is_identity() {
        let grid = asymmetric_gray();
        assert_eq!(apply_orientation(grid.clone(), Orientation::Normal), grid);
    }

    #[test]
    fn mirror_horizontal_reverses_rows() {
        let out = apply_orientation(asymmetric_gray(), Orientation::MirrorHorizontal);
        assert_eq!(gray_rows(&out), vec![vec![3, 2, 1], vec![6, 5, 4]]);
    }

    #[test]
    fn rotate180_reverses_everything() {
        let out = apply_orientation(asymmetric_gray(), Orientation::Rotate180);
        assert_eq!(gray_rows(&out), vec![vec![6, 5, 4], vec![3, 2, 1]]);
    }

    #[test]
    fn mirror_vertical_swaps_rows() {
        let out = apply_orientation(asymmetric_gray(), Orientation::MirrorVertical);
        assert_eq!(gray_rows(&out), vec![vec![4, 5, 6], vec![1, 2, 3]]);
    }

    #[test]
    fn rotate90_turns_clockwise() {
        let out = apply_orientation(asymmetric_gray(), Orientation::Rotate90);
        assert_eq!(gray_rows(&out), vec![vec![4, 1], vec![5, 2], vec![6, 3]]);
    }

    #[test]
    fn rotate270_turns_counter_clockwise() {
        let out = apply_orientation(asymmetric_gray(), Orientation::Rotate270);
        assert_eq!(gray_rows(&out), vec![vec![3, 6], vec![2, 5], vec![1, 4]]);
    }

    #[test]
    fn transpose_swaps_axes() {
        let out = apply_orientation(asymmetric_gray(), Orientation::Transpose);
        assert_eq!(gray_rows(&out), vec![vec![1, 4], vec![2, 5], vec![3, 6]]);
    }

    #[test]
    fn transverse_swaps_anti_diagonal() {
        let out = apply_orientation(asymmetric_gray(), Orientation::Transverse);
        assert_eq!(gray_rows(&out), vec![vec![6, 3], vec![5, 2], vec![4, 1]]);
    }

    #[test]
    fn every_code_round_trips_through_its_inverse() {
        let gray = asymmetric_gray();
        let rgb = PixelGrid::Rgb(RgbImage::from_fn(5, 3, |x, y| {
            Rgb([x as u8, y as u8, (x * 7 + y * 11) as u8])
        }));

        for original in [gray, rgb] {
            for o in Orientation::ALL {
                let turned = apply_orientation(original.clone(), o);
                let (w, h) = original.dimensions();
                let expected = if o.swaps_dimensions() { (h, w) } else { (w, h) };
                assert_eq!(turned.dimensions(), expected, "{o:?}");

                let restored = apply_orientation(turned, o.inverse());
                assert_eq!(restored, original, "{o:?} then {:?}", o.inverse());
            }
        }
    }

    // ── EXIF reading ──

    #[test]
    fn no_exif_reads_as_normal() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(4, 4, Rgb([1, 2, 3])));
        let png = encode(img, ImageOutputFormat::Png);
        assert_eq!(read_exif_orientation(&png), Orientation::Normal);
    }

    #[test]
    fn garbage_reads_as_normal() {
        assert_eq!(read_exif_orientation(b"not an image"), Orientation::Normal);
        assert_eq!(read_exif_orientation(&[]), Orientation::Normal);
    }

    #[test]
    fn reads_orientation_from_jpeg_app1() {
        assert_eq!(read_exif_orientation(&jpeg_with_orientation(8, 4, 6)), Orientation::Rotate90);
        assert_eq!(read_exif_orientation(&jpeg_with_orientation(8, 4, 3)), Orientation::Rotate180);
    }

    #[test]
    fn exif_corrector_rotates_decoded_grid() {
        let bytes = jpeg_with_orientation(8, 4, 6);
        let decoded = image::load_from_memory(&bytes).unwrap().to_rgb8();
        assert_eq!(decoded.dimensions(), (8, 4));

        let out = ExifOrientationCorrector.correct(&bytes, PixelGrid::Rgb(decoded));
        assert_eq!(out.dimensions(), (4, 8));
    }

    #[test]
    fn noop_corrector_ignores_metadata() {
        let bytes = jpeg_with_orientation(8, 4, 6);
        let grid = asymmetric_gray();
        assert_eq!(NoOpOrientationCorrector.correct(&bytes, grid.clone()), grid);
    }
}
