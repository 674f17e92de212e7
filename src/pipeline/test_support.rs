//! In-memory test images shared by pipeline and API tests.

use std::io::Cursor;

use image::{DynamicImage, GrayImage, ImageOutputFormat, Luma, Rgb, RgbImage};

pub fn encode(img: DynamicImage, format: ImageOutputFormat) -> Vec<u8> {
    let mut cursor = Cursor::new(Vec::new());
    img.write_to(&mut cursor, format).unwrap();
    cursor.into_inner()
}

pub fn png_gray(img: GrayImage) -> Vec<u8> {
    encode(DynamicImage::ImageLuma8(img), ImageOutputFormat::Png)
}

pub fn jpeg_rgb(img: RgbImage) -> Vec<u8> {
    encode(DynamicImage::ImageRgb8(img), ImageOutputFormat::Jpeg(92))
}

/// Checkerboard of `cell`-pixel squares alternating between `lo` and `hi`.
pub fn checkerboard(w: u32, h: u32, cell: u32, lo: u8, hi: u8) -> RgbImage {
    RgbImage::from_fn(w, h, |x, y| {
        let v = if (x / cell + y / cell) % 2 == 0 { lo } else { hi };
        Rgb([v, v, v])
    })
}

/// Slowly varying luminance around `mean`: no edges anywhere.
pub fn smooth_field(w: u32, h: u32, mean: f64, amplitude: f64) -> RgbImage {
    RgbImage::from_fn(w, h, |x, y| {
        let v = mean + amplitude * (x as f64 / 300.0).sin() * (y as f64 / 300.0).cos();
        let v = v.round().clamp(0.0, 255.0) as u8;
        Rgb([v, v, v])
    })
}

pub fn black_png(w: u32, h: u32) -> Vec<u8> {
    png_gray(GrayImage::from_pixel(w, h, Luma([0])))
}

/// Baseline JPEG (`w x h`) with an APP1 segment carrying only the orientation tag.
pub fn jpeg_with_orientation(w: u32, h: u32, code: u16) -> Vec<u8> {
    let jpeg = jpeg_rgb(checkerboard(w, h, 2, 40, 200));

    let mut tiff = Vec::new();
    tiff.extend_from_slice(b"MM\0\x2A\0\0\0\x08"); // big-endian header, IFD0 at offset 8
    tiff.extend_from_slice(&[0x00, 0x01]); // one entry
    tiff.extend_from_slice(&[0x01, 0x12, 0x00, 0x03, 0x00, 0x00, 0x00, 0x01]); // Orientation, SHORT, count 1
    tiff.extend_from_slice(&code.to_be_bytes());
    tiff.extend_from_slice(&[0x00, 0x00]); // value padding
    tiff.extend_from_slice(&[0x00, 0x00, 0x00, 0x00]); // no next IFD

    let mut app1 = b"Exif\0\0".to_vec();
    app1.extend_from_slice(&tiff);
    let len = (app1.len() + 2) as u16;

    let mut out = vec![0xFF, 0xD8, 0xFF, 0xE1];
    out.extend_from_slice(&len.to_be_bytes());
    out.extend_from_slice(&app1);
    out.extend_from_slice(&jpeg[2..]); // original SOI already written
    out
}
