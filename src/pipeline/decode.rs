//! Decoder: raw upload bytes → `PixelGrid`.
//!
//! Order of checks is fixed and cheap-first:
//! 1. declared content type is one we accept
//! 2. byte length within the upload limit (before any decode work)
//! 3. magic bytes identify a supported container
//! 4. header dimensions within bounds (before allocating pixels)
//! 5. full decode, then a minimum-size check

use std::io::Cursor;

use image::{ColorType, ImageFormat};
use tracing::debug;

use super::types::PixelGrid;
use super::QualityError;

/// Both dimensions must be at least this large for the Laplacian to mean anything.
pub const MIN_DIMENSION: u32 = 2;

/// Header-declared pixel count above which we refuse to allocate.
/// A few MB of compressed data can otherwise declare a multi-GB canvas.
pub const MAX_DECODED_PIXELS: u64 = 100_000_000;

/// Declared content types accepted from the client (parameters stripped, lowercase).
pub const ACCEPTED_CONTENT_TYPES: &[&str] = &[
    "image/jpeg",
    "image/jpg",
    "image/pjpeg",
    "image/png",
    "image/x-png",
    "image/tiff",
];

/// Containers the pipeline decodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupportedFormat {
    Jpeg,
    Png,
    Tiff,
}

impl SupportedFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Jpeg => "jpeg",
            Self::Png => "png",
            Self::Tiff => "tiff",
        }
    }

    fn image_format(self) -> ImageFormat {
        match self {
            Self::Jpeg => ImageFormat::Jpeg,
            Self::Png => ImageFormat::Png,
            Self::Tiff => ImageFormat::Tiff,
        }
    }
}

/// Reject declared content types outside the accepted image set.
pub fn check_content_type(declared: &str) -> Result<(), QualityError> {
    let essence = declared
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();

    if ACCEPTED_CONTENT_TYPES.contains(&essence.as_str()) {
        Ok(())
    } else {
        Err(QualityError::UnsupportedMediaType(format!(
            "content type {declared:?} is not an accepted image type"
        )))
    }
}

/// Enforce the upload ceiling. Runs before any decode work.
pub fn check_payload_size(len: usize, limit: usize) -> Result<(), QualityError> {
    if len > limit {
        return Err(QualityError::PayloadTooLarge { size: len, limit });
    }
    Ok(())
}

/// Identify the container from magic bytes (never from the declared type).
///
/// Recognised image containers we do not decode are `UnsupportedMediaType`;
/// bytes that are not an image container at all are `InvalidImageData`.
pub fn sniff_format(bytes: &[u8]) -> Result<SupportedFormat, QualityError> {
    match bytes {
        [0xFF, 0xD8, 0xFF, ..] => Ok(SupportedFormat::Jpeg),
        [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, ..] => Ok(SupportedFormat::Png),
        [b'I', b'I', 0x2A, 0x00, ..] | [b'M', b'M', 0x00, 0x2A, ..] => Ok(SupportedFormat::Tiff),
        [b'G', b'I', b'F', b'8', ..] => Err(unsupported("gif")),
        [b'B', b'M', ..] => Err(unsupported("bmp")),
        [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => Err(unsupported("webp")),
        [_, _, _, _, b'f', b't', b'y', b'p', ..] => Err(unsupported("heif/avif")),
        _ => Err(QualityError::InvalidImageData(
            "bytes do not match any known image format".into(),
        )),
    }
}

fn unsupported(kind: &str) -> QualityError {
    QualityError::UnsupportedMediaType(format!("{kind} images are not supported"))
}

/// Decode bytes already identified as `format` into a `PixelGrid`.
///
/// Grayscale sources stay single-channel; everything else (including alpha
/// and 16-bit variants) is reduced to 8-bit RGB.
pub fn decode_pixels(bytes: &[u8], format: SupportedFormat) -> Result<PixelGrid, QualityError> {
    let (w, h) = image::io::Reader::with_format(Cursor::new(bytes), format.image_format())
        .into_dimensions()
        .map_err(|e| {
            QualityError::InvalidImageData(format!("unreadable {} header: {e}", format.as_str()))
        })?;

    if u64::from(w) * u64::from(h) > MAX_DECODED_PIXELS {
        return Err(QualityError::InvalidImageData(format!(
            "declared dimensions {w}x{h} exceed the {MAX_DECODED_PIXELS} pixel limit"
        )));
    }

    let img = image::load_from_memory_with_format(bytes, format.image_format()).map_err(|e| {
        QualityError::InvalidImageData(format!("failed to decode {}: {e}", format.as_str()))
    })?;

    let is_gray = matches!(
        img.color(),
        ColorType::L8 | ColorType::La8 | ColorType::L16 | ColorType::La16
    );
    let grid = if is_gray {
        PixelGrid::Gray(img.to_luma8())
    } else {
        PixelGrid::Rgb(img.to_rgb8())
    };

    let (gw, gh) = grid.dimensions();
    if gw < MIN_DIMENSION || gh < MIN_DIMENSION {
        return Err(QualityError::InvalidImageData(format!(
            "image is {gw}x{gh}; both sides must be at least {MIN_DIMENSION} pixels"
        )));
    }

    debug!(
        format = format.as_str(),
        size = %format!("{gw}x{gh}"),
        channels = grid.channels(),
        "Image decoded"
    );

    Ok(grid)
}

/// Full decoder contract for an upload: content type, size, magic, decode.
pub fn decode_upload(
    bytes: &[u8],
    content_type: &str,
    max_bytes: usize,
) -> Result<PixelGrid, QualityError> {
    check_content_type(content_type)?;
    check_payload_size(bytes.len(), max_bytes)?;
    let format = sniff_format(bytes)?;
    decode_pixels(bytes, format)
}
