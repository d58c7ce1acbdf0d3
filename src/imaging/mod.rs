//! Image processing on top of the `image` crate.
//!
//! | Operation | Function |
//! |---|---|
//! | Decode (JPEG, PNG, GIF, WebP, TIFF, BMP) | `image::ImageReader` with guessed format |
//! | Rotate 90/180/270 | `DynamicImage::rotate90` / `rotate180` / `rotate270` |
//! | Resize | `DynamicImage::resize_exact` with `Lanczos3` |
//! | Grayscale | `DynamicImage::grayscale` |
//! | Encode | `DynamicImage::write_to` in the input's format |
//!
//! Everything here is synchronous and CPU-bound. Callers on an async runtime
//! should run [`process`] on a blocking thread.

pub mod format;
pub mod operation;

use image::{ImageError, ImageFormat, ImageReader};
use std::io::Cursor;
use thiserror::Error;

use format::format_name;

pub use format::{content_type, detect_format_name};
pub use operation::{Angle, Operation};

#[derive(Error, Debug)]
pub enum ImagingError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("unrecognized image format")]
    UnknownFormat,
    #[error("failed to decode image: {0}")]
    Decode(#[source] ImageError),
    #[error("failed to encode {format:?}: {source}")]
    Encode {
        format: ImageFormat,
        #[source]
        source: ImageError,
    },
}

/// An encoded transform result.
#[derive(Debug, Clone)]
pub struct ProcessedImage {
    pub bytes: Vec<u8>,
    pub format: ImageFormat,
}

impl ProcessedImage {
    /// `image/<format>` as sniffed from the encoded bytes.
    pub fn content_type(&self) -> String {
        content_type(&self.bytes)
    }
}

/// Decode `input`, apply `operation`, and re-encode in the input's format.
pub fn process(input: &[u8], operation: &Operation) -> Result<ProcessedImage, ImagingError> {
    let reader = ImageReader::new(Cursor::new(input)).with_guessed_format()?;
    let format = reader.format().ok_or(ImagingError::UnknownFormat)?;
    let decoded = reader.decode().map_err(ImagingError::Decode)?;

    tracing::debug!(
        format = format_name(format),
        width = decoded.width(),
        height = decoded.height(),
        operation = %operation,
        "Image decoded"
    );

    let transformed = format::prepare_for_encoding(operation.apply(decoded), format);

    let mut bytes = Vec::new();
    transformed
        .write_to(&mut Cursor::new(&mut bytes), format)
        .map_err(|source| ImagingError::Encode { format, source })?;

    Ok(ProcessedImage { bytes, format })
}
