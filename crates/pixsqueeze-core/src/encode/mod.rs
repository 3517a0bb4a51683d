//! Image encoding pipeline for pixsqueeze.
//!
//! This module provides functionality for:
//! - Encoding surfaces to JPEG with a fractional quality factor
//! - Encoding surfaces losslessly to PNG, WebP and BMP
//! - Wrapping encoded bytes as an [`ImageFile`]
//!
//! Encoding is deterministic: the same surface, format and quality always
//! produce the same bytes.
//!
//! # Examples
//!
//! ```ignore
//! use pixsqueeze_core::decode::PixelSurface;
//! use pixsqueeze_core::encode::encode;
//!
//! let surface = PixelSurface::new(100, 100, vec![128u8; 100 * 100 * 4]);
//! let jpeg_bytes = encode(&surface, "image/jpeg", 0.8).unwrap();
//! println!("Encoded {} bytes", jpeg_bytes.len());
//! ```

mod format;
mod jpeg;
mod lossless;

pub use format::{same_mime_type, EncodeError, OutputFormat};
pub use jpeg::jpeg_quality;

use crate::decode::PixelSurface;
use crate::file::ImageFile;

/// Encode a surface as the given mime type.
///
/// `quality` is a factor in [0, 1] and only affects lossy formats.
///
/// # Errors
///
/// Returns `EncodeError::UnsupportedMimeType` for mime types without an
/// encoder, and a validation error if the surface is empty or inconsistent.
pub fn encode(surface: &PixelSurface, mime_type: &str, quality: f64) -> Result<Vec<u8>, EncodeError> {
    encode_as(surface, OutputFormat::from_mime_type(mime_type)?, quality)
}

/// Encode a surface in an already resolved format.
pub fn encode_as(
    surface: &PixelSurface,
    format: OutputFormat,
    quality: f64,
) -> Result<Vec<u8>, EncodeError> {
    validate(surface)?;
    let (width, height) = surface.dimensions();
    match format {
        OutputFormat::Jpeg => jpeg::encode_jpeg(&surface.pixels, width, height, quality),
        lossless => lossless::encode_lossless(lossless, &surface.pixels, width, height),
    }
}

/// Encode a surface and wrap the bytes as a file.
///
/// `quality` defaults to 1.0. The file's mime type is the canonical one for
/// the format, so `image/jpg` comes back as `image/jpeg`.
pub fn surface_to_file(
    surface: &PixelSurface,
    mime_type: &str,
    file_name: &str,
    last_modified: u64,
    quality: Option<f64>,
) -> Result<ImageFile, EncodeError> {
    let format = OutputFormat::from_mime_type(mime_type)?;
    let bytes = encode_as(surface, format, quality.unwrap_or(1.0))?;
    Ok(ImageFile::new(file_name, format.mime_type(), bytes).with_last_modified(last_modified))
}

fn validate(surface: &PixelSurface) -> Result<(), EncodeError> {
    if surface.width == 0 || surface.height == 0 {
        return Err(EncodeError::InvalidDimensions {
            width: surface.width,
            height: surface.height,
        });
    }

    let expected = surface.width as usize * surface.height as usize * 4;
    if surface.pixels.len() != expected {
        return Err(EncodeError::InvalidPixelData {
            expected,
            actual: surface.pixels.len(),
        });
    }
    Ok(())
}
