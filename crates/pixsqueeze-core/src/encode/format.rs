//! Output formats and their mime types.

use thiserror::Error;

/// Errors that can occur while encoding a surface.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// No encoder exists for the requested mime type.
    #[error("Unsupported output type: {0}")]
    UnsupportedMimeType(String),

    /// Pixel data length doesn't match expected dimensions
    #[error("Invalid pixel data: expected {expected} bytes (width * height * 4), got {actual}")]
    InvalidPixelData { expected: usize, actual: usize },

    /// Width or height is zero
    #[error("Invalid dimensions: width ({width}) and height ({height}) must be non-zero")]
    InvalidDimensions { width: u32, height: u32 },

    /// The underlying codec failed
    #[error("{format} encoding failed: {message}")]
    EncodingFailed {
        format: &'static str,
        message: String,
    },
}

/// An encodable output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputFormat {
    Jpeg,
    Png,
    /// Lossless WebP; the quality factor is ignored.
    WebP,
    Bmp,
}

impl OutputFormat {
    /// Resolve a mime type, accepting the common `image/jpg` alias.
    /// Matching ignores ASCII case and any `;` parameters.
    pub fn from_mime_type(mime_type: &str) -> Result<Self, EncodeError> {
        let essence = mime_type.split(';').next().unwrap_or_default().trim();
        match essence.to_ascii_lowercase().as_str() {
            "image/jpeg" | "image/jpg" => Ok(OutputFormat::Jpeg),
            "image/png" => Ok(OutputFormat::Png),
            "image/webp" => Ok(OutputFormat::WebP),
            "image/bmp" | "image/x-ms-bmp" => Ok(OutputFormat::Bmp),
            _ => Err(EncodeError::UnsupportedMimeType(mime_type.to_string())),
        }
    }

    /// Canonical mime type written on encoded files.
    pub fn mime_type(self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "image/jpeg",
            OutputFormat::Png => "image/png",
            OutputFormat::WebP => "image/webp",
            OutputFormat::Bmp => "image/bmp",
        }
    }

    /// Whether the quality factor changes the output at all.
    pub fn is_lossy(self) -> bool {
        matches!(self, OutputFormat::Jpeg)
    }

    pub(crate) fn name(self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "JPEG",
            OutputFormat::Png => "PNG",
            OutputFormat::WebP => "WebP",
            OutputFormat::Bmp => "BMP",
        }
    }
}

/// True when two mime strings name the same type.
pub fn same_mime_type(a: &str, b: &str) -> bool {
    match (OutputFormat::from_mime_type(a), OutputFormat::from_mime_type(b)) {
        (Ok(x), Ok(y)) => x == y,
        _ => a.trim().eq_ignore_ascii_case(b.trim()),
    }
}
