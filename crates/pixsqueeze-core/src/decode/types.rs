//! Core types for image decoding.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error types for image decoding operations.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The file format is not recognized or supported.
    #[error("Invalid or unsupported image format")]
    InvalidFormat,

    /// The image file is corrupted or incomplete.
    #[error("Corrupted or incomplete image file: {0}")]
    CorruptedFile(String),

    /// The image decoded to zero pixels.
    #[error("Image has no pixels ({width}x{height})")]
    EmptyImage { width: u32, height: u32 },

    /// A URL handed to the loader could not be turned into bytes.
    #[error("Cannot load image from URL: {0}")]
    UnsupportedUrl(String),
}

/// Filter type for image resizing operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FilterType {
    /// Nearest neighbor interpolation (fastest, lowest quality).
    Nearest,
    /// Bilinear interpolation (fast, acceptable quality).
    #[default]
    Bilinear,
    /// Lanczos3 interpolation (slower, highest quality).
    Lanczos3,
}

impl FilterType {
    /// Convert to the image crate's FilterType.
    pub fn to_image_filter(self) -> image::imageops::FilterType {
        match self {
            FilterType::Nearest => image::imageops::FilterType::Nearest,
            FilterType::Bilinear => image::imageops::FilterType::Triangle,
            FilterType::Lanczos3 => image::imageops::FilterType::Lanczos3,
        }
    }
}

/// A decoded, orientation-corrected RGBA pixel grid.
///
/// This is the canvas the compression loop encodes from. It is created once
/// per call and never shared between calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelSurface {
    /// Surface width in pixels.
    pub width: u32,
    /// Surface height in pixels.
    pub height: u32,
    /// RGBA pixel data in row-major order (4 bytes per pixel).
    /// Length should be width * height * 4.
    pub pixels: Vec<u8>,
}

impl PixelSurface {
    /// Create a new PixelSurface with the given dimensions and pixel data.
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        debug_assert_eq!(
            pixels.len(),
            width as usize * height as usize * 4,
            "Pixel buffer size mismatch"
        );
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Create a PixelSurface, or `None` if `pixels` is not exactly
    /// `width * height * 4` bytes.
    pub fn from_raw(width: u32, height: u32, pixels: Vec<u8>) -> Option<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)?
            .checked_mul(4)?;
        (pixels.len() == expected).then(|| Self {
            width,
            height,
            pixels,
        })
    }

    /// Create a PixelSurface from an image::RgbaImage.
    pub fn from_rgba_image(img: image::RgbaImage) -> Self {
        let (width, height) = img.dimensions();
        let pixels = img.into_raw();
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Borrow the pixels as an image::RgbaImage view.
    pub fn as_rgba_view(&self) -> Option<image::ImageBuffer<image::Rgba<u8>, &[u8]>> {
        image::ImageBuffer::from_raw(self.width, self.height, self.pixels.as_slice())
    }

    /// Convert to an owned image::RgbaImage for further processing.
    pub fn to_rgba_image(&self) -> Option<image::RgbaImage> {
        image::RgbaImage::from_raw(self.width, self.height, self.pixels.clone())
    }

    /// Width and height as a tuple.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Length of the longer edge.
    pub fn longest_edge(&self) -> u32 {
        self.width.max(self.height)
    }

    /// Get the size of the pixel buffer in bytes.
    pub fn byte_size(&self) -> usize {
        self.pixels.len()
    }
}

/// A decoded image as it came out of the file, before any orientation logic.
///
/// Produced by [`load_image`](super::load_image) and drawn onto a surface by
/// [`render_to_surface`](super::render_to_surface).
#[derive(Debug, Clone)]
pub struct ImageHandle {
    image: image::DynamicImage,
}

impl ImageHandle {
    pub(crate) fn new(image: image::DynamicImage) -> Self {
        Self { image }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub(crate) fn image(&self) -> &image::DynamicImage {
        &self.image
    }
}
