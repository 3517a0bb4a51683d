//! Image decoding pipeline for pixsqueeze.
//!
//! This module provides functionality for:
//! - Reading the EXIF orientation tag without decoding pixels
//! - Decoding any supported format (JPEG, PNG, WebP, BMP, GIF) into RGBA
//! - Undoing EXIF orientation through a fixed 8-entry transform table
//! - Proportional downscaling to a dimension ceiling
//!
//! # Architecture
//!
//! All operations are synchronous. The compressor calls [`render`] exactly
//! once per operation; re-decoding is the expensive step, so dimension
//! reduction never happens inside the quality search.
//!
//! # Examples
//!
//! ```ignore
//! use pixsqueeze_core::decode::render;
//! use pixsqueeze_core::ImageFile;
//!
//! let file = ImageFile::new("photo.jpg", "image/jpeg", std::fs::read("photo.jpg").unwrap());
//! let surface = render(&file, None, Some(1920)).unwrap();
//! println!("Rendered {}x{} surface", surface.width, surface.height);
//! ```

mod orientation;
mod render;
mod resize;
mod types;

pub use orientation::{
    read_orientation, try_read_orientation, Orientation, OrientationReadError,
    OrientationTransform, Rotation,
};
pub(crate) use render::render_scaled;
pub use render::{decode_image, load_image, render, render_file_to_surface, render_to_surface};
pub use resize::{calculate_fit_dimensions, resize, resize_to_fit};
pub use types::{DecodeError, FilterType, ImageHandle, PixelSurface};
