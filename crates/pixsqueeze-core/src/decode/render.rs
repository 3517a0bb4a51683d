//! Turning files into pixel surfaces.
//!
//! [`render`] is the path the compressor takes: decode, undo the EXIF
//! orientation, then shrink to the dimension ceiling. The remaining functions
//! are the individual steps, exposed for callers that want to drive them.

use std::io::Cursor;

use image::{DynamicImage, ImageError, ImageFormat, ImageReader};

use super::orientation::{read_orientation, Orientation};
use super::resize::resize_to_fit;
use super::{DecodeError, FilterType, ImageHandle, PixelSurface};
use crate::file::{decode_data_url, ImageFile};

/// Decode file bytes into an image, without any orientation handling.
///
/// The format is sniffed from the magic bytes; `mime_hint` is only consulted
/// when sniffing fails. Multi-frame formats yield their first frame.
///
/// # Errors
///
/// Returns `DecodeError::InvalidFormat` if neither the bytes nor the hint
/// identify a supported format, and `DecodeError::CorruptedFile` if the
/// decoder rejects the data.
pub fn decode_image(bytes: &[u8], mime_hint: Option<&str>) -> Result<DynamicImage, DecodeError> {
    let mut reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| DecodeError::CorruptedFile(e.to_string()))?;

    if reader.format().is_none() {
        let hinted = mime_hint
            .and_then(ImageFormat::from_mime_type)
            .ok_or(DecodeError::InvalidFormat)?;
        reader.set_format(hinted);
    }

    let img = reader.decode().map_err(|e| match e {
        ImageError::Unsupported(_) => DecodeError::InvalidFormat,
        other => DecodeError::CorruptedFile(other.to_string()),
    })?;

    if img.width() == 0 || img.height() == 0 {
        return Err(DecodeError::EmptyImage {
            width: img.width(),
            height: img.height(),
        });
    }
    Ok(img)
}

/// Load an image from a URL into a renderable handle.
///
/// Only `data:` URLs are supported; nothing is fetched over the network.
pub fn load_image(url: &str) -> Result<ImageHandle, DecodeError> {
    let (mime_type, bytes) =
        decode_data_url(url).map_err(|e| DecodeError::UnsupportedUrl(e.to_string()))?;
    decode_image(&bytes, Some(&mime_type)).map(ImageHandle::new)
}

/// Draw a loaded image onto a new RGBA surface, exactly as decoded.
pub fn render_to_surface(handle: &ImageHandle) -> PixelSurface {
    PixelSurface::from_rgba_image(handle.image().to_rgba8())
}

/// Decode a file and draw it, returning both the handle and the surface.
pub fn render_file_to_surface(file: &ImageFile) -> Result<(ImageHandle, PixelSurface), DecodeError> {
    let handle = ImageHandle::new(decode_image(&file.bytes, Some(&file.mime_type))?);
    let surface = render_to_surface(&handle);
    Ok((handle, surface))
}

/// Decode a file into a canonically oriented surface.
///
/// `orientation` overrides whatever the file's EXIF says; without an
/// override the tag is read from the file and a missing or unreadable tag
/// means no transform. When `max_edge` is given the oriented surface is
/// shrunk so its longer edge equals it.
pub fn render(
    file: &ImageFile,
    orientation: Option<Orientation>,
    max_edge: Option<u32>,
) -> Result<PixelSurface, DecodeError> {
    render_scaled(file, orientation, max_edge).map(|(surface, _)| surface)
}

/// [`render`], also returning the linear scale factor the ceiling applied
/// (1.0 when the image already fit).
pub(crate) fn render_scaled(
    file: &ImageFile,
    orientation: Option<Orientation>,
    max_edge: Option<u32>,
) -> Result<(PixelSurface, f64), DecodeError> {
    let orientation = orientation
        .or_else(|| read_orientation(&file.bytes))
        .unwrap_or_default();

    let img = decode_image(&file.bytes, Some(&file.mime_type))?;
    log::trace!(
        "decoded {} as {}x{}, orientation {}",
        file.name,
        img.width(),
        img.height(),
        orientation.code()
    );

    let surface = PixelSurface::from_rgba_image(orientation.apply(img).into_rgba8());
    let Some(edge) = max_edge else {
        return Ok((surface, 1.0));
    };

    let original_edge = surface.longest_edge();
    let scaled = resize_to_fit(&surface, edge, FilterType::Bilinear)?;
    let scale = f64::from(scaled.longest_edge()) / f64::from(original_edge);
    Ok((scaled, scale))
}
