//! Decoding, drawing and encoding bindings.
//!
//! # Functions
//!
//! - [`read_orientation`] - Read the EXIF orientation code of a file
//! - [`load_image`] - Decode a `data:` URL into an image handle
//! - [`render_to_surface`] - Draw a handle onto an RGBA surface, no orientation logic
//! - [`render_file_to_surface`] - Decode and draw a file in one step
//! - [`resize_surface`] - Shrink a surface to fit a max edge
//! - [`surface_to_file`] - Encode a surface and wrap it as a file
//!
//! # Example
//!
//! ```typescript
//! import { JsImageFile, render_file_to_surface, surface_to_file } from '@pixsqueeze/wasm';
//!
//! const file = new JsImageFile(f.name, f.type, new Uint8Array(await f.arrayBuffer()), f.lastModified);
//! const [handle, surface] = render_file_to_surface(file);
//! const png = surface_to_file(surface, 'image/png', 'copy.png', Date.now());
//! ```

use crate::types::{filter_from_u8, JsImageFile, JsImageHandle, JsPixelSurface};
use pixsqueeze_core::{decode, encode};
use wasm_bindgen::prelude::*;

/// Read the EXIF orientation (1-8) of a file.
///
/// Returns `undefined` when the file has no readable orientation tag;
/// malformed metadata is never an error.
#[wasm_bindgen]
pub fn read_orientation(file: &JsImageFile) -> Option<u8> {
    decode::read_orientation(&file.as_core().bytes).map(|o| o.code())
}

/// Decode an image from a `data:` URL.
///
/// # Errors
///
/// Returns an error for anything but a base64 data URL holding a supported image.
#[wasm_bindgen]
pub fn load_image(url: &str) -> Result<JsImageHandle, JsValue> {
    decode::load_image(url)
        .map(JsImageHandle::from_core)
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Draw a loaded image onto a new RGBA surface, exactly as decoded.
#[wasm_bindgen]
pub fn render_to_surface(handle: &JsImageHandle) -> JsPixelSurface {
    JsPixelSurface::from_core(decode::render_to_surface(handle.as_core()))
}

/// Decode a file and draw it.
///
/// # Returns
///
/// A two-element array `[JsImageHandle, JsPixelSurface]`.
#[wasm_bindgen]
pub fn render_file_to_surface(file: &JsImageFile) -> Result<js_sys::Array, JsValue> {
    let (handle, surface) = decode::render_file_to_surface(file.as_core())
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
    Ok(js_sys::Array::of2(
        &JsImageHandle::from_core(handle).into(),
        &JsPixelSurface::from_core(surface).into(),
    ))
}

/// Shrink a surface so its longer edge is at most `max_edge`. Never upscales.
///
/// # Arguments
///
/// * `surface` - The surface to resize
/// * `max_edge` - Maximum length of the longer edge
/// * `filter` - Resize filter: 0 = Nearest, 1 = Bilinear, 2 = Lanczos3
#[wasm_bindgen]
pub fn resize_surface(
    surface: &JsPixelSurface,
    max_edge: u32,
    filter: u8,
) -> Result<JsPixelSurface, JsValue> {
    decode::resize_to_fit(surface.as_core(), max_edge, filter_from_u8(filter))
        .map(JsPixelSurface::from_core)
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Encode a surface and wrap the bytes as a file.
///
/// # Arguments
///
/// * `surface` - The surface to encode
/// * `mime_type` - Output type: `image/jpeg`, `image/png`, `image/webp` or `image/bmp`
/// * `file_name` - Name of the new file
/// * `last_modified` - Timestamp for the new file, in milliseconds
/// * `quality` - Quality in [0, 1] for lossy types (default 1.0)
#[wasm_bindgen]
pub fn surface_to_file(
    surface: &JsPixelSurface,
    mime_type: &str,
    file_name: &str,
    last_modified: f64,
    quality: Option<f64>,
) -> Result<JsImageFile, JsValue> {
    let last_modified = crate::types::millis_from_js(last_modified)
        .or_else(|| crate::types::millis_from_js(js_sys::Date::now()))
        .unwrap_or_default();
    encode::surface_to_file(surface.as_core(), mime_type, file_name, last_modified, quality)
        .map(JsImageFile::from_core)
        .map_err(|e| JsValue::from_str(&e.to_string()))
}
