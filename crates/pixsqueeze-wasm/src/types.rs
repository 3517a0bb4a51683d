//! WASM-compatible wrapper types.
//!
//! This module provides JavaScript-friendly types that wrap the core pixsqueeze
//! types, handling the conversion between Rust and JavaScript data representations.

use pixsqueeze_core::decode::{FilterType, ImageHandle, PixelSurface};
use pixsqueeze_core::ImageFile;
use wasm_bindgen::prelude::*;

/// An in-memory file for JavaScript: the input and output of compression.
///
/// # Memory Management
///
/// The bytes live in WASM memory. `bytes()` copies them out to a
/// `Uint8Array`; keep the file in WASM memory when chaining operations.
#[wasm_bindgen]
pub struct JsImageFile {
    inner: ImageFile,
}

#[wasm_bindgen]
impl JsImageFile {
    /// Create a file from its parts.
    ///
    /// # Arguments
    /// * `name` - File name
    /// * `mime_type` - Mime type, e.g. `image/jpeg`
    /// * `bytes` - File contents
    /// * `last_modified` - Milliseconds since the Unix epoch (optional)
    #[wasm_bindgen(constructor)]
    pub fn new(
        name: String,
        mime_type: String,
        bytes: Vec<u8>,
        last_modified: Option<f64>,
    ) -> JsImageFile {
        let mut inner = ImageFile::new(name, mime_type, bytes);
        inner.last_modified = last_modified.and_then(millis_from_js);
        JsImageFile { inner }
    }

    #[wasm_bindgen(getter)]
    pub fn name(&self) -> String {
        self.inner.name.clone()
    }

    #[wasm_bindgen(getter)]
    pub fn mime_type(&self) -> String {
        self.inner.mime_type.clone()
    }

    /// Milliseconds since the Unix epoch, if known.
    #[wasm_bindgen(getter)]
    pub fn last_modified(&self) -> Option<f64> {
        self.inner.last_modified.map(|ms| ms as f64)
    }

    /// Size of the contents in bytes.
    #[wasm_bindgen(getter)]
    pub fn size(&self) -> usize {
        self.inner.size()
    }

    /// Returns the file contents as a Uint8Array (a copy).
    pub fn bytes(&self) -> Vec<u8> {
        self.inner.bytes.clone()
    }
}

impl JsImageFile {
    pub(crate) fn from_core(inner: ImageFile) -> Self {
        Self { inner }
    }

    pub(crate) fn as_core(&self) -> &ImageFile {
        &self.inner
    }
}

/// An RGBA pixel surface for JavaScript (4 bytes per pixel, row-major).
///
/// The layout matches `ImageData`, so `new ImageData(new Uint8ClampedArray(surface.pixels()), surface.width)`
/// draws it on a canvas.
#[wasm_bindgen]
pub struct JsPixelSurface {
    inner: PixelSurface,
}

#[wasm_bindgen]
impl JsPixelSurface {
    /// Create a surface from dimensions and RGBA pixel data.
    ///
    /// # Errors
    ///
    /// Returns an error if `pixels` is not `width * height * 4` bytes long.
    #[wasm_bindgen(constructor)]
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Result<JsPixelSurface, JsValue> {
        let len = pixels.len();
        PixelSurface::from_raw(width, height, pixels)
            .map(|inner| JsPixelSurface { inner })
            .ok_or_else(|| {
                JsValue::from_str(&format!(
                    "Pixel buffer of {} bytes does not match {}x{} RGBA",
                    len, width, height
                ))
            })
    }

    /// Get the surface width in pixels
    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.inner.width
    }

    /// Get the surface height in pixels
    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.inner.height
    }

    /// Get the number of bytes in the pixel buffer (width * height * 4)
    #[wasm_bindgen(getter)]
    pub fn byte_length(&self) -> usize {
        self.inner.byte_size()
    }

    /// Returns RGBA pixel data as Uint8Array.
    ///
    /// Note: This creates a copy of the pixel data.
    pub fn pixels(&self) -> Vec<u8> {
        self.inner.pixels.clone()
    }

    /// Explicitly free WASM memory.
    ///
    /// This is optional - wasm-bindgen's finalizer will handle cleanup automatically.
    pub fn free(self) {
        // Dropping self releases the memory
    }
}

impl JsPixelSurface {
    pub(crate) fn from_core(inner: PixelSurface) -> Self {
        Self { inner }
    }

    pub(crate) fn as_core(&self) -> &PixelSurface {
        &self.inner
    }
}

/// A decoded image that has not been drawn yet, the counterpart of an
/// `HTMLImageElement`. No orientation has been applied.
#[wasm_bindgen]
pub struct JsImageHandle {
    inner: ImageHandle,
}

#[wasm_bindgen]
impl JsImageHandle {
    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.inner.width()
    }

    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.inner.height()
    }
}

impl JsImageHandle {
    pub(crate) fn from_core(inner: ImageHandle) -> Self {
        Self { inner }
    }

    pub(crate) fn as_core(&self) -> &ImageHandle {
        &self.inner
    }
}

/// Convert a JS timestamp to milliseconds. Negative, NaN and infinite
/// values count as unknown.
pub(crate) fn millis_from_js(value: f64) -> Option<u64> {
    (value.is_finite() && value >= 0.0).then(|| value as u64)
}

/// Convert a u8 filter type value to the core FilterType enum.
///
/// Values:
/// - 0 = Nearest (fastest, lowest quality)
/// - 1 = Bilinear (good balance of speed and quality)
/// - 2 = Lanczos3 (best quality, slowest)
///
/// Any other value defaults to Bilinear.
pub(crate) fn filter_from_u8(value: u8) -> FilterType {
    match value {
        0 => FilterType::Nearest,
        2 => FilterType::Lanczos3,
        _ => FilterType::Bilinear, // Default
    }
}
