//! Pixsqueeze WASM - WebAssembly bindings for pixsqueeze
//!
//! This crate provides WASM bindings to expose the pixsqueeze-core
//! compression functionality to JavaScript/TypeScript applications.
//!
//! # Module Structure
//!
//! - `types` - WASM-compatible wrapper types for files, surfaces and image handles
//! - `compress` - The compression entry points, inline and worker-side
//! - `render` - Orientation, decoding, drawing and encoding helpers
//! - `file` - Data URL conversion
//!
//! # Usage
//!
//! ```typescript
//! import init, { JsImageFile, compress } from '@pixsqueeze/wasm';
//!
//! // Initialize WASM module (must call first)
//! await init();
//!
//! const bytes = new Uint8Array(await file.arrayBuffer());
//! const input = new JsImageFile(file.name, file.type, bytes, file.lastModified);
//! const output = compress(input, { maxSizeMB: 1 });
//! console.log(`Compressed ${input.size} -> ${output.size} bytes`);
//! ```

use pixsqueeze_core::size::{Base, SizeFormatOptions};
use wasm_bindgen::prelude::*;

mod compress;
mod file;
mod logger;
mod render;
mod types;

// Re-export public types
pub use compress::{compress, read_progress_message, worker_compress};
pub use file::{data_url_to_file, file_to_data_url};
pub use render::{
    load_image, read_orientation, render_file_to_surface, render_to_surface, resize_surface,
    surface_to_file,
};
pub use types::{JsImageFile, JsImageHandle, JsPixelSurface};

/// Initialize the WASM module (called automatically on load)
///
/// Installs a console logger at `warn` level.
#[wasm_bindgen(start)]
pub fn init() {
    logger::install(log::LevelFilter::Warn);
}

/// Change the console log level: "off", "error", "warn", "info", "debug" or "trace".
#[wasm_bindgen]
pub fn set_log_level(level: &str) {
    logger::install(logger::parse_level(level));
}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Format a byte count for display, e.g. `1536` as `"1.5 KB"`.
///
/// `decimal` switches from powers of 1024 to powers of 1000.
#[wasm_bindgen]
pub fn format_size(bytes: f64, decimal: Option<bool>) -> String {
    let options = SizeFormatOptions {
        base: if decimal.unwrap_or(false) {
            Base::Decimal
        } else {
            Base::Binary
        },
        ..Default::default()
    };
    let bytes = if bytes.is_finite() && bytes > 0.0 {
        bytes as u64
    } else {
        0
    };
    pixsqueeze_core::format_size(bytes, &options)
}
