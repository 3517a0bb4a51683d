//! Compression bindings.
//!
//! [`compress`] runs the convergence loop on the calling thread. For
//! `useWebWorker`, the JS glue starts a `Worker` that loads this module and
//! calls [`worker_compress`]; the worker posts `{ type: "progress", progress }`
//! messages while it runs, and the page feeds each one through
//! [`read_progress_message`] to its own `onProgress` callback.
//!
//! # Example
//!
//! ```typescript
//! import { JsImageFile, compress } from '@pixsqueeze/wasm';
//!
//! const input = new JsImageFile(f.name, f.type, new Uint8Array(await f.arrayBuffer()), f.lastModified);
//! const output = compress(input, { maxSizeMB: 1, maxWidthOrHeight: 1920 }, (p) => bar.value = p);
//! ```

use crate::types::{millis_from_js, JsImageFile};
use pixsqueeze_core::{compress_image_with_progress, CompressionOptions, ImageFile};
use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
enum MessageKind {
    Progress,
}

/// A progress message posted from a worker to the page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct ProgressMessage {
    #[serde(rename = "type")]
    kind: MessageKind,
    progress: u8,
}

impl ProgressMessage {
    fn new(progress: u8) -> Self {
        Self {
            kind: MessageKind::Progress,
            progress,
        }
    }
}

/// Parse a JS options object. `undefined` and `null` mean all defaults;
/// missing keys take their defaults.
fn parse_options(options: JsValue) -> Result<CompressionOptions, JsValue> {
    if options.is_undefined() || options.is_null() {
        return Ok(CompressionOptions::default());
    }
    serde_wasm_bindgen::from_value(options)
        .map_err(|e| JsValue::from_str(&format!("Invalid options: {}", e)))
}

/// The core has no clock on wasm32, so results of sources without a
/// timestamp are stamped with `Date.now()` here.
fn stamp_result(source: &JsImageFile, mut result: ImageFile) -> JsImageFile {
    if source.as_core().last_modified.is_none() {
        result.last_modified = millis_from_js(js_sys::Date::now());
    }
    JsImageFile::from_core(result)
}

fn call_progress(callback: &js_sys::Function, value: &JsValue) {
    if let Err(e) = callback.call1(&JsValue::NULL, value) {
        log::warn!("progress callback threw: {:?}", e);
    }
}

/// Compress a file on the calling thread.
///
/// # Arguments
///
/// * `file` - The source file
/// * `options` - Options object (`maxSizeMB`, `maxWidthOrHeight`, `maxIteration`,
///   `exifOrientation`, `fileType`, `initialQuality`); may be omitted
/// * `on_progress` - Called with values from 0 to 100, ending at 100
///
/// # Errors
///
/// Returns an error if the options are malformed, the source can't be
/// decoded, or the output type has no encoder. Missing the size target is
/// not an error: the smallest attempt is returned.
#[wasm_bindgen]
pub fn compress(
    file: &JsImageFile,
    options: JsValue,
    on_progress: Option<js_sys::Function>,
) -> Result<JsImageFile, JsValue> {
    let options = parse_options(options)?;
    compress_image_with_progress(file.as_core(), &options, |progress| {
        if let Some(callback) = &on_progress {
            call_progress(callback, &JsValue::from(progress));
        }
    })
    .map(|result| stamp_result(file, result))
    .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Worker-side entry point: compress and report progress as messages.
///
/// `post` is typically `self.postMessage` bound to the worker scope. It
/// receives `{ type: "progress", progress }` objects in order; the result
/// is returned for the worker to post itself.
#[wasm_bindgen]
pub fn worker_compress(
    file: &JsImageFile,
    options: JsValue,
    post: js_sys::Function,
) -> Result<JsImageFile, JsValue> {
    let options = parse_options(options)?;
    compress_image_with_progress(file.as_core(), &options, |progress| {
        match serde_wasm_bindgen::to_value(&ProgressMessage::new(progress)) {
            Ok(message) => call_progress(&post, &message),
            Err(e) => log::warn!("failed to build progress message: {}", e),
        }
    })
    .map(|result| stamp_result(file, result))
    .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Extract the progress value from a worker message.
///
/// Returns `undefined` for anything that isn't a progress message, so the
/// page can route other messages (the final result) elsewhere.
#[wasm_bindgen]
pub fn read_progress_message(message: JsValue) -> Option<u8> {
    serde_wasm_bindgen::from_value::<ProgressMessage>(message)
        .ok()
        .map(|m| m.progress.min(100))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_message_shape() {
        let message = ProgressMessage::new(40);
        assert_eq!(message.kind, MessageKind::Progress);
        assert_eq!(message.progress, 40);
    }
}
