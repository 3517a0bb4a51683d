//! Data URL bindings.

use crate::types::{millis_from_js, JsImageFile};
use pixsqueeze_core::file;
use wasm_bindgen::prelude::*;

/// Encode a file as a base64 `data:` URL.
#[wasm_bindgen]
pub fn file_to_data_url(file: &JsImageFile) -> String {
    file::file_to_data_url(file.as_core())
}

/// Rebuild a file from a base64 `data:` URL.
///
/// # Arguments
///
/// * `data_url` - The data URL
/// * `file_name` - Name of the new file
/// * `last_modified` - Timestamp in milliseconds; defaults to `Date.now()`
///
/// # Errors
///
/// Returns an error if the URL is not a base64 data URL.
#[wasm_bindgen]
pub fn data_url_to_file(
    data_url: &str,
    file_name: &str,
    last_modified: Option<f64>,
) -> Result<JsImageFile, JsValue> {
    let last_modified = last_modified
        .and_then(millis_from_js)
        .or_else(|| millis_from_js(js_sys::Date::now()));
    file::data_url_to_file(data_url, file_name, last_modified)
        .map(JsImageFile::from_core)
        .map_err(|e| JsValue::from_str(&e.to_string()))
}
