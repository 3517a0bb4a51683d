//! In-memory files and their data-URL form.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use thiserror::Error;

/// An image file held in memory: the input to and output of compression.
///
/// Inputs are never mutated; every result is a newly allocated file owned by
/// the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFile {
    pub name: String,
    pub mime_type: String,
    /// Milliseconds since the Unix epoch.
    pub last_modified: Option<u64>,
    pub bytes: Vec<u8>,
}

impl ImageFile {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            last_modified: None,
            bytes,
        }
    }

    pub fn with_last_modified(mut self, last_modified: u64) -> Self {
        self.last_modified = Some(last_modified);
        self
    }

    /// Size of the file contents in bytes.
    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    /// The file's own timestamp, or the current time when it has none.
    pub fn last_modified_or_now(&self) -> u64 {
        self.last_modified.unwrap_or_else(now_millis)
    }
}

/// Milliseconds since the Unix epoch.
#[cfg(not(target_arch = "wasm32"))]
pub fn now_millis() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// `wasm32-unknown-unknown` has no clock; the wasm bindings stamp
/// untimed results from `Date.now()` instead.
#[cfg(target_arch = "wasm32")]
pub fn now_millis() -> u64 {
    0
}

/// Errors from parsing a data URL.
#[derive(Debug, Error)]
pub enum DataUrlError {
    #[error("Not a data URL")]
    MissingScheme,

    #[error("Data URL has no ',' separating header and payload")]
    MissingPayload,

    #[error("Only base64 data URLs are supported")]
    NotBase64,

    #[error("Invalid base64 payload: {0}")]
    InvalidBase64(#[from] base64::DecodeError),
}

/// Encode a file's bytes as a base64 `data:` URL carrying its mime type.
pub fn file_to_data_url(file: &ImageFile) -> String {
    format!("data:{};base64,{}", file.mime_type, STANDARD.encode(&file.bytes))
}

/// Rebuild a file from a base64 `data:` URL.
///
/// Without `last_modified` the file is stamped with the current time.
pub fn data_url_to_file(
    data_url: &str,
    file_name: &str,
    last_modified: Option<u64>,
) -> Result<ImageFile, DataUrlError> {
    let (mime_type, bytes) = decode_data_url(data_url)?;
    Ok(ImageFile::new(file_name, mime_type, bytes)
        .with_last_modified(last_modified.unwrap_or_else(now_millis)))
}

/// Split a data URL into its mime type and decoded payload.
pub(crate) fn decode_data_url(data_url: &str) -> Result<(String, Vec<u8>), DataUrlError> {
    let rest = data_url
        .strip_prefix("data:")
        .ok_or(DataUrlError::MissingScheme)?;
    let (header, payload) = rest.split_once(',').ok_or(DataUrlError::MissingPayload)?;

    let mut params = header.split(';');
    let mime_type = match params.next().map(str::trim) {
        Some(mime) if !mime.is_empty() => mime.to_string(),
        _ => "application/octet-stream".to_string(),
    };
    if !params.any(|p| p.trim().eq_ignore_ascii_case("base64")) {
        return Err(DataUrlError::NotBase64);
    }

    let bytes = STANDARD.decode(payload.trim())?;
    Ok((mime_type, bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_to_data_url() {
        let file = ImageFile::new("a.png", "image/png", vec![1, 2, 3]);
        assert_eq!(file_to_data_url(&file), "data:image/png;base64,AQID");
    }

    #[test]
    fn test_data_url_roundtrip_preserves_bytes() {
        let bytes: Vec<u8> = (0..=255).collect();
        let file = ImageFile::new("all.bin", "image/jpeg", bytes.clone());

        let restored = data_url_to_file(&file_to_data_url(&file), "copy.jpg", Some(7)).unwrap();

        assert_eq!(restored.bytes, bytes);
        assert_eq!(restored.mime_type, "image/jpeg");
        assert_eq!(restored.name, "copy.jpg");
        assert_eq!(restored.last_modified, Some(7));
    }

    #[test]
    fn test_data_url_to_file_stamps_time() {
        let file = data_url_to_file("data:image/png;base64,AQID", "a.png", None).unwrap();
        assert!(file.last_modified.is_some());
    }

    #[test]
    fn test_data_url_without_mime() {
        let (mime, bytes) = decode_data_url("data:;base64,AQID").unwrap();
        assert_eq!(mime, "application/octet-stream");
        assert_eq!(bytes, vec![1, 2, 3]);
    }

    #[test]
    fn test_data_url_errors() {
        assert!(matches!(
            decode_data_url("image/png;base64,AQID"),
            Err(DataUrlError::MissingScheme)
        ));
        assert!(matches!(
            decode_data_url("data:image/png;base64"),
            Err(DataUrlError::MissingPayload)
        ));
        assert!(matches!(
            decode_data_url("data:text/plain,hello"),
            Err(DataUrlError::NotBase64)
        ));
        assert!(matches!(
            decode_data_url("data:image/png;base64,@@@"),
            Err(DataUrlError::InvalidBase64(_))
        ));
    }

    #[test]
    fn test_last_modified_or_now() {
        let file = ImageFile::new("a", "image/png", vec![]);
        assert!(file.last_modified_or_now() > 0);
        assert_eq!(file.with_last_modified(5).last_modified_or_now(), 5);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: A data URL round trip reproduces the exact bytes.
        #[test]
        fn prop_data_url_roundtrip(bytes in prop::collection::vec(any::<u8>(), 0..512)) {
            let file = ImageFile::new("f", "image/webp", bytes.clone());
            let restored = data_url_to_file(&file_to_data_url(&file), "f", None).unwrap();
            prop_assert_eq!(restored.bytes, bytes);
        }
    }
}
