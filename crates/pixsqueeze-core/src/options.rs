//! Compression options.
//!
//! Everything except the progress sink is plain data and (de)serializes with
//! the camelCase keys JavaScript callers use, so a partial options object
//! from JS fills the rest from defaults.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::decode::Orientation;

/// Default number of encode attempts in the convergence loop.
pub const DEFAULT_MAX_ITERATION: u32 = 10;

/// Bytes per megabyte when converting `max_size_mb`.
pub const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Receives progress values from 0 to 100.
#[derive(Clone)]
pub struct ProgressSink(Arc<dyn Fn(u8) + Send + Sync>);

impl ProgressSink {
    pub fn new(f: impl Fn(u8) + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    pub fn report(&self, progress: u8) {
        (self.0)(progress)
    }
}

impl fmt::Debug for ProgressSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ProgressSink")
    }
}

/// Options for a single compression call. Read-only once the call starts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CompressionOptions {
    /// Target size ceiling in megabytes (1 MB = 1,048,576 bytes).
    #[serde(rename = "maxSizeMB")]
    pub max_size_mb: Option<f64>,
    /// Ceiling on the longer edge in pixels. Images are never upscaled.
    pub max_width_or_height: Option<u32>,
    /// Run the compression on a background worker thread.
    pub use_web_worker: bool,
    /// Maximum number of encode attempts.
    pub max_iteration: u32,
    /// Orientation to apply instead of the file's EXIF tag.
    pub exif_orientation: Option<Orientation>,
    /// Output mime type; defaults to the input's.
    pub file_type: Option<String>,
    /// Starting encoder quality in [0, 1].
    pub initial_quality: f64,
    /// Progress callback. Not transferable, so it never serializes.
    #[serde(skip)]
    pub on_progress: Option<ProgressSink>,
}

impl Default for CompressionOptions {
    fn default() -> Self {
        Self {
            max_size_mb: None,
            max_width_or_height: None,
            use_web_worker: false,
            max_iteration: DEFAULT_MAX_ITERATION,
            exif_orientation: None,
            file_type: None,
            initial_quality: 1.0,
            on_progress: None,
        }
    }
}

impl CompressionOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_size_mb(mut self, max_size_mb: f64) -> Self {
        self.max_size_mb = Some(max_size_mb);
        self
    }

    pub fn with_max_width_or_height(mut self, max_edge: u32) -> Self {
        self.max_width_or_height = Some(max_edge);
        self
    }

    pub fn with_web_worker(mut self, use_web_worker: bool) -> Self {
        self.use_web_worker = use_web_worker;
        self
    }

    pub fn with_max_iteration(mut self, max_iteration: u32) -> Self {
        self.max_iteration = max_iteration;
        self
    }

    pub fn with_exif_orientation(mut self, orientation: Orientation) -> Self {
        self.exif_orientation = Some(orientation);
        self
    }

    pub fn with_file_type(mut self, mime_type: impl Into<String>) -> Self {
        self.file_type = Some(mime_type.into());
        self
    }

    pub fn with_initial_quality(mut self, quality: f64) -> Self {
        self.initial_quality = quality;
        self
    }

    pub fn with_progress(mut self, f: impl Fn(u8) + Send + Sync + 'static) -> Self {
        self.on_progress = Some(ProgressSink::new(f));
        self
    }

    /// The size ceiling in bytes, if any. Non-finite or negative ceilings
    /// count as unbounded.
    pub fn max_size_bytes(&self) -> Option<u64> {
        self.max_size_mb
            .filter(|mb| mb.is_finite() && *mb >= 0.0)
            .map(|mb| (mb * BYTES_PER_MB).floor() as u64)
    }

    /// The longer-edge ceiling, if any. Zero counts as no ceiling.
    pub fn dimension_ceiling(&self) -> Option<u32> {
        self.max_width_or_height.filter(|&edge| edge > 0)
    }

    /// Number of attempts the loop may make; never less than one.
    pub fn attempt_budget(&self) -> u32 {
        self.max_iteration.max(1)
    }

    /// Starting quality clamped to [0, 1]; NaN falls back to 1.0.
    pub fn effective_initial_quality(&self) -> f64 {
        if self.initial_quality.is_nan() {
            1.0
        } else {
            self.initial_quality.clamp(0.0, 1.0)
        }
    }

    /// Take the progress sink out, leaving transferable data behind.
    pub(crate) fn detach_progress(&mut self) -> Option<ProgressSink> {
        self.on_progress.take()
    }
}
