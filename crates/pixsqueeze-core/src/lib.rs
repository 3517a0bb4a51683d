//! Pixsqueeze Core - Size-constrained image compression
//!
//! This crate shrinks image files to a byte-size and/or pixel-dimension
//! budget while keeping their EXIF orientation visually correct. The
//! convergence loop decodes once, then searches encoder quality downwards
//! until the output fits; it can run inline or on a worker thread.

pub mod archive;
pub mod compress;
pub mod decode;
pub mod dispatch;
pub mod encode;
pub mod file;
pub mod options;
pub mod size;

#[cfg(test)]
mod test_support;

pub use compress::{
    compress_image, compress_image_with_progress, CompressError, CompressionAttempt,
};
pub use decode::{
    load_image, read_orientation, render_file_to_surface, render_to_surface, DecodeError,
    ImageHandle, Orientation, PixelSurface,
};
pub use dispatch::{
    compress, CompressionFuture, Executor, InlineExecutor, VenueInitError, WorkerExecutor,
    WorkerMessage,
};
pub use encode::{surface_to_file, EncodeError, OutputFormat};
pub use file::{data_url_to_file, file_to_data_url, DataUrlError, ImageFile};
pub use options::{CompressionOptions, ProgressSink};
pub use size::{format_size, SizeFormatOptions};
