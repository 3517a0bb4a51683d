//! The convergence loop: decode once, then search encoder quality until the
//! output fits the size ceiling or the attempt budget runs out.
//!
//! # Architecture
//!
//! ```text
//! INIT -> DECODE -> SCALE_DECISION -> ENCODE_ATTEMPT -> SIZE_CHECK
//!                                          ^                |
//!                                          +-- RETRY <------+--> DONE | EXHAUSTED
//! ```
//!
//! The search is a fold over a [`QualitySchedule`], carrying only the
//! smallest candidate seen so far. Quality never increases, so the loop
//! makes at most `max_iteration` attempts. Running out of attempts is not an
//! error: the smallest candidate is returned instead.

mod progress;
mod schedule;

pub use schedule::{QualitySchedule, MIN_QUALITY, QUALITY_STEP};

use std::borrow::Cow;
use std::ops::ControlFlow;

use thiserror::Error;

use crate::decode::{read_orientation, render_scaled, DecodeError};
use crate::encode::{encode_as, same_mime_type, EncodeError, OutputFormat};
use crate::file::ImageFile;
use crate::options::CompressionOptions;
use progress::ProgressReporter;

/// Reasons a compression call rejects.
///
/// Failing to reach the size ceiling is never one of them.
#[derive(Debug, Error)]
pub enum CompressError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Encode(#[from] EncodeError),

    /// The worker went away without delivering a result.
    #[error("Compression worker terminated before producing a result")]
    WorkerTerminated,
}

/// One encode attempt, kept only to steer the search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompressionAttempt {
    pub quality: f64,
    /// Linear scale applied by the dimension ceiling (1.0 when none).
    pub scale: f64,
    pub size: u64,
}

/// A possible answer: either an encode attempt or the source bytes.
#[derive(Debug)]
struct Candidate<'a> {
    bytes: Cow<'a, [u8]>,
    attempt: Option<CompressionAttempt>,
}

impl Candidate<'_> {
    fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    fn smaller(self, other: Self) -> Self {
        if other.size() < self.size() {
            other
        } else {
            self
        }
    }
}

fn fits(size: u64, limit: Option<u64>) -> bool {
    limit.map_or(true, |limit| size <= limit)
}

/// Compress `file` according to `options`, synchronously on this thread.
///
/// Progress goes to `options.on_progress` as a non-decreasing sequence
/// ending at 100. The result is a new file named like the source, in the
/// output mime type, stamped with the source's timestamp (or now).
///
/// # Errors
///
/// Returns `CompressError::Encode` if the output type has no encoder and
/// `CompressError::Decode` if the source can't be decoded.
pub fn compress_image(
    file: &ImageFile,
    options: &CompressionOptions,
) -> Result<ImageFile, CompressError> {
    let sink = options.on_progress.clone();
    compress_image_with_progress(file, options, move |progress| {
        if let Some(sink) = &sink {
            sink.report(progress);
        }
    })
}

/// [`compress_image`], reporting progress to `on_progress` instead of the
/// sink in `options`. The callback need not be `Send`.
pub fn compress_image_with_progress(
    file: &ImageFile,
    options: &CompressionOptions,
    on_progress: impl FnMut(u8),
) -> Result<ImageFile, CompressError> {
    let mut reporter = ProgressReporter::new(on_progress);
    let target_mime = options.file_type.as_deref().unwrap_or(&file.mime_type);
    let limit = options.max_size_bytes();
    let max_edge = options.dimension_ceiling();

    let file_orientation = read_orientation(&file.bytes).unwrap_or_default();
    let orientation = options.exif_orientation.unwrap_or(file_orientation);
    let source_usable =
        same_mime_type(&file.mime_type, target_mime) && orientation == file_orientation;

    let result = |mime_type: &str, bytes: Vec<u8>| ImageFile {
        name: file.name.clone(),
        mime_type: mime_type.to_string(),
        last_modified: Some(file.last_modified_or_now()),
        bytes,
    };

    // Decided on mime strings alone: the source type may have no encoder.
    if source_usable && max_edge.is_none() && fits(file.size() as u64, limit) {
        log::debug!("{} needs no transformation, passing through", file.name);
        reporter.finish();
        return Ok(result(&file.mime_type, file.bytes.clone()));
    }

    let format = OutputFormat::from_mime_type(target_mime)?;
    let (surface, scale) = render_scaled(file, Some(orientation), max_edge)?;
    log::debug!(
        "{}: rendered {}x{} (scale {:.3}), target {} bytes",
        file.name,
        surface.width,
        surface.height,
        scale,
        limit.map_or_else(|| "unbounded".to_string(), |l| l.to_string())
    );

    // Without a downscale the source is still a valid answer and competes
    // with the re-encodes.
    let source = (source_usable && scale >= 1.0).then(|| Candidate {
        bytes: Cow::Borrowed(file.bytes.as_slice()),
        attempt: None,
    });

    let budget = if format.is_lossy() {
        options.attempt_budget()
    } else {
        1
    };
    let schedule = QualitySchedule::new(options.effective_initial_quality(), budget);

    let best = converge(schedule, budget, limit, source, &mut reporter, |quality| {
        let bytes = encode_as(&surface, format, quality)?;
        let attempt = CompressionAttempt {
            quality,
            scale,
            size: bytes.len() as u64,
        };
        Ok(Candidate {
            bytes: Cow::Owned(bytes),
            attempt: Some(attempt),
        })
    })?;

    match best.attempt {
        Some(attempt) => log::debug!(
            "{}: settled on quality {:.3} at {} bytes",
            file.name,
            attempt.quality,
            attempt.size
        ),
        None => log::debug!("{}: no attempt beat the source, keeping it", file.name),
    }
    reporter.finish();
    Ok(result(format.mime_type(), best.bytes.into_owned()))
}

/// Fold over the schedule until a candidate fits `limit`.
///
/// When nothing fits, the smallest candidate seen wins. `seed` is compared
/// against the outcome without counting as an attempt.
fn converge<'a>(
    mut schedule: QualitySchedule,
    budget: u32,
    limit: Option<u64>,
    seed: Option<Candidate<'a>>,
    reporter: &mut ProgressReporter<impl FnMut(u8)>,
    mut attempt: impl FnMut(f64) -> Result<Candidate<'a>, EncodeError>,
) -> Result<Candidate<'a>, EncodeError> {
    let first_quality = schedule.next().unwrap_or(MIN_QUALITY);
    let first = attempt(first_quality)?;
    log::trace!("attempt 1/{}: quality {:.3}, {} bytes", budget, first_quality, first.size());

    let mut attempts = 1u32;
    let outcome = if fits(first.size(), limit) {
        ControlFlow::Break(Ok(first))
    } else {
        schedule.try_fold(first, |best, quality| {
            reporter.step(attempts, budget);
            attempts += 1;

            let candidate = match attempt(quality) {
                Ok(candidate) => candidate,
                Err(e) => return ControlFlow::Break(Err(e)),
            };
            log::trace!(
                "attempt {}/{}: quality {:.3}, {} bytes",
                attempts,
                budget,
                quality,
                candidate.size()
            );
            if fits(candidate.size(), limit) {
                ControlFlow::Break(Ok(candidate))
            } else {
                ControlFlow::Continue(best.smaller(candidate))
            }
        })
    };

    let found = match outcome {
        ControlFlow::Break(result) => result?,
        ControlFlow::Continue(best) => {
            log::debug!("size ceiling not reached after {} attempts", attempts);
            best
        }
    };
    Ok(match seed {
        Some(source) => source.smaller(found),
        None => found,
    })
}
