//! Choosing where a compression runs.
//!
//! Both venues present the same contract: an owned file and options in, a
//! future of the result out, progress delivered to the caller's sink. The
//! worker venue runs the whole convergence loop on its own thread and talks
//! to the caller only through messages: the input goes over once, then
//! progress numbers and a single final result come back.

use std::io;
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;

use futures::channel::mpsc::{unbounded, UnboundedReceiver, UnboundedSender};
use futures::future::{self, BoxFuture, FutureExt};
use futures::StreamExt;
use thiserror::Error;

use crate::compress::{compress_image, compress_image_with_progress, CompressError};
use crate::file::ImageFile;
use crate::options::{CompressionOptions, ProgressSink};

/// The eventual result of a compression call.
pub type CompressionFuture = BoxFuture<'static, Result<ImageFile, CompressError>>;

/// A venue that can run the convergence loop.
pub trait Executor: Send + Sync {
    fn run(&self, file: ImageFile, options: CompressionOptions) -> CompressionFuture;
}

/// Runs on the caller's thread. The returned future is already complete.
#[derive(Debug, Clone, Copy, Default)]
pub struct InlineExecutor;

impl Executor for InlineExecutor {
    fn run(&self, file: ImageFile, options: CompressionOptions) -> CompressionFuture {
        future::ready(compress_image(&file, &options)).boxed()
    }
}

/// Messages a worker sends back to the caller.
#[derive(Debug)]
pub enum WorkerMessage {
    Progress(u8),
    /// Always the last message.
    Finished(Result<ImageFile, CompressError>),
}

/// The worker venue could not be started.
#[derive(Debug, Error)]
#[error("Failed to start compression worker: {0}")]
pub struct VenueInitError(#[from] io::Error);

/// Starts a job on some other thread.
pub type Spawner = Arc<dyn Fn(Box<dyn FnOnce() + Send>) -> io::Result<()> + Send + Sync>;

type WorkerInput = (ImageFile, CompressionOptions);

/// Runs each call on a dedicated worker thread.
///
/// If the worker can't be started the call runs inline instead; callers see
/// no difference beyond latency.
#[derive(Clone)]
pub struct WorkerExecutor {
    spawner: Spawner,
}

impl Default for WorkerExecutor {
    fn default() -> Self {
        Self::with_spawner(|job| {
            thread::Builder::new()
                .name("pixsqueeze-worker".to_string())
                .spawn(job)
                .map(drop)
        })
    }
}

impl std::fmt::Debug for WorkerExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerExecutor").finish_non_exhaustive()
    }
}

/// A started worker, waiting for its input.
struct Venue {
    inbox: mpsc::Sender<WorkerInput>,
    outbox: UnboundedReceiver<WorkerMessage>,
}

impl WorkerExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a custom way of starting worker threads.
    pub fn with_spawner(
        spawner: impl Fn(Box<dyn FnOnce() + Send>) -> io::Result<()> + Send + Sync + 'static,
    ) -> Self {
        Self {
            spawner: Arc::new(spawner),
        }
    }

    fn start(&self) -> Result<Venue, VenueInitError> {
        let (inbox, input) = mpsc::channel::<WorkerInput>();
        let (messages, outbox) = unbounded();
        (self.spawner)(Box::new(move || worker_main(input, messages)))?;
        Ok(Venue { inbox, outbox })
    }
}

impl Executor for WorkerExecutor {
    fn run(&self, file: ImageFile, mut options: CompressionOptions) -> CompressionFuture {
        let venue = match self.start() {
            Ok(venue) => venue,
            Err(e) => {
                log::warn!("{e}; compressing {} inline", file.name);
                return InlineExecutor.run(file, options);
            }
        };

        let sink = options.detach_progress();
        if let Err(mpsc::SendError((file, mut options))) = venue.inbox.send((file, options)) {
            log::warn!(
                "compression worker exited before receiving input; compressing {} inline",
                file.name
            );
            options.on_progress = sink;
            return InlineExecutor.run(file, options);
        }

        relay(venue.outbox, sink).boxed()
    }
}

/// Worker side: take the input once, stream progress, send the result.
fn worker_main(input: mpsc::Receiver<WorkerInput>, messages: UnboundedSender<WorkerMessage>) {
    let Ok((file, options)) = input.recv() else {
        return;
    };

    let result = compress_image_with_progress(&file, &options, |progress| {
        // The caller may have dropped the future; nothing to do then.
        let _ = messages.unbounded_send(WorkerMessage::Progress(progress));
    });
    let _ = messages.unbounded_send(WorkerMessage::Finished(result));
}

/// Caller side: replay progress on the local sink in arrival order and
/// resolve with the worker's result.
async fn relay(
    mut messages: UnboundedReceiver<WorkerMessage>,
    sink: Option<ProgressSink>,
) -> Result<ImageFile, CompressError> {
    while let Some(message) = messages.next().await {
        match message {
            WorkerMessage::Progress(progress) => {
                if let Some(sink) = &sink {
                    sink.report(progress);
                }
            }
            WorkerMessage::Finished(result) => return result,
        }
    }
    Err(CompressError::WorkerTerminated)
}

/// Compress `file`, on a worker thread when `options.use_web_worker` is set
/// and inline otherwise.
pub fn compress(file: ImageFile, options: CompressionOptions) -> CompressionFuture {
    if options.use_web_worker {
        WorkerExecutor::default().run(file, options)
    } else {
        InlineExecutor.run(file, options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::BYTES_PER_MB;
    use crate::test_support::{encode_test_png, noise_rgb, png_file};
    use futures::executor::block_on;
    use std::sync::Mutex;

    fn noise_file() -> ImageFile {
        png_file("noise.png", encode_test_png(&noise_rgb(32, 32), 32, 32))
    }

    fn squeezing_options() -> CompressionOptions {
        CompressionOptions::new()
            .with_file_type("image/jpeg")
            .with_max_size_mb(512.0 / BYTES_PER_MB)
            .with_max_iteration(5)
    }

    fn recorded(options: CompressionOptions) -> (CompressionOptions, Arc<Mutex<Vec<u8>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink_seen = Arc::clone(&seen);
        let options = options.with_progress(move |p| sink_seen.lock().unwrap().push(p));
        (options, seen)
    }

    fn failing_spawner() -> WorkerExecutor {
        WorkerExecutor::with_spawner(|_job| Err(io::Error::new(io::ErrorKind::Other, "no threads")))
    }

    #[test]
    fn test_inline_matches_direct_call() {
        let file = noise_file();
        let options = squeezing_options();

        let via_executor = block_on(InlineExecutor.run(file.clone(), options.clone())).unwrap();
        let direct = compress_image(&file, &options).unwrap();

        assert_eq!(via_executor.bytes, direct.bytes);
    }

    #[test]
    fn test_worker_matches_inline() {
        let file = noise_file();
        let options = squeezing_options();

        let inline = block_on(InlineExecutor.run(file.clone(), options.clone())).unwrap();
        let worker = block_on(WorkerExecutor::new().run(file, options)).unwrap();

        assert_eq!(worker, inline);
    }

    #[test]
    fn test_worker_relays_progress_in_order() {
        let (inline_options, inline_seen) = recorded(squeezing_options().with_max_size_mb(0.0));
        let (worker_options, worker_seen) = recorded(squeezing_options().with_max_size_mb(0.0));

        block_on(InlineExecutor.run(noise_file(), inline_options)).unwrap();
        block_on(WorkerExecutor::new().run(noise_file(), worker_options)).unwrap();

        assert_eq!(*worker_seen.lock().unwrap(), vec![20, 40, 60, 80, 100]);
        assert_eq!(*worker_seen.lock().unwrap(), *inline_seen.lock().unwrap());
    }

    #[test]
    fn test_spawn_failure_falls_back_inline() {
        let file = noise_file();
        let (options, seen) = recorded(squeezing_options());

        let fallback = block_on(failing_spawner().run(file.clone(), options.clone())).unwrap();
        let inline = block_on(InlineExecutor.run(file, options)).unwrap();

        assert_eq!(fallback.bytes, inline.bytes);
        assert_eq!(fallback.mime_type, inline.mime_type);
        assert_eq!(seen.lock().unwrap().last(), Some(&100));
    }

    #[test]
    fn test_worker_that_drops_its_job_falls_back_inline() {
        let executor = WorkerExecutor::with_spawner(|job| {
            drop(job);
            Ok(())
        });

        let result = block_on(executor.run(noise_file(), squeezing_options())).unwrap();
        assert_eq!(result.mime_type, "image/jpeg");
    }

    #[test]
    fn test_relay_without_result_is_terminated() {
        let (tx, rx) = unbounded();
        tx.unbounded_send(WorkerMessage::Progress(10)).unwrap();
        drop(tx);

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink_seen = Arc::clone(&seen);
        let sink = ProgressSink::new(move |p| sink_seen.lock().unwrap().push(p));

        let result = block_on(relay(rx, Some(sink)));

        assert!(matches!(result, Err(CompressError::WorkerTerminated)));
        assert_eq!(*seen.lock().unwrap(), vec![10]);
    }

    #[test]
    fn test_worker_propagates_errors() {
        let file = png_file("broken.png", vec![1, 2, 3, 4]);
        let options = CompressionOptions::new().with_max_width_or_height(10);

        let result = block_on(WorkerExecutor::new().run(file, options));
        assert!(matches!(result, Err(CompressError::Decode(_))));
    }

    #[test]
    fn test_compress_picks_venue() {
        let file = noise_file();
        let inline = block_on(compress(file.clone(), squeezing_options())).unwrap();
        let worker = block_on(compress(file, squeezing_options().with_web_worker(true))).unwrap();

        assert_eq!(inline.bytes, worker.bytes);
    }

    #[test]
    fn test_concurrent_worker_calls() {
        let calls = (0..4).map(|_| compress(noise_file(), squeezing_options().with_web_worker(true)));
        let results = block_on(future::join_all(calls));

        let first = results[0].as_ref().unwrap();
        for result in &results {
            assert_eq!(result.as_ref().unwrap().bytes, first.bytes);
        }
    }
}
