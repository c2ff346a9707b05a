//! Bounded worker pool driving one pipeline invocation per source.
//!
//! Work units are whole sources, never individual widths: per-source decode
//! and normalization are shared by all widths of that source and must not be
//! duplicated across workers.

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::{mpsc, Semaphore};
use tracing::{debug, warn};

use crate::core::{ConversionOptions, ConversionResult, ProgressUpdate};
use crate::processing::convert_single;

#[derive(Clone)]
pub struct WorkerPool {
    semaphore: Arc<Semaphore>,
    concurrency: usize,
}

/// Receiving side of a running batch: one `ProgressUpdate` per source, in
/// completion order. Yields `None` once every submitted task has reported,
/// which is the batch's completion condition (clean drain, no preemption).
pub struct BatchHandle {
    total: usize,
    receiver: mpsc::UnboundedReceiver<ProgressUpdate>,
}

impl BatchHandle {
    pub fn total(&self) -> usize {
        self.total
    }

    pub async fn next(&mut self) -> Option<ProgressUpdate> {
        self.receiver.recv().await
    }
}

impl WorkerPool {
    pub fn new(concurrency: usize) -> Self {
        let concurrency = concurrency.max(1);
        Self {
            semaphore: Arc::new(Semaphore::new(concurrency)),
            concurrency,
        }
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Enqueues every source up front and returns immediately; the caller
    /// drains the returned handle while workers run.
    ///
    /// Completions are pushed over an unbounded channel, so a slow sink never
    /// blocks task execution. One task's failure (including a panic inside
    /// the pipeline) is reduced to a failed result and never cancels, retries,
    /// or blocks the others.
    pub fn spawn_batch(
        &self,
        sources: Vec<PathBuf>,
        out_dir: PathBuf,
        options: Arc<ConversionOptions>,
    ) -> BatchHandle {
        let total = sources.len();
        let completed = Arc::new(AtomicUsize::new(0));
        let (tx, receiver) = mpsc::unbounded_channel();

        for source in sources {
            let semaphore = Arc::clone(&self.semaphore);
            let options = Arc::clone(&options);
            let out_dir = out_dir.clone();
            let completed = Arc::clone(&completed);
            let tx = tx.clone();

            tokio::spawn(async move {
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(e) => {
                        // The pool never closes its own semaphore; report and bail.
                        warn!(source = %source.display(), "failed to acquire worker permit: {e}");
                        let result =
                            ConversionResult::failure(source, format!("worker unavailable: {e}"));
                        let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
                        let _ = tx.send(ProgressUpdate::new(done, total, result));
                        return;
                    }
                };

                debug!(source = %source.display(), "worker started");
                let task_source = source.clone();
                let task_options = Arc::clone(&options);
                let joined = tokio::task::spawn_blocking(move || {
                    convert_single(&task_source, &out_dir, &task_options)
                })
                .await;

                let result = match joined {
                    Ok(Ok(outputs)) => ConversionResult::success(source, outputs),
                    Ok(Err(e)) => {
                        warn!(source = %source.display(), "conversion failed: {e}");
                        ConversionResult::failure(source, e.to_string())
                    }
                    Err(e) => {
                        warn!(source = %source.display(), "conversion task panicked: {e}");
                        ConversionResult::failure(source, format!("conversion task panicked: {e}"))
                    }
                };

                let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
                let _ = tx.send(ProgressUpdate::new(done, total, result));
            });
        }

        BatchHandle { total, receiver }
    }
}
