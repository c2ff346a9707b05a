//! Batch orchestration: validate options, discover sources, schedule the
//! pool, and fold completions into a summary.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use tracing::info;

use crate::core::{BatchSummary, ConversionOptions, ProgressUpdate};
use crate::discovery;
use crate::utils::ConvertResult;
use crate::worker::WorkerPool;

/// Runs one full batch: every supported image under `input_dir` is converted
/// into `output_dir`, with `sink` invoked once per completed source.
///
/// Batch-level errors (`NotFound`, `Config`) are returned before anything is
/// scheduled. Per-source decode/encode failures never fail the batch; they
/// arrive at the sink as failed results and in the summary's breakdown.
///
/// The caller's task is only ever suspended waiting on completion messages,
/// so a driver embedding this next to a UI stays responsive; drivers that
/// need finer control can use [`WorkerPool::spawn_batch`] directly.
pub async fn run_batch(
    input_dir: &Path,
    output_dir: &Path,
    options: ConversionOptions,
    mut sink: impl FnMut(&ProgressUpdate),
) -> ConvertResult<BatchSummary> {
    let options = options.normalized()?;
    let sources = discovery::discover(input_dir)?;
    let started = Instant::now();

    info!(
        sources = sources.len(),
        concurrency = options.concurrency,
        widths = ?options.widths,
        "starting batch"
    );

    let pool = WorkerPool::new(options.concurrency);
    let mut handle = pool.spawn_batch(sources, output_dir.to_path_buf(), Arc::new(options));

    let mut summary = BatchSummary::default();
    while let Some(update) = handle.next().await {
        summary.record(&update.result);
        sink(&update);
    }
    summary.elapsed_ms = started.elapsed().as_millis() as u64;

    info!(
        sources = summary.total_sources,
        derivatives = summary.total_outputs,
        failures = summary.failures.len(),
        elapsed_ms = summary.elapsed_ms,
        "batch complete"
    );
    Ok(summary)
}
