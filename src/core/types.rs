//! Per-source results and the end-of-batch summary.

use std::path::PathBuf;

use serde::Serialize;

/// Outcome of one pipeline invocation. Immutable once produced; a source
/// either contributed its full list of derivatives or failed as a whole.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionResult {
    /// The source image this result belongs to.
    pub source: PathBuf,
    /// Every derivative written for this source, ascending by width.
    pub outputs: Vec<PathBuf>,
    /// Failure description when the source could not be converted.
    pub error: Option<String>,
}

impl ConversionResult {
    pub fn success(source: PathBuf, outputs: Vec<PathBuf>) -> Self {
        Self {
            source,
            outputs,
            error: None,
        }
    }

    pub fn failure(source: PathBuf, error: impl Into<String>) -> Self {
        Self {
            source,
            outputs: Vec::new(),
            error: Some(error.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// One failed source with its message, for the final breakdown.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FailedSource {
    pub source: PathBuf,
    pub error: String,
}

/// Aggregate totals for a completed batch.
///
/// A batch with failures is still a completed batch; whether that counts as
/// an overall failure is the driver's call.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSummary {
    /// Sources processed (successes and failures).
    pub total_sources: usize,
    /// Derivative files written across all sources.
    pub total_outputs: usize,
    /// Per-source failure breakdown.
    pub failures: Vec<FailedSource>,
    /// Wall-clock duration of the batch in milliseconds.
    pub elapsed_ms: u64,
}

impl BatchSummary {
    /// Folds one per-source result into the totals.
    pub fn record(&mut self, result: &ConversionResult) {
        self.total_sources += 1;
        self.total_outputs += result.outputs.len();
        if let Some(error) = &result.error {
            self.failures.push(FailedSource {
                source: result.source.clone(),
                error: error.clone(),
            });
        }
    }
}
