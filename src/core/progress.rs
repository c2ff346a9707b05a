//! Progress reporting types pushed to the external sink.

use serde::Serialize;

use crate::core::ConversionResult;

/// One completion notification: the finished source's result plus the batch
/// counters at the moment it finished. Pushed per source, in completion order.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressUpdate {
    /// Number of completed tasks, including this one.
    pub completed_tasks: usize,
    /// Total number of tasks in the batch.
    pub total_tasks: usize,
    /// Progress percentage (0-100).
    pub progress_percentage: usize,
    /// Result of the task that just completed.
    pub result: ConversionResult,
}

impl ProgressUpdate {
    pub fn new(completed_tasks: usize, total_tasks: usize, result: ConversionResult) -> Self {
        let progress_percentage = if total_tasks > 0 {
            (completed_tasks * 100) / total_tasks
        } else {
            0
        };
        Self {
            completed_tasks,
            total_tasks,
            progress_percentage,
            result,
        }
    }
}
