//! Batch conversion engine producing responsive, width-variant WebP
//! derivatives from a directory tree of raster images.
//!
//! The engine has four parts: [`discovery`] walks the input tree against a
//! fixed extension allow-list; [`core`] holds the immutable per-batch options
//! and the result/progress types; [`processing`] is the pure per-image
//! pipeline (decode, orientation, color-mode normalization, multi-width
//! Lanczos resize, WebP encode); [`worker`] fans pipelines out over a bounded
//! pool with push-based progress and per-source failure isolation.
//! [`batch::run_batch`] ties them together for drivers that just want a
//! progress sink and a final summary.

// Module declarations in dependency order
pub mod utils;
pub mod core;
pub mod discovery;
pub mod processing;
pub mod worker;
pub mod batch;

// Public exports for external consumers
pub use crate::batch::run_batch;
pub use crate::core::{BatchSummary, ConversionOptions, ConversionResult, ProgressUpdate};
pub use crate::utils::{ConvertError, ConvertResult};
pub use crate::worker::{BatchHandle, WorkerPool};
