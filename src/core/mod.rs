pub mod options;
pub mod progress;
pub mod types;

pub use options::{default_concurrency, parse_widths, ConversionOptions, DEFAULT_NAME_PATTERN, DEFAULT_WIDTHS};
pub use progress::ProgressUpdate;
pub use types::{BatchSummary, ConversionResult, FailedSource};
