//! Error types for the conversion engine.
//!
//! `NotFound` and `Config` are batch-level: surfaced to the caller before any
//! task is scheduled. `Decode` and `Encode` are source-level: caught per task
//! and reduced to a failed `ConversionResult`, never thrown across task
//! boundaries.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConvertError {
    /// Input root does not exist or is not a directory.
    #[error("input directory not found: {0}")]
    NotFound(PathBuf),

    /// Invalid options: empty widths, out-of-range quality, bad name pattern.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Source file is unreadable or not a valid image of a supported codec.
    #[error("decode failed: {0}")]
    Decode(String),

    /// Resampling, encoding, or writing a derivative failed.
    #[error("encode failed: {0}")]
    Encode(String),
}

/// Convenience result type for engine operations.
pub type ConvertResult<T> = Result<T, ConvertError>;

impl ConvertError {
    pub fn config<T: Into<String>>(msg: T) -> Self {
        Self::Config(msg.into())
    }

    pub fn decode<T: Into<String>>(msg: T) -> Self {
        Self::Decode(msg.into())
    }

    pub fn encode<T: Into<String>>(msg: T) -> Self {
        Self::Encode(msg.into())
    }
}
