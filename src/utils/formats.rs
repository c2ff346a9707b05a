//! Source format allow-list.
//!
//! Discovery accepts files by extension only; there is no content sniffing at
//! this stage. A file with a matching extension that turns out not to be a
//! valid image fails later in the pipeline with a decode error.

use std::path::Path;

/// Lowercase extensions accepted as conversion sources.
pub const SUPPORTED_EXTENSIONS: [&str; 7] = ["jpg", "jpeg", "png", "tif", "tiff", "bmp", "webp"];

/// Returns the lowercase extension of `path`, if it has one.
pub fn lowercase_extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
}

/// Whether `path` names a supported source image, judged by extension alone.
pub fn is_supported_source(path: &Path) -> bool {
    match lowercase_extension(path) {
        Some(ext) => SUPPORTED_EXTENSIONS.contains(&ext.as_str()),
        None => false,
    }
}
