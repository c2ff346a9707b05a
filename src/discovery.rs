//! Source discovery: recursive directory walk with a fixed extension allow-list.

use std::path::{Path, PathBuf};

use tracing::warn;
use walkdir::WalkDir;

use crate::utils::{is_supported_source, ConvertError, ConvertResult};

/// Lazily yields every supported image file beneath `root`, recursively.
///
/// Symbolic links are never followed, so cyclic directory links cannot cause
/// unbounded recursion. Entries are sorted by file name within each directory,
/// making the order deterministic for a given directory state. Unreadable
/// entries are skipped with a warning rather than aborting the walk.
pub fn iter_sources(root: &Path) -> impl Iterator<Item = PathBuf> {
    WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(e) if e.file_type().is_file() && is_supported_source(e.path()) => {
                Some(e.into_path())
            }
            Ok(_) => None,
            Err(err) => {
                warn!("skipping unreadable entry during discovery: {err}");
                None
            }
        })
}

/// Collects all discovered sources, failing with `NotFound` when `root` is
/// missing or not a directory.
pub fn discover(root: &Path) -> ConvertResult<Vec<PathBuf>> {
    if !root.is_dir() {
        return Err(ConvertError::NotFound(root.to_path_buf()));
    }
    Ok(iter_sources(root).collect())
}
