//! Timestamp-gated cache freshness.
//!
//! The cache directory mirrors the source tree. An entry is fresh when its
//! modification time is not older than the source's; there is no content
//! hashing and no locking. Concurrent runs can duplicate regeneration work
//! but cannot corrupt entries, since the tool replaces files whole.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Cache path mirroring a relative source path under the cache root.
pub fn cache_path_for(cache_root: &Path, source_path: &Path) -> PathBuf {
    cache_root.join(source_path)
}

/// Path of the rewritten stylesheet the tool writes for a given input.
///
/// The tool inserts the configured suffix before the extension:
/// `css/main.css` with suffix `-sprite` becomes `css/main-sprite.css`.
/// An empty suffix means the tool rewrites the staged copy in place.
pub fn rewritten_path(cache_root: &Path, source_path: &Path, suffix: &str) -> PathBuf {
    with_suffix(&cache_path_for(cache_root, source_path), suffix)
}

/// Insert a suffix before a path's extension: `main.css` + `-sprite`
/// becomes `main-sprite.css`.
pub fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    if suffix.is_empty() {
        return path.to_path_buf();
    }

    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let renamed = match path.extension() {
        Some(ext) => format!("{}{}.{}", stem, suffix, ext.to_string_lossy()),
        None => format!("{}{}", stem, suffix),
    };

    let mut path = path.to_path_buf();
    path.set_file_name(renamed);
    path
}

/// Whether a cache entry needs regenerating.
///
/// A missing entry is stale. Otherwise the entry is stale only when the
/// source's modification time is strictly greater than the entry's.
pub fn is_stale(source: &Path, cached: &Path) -> Result<bool> {
    if !cached.exists() {
        return Ok(true);
    }

    let source_mtime = fs::metadata(source)?.modified()?;
    let cached_mtime = fs::metadata(cached)?.modified()?;

    Ok(source_mtime > cached_mtime)
}
