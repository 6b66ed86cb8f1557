//! Generated-output discovery.
//!
//! The sprite tool embeds timestamps or hashes in generated filenames and
//! may leave stale outputs from earlier runs beside them. Resolution walks
//! the output root for files matching the directive's glob and picks the
//! most recently modified; modification-time ties fall back to path order
//! so the choice is deterministic for a given listing.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use walkdir::WalkDir;

use crate::error::{Result, SpritelyError};
use crate::pattern;

/// Resolve the newest file under `root` matching `glob`.
///
/// The glob is matched against paths relative to `root`; a leading `/` in
/// the pattern (templates are document-root absolute URLs) is ignored.
/// Fails with `NoOutputFound` when nothing matches.
pub fn locate_newest(root: &Path, glob: &str) -> Result<PathBuf> {
    let mut matches: Vec<(SystemTime, PathBuf)> = Vec::new();

    for entry in WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();

        if path.is_dir() {
            continue;
        }

        let Ok(relative) = path.strip_prefix(root) else {
            continue;
        };
        let relative_str = relative.to_string_lossy().replace('\\', "/");

        if pattern::matches(&relative_str, glob) {
            let mtime = path
                .metadata()
                .and_then(|m| m.modified())
                .unwrap_or(SystemTime::UNIX_EPOCH);
            matches.push((mtime, path.to_path_buf()));
        }
    }

    // Newest wins; equal timestamps resolve by path order.
    match matches.into_iter().max() {
        Some((_, newest)) => Ok(newest),
        None => Err(SpritelyError::NoOutputFound {
            root: root.to_path_buf(),
            pattern: glob.to_string(),
            help: Some("Did the sprite tool run against this document root?".to_string()),
        }),
    }
}
