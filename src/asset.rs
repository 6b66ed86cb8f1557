//! In-memory asset representation shared with the enclosing pipeline.
//!
//! The pipeline owns assets; the filter mutates `content` and `target_path`
//! only. `source_root` and `source_path` are read-only inputs.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::config::Config;
use crate::pattern;

/// One unit of pipeline content flowing through the filter.
#[derive(Debug, Clone)]
pub struct Asset {
    /// Raw content bytes. Replaced with rewritten output by the filter.
    pub content: Vec<u8>,
    /// Base directory the source tree is rooted at.
    pub source_root: PathBuf,
    /// Path of the source file, relative to `source_root`.
    pub source_path: PathBuf,
    /// Output path the pipeline will write to. The filter retargets
    /// descriptor assets at the generated sprite image.
    pub target_path: PathBuf,
}

impl Asset {
    /// Create an asset with target path defaulting to the source path.
    pub fn new(content: Vec<u8>, source_root: PathBuf, source_path: PathBuf) -> Self {
        let target_path = source_path.clone();
        Self {
            content,
            source_root,
            source_path,
            target_path,
        }
    }

    /// Read an asset's content from disk.
    pub fn load(source_root: &Path, source_path: &Path) -> crate::error::Result<Self> {
        let absolute = source_root.join(source_path);
        let content = std::fs::read(&absolute).map_err(|e| crate::error::SpritelyError::Io {
            path: absolute,
            message: format!("Failed to read asset: {}", e),
        })?;

        Ok(Self::new(
            content,
            source_root.to_path_buf(),
            source_path.to_path_buf(),
        ))
    }

    /// Absolute path of the source file.
    pub fn absolute_source(&self) -> PathBuf {
        self.source_root.join(&self.source_path)
    }

    /// Content interpreted as UTF-8, lossily.
    pub fn content_str(&self) -> String {
        String::from_utf8_lossy(&self.content).into_owned()
    }
}

/// How the filter loads an asset once its cache entry is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    /// A sprite descriptor: the asset is retargeted at the generated image.
    Descriptor,
    /// A stylesheet: the asset's content becomes the rewritten CSS.
    Stylesheet,
}

/// Classify a file by the configured filename patterns.
///
/// Descriptor patterns are checked first so that `*.sprite.css` wins over a
/// catch-all `*.css`. Returns `None` for files the filter does not handle.
pub fn detect_asset_kind(path: &Path, config: &Config) -> Option<AssetKind> {
    let filename = path.file_name()?.to_str()?;

    for pat in &config.descriptor_patterns {
        if pattern::matches(filename, pat) {
            return Some(AssetKind::Descriptor);
        }
    }

    for pat in &config.stylesheet_patterns {
        if pattern::matches(filename, pat) {
            return Some(AssetKind::Stylesheet);
        }
    }

    None
}

/// Scan a source root for files the filter handles.
///
/// Returns paths relative to the root, in walk order.
pub fn scan_sources(root: &Path, config: &Config) -> Vec<PathBuf> {
    let mut found = Vec::new();

    if !root.exists() {
        return found;
    }

    for entry in WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();

        if path.is_dir() {
            continue;
        }

        if detect_asset_kind(path, config).is_some() {
            if let Ok(relative) = path.strip_prefix(root) {
                found.push(relative.to_path_buf());
            }
        }
    }

    found
}
