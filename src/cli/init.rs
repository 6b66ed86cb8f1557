//! Init command implementation.
//!
//! Generates a starter `spritely.yaml` manifest.

use std::fs;
use std::path::PathBuf;

use clap::Args;

use crate::config::{Config, MANIFEST_FILENAME};
use crate::error::{Result, SpritelyError};
use crate::output::{display_path, Printer};

/// Initialize a project by generating a spritely.yaml manifest
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Directory to initialize (default: current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Overwrite existing spritely.yaml
    #[arg(long)]
    pub force: bool,
}

pub fn run(args: InitArgs) -> Result<()> {
    let printer = Printer::new();
    let manifest_path = args.path.join(MANIFEST_FILENAME);

    if manifest_path.exists() && !args.force {
        return Err(SpritelyError::Configuration {
            message: format!("{} already exists", MANIFEST_FILENAME),
            help: Some("Use --force to overwrite".to_string()),
        });
    }

    let config = Config::default();
    let yaml = serde_yaml::to_string(&config).map_err(|e| SpritelyError::Parse {
        message: format!("Failed to serialize manifest: {}", e),
        help: None,
    })?;

    fs::write(&manifest_path, yaml).map_err(|e| SpritelyError::Io {
        path: manifest_path.clone(),
        message: format!("Failed to write manifest: {}", e),
    })?;

    printer.success("Created", &display_path(&manifest_path));

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_init_writes_loadable_manifest() {
        let dir = tempdir().unwrap();
        let args = InitArgs {
            path: dir.path().to_path_buf(),
            force: false,
        };

        run(args).unwrap();

        let written = Config::load(&dir.path().join(MANIFEST_FILENAME)).unwrap();
        assert_eq!(written.css_suffix, Config::default().css_suffix);
    }

    #[test]
    fn test_init_refuses_overwrite_without_force() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(MANIFEST_FILENAME), "batch: true\n").unwrap();

        let args = InitArgs {
            path: dir.path().to_path_buf(),
            force: false,
        };

        assert!(run(args).is_err());
    }

    #[test]
    fn test_init_force_overwrites() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(MANIFEST_FILENAME), "batch: true\n").unwrap();

        let args = InitArgs {
            path: dir.path().to_path_buf(),
            force: true,
        };

        run(args).unwrap();

        let written = Config::load(&dir.path().join(MANIFEST_FILENAME)).unwrap();
        assert!(!written.batch);
    }
}
