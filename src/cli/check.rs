//! Check command implementation.
//!
//! Validates the configuration and parses every sprite directive found
//! under the source root, without invoking the external tool.

use std::path::PathBuf;

use clap::Args;

use crate::asset::{scan_sources, Asset};
use crate::config::{Config, MANIFEST_FILENAME};
use crate::error::{Result, SpritelyError};
use crate::filter::directive;
use crate::output::{display_path, plural, Printer};

/// Validate configuration and sprite directives
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Source root to scan for CSS assets
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Manifest path (default: spritely.yaml under the source root)
    #[arg(long, short)]
    pub config: Option<PathBuf>,
}

pub fn run(args: CheckArgs) -> Result<()> {
    let printer = Printer::new();

    let manifest_path = args
        .config
        .clone()
        .unwrap_or_else(|| args.path.join(MANIFEST_FILENAME));
    let config = if manifest_path.exists() {
        Config::load(&manifest_path)?
    } else {
        Config::default()
    };
    config.validate()?;

    printer.status("Checking", &display_path(&args.path));

    let sources = scan_sources(&args.path, &config);
    let mut directives = 0;
    let mut problems = 0;

    for source in &sources {
        let asset = Asset::load(&args.path, source)?;
        let content = asset.content_str();

        if !directive::contains_directive(&content) {
            continue;
        }
        directives += 1;

        match directive::parse_directive(&content) {
            Ok(parsed) => {
                printer.info(
                    "Directive",
                    &format!("{}: sprite '{}'", source.display(), parsed.name),
                );
            }
            Err(e) => {
                problems += 1;
                printer.error("Invalid", &format!("{}: {}", source.display(), e));
            }
        }
    }

    if problems > 0 {
        return Err(SpritelyError::DirectiveParse {
            message: format!(
                "{} failed to parse",
                plural(problems, "directive", "directives")
            ),
            help: None,
        });
    }

    printer.success(
        "Finished",
        &format!(
            "{} across {}",
            plural(directives, "directive", "directives"),
            plural(sources.len(), "asset", "assets")
        ),
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_check_clean_tree() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("main.css"),
            "/** sprite: logo; sprite-image: url(/img/${sprite}.png) */",
        )
        .unwrap();
        fs::write(dir.path().join("plain.css"), "body {}").unwrap();

        let args = CheckArgs {
            path: dir.path().to_path_buf(),
            config: None,
        };

        run(args).unwrap();
    }

    #[test]
    fn test_check_reports_malformed_directive() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("bad.css"), "/** sprite: logo */").unwrap();

        let args = CheckArgs {
            path: dir.path().to_path_buf(),
            config: None,
        };

        let err = run(args).unwrap_err();
        assert!(matches!(err, SpritelyError::DirectiveParse { .. }));
    }

    #[test]
    fn test_check_rejects_bad_config() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join(MANIFEST_FILENAME),
            "java: /nonexistent/jvm/bin/java\n",
        )
        .unwrap();

        let args = CheckArgs {
            path: dir.path().to_path_buf(),
            config: None,
        };

        let err = run(args).unwrap_err();
        assert!(matches!(err, SpritelyError::Configuration { .. }));
    }
}
