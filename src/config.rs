//! Tool configuration (spritely.yaml) parsing.
//!
//! The configuration is an immutable value constructed once, either from a
//! `spritely.yaml` manifest or programmatically, then passed by reference
//! into the filter. There are no setters; a `Config` that validates is
//! fully formed.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, SpritelyError};

/// The name of the manifest file.
pub const MANIFEST_FILENAME: &str = "spritely.yaml";

/// Log level forwarded to the sprite tool via `--log-level`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Warn,
    Ie6Notice,
    Info,
}

impl LogLevel {
    /// The literal flag value the tool expects.
    pub fn as_flag(self) -> &'static str {
        match self {
            LogLevel::Warn => "WARN",
            LogLevel::Ie6Notice => "IE6NOTICE",
            LogLevel::Info => "INFO",
        }
    }
}

/// Immutable filter configuration loaded from spritely.yaml.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Java executable used to launch the sprite tool.
    pub java: PathBuf,

    /// Jar archives joined into the CLASSPATH environment variable.
    pub classpath: Vec<PathBuf>,

    /// Install directory of the sprite tool. Used as the working directory
    /// for batched invocations; its `lib/` holds the extension jars.
    pub tool_home: PathBuf,

    /// Character encoding passed as `--css-file-encoding`.
    pub encoding: Option<String>,

    /// Tool log level (`WARN`, `IE6NOTICE`, `INFO`).
    pub log_level: Option<LogLevel>,

    /// Sprite PNG colour depth passed as `--sprite-png-depth`.
    pub png_depth: Option<u32>,

    /// Generate IE6-compatible PNGs (`--sprite-png-ie6`).
    pub ie6: Option<bool>,

    /// Suffix inserted before the `.css` extension of rewritten stylesheets.
    #[serde(default = "default_css_suffix")]
    pub css_suffix: String,

    /// Cache directory mirroring the source tree. The tool writes rewritten
    /// stylesheets and sprite images under it.
    #[serde(default = "default_cache_dir")]
    pub cache_dir: PathBuf,

    /// Filename patterns identifying sprite descriptor files.
    /// Checked before `stylesheet_patterns`.
    #[serde(default = "default_descriptor_patterns")]
    pub descriptor_patterns: Vec<String>,

    /// Filename patterns identifying plain stylesheets.
    #[serde(default = "default_stylesheet_patterns")]
    pub stylesheet_patterns: Vec<String>,

    /// Batch all stale stylesheets of a run into one tool invocation.
    pub batch: bool,
}

fn default_css_suffix() -> String {
    "-sprite".to_string()
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from(".spritely-cache")
}

fn default_descriptor_patterns() -> Vec<String> {
    vec!["*.sprite.css".to_string()]
}

fn default_stylesheet_patterns() -> Vec<String> {
    vec!["*.css".to_string()]
}

impl Default for Config {
    fn default() -> Self {
        Self {
            java: PathBuf::from("java"),
            classpath: vec![],
            tool_home: PathBuf::from("."),
            encoding: None,
            log_level: None,
            png_depth: None,
            ie6: None,
            css_suffix: default_css_suffix(),
            cache_dir: default_cache_dir(),
            descriptor_patterns: default_descriptor_patterns(),
            stylesheet_patterns: default_stylesheet_patterns(),
            batch: false,
        }
    }
}

impl Config {
    /// Load configuration from a spritely.yaml file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| SpritelyError::Io {
            path: path.to_path_buf(),
            message: format!("Failed to read manifest: {}", e),
        })?;

        Self::parse(&content)
    }

    /// Parse configuration from a YAML string.
    pub fn parse(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| SpritelyError::Parse {
            message: format!("Invalid manifest: {}", e),
            help: Some("Check spritely.yaml syntax".to_string()),
        })
    }

    /// Validate the configuration.
    ///
    /// A bare executable name (e.g. `java`) is assumed to resolve via PATH;
    /// an explicit path must exist on disk. Classpath entries must exist.
    pub fn validate(&self) -> Result<()> {
        if self.java.components().count() > 1 && !self.java.exists() {
            return Err(SpritelyError::Configuration {
                message: format!("tool executable not found: {}", self.java.display()),
                help: Some("Set `java:` in spritely.yaml to a valid JVM path".to_string()),
            });
        }

        for jar in &self.classpath {
            if !jar.exists() {
                return Err(SpritelyError::Configuration {
                    message: format!("classpath entry not found: {}", jar.display()),
                    help: None,
                });
            }
        }

        Ok(())
    }

    /// Join classpath entries with the platform's CLASSPATH separator.
    pub fn classpath_value(&self) -> String {
        let sep = if cfg!(windows) { ";" } else { ":" };
        self.classpath
            .iter()
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join(sep)
    }
}
