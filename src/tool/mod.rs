//! Sprite tool invocation.
//!
//! Argument construction is a pure function from configuration and inputs
//! to a [`CommandSpec`]; actually spawning a process lives behind the
//! [`ToolRunner`] trait so the filter tests against a mock without a JVM.

mod runner;

use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::error::{Result, SpritelyError};

pub use runner::SystemRunner;

/// Entry point class of the SmartSprites tool.
pub const MAIN_CLASS: &str = "org.carrot2.labs.smartsprites.SmartSprites";

/// The tool sometimes exits 0 while reporting failures on stdout; this
/// marker identifies those runs.
pub const ERROR_MARKER: &str = "ERROR:";

/// A fully constructed child-process invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub env: Vec<(String, String)>,
    pub cwd: PathBuf,
}

/// Captured result of a tool run.
#[derive(Debug, Clone)]
pub struct ToolOutput {
    /// Exit code; `None` when the process was killed by a signal.
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

/// Executes a [`CommandSpec`] synchronously.
///
/// The real implementation spawns a child process and blocks until it
/// exits; no timeout is enforced at this layer.
pub trait ToolRunner {
    fn run(&self, spec: &CommandSpec) -> Result<ToolOutput>;
}

/// Build the invocation for a set of CSS files.
///
/// Produces the headless-JVM argument vector the tool expects, with
/// CLASSPATH assembled from the configured archives. `document_root` is
/// where the tool resolves absolute `url()` paths and writes outputs;
/// `cwd` differs by variant (tool install dir for batched runs, the
/// asset's source root otherwise).
pub fn command_spec(
    config: &Config,
    css_files: &[PathBuf],
    document_root: &Path,
    cwd: &Path,
) -> CommandSpec {
    let mut args = vec![
        "-Djava.awt.headless=true".to_string(),
        "-Djava.ext.dirs=lib".to_string(),
        MAIN_CLASS.to_string(),
    ];

    if let Some(encoding) = &config.encoding {
        args.push("--css-file-encoding".to_string());
        args.push(encoding.clone());
    }

    if let Some(level) = config.log_level {
        args.push("--log-level".to_string());
        args.push(level.as_flag().to_string());
    }

    args.push("--document-root-dir-path".to_string());
    args.push(document_root.display().to_string());

    if let Some(depth) = config.png_depth {
        args.push("--sprite-png-depth".to_string());
        args.push(depth.to_string());
    }

    if let Some(ie6) = config.ie6 {
        args.push("--sprite-png-ie6".to_string());
        args.push(ie6.to_string());
    }

    if !config.css_suffix.is_empty() {
        args.push("--css-file-suffix".to_string());
        args.push(config.css_suffix.clone());
    }

    args.push("--css-files".to_string());
    for file in css_files {
        args.push(file.display().to_string());
    }

    let env = vec![("CLASSPATH".to_string(), config.classpath_value())];

    CommandSpec {
        program: config.java.clone(),
        args,
        env,
        cwd: cwd.to_path_buf(),
    }
}

/// Classify a completed run.
///
/// Non-zero exit is an execution failure carrying stderr verbatim; a zero
/// exit whose stdout contains the error marker is a tool-reported failure.
pub fn check_output(output: &ToolOutput) -> Result<()> {
    if output.code != Some(0) {
        return Err(SpritelyError::Execution {
            code: output.code.unwrap_or(-1),
            stderr: output.stderr.clone(),
        });
    }

    if output.stdout.contains(ERROR_MARKER) {
        return Err(SpritelyError::ToolReported {
            stdout: output.stdout.clone(),
        });
    }

    Ok(())
}
