//! Child-process runner.

use std::process::{Command, Stdio};

use crate::error::{Result, SpritelyError};

use super::{CommandSpec, ToolOutput, ToolRunner};

/// Runs the tool as a real child process via `std::process::Command`.
///
/// Blocking and synchronous; stdout and stderr are captured in full. A
/// hung tool hangs the caller.
#[derive(Debug)]
pub struct SystemRunner;

impl ToolRunner for SystemRunner {
    fn run(&self, spec: &CommandSpec) -> Result<ToolOutput> {
        let output = Command::new(&spec.program)
            .args(&spec.args)
            .envs(spec.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .current_dir(&spec.cwd)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| SpritelyError::Io {
                path: spec.program.clone(),
                message: format!("Failed to launch sprite tool: {}", e),
            })?;

        Ok(ToolOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
