//! [`CommandRunner`] that executes commands through `sh -c`.

use crate::traits::CommandRunner;
use log::{debug, info};
use std::process::Command;

/// Runs synthesized commands with the system shell.
///
/// With `dry_run` set, commands are only logged.
#[derive(Debug, Default, Clone)]
pub struct ShellRunner {
    pub dry_run: bool,
}

/// A command could not be started or exited unsuccessfully.
#[derive(Debug, thiserror::Error)]
#[error("command failed: {0}")]
pub struct RunnerError(String);

impl ShellRunner {
    pub fn new(dry_run: bool) -> Self {
        Self { dry_run }
    }
}

impl CommandRunner for ShellRunner {
    type Error = RunnerError;

    fn run(&self, command: &str) -> Result<(), RunnerError> {
        if self.dry_run {
            info!("dry run: {}", command);
            return Ok(());
        }
        debug!("sh -c {:?}", command);
        let output = Command::new("sh")
            .arg("-c")
            .arg(command)
            .output()
            .map_err(|e| RunnerError(format!("failed to spawn sh: {}", e)))?;
        if output.status.success() {
            Ok(())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(RunnerError(format!("{} ({})", output.status, stderr.trim())))
        }
    }
}
