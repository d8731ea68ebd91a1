//! Hand-off to the external test runner.
//!
//! frdtest never executes generated tests itself. Discovered files are passed to a
//! [`SuiteRunner`]; the default one spawns the configured program (`python3 -m unittest -v`)
//! inside the discovery directory and waits for it.

use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{debug, info};

use crate::config::RunnerConfig;
use crate::{err_msg, FrdError};

/// What a runner reports back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub files: Vec<PathBuf>,
    pub passed: bool,
    pub exit_code: Option<i32>,
}

impl RunSummary {
    /// Nothing to run counts as a pass.
    pub fn nothing_to_run() -> Self {
        Self {
            files: Vec::new(),
            passed: true,
            exit_code: None,
        }
    }
}

pub trait SuiteRunner {
    /// Runs `files`, all of which live in `dir`. Failing tests are reported in the summary;
    /// only a runner that cannot start is an error.
    fn run(&self, dir: &Path, files: &[PathBuf]) -> Result<RunSummary, FrdError>;
}

/// Spawns an external program with the discovered files appended to its arguments.
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    config: RunnerConfig,
}

impl ProcessRunner {
    pub fn new(config: RunnerConfig) -> Self {
        Self { config }
    }

    /// The full command line, with paths made relative to `dir` where possible.
    pub fn command_line(&self, dir: &Path, files: &[PathBuf]) -> Vec<String> {
        let mut argv = Vec::with_capacity(1 + self.config.args.len() + files.len());
        argv.push(self.config.program.clone());
        argv.extend(self.config.args.iter().cloned());
        argv.extend(files.iter().map(|f| {
            f.strip_prefix(dir)
                .unwrap_or(f)
                .to_string_lossy()
                .into_owned()
        }));
        argv
    }
}

impl SuiteRunner for ProcessRunner {
    fn run(&self, dir: &Path, files: &[PathBuf]) -> Result<RunSummary, FrdError> {
        if files.is_empty() {
            return Ok(RunSummary::nothing_to_run());
        }

        let argv = self.command_line(dir, files);
        debug!(dir = %dir.display(), command = ?argv, "spawning test runner");

        let status = Command::new(&argv[0])
            .args(&argv[1..])
            .current_dir(dir)
            .status()
            .map_err(|e| {
                err_msg!(Runner, "Failed to start '{}'", self.config.program).with_cause(e)
            })?;

        info!(exit_code = ?status.code(), "test runner finished");
        Ok(RunSummary {
            files: files.to_vec(),
            passed: status.success(),
            exit_code: status.code(),
        })
    }
}
