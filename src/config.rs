//! Configuration loaded from `frdtest.yaml`.
//!
//! Every field is optional; a missing file means all defaults.
//!
//! ```yaml
//! vocabulary:
//!   fixture_marker: ":frd:"
//!   function_keyword: def
//!   interface_keyword: import
//! output_prefix: test_
//! discovery:
//!   prefix: test
//!   extension: py
//! runner:
//!   program: python3
//!   args: ["-m", "unittest", "-v"]
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::syntax::Vocabulary;
use crate::{err_msg, FrdError};

pub const DEFAULT_CONFIG_FILE: &str = "frdtest.yaml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub vocabulary: Vocabulary,
    /// Prepended to the source file name to name the generated suite.
    pub output_prefix: String,
    pub discovery: DiscoveryConfig,
    pub runner: RunnerConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            vocabulary: Vocabulary::default(),
            output_prefix: "test_".to_string(),
            discovery: DiscoveryConfig::default(),
            runner: RunnerConfig::default(),
        }
    }
}

/// Which files count as test files: `<prefix>*.<extension>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DiscoveryConfig {
    pub prefix: String,
    pub extension: String,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            prefix: "test".to_string(),
            extension: "py".to_string(),
        }
    }
}

/// The external program that runs discovered suites. File paths are appended to `args`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunnerConfig {
    pub program: String,
    pub args: Vec<String>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            program: "python3".to_string(),
            args: vec!["-m".into(), "unittest".into(), "-v".into()],
        }
    }
}

impl Config {
    pub fn from_yaml(text: &str) -> Result<Self, FrdError> {
        serde_yaml::from_str(text)
            .map_err(|e| err_msg!(Config, "Invalid configuration: {}", e).with_cause(e))
    }

    pub fn from_file(path: &Path) -> Result<Self, FrdError> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            err_msg!(Config, "Failed to read config '{}'", path.display()).with_cause(e)
        })?;
        let config = Self::from_yaml(&text)?;
        debug!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    /// An explicit path must exist; otherwise `frdtest.yaml` in `dir` is used when present.
    pub fn load(explicit: Option<&Path>, dir: &Path) -> Result<Self, FrdError> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        let implicit: PathBuf = dir.join(DEFAULT_CONFIG_FILE);
        if implicit.is_file() {
            return Self::from_file(&implicit);
        }
        Ok(Self::default())
    }
}
