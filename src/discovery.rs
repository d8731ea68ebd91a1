use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::config::DiscoveryConfig;
use crate::{err_msg, FrdError};

/// Finds generated (or hand-written) test files in a directory.
///
/// Only the directory itself is searched, matching how suites are written next to their
/// sources.
#[derive(Debug)]
pub struct TestDiscoverer<'c> {
    pattern: &'c DiscoveryConfig,
}

impl<'c> TestDiscoverer<'c> {
    pub fn new(pattern: &'c DiscoveryConfig) -> Self {
        Self { pattern }
    }

    /// Lists files matching `<prefix>*.<extension>` in `root`.
    ///
    /// The returned list is sorted to ensure deterministic execution order.
    pub fn discover_test_files<P: AsRef<Path>>(&self, root: P) -> Result<Vec<PathBuf>, FrdError> {
        let mut files = Vec::new();
        for entry in WalkDir::new(root.as_ref()).min_depth(1).max_depth(1) {
            let entry = entry.map_err(|e| {
                err_msg!(Io, "Failed to walk '{}'", root.as_ref().display()).with_cause(e)
            })?;

            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            if !self.is_test_file(path) {
                continue;
            }

            files.push(path.to_path_buf());
        }
        files.sort();
        Ok(files)
    }

    /// Returns true if the file name starts with the prefix and has the extension.
    pub fn is_test_file(&self, path: &Path) -> bool {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            return false;
        };
        name.starts_with(&self.pattern.prefix)
            && path
                .extension()
                .is_some_and(|ext| ext == self.pattern.extension.as_str())
    }
}
