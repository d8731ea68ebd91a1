use std::path::{Path, PathBuf};

use tracing::info;

use crate::codegen::{module_name, render_suite, test_file_path, write_suite};
use crate::config::Config;
use crate::diagnostics::to_error_source;
use crate::discovery::TestDiscoverer;
use crate::plan::{PlanBuilder, ScanOutcome};
use crate::runner::{RunSummary, SuiteRunner};
use crate::{err_msg, FrdError};

// ============================================================================
// GENERATED SUITE
// ============================================================================

/// The result of one scan-then-generate pass over a source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedSuite {
    pub module: String,
    pub test_path: PathBuf,
    pub outcome: ScanOutcome,
    pub contents: String,
}

impl GeneratedSuite {
    /// Writes the suite to [`GeneratedSuite::test_path`], replacing any earlier version.
    pub fn write(&self) -> Result<(), FrdError> {
        write_suite(&self.test_path, &self.contents)
    }
}

// ============================================================================
// PIPELINE
// ============================================================================

/// Scan → validate → generate, configured once and reusable across files.
#[derive(Debug, Clone, Default)]
pub struct GenerationPipeline {
    config: Config,
}

impl GenerationPipeline {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn read_file(path: &Path) -> Result<String, FrdError> {
        std::fs::read_to_string(path).map_err(|e| {
            err_msg!(Io, "Failed to read source '{}'", path.display()).with_cause(e)
        })
    }

    /// Scans in-memory text; `name` only labels diagnostics.
    pub fn scan_source(&self, name: &str, text: &str) -> Result<ScanOutcome, FrdError> {
        let source = to_error_source(name, text);
        PlanBuilder::scan(&self.config.vocabulary, source, text)
    }

    pub fn scan_file(&self, path: &Path) -> Result<ScanOutcome, FrdError> {
        let text = Self::read_file(path)?;
        self.scan_source(&path.display().to_string(), &text)
    }

    /// Scans `path` and renders its suite without touching the output file.
    pub fn generate(&self, path: &Path) -> Result<GeneratedSuite, FrdError> {
        let module = module_name(path)?;
        let test_path = test_file_path(path, &self.config.output_prefix)?;
        let outcome = self.scan_file(path)?;
        let contents = render_suite(&module, &outcome);

        info!(
            source = %path.display(),
            module = %module,
            functions = outcome.plan.len(),
            fixtures = outcome.plan.fixture_count(),
            "suite generated"
        );

        Ok(GeneratedSuite {
            module,
            test_path,
            outcome,
            contents,
        })
    }

    /// The full entry operation: scan, generate, and overwrite `test_<file>`.
    pub fn generate_and_write(&self, path: &Path) -> Result<GeneratedSuite, FrdError> {
        let suite = self.generate(path)?;
        suite.write()?;
        Ok(suite)
    }

    /// Discovers test files in `dir` and hands them to `runner`.
    pub fn run_tests(&self, dir: &Path, runner: &dyn SuiteRunner) -> Result<RunSummary, FrdError> {
        let files = TestDiscoverer::new(&self.config.discovery).discover_test_files(dir)?;
        info!(dir = %dir.display(), files = files.len(), "test files discovered");
        runner.run(dir, &files)
    }
}
