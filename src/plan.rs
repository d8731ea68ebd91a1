//! Test-plan assembly.
//!
//! [`PlanBuilder`] streams a file's lines through the classifier, collecting declared interfaces
//! and attributing each fixture to the nearest preceding function declaration. Once the scan is
//! done, [`PlanBuilder::finish`] drops every function that ended up with no fixtures.

use indexmap::IndexMap;
use serde::Serialize;
use tracing::{debug, warn};

use crate::diagnostics::SourceArc;
use crate::syntax::classifier::ExtractError;
use crate::syntax::{FixtureRecord, LineCategory, Span, Vocabulary};
use crate::{err_src, FrdError};

// ============================================================================
// DATA MODEL
// ============================================================================

/// Function name -> ordered fixtures, in first-declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TestPlan {
    functions: IndexMap<String, Vec<FixtureRecord>>,
}

impl TestPlan {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a function, resetting its fixtures if it was already declared.
    ///
    /// Returns `true` when the function had been declared before.
    pub fn declare(&mut self, function: impl Into<String>) -> bool {
        self.functions.insert(function.into(), Vec::new()).is_some()
    }

    /// Appends a fixture to an already declared function.
    pub fn push_fixture(&mut self, function: &str, record: FixtureRecord) {
        if let Some(fixtures) = self.functions.get_mut(function) {
            fixtures.push(record);
        }
    }

    pub fn fixtures(&self, function: &str) -> Option<&[FixtureRecord]> {
        self.functions.get(function).map(Vec::as_slice)
    }

    pub fn functions(&self) -> impl Iterator<Item = (&str, &[FixtureRecord])> {
        self.functions
            .iter()
            .map(|(name, fixtures)| (name.as_str(), fixtures.as_slice()))
    }

    pub fn function_names(&self) -> impl Iterator<Item = &str> {
        self.functions.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    pub fn fixture_count(&self) -> usize {
        self.functions.values().map(Vec::len).sum()
    }

    /// Keeps only functions with at least one fixture. This is the sole validation rule.
    pub fn validated(mut self) -> Self {
        self.functions.retain(|_, fixtures| !fixtures.is_empty());
        self
    }
}

/// Everything a scan produces: the declared interfaces and the validated plan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScanOutcome {
    pub interfaces: Vec<String>,
    pub plan: TestPlan,
}

// ============================================================================
// BUILDER
// ============================================================================

/// Single-pass accumulator over the lines of one source file.
pub struct PlanBuilder<'v> {
    vocabulary: &'v Vocabulary,
    source: SourceArc,
    interfaces: Vec<String>,
    plan: TestPlan,
    current_function: Option<String>,
    lines_seen: usize,
}

impl<'v> PlanBuilder<'v> {
    /// `source` is only used to attach diagnostics; lines are fed through [`Self::feed_line`].
    pub fn new(vocabulary: &'v Vocabulary, source: SourceArc) -> Self {
        Self {
            vocabulary,
            source,
            interfaces: Vec::new(),
            plan: TestPlan::new(),
            current_function: None,
            lines_seen: 0,
        }
    }

    /// Scans `text` line by line and returns the validated outcome.
    pub fn scan(
        vocabulary: &'v Vocabulary,
        source: SourceArc,
        text: &str,
    ) -> Result<ScanOutcome, FrdError> {
        let mut builder = Self::new(vocabulary, source);
        let mut offset = 0;
        for line in text.split_inclusive('\n') {
            builder.feed_line(line, offset)?;
            offset += line.len();
        }
        Ok(builder.finish())
    }

    /// Feeds one line. `offset` is the byte position of the line's start in the whole file.
    pub fn feed_line(&mut self, line: &str, offset: usize) -> Result<(), FrdError> {
        self.lines_seen += 1;
        let marked = self.vocabulary.classify(line);

        match marked.category() {
            LineCategory::InterfaceLine => {
                let name = marked
                    .extract_interface_name()
                    .map_err(|e| self.extract_error(e, offset))?;
                debug!(line = self.lines_seen, interface = name, "interface declared");
                self.interfaces.push(name.to_string());
            }
            LineCategory::FunctionLine => {
                let name = marked
                    .extract_function_name()
                    .map_err(|e| self.extract_error(e, offset))?;
                if self.plan.declare(name) {
                    warn!(
                        line = self.lines_seen,
                        function = name,
                        "function declared again; earlier fixtures are discarded"
                    );
                }
                self.current_function = Some(name.to_string());
            }
            LineCategory::FixtureLine => {
                let Some(function) = self.current_function.as_deref() else {
                    let span = marked
                        .tokens()
                        .first()
                        .map(|t| t.span)
                        .unwrap_or_default()
                        .shifted(offset);
                    return Err(err_src!(
                        Validation,
                        "fixture record has no function to attach to",
                        &self.source,
                        span,
                        format!(
                            "declare the function with `{} name(...)` above its fixtures",
                            self.vocabulary.function_keyword
                        )
                    ));
                };
                let record = marked
                    .extract_fixture_record()
                    .map_err(|e| self.extract_error(e, offset))?;
                self.plan.push_fixture(function, record);
            }
            LineCategory::OtherLine => {}
        }

        Ok(())
    }

    /// Applies the validation filter and hands back the outcome.
    pub fn finish(self) -> ScanOutcome {
        let declared = self.plan.len();
        let plan = self.plan.validated();
        debug!(
            lines = self.lines_seen,
            interfaces = self.interfaces.len(),
            declared,
            tested = plan.len(),
            fixtures = plan.fixture_count(),
            "scan complete"
        );
        ScanOutcome {
            interfaces: self.interfaces,
            plan,
        }
    }

    fn extract_error(&self, err: ExtractError, offset: usize) -> FrdError {
        let span: Span = err.span().shifted(offset);
        let help = match &err {
            ExtractError::MissingSymbol { .. } => "marker lines need a symbol name after the keyword",
            ExtractError::MalformedField { .. } => "write fixture fields as key(value) with no spaces",
        };
        err_src!(Parse, err.to_string(), &self.source, span, help)
    }
}
