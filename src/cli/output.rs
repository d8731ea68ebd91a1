//! Handles all user-facing output for the CLI.
//!
//! Everything is written through `termcolor::WriteColor` so the same functions drive the
//! colored terminal and the plain buffers used in tests.

use std::io::{self, IsTerminal, Write};
use std::path::Path;

use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::plan::ScanOutcome;
use crate::runner::RunSummary;
use crate::syntax::FixtureRecord;
use crate::{err_msg, FrdError};

/// Colored only when stdout is a terminal, so piped output stays plain.
pub fn stdout() -> StandardStream {
    let choice = if io::stdout().is_terminal() {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    };
    StandardStream::stdout(choice)
}

pub fn stderr() -> StandardStream {
    let choice = if io::stderr().is_terminal() {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    };
    StandardStream::stderr(choice)
}

// ============================================================================
// PLAN OUTPUT
// ============================================================================

/// Prints the collected interfaces and the validated plan for inspection.
pub fn write_outcome<W: WriteColor>(out: &mut W, outcome: &ScanOutcome) -> io::Result<()> {
    out.set_color(ColorSpec::new().set_bold(true))?;
    write!(out, "interfaces")?;
    out.reset()?;
    writeln!(out, " = [{}]", outcome.interfaces.join(", "))?;

    out.set_color(ColorSpec::new().set_bold(true))?;
    writeln!(out, "test_plan:")?;
    out.reset()?;

    if outcome.plan.is_empty() {
        writeln!(out, "  (no functions with fixtures)")?;
        return Ok(());
    }

    for (function, fixtures) in outcome.plan.functions() {
        out.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)).set_bold(true))?;
        write!(out, "  {function}")?;
        out.reset()?;
        writeln!(out, " ({} fixture{})", fixtures.len(), plural(fixtures.len()))?;
        for (index, record) in fixtures.iter().enumerate() {
            writeln!(out, "    [{index}] {}", describe_record(record))?;
        }
    }
    Ok(())
}

pub fn outcome_json(outcome: &ScanOutcome) -> Result<String, FrdError> {
    serde_json::to_string_pretty(outcome)
        .map_err(|e| err_msg!(Io, "Failed to serialize test plan").with_cause(e))
}

fn describe_record(record: &FixtureRecord) -> String {
    if record.is_empty() {
        return "(no fields)".to_string();
    }
    record
        .iter()
        .map(|(key, value)| format!("{key}({value})"))
        .collect::<Vec<_>>()
        .join(" ")
}

// ============================================================================
// STATUS OUTPUT
// ============================================================================

pub fn write_written<W: WriteColor>(out: &mut W, path: &Path, cases: usize) -> io::Result<()> {
    out.set_color(ColorSpec::new().set_fg(Some(Color::Green)))?;
    write!(out, "✓ wrote")?;
    out.reset()?;
    writeln!(out, " {} ({cases} test case{})", path.display(), plural(cases))
}

pub fn write_run_summary<W: WriteColor>(out: &mut W, summary: &RunSummary) -> io::Result<()> {
    if summary.files.is_empty() {
        return writeln!(out, "No test files found.");
    }

    let (color, mark, verdict) = if summary.passed {
        (Color::Green, "✓", "passed")
    } else {
        (Color::Red, "✗", "failed")
    };
    out.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true))?;
    write!(out, "{mark} {verdict}")?;
    out.reset()?;
    write!(
        out,
        " ({} test file{}",
        summary.files.len(),
        plural(summary.files.len())
    )?;
    match summary.exit_code {
        Some(code) => writeln!(out, ", exit code {code})"),
        None => writeln!(out, ")"),
    }
}

/// Renders an error with miette's fancy report on stderr.
pub fn print_error(error: FrdError) {
    let report = miette::Report::new(error);
    eprintln!("{report:?}");
}

fn plural(n: usize) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}
