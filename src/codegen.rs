//! Test-suite generation.
//!
//! Rendering is flat template instantiation: one function per generated construct, each fixture
//! becoming exactly one test case with exactly one assertion. Output is a `String` so a render is
//! deterministic and can be checked without touching the filesystem.

use std::fmt::Write as _;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::info;

use crate::plan::{ScanOutcome, TestPlan};
use crate::syntax::FixtureRecord;
use crate::{err_msg, FrdError};

const INDENT: &str = "    ";
const NULL_VALUE: &str = "None";

// ============================================================================
// NAMING
// ============================================================================

/// The logical module name: the file name up to its first `.`.
pub fn module_name(source_path: &Path) -> Result<String, FrdError> {
    let file_name = file_name(source_path)?;
    let module = file_name.split('.').next().unwrap_or_default();
    if module.is_empty() {
        return Err(err_msg!(
            Io,
            "Cannot derive a module name from '{}'",
            source_path.display()
        ));
    }
    Ok(module.to_string())
}

/// `<dir>/<prefix><file name>`, next to the source file.
pub fn test_file_path(source_path: &Path, prefix: &str) -> Result<PathBuf, FrdError> {
    let file_name = file_name(source_path)?;
    Ok(source_path.with_file_name(format!("{prefix}{file_name}")))
}

fn file_name(source_path: &Path) -> Result<&str, FrdError> {
    source_path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| err_msg!(Io, "'{}' does not name a file", source_path.display()))
}

// ============================================================================
// TEMPLATES
// ============================================================================

/// Framework, mocking utility, the module itself, then each tested function by name.
pub fn import_header(module: &str, plan: &TestPlan) -> String {
    let mut out = String::new();
    out.push_str("import unittest\n");
    out.push_str("from unittest import mock\n");
    let _ = writeln!(out, "import {module}");
    for function in plan.function_names() {
        let _ = writeln!(out, "from {module} import {function}");
    }
    out.push_str("\n\n");
    out
}

pub fn group_header(function: &str) -> String {
    format!("class Test_{function}(unittest.TestCase):\n")
}

/// One test case: call with `input` (or nothing), compare against `return` (or `None`).
///
/// Keys other than `input` and `return` do not affect the rendered case.
pub fn case_body(function: &str, index: usize, record: &FixtureRecord) -> String {
    let args = record.input().unwrap_or_default();
    let expected = record.expected_return().unwrap_or(NULL_VALUE);

    let mut out = String::new();
    let _ = writeln!(out, "{INDENT}def test_frd{index}(self):");
    let _ = writeln!(out, "{INDENT}{INDENT}result = {function}({args})");
    let _ = writeln!(out, "{INDENT}{INDENT}self.assertEqual({expected}, result)");
    out.push('\n');
    out
}

pub fn trailer() -> String {
    format!("if __name__ == '__main__':\n{INDENT}unittest.main()\n")
}

/// Renders the complete suite for `module`.
pub fn render_suite(module: &str, outcome: &ScanOutcome) -> String {
    let plan = &outcome.plan;
    let mut out = import_header(module, plan);

    for (function, fixtures) in plan.functions() {
        out.push_str(&group_header(function));
        for (index, record) in fixtures.iter().enumerate() {
            out.push_str(&case_body(function, index, record));
        }
        out.push('\n');
    }

    out.push_str(&trailer());
    out
}

// ============================================================================
// OUTPUT
// ============================================================================

/// Overwrites (or creates) `path` with the rendered suite. No backup is kept.
pub fn write_suite(path: &Path, contents: &str) -> Result<(), FrdError> {
    let io_err = |e: std::io::Error| {
        err_msg!(Io, "Failed to write test suite '{}'", path.display()).with_cause(e)
    };

    let file = File::create(path).map_err(io_err)?;
    let mut writer = BufWriter::new(file);
    writer.write_all(contents.as_bytes()).map_err(io_err)?;
    writer.flush().map_err(io_err)?;

    info!(path = %path.display(), bytes = contents.len(), "test suite written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn outcome(functions: &[(&str, Vec<FixtureRecord>)]) -> ScanOutcome {
        let mut plan = TestPlan::new();
        for (name, fixtures) in functions {
            plan.declare(*name);
            for f in fixtures {
                plan.push_fixture(name, f.clone());
            }
        }
        ScanOutcome {
            interfaces: vec![],
            plan,
        }
    }

    fn record(pairs: &[(&str, &str)]) -> FixtureRecord {
        pairs.iter().copied().collect()
    }

    #[test]
    fn renders_abs_num_suite() {
        let outcome = outcome(&[(
            "abs_num",
            vec![
                record(&[("input", "-1"), ("return", "1")]),
                record(&[("input", "1"), ("return", "1")]),
            ],
        )]);
        let expected = "\
import unittest
from unittest import mock
import calc
from calc import abs_num


class Test_abs_num(unittest.TestCase):
    def test_frd0(self):
        result = abs_num(-1)
        self.assertEqual(1, result)

    def test_frd1(self):
        result = abs_num(1)
        self.assertEqual(1, result)


if __name__ == '__main__':
    unittest.main()
";
        assert_eq!(render_suite("calc", &outcome), expected);
    }

    #[test]
    fn missing_input_and_return() {
        let body = case_body("now", 3, &record(&[("note", "clock")]));
        assert_eq!(
            body,
            "    def test_frd3(self):\n        result = now()\n        self.assertEqual(None, result)\n\n"
        );
    }

    #[test]
    fn empty_plan_renders_minimal_suite() {
        let rendered = render_suite("empty", &ScanOutcome::default());
        assert_eq!(
            rendered,
            "import unittest\nfrom unittest import mock\nimport empty\n\n\nif __name__ == '__main__':\n    unittest.main()\n"
        );
    }

    #[test]
    fn groups_follow_plan_order() {
        let outcome = outcome(&[
            ("zeta", vec![record(&[("return", "0")])]),
            ("alpha", vec![record(&[("input", "'a'")])]),
        ]);
        let rendered = render_suite("m", &outcome);
        let zeta = rendered.find("class Test_zeta").unwrap();
        let alpha = rendered.find("class Test_alpha").unwrap();
        assert!(zeta < alpha);
        assert!(rendered.contains("from m import zeta\nfrom m import alpha\n"));
        assert!(rendered.contains("result = alpha('a')\n        self.assertEqual(None, result)"));
    }

    #[test]
    fn naming_helpers() {
        assert_eq!(module_name(Path::new("src/fibnaci.py")).unwrap(), "fibnaci");
        assert_eq!(module_name(Path::new("pkg.tar.py")).unwrap(), "pkg");
        assert_eq!(
            test_file_path(Path::new("src/fibnaci.py"), "test_").unwrap(),
            PathBuf::from("src/test_fibnaci.py")
        );
        assert!(module_name(Path::new(".hidden")).is_err());
        assert!(module_name(Path::new("/")).is_err());
    }
}
