//! Marker-line classification and extraction.
//!
//! A line is classified purely by its first token against a fixed [`Vocabulary`]:
//!
//! ```text
//! import math                     -> InterfaceLine   ("math")
//! def abs_num(n):                 -> FunctionLine    ("abs_num")
//! :frd: input(-1) return(1)       -> FixtureLine     {input: "-1", return: "1"}
//! return n if n > 0 else -n       -> OtherLine
//! ```

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{tokenize, Span, Token};

/// `key(value)`: the key runs up to the first `(`, the value up to the token's closing `)`.
/// The value's own parentheses must balance; see `parens_balanced`.
static FIXTURE_FIELD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([^()]+)\((.*)\)$").unwrap_or_else(|e| panic!("fixture field regex: {e}"))
});

// ============================================================================
// VOCABULARY - The three first-token sentinels
// ============================================================================

/// The first-token sentinels that turn an ordinary line into a marker line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Vocabulary {
    pub fixture_marker: String,
    pub function_keyword: String,
    pub interface_keyword: String,
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self {
            fixture_marker: ":frd:".to_string(),
            function_keyword: "def".to_string(),
            interface_keyword: "import".to_string(),
        }
    }
}

impl Vocabulary {
    /// Tokenizes `line` and decides its category.
    ///
    /// The fixture marker is checked first, so a vocabulary that reuses one sentinel for two
    /// roles still classifies fixtures deterministically.
    pub fn classify<'a>(&self, line: &'a str) -> MarkedLine<'a> {
        let tokens = tokenize(line);
        let category = match tokens.first().map(|t| t.text) {
            None => LineCategory::OtherLine,
            Some(head) if head == self.fixture_marker => LineCategory::FixtureLine,
            Some(head) if head == self.function_keyword => LineCategory::FunctionLine,
            Some(head) if head == self.interface_keyword => LineCategory::InterfaceLine,
            Some(_) => LineCategory::OtherLine,
        };
        MarkedLine { category, tokens }
    }
}

// ============================================================================
// CLASSIFIED LINES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineCategory {
    InterfaceLine,
    FunctionLine,
    FixtureLine,
    OtherLine,
}

/// A tokenized line together with its category.
///
/// The extractors assume the category already matches; callers dispatch on
/// [`MarkedLine::category`] before extracting.
#[derive(Debug, Clone)]
pub struct MarkedLine<'a> {
    category: LineCategory,
    tokens: Vec<Token<'a>>,
}

/// Why a marker line could not be turned into structured content.
///
/// Spans are relative to the line that was classified.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    #[error("`{marker}` is not followed by a symbol name")]
    MissingSymbol { marker: String, span: Span },
    #[error("malformed fixture token `{token}`, expected key(value)")]
    MalformedField { token: String, span: Span },
}

impl ExtractError {
    pub fn span(&self) -> Span {
        match self {
            ExtractError::MissingSymbol { span, .. } | ExtractError::MalformedField { span, .. } => {
                *span
            }
        }
    }
}

impl<'a> MarkedLine<'a> {
    pub fn category(&self) -> LineCategory {
        self.category
    }

    pub fn tokens(&self) -> &[Token<'a>] {
        &self.tokens
    }

    /// The declared/imported symbol: the second token, verbatim.
    pub fn extract_interface_name(&self) -> Result<&'a str, ExtractError> {
        self.symbol_token().map(|t| t.text)
    }

    /// The function name: the second token cut at the parameter list's `(`.
    pub fn extract_function_name(&self) -> Result<&'a str, ExtractError> {
        let token = self.symbol_token()?;
        let name = token.text.split('(').next().unwrap_or_default();
        if name.is_empty() {
            return Err(self.missing_symbol());
        }
        Ok(name)
    }

    /// Parses every token after the marker as a `key(value)` field.
    pub fn extract_fixture_record(&self) -> Result<FixtureRecord, ExtractError> {
        let mut record = FixtureRecord::new();
        for token in self.tokens.iter().skip(1) {
            let malformed = || ExtractError::MalformedField {
                token: token.text.to_string(),
                span: token.span,
            };
            let caps = FIXTURE_FIELD.captures(token.text).ok_or_else(malformed)?;
            if !parens_balanced(&caps[2]) {
                return Err(malformed());
            }
            record.insert(&caps[1], &caps[2]);
        }
        Ok(record)
    }

    fn symbol_token(&self) -> Result<&Token<'a>, ExtractError> {
        self.tokens.get(1).ok_or_else(|| self.missing_symbol())
    }

    fn missing_symbol(&self) -> ExtractError {
        let head = self.tokens.first();
        ExtractError::MissingSymbol {
            marker: head.map(|t| t.text.to_string()).unwrap_or_default(),
            span: head.map(|t| t.span).unwrap_or_default(),
        }
    }
}

/// True when every `)` closes an earlier `(` and none are left open.
fn parens_balanced(value: &str) -> bool {
    let mut depth = 0usize;
    for ch in value.chars() {
        match ch {
            '(' => depth += 1,
            ')' => match depth.checked_sub(1) {
                Some(d) => depth = d,
                None => return false,
            },
            _ => {}
        }
    }
    depth == 0
}

// ============================================================================
// FIXTURE RECORDS
// ============================================================================

/// One fixture: an ordered `key -> raw text` mapping.
///
/// Values are never evaluated; they are pasted verbatim into generated code. Keys other than
/// `input` and `return` are kept as-is so later consumers can read them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FixtureRecord {
    fields: IndexMap<String, String>,
}

impl FixtureRecord {
    pub const INPUT: &'static str = "input";
    pub const RETURN: &'static str = "return";

    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a field. A repeated key takes the new value and keeps its first position.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    pub fn input(&self) -> Option<&str> {
        self.get(Self::INPUT)
    }

    pub fn expected_return(&self) -> Option<&str> {
        self.get(Self::RETURN)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FixtureRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Self::new();
        for (k, v) in iter {
            record.insert(k, v);
        }
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vocab() -> Vocabulary {
        Vocabulary::default()
    }

    #[test]
    fn fixture_marker_always_wins() {
        for line in [":frd:", ":frd: input(1)", "   :frd: return(2)", "\t:frd: junk"] {
            assert_eq!(vocab().classify(line).category(), LineCategory::FixtureLine, "{line}");
        }
    }

    #[test]
    fn keywords_classify_by_first_token_only() {
        assert_eq!(
            vocab().classify("def add(a, b):").category(),
            LineCategory::FunctionLine
        );
        assert_eq!(
            vocab().classify("    def method(self):").category(),
            LineCategory::FunctionLine
        );
        assert_eq!(
            vocab().classify("import math").category(),
            LineCategory::InterfaceLine
        );
        assert_eq!(
            vocab().classify("from math import sqrt").category(),
            LineCategory::OtherLine
        );
        assert_eq!(
            vocab().classify("# :frd: input(1)").category(),
            LineCategory::OtherLine
        );
        assert_eq!(vocab().classify("define x").category(), LineCategory::OtherLine);
        assert_eq!(vocab().classify("").category(), LineCategory::OtherLine);
        assert_eq!(vocab().classify("   \n").category(), LineCategory::OtherLine);
    }

    #[test]
    fn custom_vocabulary() {
        let vocab = Vocabulary {
            fixture_marker: "//@case".into(),
            function_keyword: "fn".into(),
            interface_keyword: "use".into(),
        };
        assert_eq!(vocab.classify("fn add(a: i32)").category(), LineCategory::FunctionLine);
        assert_eq!(vocab.classify("use std").category(), LineCategory::InterfaceLine);
        assert_eq!(vocab.classify("//@case input(1)").category(), LineCategory::FixtureLine);
        assert_eq!(vocab.classify("def add(a):").category(), LineCategory::OtherLine);
    }

    #[test]
    fn extract_function_name_strips_parameters() {
        let line = vocab().classify("def add(a, b):");
        assert_eq!(line.extract_function_name(), Ok("add"));

        let spaced = vocab().classify("def add (a, b):");
        assert_eq!(spaced.extract_function_name(), Ok("add"));
    }

    #[test]
    fn extract_interface_name_is_verbatim() {
        assert_eq!(vocab().classify("import math").extract_interface_name(), Ok("math"));
        assert_eq!(vocab().classify("import os, sys").extract_interface_name(), Ok("os,"));
    }

    #[test]
    fn bare_marker_is_missing_symbol() {
        let err = vocab().classify("  import").extract_interface_name().unwrap_err();
        assert_eq!(
            err,
            ExtractError::MissingSymbol {
                marker: "import".into(),
                span: Span::new(2, 8),
            }
        );
        assert!(matches!(
            vocab().classify("def (x):").extract_function_name(),
            Err(ExtractError::MissingSymbol { .. })
        ));
    }

    #[test]
    fn extract_fixture_record_in_order() {
        let record = vocab()
            .classify(":frd: input(-1) return(1)")
            .extract_fixture_record()
            .unwrap();
        let fields: Vec<_> = record.iter().collect();
        assert_eq!(fields, vec![("input", "-1"), ("return", "1")]);
        assert_eq!(record.input(), Some("-1"));
        assert_eq!(record.expected_return(), Some("1"));
    }

    #[test]
    fn extract_fixture_record_keeps_unknown_keys_and_nested_parens() {
        let record = vocab()
            .classify(":frd: input((1,2)) return([]) note(edge)")
            .extract_fixture_record()
            .unwrap();
        assert_eq!(record.input(), Some("(1,2)"));
        assert_eq!(record.expected_return(), Some("[]"));
        assert_eq!(record.get("note"), Some("edge"));
        assert_eq!(record.len(), 3);

        let call = vocab()
            .classify(":frd: input(f(x)) return(g((1),(2)))")
            .extract_fixture_record()
            .unwrap();
        assert_eq!(call.input(), Some("f(x)"));
        assert_eq!(call.expected_return(), Some("g((1),(2))"));
    }

    #[test]
    fn repeated_key_keeps_first_position() {
        let record = vocab()
            .classify(":frd: input(1) return(2) input(3)")
            .extract_fixture_record()
            .unwrap();
        let fields: Vec<_> = record.iter().collect();
        assert_eq!(fields, vec![("input", "3"), ("return", "2")]);
    }

    #[test]
    fn empty_value_is_allowed_and_bare_marker_is_empty_record() {
        let record = vocab().classify(":frd: input()").extract_fixture_record().unwrap();
        assert_eq!(record.input(), Some(""));

        let empty = vocab().classify(":frd:").extract_fixture_record().unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn malformed_fixture_tokens() {
        for (line, bad) in [
            (":frd: input-1", "input-1"),
            (":frd: input(1) return(2", "return(2"),
            (":frd: (1)", "(1)"),
            (":frd: input(1)x", "input(1)x"),
            (":frd: input(1, 2)", "input(1,"),
            (":frd: input(1))", "input(1))"),
            (":frd: input((1)", "input((1)"),
            (":frd: return(0) input(1)(2)", "input(1)(2)"),
        ] {
            match vocab().classify(line).extract_fixture_record() {
                Err(ExtractError::MalformedField { token, span }) => {
                    assert_eq!(token, bad);
                    assert_eq!(&line[span.start..span.end], bad);
                }
                other => panic!("expected malformed field for {line:?}, got {other:?}"),
            }
        }
    }
}

#[cfg(test)]
mod classify_properties {
    use proptest::prelude::*;

    use super::*;

    fn is_sentinel(token: &str) -> bool {
        let vocab = Vocabulary::default();
        token == vocab.fixture_marker
            || token == vocab.function_keyword
            || token == vocab.interface_keyword
    }

    proptest! {
        #[test]
        fn unknown_first_token_is_other_line(
            head in "[^\\s]{1,12}",
            rest in "[ \t]{1,3}[ -~]{0,30}",
        ) {
            prop_assume!(!is_sentinel(&head));
            let line = format!("{head}{rest}");
            prop_assert_eq!(
                Vocabulary::default().classify(&line).category(),
                LineCategory::OtherLine
            );
        }

        #[test]
        fn fixture_marker_first_is_fixture_line(
            indent in "[ \t]{0,8}",
            rest in "([ \t]{1,3}[!-~]{1,10}){0,4}",
        ) {
            let line = format!("{indent}:frd:{rest}");
            prop_assert_eq!(
                Vocabulary::default().classify(&line).category(),
                LineCategory::FixtureLine
            );
        }
    }
}
