//! Line-level syntax: spans, whitespace tokens, and the marker classifier.
//!
//! frdtest never parses the host language. A line is reduced to its whitespace-delimited tokens
//! and only the first token decides what the line means.

pub mod classifier;

pub use classifier::{FixtureRecord, LineCategory, MarkedLine, Vocabulary};

/// A byte range into the scanned source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Moves the span by `offset` bytes, used to lift line-relative spans into file spans.
    pub fn shifted(self, offset: usize) -> Self {
        Self {
            start: self.start + offset,
            end: self.end + offset,
        }
    }
}

/// One whitespace-delimited token and where it sits in its line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub text: &'a str,
    pub span: Span,
}

/// Splits a line on whitespace, dropping empty tokens, keeping byte offsets.
pub fn tokenize(line: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut start = None;

    for (idx, ch) in line.char_indices() {
        match (ch.is_whitespace(), start) {
            (true, Some(s)) => {
                tokens.push(Token {
                    text: &line[s..idx],
                    span: Span::new(s, idx),
                });
                start = None;
            }
            (false, None) => start = Some(idx),
            _ => {}
        }
    }

    if let Some(s) = start {
        tokens.push(Token {
            text: &line[s..],
            span: Span::new(s, line.len()),
        });
    }

    tokens
}
