//!
//! # Overview
//!
//! This module defines the unified, `miette`-based diagnostic system for frdtest. Every failure
//! produced by any stage of the pipeline (scanning, plan assembly, generation, discovery, running)
//! is represented by [`FrdError`]. Construction is streamlined with the `err_msg!` and `err_src!`
//! macros.
//!
//! # Error Construction Macros
//!
//! - **Use `err_msg!` for simple, message-only errors.**
//!   - `err_msg!(Io, "Failed to read '{}': {}", path, e)`
//!
//! - **Use `err_src!` for errors that point into a scanned source file.**
//!   - `err_src!(Parse, "Malformed fixture token", &source, span)`
//!   - `err_src!(Parse, "Malformed fixture token", &source, span, help)`
//!
//! The `source` argument is always a [`SourceArc`]; the macro clones the `Arc` itself, so pass a
//! reference and never clone at the call site.

use std::sync::Arc;

use miette::{Diagnostic, LabeledSpan, NamedSource, SourceCode};
use thiserror::Error;

use crate::syntax::Span;

pub type SourceArc = Arc<NamedSource<String>>;

/// Type-safe classification of [`FrdError`] variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorType {
    /// Malformed fixture tokens, marker lines missing their symbol
    Parse,
    /// Fixtures with no function to attach to
    Validation,
    /// Unreadable sources, unwritable outputs, directory walk failures
    Io,
    /// Unreadable or invalid configuration files
    Config,
    /// The external test runner could not be started
    Runner,
}

impl ErrorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorType::Parse => "Parse",
            ErrorType::Validation => "Validation",
            ErrorType::Io => "Io",
            ErrorType::Config => "Config",
            ErrorType::Runner => "Runner",
        }
    }
}

impl std::fmt::Display for ErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Minimal, composable error context for diagnostics.
#[derive(Debug, Default)]
pub struct ErrorContext {
    /// The scanned file this error points into (if any).
    pub source: Option<SourceArc>,
    /// The primary span for this error (if any).
    pub span: Option<Span>,
    /// An optional help message.
    pub help: Option<String>,
}

impl ErrorContext {
    /// Returns an empty error context (no source, span, or help).
    pub fn none() -> Self {
        Self::default()
    }

    /// Creates a context with both source and span.
    pub fn with_source_and_span(source: SourceArc, span: Span) -> Self {
        Self {
            source: Some(source),
            span: Some(span),
            help: None,
        }
    }
}

type BoxedCause = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Unified error type for every frdtest failure mode.
#[derive(Debug, Error)]
pub enum FrdError {
    #[error("Parse error: {message}")]
    Parse {
        message: String,
        ctx: ErrorContext,
        #[source]
        source: Option<BoxedCause>,
    },
    #[error("Validation error: {message}")]
    Validation {
        message: String,
        ctx: ErrorContext,
        #[source]
        source: Option<BoxedCause>,
    },
    #[error("I/O error: {message}")]
    Io {
        message: String,
        ctx: ErrorContext,
        #[source]
        source: Option<BoxedCause>,
    },
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        ctx: ErrorContext,
        #[source]
        source: Option<BoxedCause>,
    },
    #[error("Runner error: {message}")]
    Runner {
        message: String,
        ctx: ErrorContext,
        #[source]
        source: Option<BoxedCause>,
    },
}

impl FrdError {
    fn get_ctx(&self) -> &ErrorContext {
        match self {
            FrdError::Parse { ctx, .. }
            | FrdError::Validation { ctx, .. }
            | FrdError::Io { ctx, .. }
            | FrdError::Config { ctx, .. }
            | FrdError::Runner { ctx, .. } => ctx,
        }
    }

    fn message(&self) -> &str {
        match self {
            FrdError::Parse { message, .. }
            | FrdError::Validation { message, .. }
            | FrdError::Io { message, .. }
            | FrdError::Config { message, .. }
            | FrdError::Runner { message, .. } => message,
        }
    }

    /// Returns the type-safe error classification for this error.
    pub fn error_type(&self) -> ErrorType {
        match self {
            FrdError::Parse { .. } => ErrorType::Parse,
            FrdError::Validation { .. } => ErrorType::Validation,
            FrdError::Io { .. } => ErrorType::Io,
            FrdError::Config { .. } => ErrorType::Config,
            FrdError::Runner { .. } => ErrorType::Runner,
        }
    }

    /// The span this error points at, if it came from a scanned file.
    pub fn span(&self) -> Option<Span> {
        self.get_ctx().span
    }

    /// Attaches an underlying cause.
    pub fn with_cause<E>(mut self, cause: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        let slot = match &mut self {
            FrdError::Parse { source, .. }
            | FrdError::Validation { source, .. }
            | FrdError::Io { source, .. }
            | FrdError::Config { source, .. }
            | FrdError::Runner { source, .. } => source,
        };
        *slot = Some(Box::new(cause));
        self
    }
}

impl Diagnostic for FrdError {
    fn code<'a>(&'a self) -> Option<Box<dyn std::fmt::Display + 'a>> {
        let code = match self.error_type() {
            ErrorType::Parse => "frdtest::parse",
            ErrorType::Validation => "frdtest::validation",
            ErrorType::Io => "frdtest::io",
            ErrorType::Config => "frdtest::config",
            ErrorType::Runner => "frdtest::runner",
        };
        Some(Box::new(code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn std::fmt::Display + 'a>> {
        self.get_ctx()
            .help
            .as_ref()
            .map(|h| Box::new(h) as Box<dyn std::fmt::Display + 'a>)
    }

    fn source_code(&self) -> Option<&dyn SourceCode> {
        self.get_ctx()
            .source
            .as_ref()
            .map(|s| s.as_ref() as &dyn SourceCode)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let ctx = self.get_ctx();
        // A label without source text has nothing to render against.
        ctx.source.as_ref()?;
        let span = ctx.span?;
        let len = if span.end > span.start {
            span.end - span.start
        } else {
            1
        };
        let label = LabeledSpan::new(Some(self.message().to_string()), span.start, len);
        Some(Box::new(std::iter::once(label)))
    }
}

/// Wraps file contents into a named source for use in error contexts.
pub fn to_error_source(name: impl AsRef<str>, content: impl Into<String>) -> SourceArc {
    Arc::new(NamedSource::new(name.as_ref(), content.into()))
}

/// Constructs an FrdError variant with a formatted message and no context.
#[macro_export]
macro_rules! err_msg {
    ($variant:ident, $msg:expr, $($arg:expr),+ $(,)?) => {
        $crate::FrdError::$variant {
            message: format!($msg, $($arg),+),
            ctx: $crate::ErrorContext::none(),
            source: None,
        }
    };
    ($variant:ident, $msg:expr) => {
        $crate::FrdError::$variant {
            message: format!("{}", $msg),
            ctx: $crate::ErrorContext::none(),
            source: None,
        }
    };
}

/// Constructs an FrdError variant pointing at a span inside a scanned source.
#[macro_export]
macro_rules! err_src {
    // Message, source, span, help
    ($variant:ident, $msg:expr, $source:expr, $span:expr, $help:expr) => {
        $crate::FrdError::$variant {
            message: $msg.to_string(),
            ctx: $crate::ErrorContext {
                source: Some(std::sync::Arc::clone($source)),
                span: Some($span),
                help: Some(format!("{}", $help)),
            },
            source: None,
        }
    };
    // Message, source, span
    ($variant:ident, $msg:expr, $source:expr, $span:expr) => {
        $crate::FrdError::$variant {
            message: $msg.to_string(),
            ctx: $crate::ErrorContext::with_source_and_span(std::sync::Arc::clone($source), $span),
            source: None,
        }
    };
}

#[cfg(test)]
mod diagnostics_tests {
    use miette::Report;

    use super::*;

    #[test]
    fn test_labelled_diagnostic_renders_source_and_help() {
        let src = to_error_source("calc.py", ":frd: input-1\n");
        let err = err_src!(
            Parse,
            "malformed fixture token",
            &src,
            Span { start: 6, end: 13 },
            "write fixture fields as key(value)"
        );
        let output = format!("{:?}", Report::new(err));
        assert!(output.contains("malformed fixture token"));
        assert!(output.contains("calc.py"));
        assert!(output.contains("key(value)"));
        assert!(output.contains("frdtest::parse"));
    }

    #[test]
    fn test_error_chaining() {
        let cause = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err = err_msg!(Io, "Failed to read '{}'", "missing.py").with_cause(cause);
        assert_eq!(err.error_type(), ErrorType::Io);
        let output = format!("{:?}", Report::new(err));
        assert!(output.contains("missing.py"));
        assert!(output.contains("no such file"));
    }

    #[test]
    fn test_message_only_errors_have_no_labels() {
        let err = err_msg!(Config, "bad config");
        assert!(err.labels().is_none());
        assert!(err.span().is_none());
        assert_eq!(err.to_string(), "Configuration error: bad config");
    }
}
