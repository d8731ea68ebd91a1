//! frdtest: an annotation-driven test-scaffold compiler.
//!
//! Source files carry single-line markers: `import` lines, `def` lines, and `:frd:` fixture
//! records attached to the function above them. frdtest classifies each line, assembles a
//! per-function test plan, and renders a `unittest` suite with one test case per fixture.

pub use crate::diagnostics::{ErrorContext, ErrorType, FrdError};

pub mod cli;
pub mod codegen;
pub mod config;
pub mod diagnostics;
pub mod discovery;
pub mod pipeline;
pub mod plan;
pub mod runner;
pub mod syntax;
