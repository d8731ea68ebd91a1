//! Defines the command-line arguments and subcommands for the frdtest CLI.
//!
//! This module uses the `clap` crate with its "derive" feature to create a
//! declarative and type-safe argument parsing structure.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// The main CLI argument structure.
#[derive(Debug, Parser)]
#[command(
    name = "frdtest",
    version,
    about = "Compiles inline :frd: fixture annotations into runnable unittest suites."
)]
pub struct FrdArgs {
    /// Configuration file (defaults to ./frdtest.yaml when present).
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// An enumeration of all available CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Scan a source file, print its test plan, and write test_<file>.
    Generate {
        /// The annotated source file.
        #[arg(required = true)]
        file: PathBuf,
        /// Afterwards, discover and run every test file in the working directory.
        #[arg(long, conflicts_with = "stdout")]
        run: bool,
        /// Print the generated suite instead of writing it.
        #[arg(long)]
        stdout: bool,
        /// Print the plan as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Scan a source file and print its interfaces and test plan only.
    Plan {
        /// The annotated source file.
        #[arg(required = true)]
        file: PathBuf,
        /// Print the plan as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Discover and run all test files in a directory.
    Run {
        /// The directory containing test files.
        #[arg(default_value = ".")]
        path: PathBuf,
    },
}
