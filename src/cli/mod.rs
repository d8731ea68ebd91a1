//! The frdtest Command-Line Interface.
//!
//! This module is the main entry point for all CLI commands and orchestrates
//! the core library functions.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;

use crate::cli::args::{Command, FrdArgs};
use crate::config::Config;
use crate::pipeline::GenerationPipeline;
use crate::plan::ScanOutcome;
use crate::runner::ProcessRunner;
use crate::FrdError;

pub mod args;
pub mod output;

/// The main entry point for the CLI.
pub fn run() {
    init_tracing();
    let args = FrdArgs::parse();

    match dispatch(args) {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            output::print_error(e);
            process::exit(1);
        }
    }
}

/// Logs go to stderr; `RUST_LOG=frdtest=debug` shows the scan in detail.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("frdtest=warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Returns whether the run succeeded; failing tests are `Ok(false)`.
fn dispatch(args: FrdArgs) -> Result<bool, FrdError> {
    let cwd = PathBuf::from(".");
    let config = Config::load(args.config.as_deref(), &cwd)?;
    let pipeline = GenerationPipeline::new(config);

    match args.command {
        Command::Generate {
            file,
            run,
            stdout,
            json,
        } => {
            let suite = pipeline.generate(&file)?;
            if stdout {
                print!("{}", suite.contents);
                return Ok(true);
            }

            print_outcome(&suite.outcome, json)?;
            suite.write()?;
            let cases = suite.outcome.plan.fixture_count();
            // Keep stdout pure JSON when it was asked for.
            let _ = if json {
                output::write_written(&mut output::stderr(), &suite.test_path, cases)
            } else {
                output::write_written(&mut output::stdout(), &suite.test_path, cases)
            };

            if run {
                return run_tests(&pipeline, &cwd);
            }
            Ok(true)
        }

        Command::Plan { file, json } => {
            let outcome = pipeline.scan_file(&file)?;
            print_outcome(&outcome, json)?;
            Ok(true)
        }

        Command::Run { path } => run_tests(&pipeline, &path),
    }
}

fn print_outcome(outcome: &ScanOutcome, json: bool) -> Result<(), FrdError> {
    if json {
        println!("{}", output::outcome_json(outcome)?);
        return Ok(());
    }
    let mut out = output::stdout();
    let _ = output::write_outcome(&mut out, outcome);
    let _ = out.flush();
    Ok(())
}

fn run_tests(pipeline: &GenerationPipeline, dir: &Path) -> Result<bool, FrdError> {
    let runner = ProcessRunner::new(pipeline.config().runner.clone());
    let summary = pipeline.run_tests(dir, &runner)?;
    let mut out = output::stdout();
    let _ = output::write_run_summary(&mut out, &summary);
    Ok(summary.passed)
}
