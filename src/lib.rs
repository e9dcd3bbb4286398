#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]

pub mod cli;
pub mod clock;
pub mod commands;
pub mod config;
pub mod expectation;
pub mod helpers;
pub mod models;
pub mod output;

use anyhow::{Context, Result};

use cli::{Cli, Commands};
use clock::SystemClock;
use commands::inspect::OutputSource;
use config::Config;
use expectation::ExpectedResult;
use models::TestResult;
use output::Output;

/// Environment variable holding a tracing filter; overrides the config's.
pub const LOG_ENV: &str = "VERDICT_LOG";

/// The configured expected result unless the command line names one.
fn expected_result(flag: Option<&str>, config: &Config) -> Result<TestResult> {
    match flag {
        Some(name) => TestResult::parse(name).context("Invalid --expect value"),
        None => Ok(config.expect),
    }
}

pub fn run(cli: Cli, config: &Config) -> Result<()> {
    match cli.command {
        Commands::Inspect {
            name,
            result,
            output,
            output_file,
            expect,
            expect_output,
            json,
        } => {
            let result = TestResult::parse(&result).context("Invalid --result value")?;
            let source = match output_file {
                Some(path) => OutputSource::File(path),
                None => OutputSource::Lines(output),
            };

            let mut expected = ExpectedResult::new(expected_result(expect.as_deref(), config)?);
            if let Some(text) = expect_output {
                expected = expected.with_output_containing(text);
            }

            let inspection = commands::inspect::run(name, result, source, expected, &SystemClock)?;
            Output::new(json || config.json).inspection(&inspection)
        }
        Commands::Summarize { file, expect, json } => {
            let expected = ExpectedResult::new(expected_result(expect.as_deref(), config)?);
            let summary = commands::summarize::run(&file, &expected)?;
            Output::new(json || config.json).summary(&summary)
        }
    }
}
