use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::clock::Clock;
use crate::expectation::ExpectedResult;
use crate::models::{Outcome, ResultValue, TestResult};

/// Where an inspected outcome's output comes from.
#[derive(Debug)]
pub enum OutputSource {
    Lines(Vec<String>),
    File(PathBuf),
}

/// One outcome with every derived view and its verdict.
#[derive(Debug, Serialize)]
pub struct Inspection {
    #[serde(flatten)]
    outcome: Outcome,
    suite: String,
    test: String,
    path: String,
    expected: ExpectedResult,
    verdict: ResultValue,
}

impl Inspection {
    pub fn outcome(&self) -> &Outcome {
        &self.outcome
    }

    pub fn suite(&self) -> &str {
        &self.suite
    }

    pub fn test(&self) -> &str {
        &self.test
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn expected(&self) -> &ExpectedResult {
        &self.expected
    }

    pub fn verdict(&self) -> ResultValue {
        self.verdict
    }
}

pub fn run(
    name: String,
    result: TestResult,
    source: OutputSource,
    expected: ExpectedResult,
    clock: &impl Clock,
) -> Result<Inspection> {
    let outcome = match source {
        OutputSource::Lines(lines) => Outcome::recorded(name, result, lines, clock),
        OutputSource::File(path) => {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read output file: {}", path.display()))?;
            Outcome::from_line(name, result, &content, clock.now())
        }
    };

    let verdict = outcome.result_value(&expected);

    Ok(Inspection {
        suite: outcome.suite_name().to_owned(),
        test: outcome.test_name().to_owned(),
        path: outcome.path(),
        outcome,
        expected,
        verdict,
    })
}
