use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::expectation::Expectation;
use crate::models::{Outcome, ResultValue, TestResult};

/// One test line within a suite.
#[derive(Debug, Serialize)]
pub struct TestVerdict {
    test: String,
    result: TestResult,
    verdict: ResultValue,
}

impl TestVerdict {
    pub fn test(&self) -> &str {
        &self.test
    }

    pub fn result(&self) -> TestResult {
        self.result
    }

    pub fn verdict(&self) -> ResultValue {
        self.verdict
    }
}

#[derive(Debug, Serialize)]
pub struct SuiteSummary {
    suite: String,
    tests: Vec<TestVerdict>,
}

impl SuiteSummary {
    pub fn suite(&self) -> &str {
        &self.suite
    }

    pub fn tests(&self) -> &[TestVerdict] {
        &self.tests
    }
}

#[derive(Debug, Default, Serialize, PartialEq, Eq)]
pub struct Totals {
    ok: usize,
    fail: usize,
    ignore: usize,
}

impl Totals {
    fn add(&mut self, verdict: ResultValue) {
        match verdict {
            ResultValue::Ok => self.ok += 1,
            ResultValue::Fail => self.fail += 1,
            ResultValue::Ignore => self.ignore += 1,
        }
    }

    pub fn ok(&self) -> usize {
        self.ok
    }

    pub fn fail(&self) -> usize {
        self.fail
    }

    pub fn ignore(&self) -> usize {
        self.ignore
    }
}

/// Every suite in byte order of its name, tests sorted by outcome name.
#[derive(Debug, Serialize)]
pub struct Summary {
    suites: Vec<SuiteSummary>,
    totals: Totals,
}

impl Summary {
    pub fn suites(&self) -> &[SuiteSummary] {
        &self.suites
    }

    pub fn totals(&self) -> &Totals {
        &self.totals
    }
}

/// Reads a JSON array of outcomes from `path`.
pub fn load_outcomes(path: &Path) -> Result<Vec<Outcome>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse outcomes from {}", path.display()))
}

pub fn run<E>(path: &Path, expectation: &E) -> Result<Summary>
where
    E: Expectation + ?Sized,
{
    let outcomes = load_outcomes(path)?;
    tracing::debug!(count = outcomes.len(), file = %path.display(), "loaded outcomes");
    Ok(summarize(outcomes, expectation))
}

pub fn summarize<E>(mut outcomes: Vec<Outcome>, expectation: &E) -> Summary
where
    E: Expectation + ?Sized,
{
    Outcome::sort_by_name(&mut outcomes);

    let mut totals = Totals::default();
    let mut by_suite: BTreeMap<String, Vec<TestVerdict>> = BTreeMap::new();
    for outcome in &outcomes {
        let verdict = outcome.result_value(expectation);
        totals.add(verdict);
        by_suite
            .entry(outcome.suite_name().to_owned())
            .or_default()
            .push(TestVerdict {
                test: outcome.test_name().to_owned(),
                result: outcome.result(),
                verdict,
            });
    }

    let suites = by_suite
        .into_iter()
        .map(|(suite, tests)| SuiteSummary { suite, tests })
        .collect();

    Summary { suites, totals }
}
