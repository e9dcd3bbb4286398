use serde::{Deserialize, Serialize};

use crate::helpers::sanitize_line;
use crate::models::{Outcome, TestResult};

/// What counts as correct behavior for an outcome.
pub trait Expectation {
    fn matches(&self, outcome: &Outcome) -> bool;
}

impl<F> Expectation for F
where
    F: Fn(&Outcome) -> bool,
{
    fn matches(&self, outcome: &Outcome) -> bool {
        self(outcome)
    }
}

/// Expects a particular result, and optionally some text in the output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpectedResult {
    result: TestResult,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    output_contains: Option<String>,
}

impl ExpectedResult {
    pub fn new(result: TestResult) -> Self {
        Self {
            result,
            output_contains: None,
        }
    }

    /// Also require `text` in the output. The text goes through the same
    /// sanitizing as output lines, so `<init>` finds `&lt;init&gt;` and a
    /// CRLF finds the LF it was stored as.
    pub fn with_output_containing(mut self, text: impl AsRef<str>) -> Self {
        self.output_contains = Some(sanitize_line(text.as_ref()));
        self
    }

    pub fn result(&self) -> TestResult {
        self.result
    }

    pub fn output_contains(&self) -> Option<&str> {
        self.output_contains.as_deref()
    }
}

impl Default for ExpectedResult {
    fn default() -> Self {
        Self::new(TestResult::Success)
    }
}

impl Expectation for ExpectedResult {
    fn matches(&self, outcome: &Outcome) -> bool {
        if outcome.result() != self.result {
            return false;
        }

        self.output_contains
            .as_deref()
            .is_none_or(|text| outcome.output().contains(text))
    }
}
