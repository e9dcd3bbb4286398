use anyhow::Result;
use console::{StyledObject, Term, style};
use serde::Serialize;

use crate::commands::inspect::Inspection;
use crate::commands::summarize::Summary;
use crate::models::ResultValue;

pub struct Output {
    term: Term,
    json: bool,
}

impl Output {
    pub fn new(json: bool) -> Self {
        Self {
            term: Term::stdout(),
            json,
        }
    }

    fn print_json<T: Serialize + ?Sized>(&self, value: &T) -> Result<()> {
        let output = serde_json::to_string_pretty(value)?;
        self.term.write_line(&output)?;
        Ok(())
    }

    pub fn inspection(&self, inspection: &Inspection) -> Result<()> {
        if self.json {
            return self.print_json(inspection);
        }

        let outcome = inspection.outcome();
        self.term.write_line(&format!(
            "Outcome: {} [{}]",
            style(outcome.name()).cyan().bold(),
            style(outcome.result().as_ref()).yellow()
        ))?;
        self.term
            .write_line(&format!("  Suite: {}", inspection.suite()))?;
        self.term
            .write_line(&format!("  Test: {}", inspection.test()))?;
        self.term
            .write_line(&format!("  Path: {}", inspection.path()))?;
        self.term
            .write_line(&format!("  Date: {}", style(outcome.date()).dim()))?;
        self.term.write_line("")?;

        let expected = inspection.expected();
        self.term
            .write_line(&format!("Expected: {}", expected.result().as_ref()))?;
        if let Some(text) = expected.output_contains() {
            self.term
                .write_line(&format!("  Output containing: {text}"))?;
        }
        self.term.write_line(&format!(
            "Verdict: {}",
            styled_verdict(inspection.verdict())
        ))?;

        if !outcome.output().is_empty() {
            self.term.write_line("")?;
            self.term.write_line(&style("Output:").bold().to_string())?;
            self.term
                .write_line(textwrap::indent(outcome.output(), "  ").trim_end_matches('\n'))?;
        }
        Ok(())
    }

    pub fn summary(&self, summary: &Summary) -> Result<()> {
        if self.json {
            return self.print_json(summary);
        }

        if summary.suites().is_empty() {
            self.term.write_line("No outcomes found.")?;
            return Ok(());
        }

        for suite in summary.suites() {
            self.term
                .write_line(&style(suite.suite()).cyan().bold().to_string())?;
            for test in suite.tests() {
                self.term.write_line(&format!(
                    "  {} {} [{}]",
                    styled_verdict(test.verdict()),
                    test.test(),
                    style(test.result().as_ref()).yellow()
                ))?;
            }
            self.term.write_line("")?;
        }

        let totals = summary.totals();
        self.term.write_line(&format!(
            "{} ok, {} failed, {} ignored",
            style(totals.ok()).green().bold(),
            style(totals.fail()).red().bold(),
            style(totals.ignore()).dim()
        ))?;
        Ok(())
    }
}

fn styled_verdict(verdict: ResultValue) -> StyledObject<&'static str> {
    match verdict {
        ResultValue::Ok => style("OK").green(),
        ResultValue::Fail => style("FAIL").red().bold(),
        ResultValue::Ignore => style("IGNORE").dim(),
    }
}
