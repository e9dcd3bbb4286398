use std::backtrace::BacktraceStatus;
use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use super::{ResultValue, TestResult};
use crate::clock::{Clock, SystemClock};
use crate::expectation::Expectation;
use crate::helpers::{join, sanitize_line};

/// Suite reported for outcomes whose name has no `#` or `.` to split on.
pub const DEFAULT_SUITE: &str = "defaultpackage";

/// The recorded result of one action. Some actions have several outcomes,
/// e.g. one per test method of a suite.
///
/// Output is sanitized on the way in and never changes afterwards. Equality
/// and hashing cover name, result and output; the date is informational.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "OutcomeRecord")]
pub struct Outcome {
    name: String,
    result: TestResult,
    output: String,
    date: Timestamp,
}

/// Wire shape of an outcome. Output read back from elsewhere is sanitized
/// again before it becomes an [`Outcome`].
#[derive(Deserialize)]
struct OutcomeRecord {
    name: String,
    result: TestResult,
    #[serde(default)]
    output: String,
    date: Timestamp,
}

impl From<OutcomeRecord> for Outcome {
    fn from(record: OutcomeRecord) -> Self {
        Self::from_line(record.name, record.result, &record.output, record.date)
    }
}

impl Outcome {
    pub fn new<I, S>(name: impl Into<String>, result: TestResult, lines: I, date: Timestamp) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            name: name.into(),
            result,
            output: sanitize_lines(lines),
            date,
        }
    }

    pub fn new_now<I, S>(name: impl Into<String>, result: TestResult, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::recorded(name, result, lines, &SystemClock)
    }

    /// Builds an outcome stamped with the current time of `clock`.
    pub fn recorded<I, S>(
        name: impl Into<String>,
        result: TestResult,
        lines: I,
        clock: &impl Clock,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::new(name, result, lines, clock.now())
    }

    pub fn from_line(
        name: impl Into<String>,
        result: TestResult,
        line: &str,
        date: Timestamp,
    ) -> Self {
        Self {
            name: name.into(),
            result,
            output: sanitize_line(line),
            date,
        }
    }

    pub fn from_line_now(name: impl Into<String>, result: TestResult, line: &str) -> Self {
        Self::from_line(name, result, line, SystemClock.now())
    }

    /// Records a caught error: its message, each cause, and the captured
    /// backtrace (if any) become the output, one line each.
    pub fn from_error(
        name: impl Into<String>,
        result: TestResult,
        error: &anyhow::Error,
        date: Timestamp,
    ) -> Self {
        let name = name.into();
        let lines = error_lines(error);
        tracing::debug!(outcome = %name, lines = lines.len(), "recording outcome from error");
        Self::new(name, result, lines, date)
    }

    pub fn from_error_now(
        name: impl Into<String>,
        result: TestResult,
        error: &anyhow::Error,
    ) -> Self {
        Self::from_error(name, result, error, SystemClock.now())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn result(&self) -> TestResult {
        self.result
    }

    pub fn output(&self) -> &str {
        &self.output
    }

    /// The output split on LF. Empty output is a single empty line.
    pub fn output_lines(&self) -> Vec<&str> {
        self.output.split('\n').collect()
    }

    pub fn date(&self) -> Timestamp {
        self.date
    }

    /// The grouping part of the name, such as `java.lang.Integer` for
    /// `java.lang.Integer#testParse`.
    pub fn suite_name(&self) -> &str {
        match self.split_point() {
            Some(i) => &self.name[..i],
            None => DEFAULT_SUITE,
        }
    }

    /// The specific part of the name, such as `testParse`.
    pub fn test_name(&self) -> &str {
        match self.split_point() {
            Some(i) => &self.name[i + 1..],
            None => &self.name,
        }
    }

    /// The name as a `/`-separated path. Unlike [`Outcome::suite_name`],
    /// every `.` and `#` counts as a separator here. Nothing is trimmed, so
    /// a leading or trailing separator leaves a leading or trailing `/`.
    pub fn path(&self) -> String {
        self.name.replace(['.', '#'], "/")
    }

    /// Last `#`, or failing that the last `.`.
    fn split_point(&self) -> Option<usize> {
        self.name.rfind('#').or_else(|| self.name.rfind('.'))
    }

    /// Judges this outcome against `expectation`. Outcomes whose result
    /// does not matter are ignored without consulting it.
    pub fn result_value<E>(&self, expectation: &E) -> ResultValue
    where
        E: Expectation + ?Sized,
    {
        let value = if !self.result.matters() {
            ResultValue::Ignore
        } else if expectation.matches(self) {
            ResultValue::Ok
        } else {
            ResultValue::Fail
        };
        tracing::debug!(outcome = %self.name, result = %self.result, verdict = %value, "classified");
        value
    }

    /// Orders outcomes by name, comparing bytes.
    pub fn cmp_by_name(a: &Self, b: &Self) -> Ordering {
        a.name.as_bytes().cmp(b.name.as_bytes())
    }

    pub fn sort_by_name(outcomes: &mut [Self]) {
        outcomes.sort_by(Self::cmp_by_name);
    }
}

impl PartialEq for Outcome {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.result == other.result && self.output == other.output
    }
}

impl Eq for Outcome {}

impl Hash for Outcome {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.result.hash(state);
        self.output.hash(state);
    }
}

fn sanitize_lines<I, S>(lines: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    join(lines.into_iter().map(|line| sanitize_line(line.as_ref())), "\n")
}

fn error_lines(error: &anyhow::Error) -> Vec<String> {
    let mut trace = error.to_string();
    for cause in error.chain().skip(1) {
        trace.push_str(&format!("\nCaused by: {cause}"));
    }

    let backtrace = error.backtrace();
    if backtrace.status() == BacktraceStatus::Captured {
        trace.push('\n');
        trace.push_str(&backtrace.to_string());
    }

    let mut lines = trace.split('\n');
    let first = lines.next().unwrap_or_default().to_owned();
    std::iter::once(first)
        .chain(
            lines
                .filter(|line| !line.trim().is_empty())
                .map(str::to_owned),
        )
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use anyhow::{Context, anyhow};
    use rstest::{fixture, rstest};

    use super::*;
    use crate::clock::FixedClock;
    use crate::helpers::xml_sanitize;

    fn fixed_date() -> Timestamp {
        Timestamp::from_millisecond(1_000_000).unwrap()
    }

    #[fixture]
    fn date() -> Timestamp {
        fixed_date()
    }

    fn outcome(name: &str) -> Outcome {
        Outcome::from_line(name, TestResult::Success, "", fixed_date())
    }

    // -- construction --

    // Every line is sanitized and the results are joined with single LFs,
    // no trailing separator.
    #[rstest]
    fn new_sanitizes_and_joins_lines(date: Timestamp) {
        let o = Outcome::new(
            "a.B#c",
            TestResult::ExecFailed,
            ["expected <1>", "but was\r\n<2>", "done\r"],
            date,
        );
        assert_eq!(o.output(), "expected &lt;1&gt;\nbut was\n&lt;2&gt;\ndone\n");
        assert_eq!(o.name(), "a.B#c");
        assert_eq!(o.result(), TestResult::ExecFailed);
        assert_eq!(o.date(), date);
    }

    #[rstest]
    fn new_with_no_lines_has_empty_output(date: Timestamp) {
        let o = Outcome::new("x", TestResult::Success, Vec::<String>::new(), date);
        assert_eq!(o.output(), "");
    }

    #[rstest]
    fn from_line_sanitizes_single_line(date: Timestamp) {
        let o = Outcome::from_line("x", TestResult::Error, "a\r\nb & <c>\u{1b}", date);
        assert_eq!(o.output(), "a\nb &amp; &lt;c&gt;U+001B");
    }

    #[rstest]
    fn recorded_takes_date_from_clock(date: Timestamp) {
        let o = Outcome::recorded("x", TestResult::Success, ["ok"], &FixedClock(date));
        assert_eq!(o.date(), date);
    }

    // The *_now constructors stamp the wall clock at construction.
    #[test]
    fn now_constructors_use_current_time() {
        let before = Timestamp::now();
        let a = Outcome::new_now("x", TestResult::Success, ["ok"]);
        let b = Outcome::from_line_now("x", TestResult::Success, "ok");
        let c = Outcome::from_error_now("x", TestResult::Error, &anyhow!("boom"));
        for o in [&a, &b, &c] {
            assert!(o.date() >= before);
        }
        assert_eq!(a, b);
    }

    // The message comes first and every later line is a non-empty cause or
    // frame.
    #[rstest]
    fn from_error_writes_message_then_causes(date: Timestamp) {
        let err = Err::<(), _>(anyhow!("disk full"))
            .context("writing report")
            .unwrap_err();
        let o = Outcome::from_error("suite#test", TestResult::Error, &err, date);
        let lines = o.output_lines();

        assert_eq!(lines[0], "writing report");
        assert_eq!(lines[1], "Caused by: disk full");
        assert!(lines[1..].iter().all(|line| !line.trim().is_empty()));
    }

    #[rstest]
    fn from_error_sanitizes_message(date: Timestamp) {
        let err = anyhow!("expected <a> & got\r\n<b>");
        let o = Outcome::from_error("x", TestResult::Error, &err, date);
        assert_eq!(o.output_lines()[0], "expected &lt;a&gt; &amp; got");
        assert_eq!(o.output_lines()[1], "&lt;b&gt;");
    }

    // -- sanitization invariants --

    // Feeding stored output back through the same pipeline changes nothing.
    #[rstest]
    #[case::markup(&["<xml attr=\"1\">&</xml>"])]
    #[case::controls(&["\u{0}\u{7}\u{1f}", "tab\there"])]
    #[case::line_endings(&["a\r\nb\rc", "\r\r\n"])]
    #[case::entities(&["&amp; &#65; &#x41; &bogus;"])]
    #[case::forbidden_references(&["&#0; &#x1F;", "&#xFFFE; &#99999999999;"])]
    fn sanitizing_is_idempotent(#[case] lines: &[&str], date: Timestamp) {
        let first = Outcome::new("x", TestResult::Success, lines, date);
        let again = Outcome::new("x", TestResult::Success, first.output_lines(), date);
        let whole = Outcome::from_line("x", TestResult::Success, first.output(), date);
        assert_eq!(again.output(), first.output());
        assert_eq!(whole.output(), first.output());
        assert!(!first.output().contains('\r'));
    }

    // Joining then splitting gives back the sanitized lines, including
    // empty ones at either end.
    #[rstest]
    #[case(&["one"])]
    #[case(&["one", "two", "three"])]
    #[case(&["", "middle", ""])]
    #[case(&["<a>", "&"])]
    fn output_lines_round_trips(#[case] lines: &[&str], date: Timestamp) {
        let o = Outcome::new("x", TestResult::Success, lines, date);
        let expected: Vec<String> = lines.iter().map(|l| xml_sanitize(l)).collect();
        assert_eq!(o.output_lines(), expected);
    }

    // -- identity --

    #[rstest]
    #[case::hash_wins("a.b#c.d", "a.b", "c.d", "a/b/c/d")]
    #[case::no_separator("Widget", "defaultpackage", "Widget", "Widget")]
    #[case::dotted("java.lang.IntegerTest", "java.lang", "IntegerTest", "java/lang/IntegerTest")]
    #[case::method("java.lang.IntegerTest#testParse", "java.lang.IntegerTest", "testParse", "java/lang/IntegerTest/testParse")]
    #[case::last_hash("a#b#c", "a#b", "c", "a/b/c")]
    #[case::empty("", "defaultpackage", "", "")]
    #[case::trailing_dot("a.", "a", "", "a/")]
    #[case::leading_hash("#x", "", "x", "/x")]
    fn identity_decomposition(
        #[case] name: &str,
        #[case] suite: &str,
        #[case] test: &str,
        #[case] path: &str,
    ) {
        let o = outcome(name);
        assert_eq!(o.suite_name(), suite);
        assert_eq!(o.test_name(), test);
        assert_eq!(o.path(), path);
    }

    // -- classification --

    // Unsupported outcomes are ignored, and the expectation is never asked.
    #[rstest]
    fn unsupported_is_ignored(date: Timestamp) {
        let o = Outcome::from_line("x", TestResult::Unsupported, "", date);
        let never = |_: &Outcome| -> bool { panic!("expectation consulted") };
        assert_eq!(o.result_value(&never), ResultValue::Ignore);
        assert_eq!(o.result_value(&|_: &Outcome| false), ResultValue::Ignore);
    }

    #[rstest]
    #[case(TestResult::Success, true, ResultValue::Ok)]
    #[case(TestResult::Success, false, ResultValue::Fail)]
    #[case(TestResult::ExecFailed, true, ResultValue::Ok)]
    #[case(TestResult::ExecTimeout, false, ResultValue::Fail)]
    #[case(TestResult::CompileFailed, false, ResultValue::Fail)]
    #[case(TestResult::Error, true, ResultValue::Ok)]
    fn verdict_follows_expectation(
        #[case] result: TestResult,
        #[case] matches: bool,
        #[case] expected: ResultValue,
        date: Timestamp,
    ) {
        let o = Outcome::from_line("x", result, "", date);
        assert_eq!(o.result_value(&move |_: &Outcome| matches), expected);
    }

    // -- equality / hashing --

    // Date is not part of identity: outcomes differing only in date are
    // equal and collapse in a set.
    #[test]
    fn equality_ignores_date() {
        let a = Outcome::new(
            "x",
            TestResult::Success,
            ["a\r\nb"],
            Timestamp::from_second(1).unwrap(),
        );
        let b = Outcome::new(
            "x",
            TestResult::Success,
            ["a", "b"],
            Timestamp::from_second(2).unwrap(),
        );
        assert_eq!(a, b);

        let set: HashSet<Outcome> = [a, b].into_iter().collect();
        assert_eq!(set.len(), 1);
    }

    #[rstest]
    fn equality_covers_name_result_and_output(date: Timestamp) {
        let base = Outcome::from_line("x", TestResult::Success, "out", date);
        assert_ne!(base, Outcome::from_line("y", TestResult::Success, "out", date));
        assert_ne!(base, Outcome::from_line("x", TestResult::Error, "out", date));
        assert_ne!(base, Outcome::from_line("x", TestResult::Success, "other", date));
    }

    // -- ordering --

    // Sorting by name matches sorting the names as byte strings, which puts
    // uppercase before lowercase.
    #[test]
    fn sort_by_name_is_bytewise() {
        let names = ["b.Test", "a.z", "B.Test", "a#z", "a.Z", "ä", ""];
        let mut outcomes: Vec<Outcome> = names.iter().map(|n| outcome(n)).collect();
        Outcome::sort_by_name(&mut outcomes);

        let mut expected: Vec<&str> = names.to_vec();
        expected.sort_unstable();
        let sorted: Vec<&str> = outcomes.iter().map(Outcome::name).collect();
        assert_eq!(sorted, expected);
    }

    #[test]
    fn cmp_by_name_ignores_result() {
        let a = Outcome::from_line("a", TestResult::Success, "", fixed_date());
        let b = Outcome::from_line("a", TestResult::Error, "", fixed_date());
        assert_eq!(Outcome::cmp_by_name(&a, &b), Ordering::Equal);
    }

    // -- serde --

    #[rstest]
    fn serializes_all_fields(date: Timestamp) {
        let o = Outcome::from_line("a.B#c", TestResult::ExecFailed, "<x>", date);
        let json = serde_json::to_value(&o).unwrap();
        assert_eq!(json["name"], "a.B#c");
        assert_eq!(json["result"], "EXEC_FAILED");
        assert_eq!(json["output"], "&lt;x&gt;");
        assert_eq!(json["date"], date.to_string());
    }

    // Output read from JSON is sanitized before it is stored.
    #[test]
    fn deserializing_sanitizes_output() {
        let json = r#"{"name":"x","result":"SUCCESS","output":"a\r\n<b>","date":"1970-01-01T00:16:40Z"}"#;
        let o: Outcome = serde_json::from_str(json).unwrap();
        assert_eq!(o.output(), "a\n&lt;b&gt;");
        assert_eq!(o.date(), fixed_date());
    }

    #[test]
    fn deserializing_defaults_missing_output() {
        let json = r#"{"name":"x","result":"UNSUPPORTED","date":"1970-01-01T00:16:40Z"}"#;
        let o: Outcome = serde_json::from_str(json).unwrap();
        assert_eq!(o.output(), "");
        assert_eq!(o.result(), TestResult::Unsupported);
    }
}
