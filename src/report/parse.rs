//! Runner log parser
//!
//! Understands the lines printed by [`crate::runner::Runner`] as well as
//! Unity's own `file:line:test:STATUS[:message]` form. Without the location,
//! a result name must carry the generated `test__` prefix. Any other line is
//! kept as output of the result that follows it.

use std::collections::HashMap;
use std::path::Path;

use super::model::{TestResult, TestStatus};
use crate::config::{PERF_TAG, TEST_FN_PREFIX};
use crate::runner::Tally;

/// Name of the synthetic result added when a log is cut short
pub const INCOMPLETE_RUN_NAME: &str = "runner";

/// Parsed runner output
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParsedLog {
    /// One result per test line, in log order
    pub results: Vec<TestResult>,
    /// Closing summary, if the runner got that far
    pub tally: Option<Tally>,
    /// Lines after the last result that belong to no test
    pub trailing_output: Vec<String>,
}

impl ParsedLog {
    /// Check if the closing summary was seen
    #[must_use]
    pub const fn complete(&self) -> bool {
        self.tally.is_some()
    }
}

/// Parse a complete runner log
///
/// A log without the closing summary gets an extra `ERROR` result carrying
/// the trailing output, since the runner stopped before finishing.
#[must_use]
pub fn parse_log(text: &str, cpu: &str, elf_path: &Path) -> ParsedLog {
    let mut parsed = ParsedLog::default();
    let mut pending_output = Vec::new();
    let mut cycles: HashMap<String, u64> = HashMap::new();

    for raw in text.lines() {
        let line = raw.trim_end();
        if line.is_empty() {
            continue;
        }

        if let Some((name, count)) = parse_perf(line) {
            cycles.insert(name.to_owned(), count);
            pending_output.push(line.to_owned());
            continue;
        }

        if let Some(tally) = parse_tally(line) {
            parsed.tally = Some(tally);
            continue;
        }

        if is_separator(line) || (parsed.tally.is_some() && matches!(line, "OK" | "FAIL")) {
            continue;
        }

        if let Some(entry) = parse_result(line) {
            let mut result = TestResult::new(entry.name, entry.status, cpu);
            result.elf_path = elf_path.to_path_buf();
            result.output_lines = std::mem::take(&mut pending_output);
            result.cycles = cycles.remove(entry.name);
            match entry.status {
                TestStatus::Fail => {
                    result.failure_reason = entry.message.map(str::to_owned);
                    result.error_type = Some("assertion".to_owned());
                }
                TestStatus::Skip => result.skip_reason = entry.message.map(str::to_owned),
                _ => {}
            }
            parsed.results.push(result);
            continue;
        }

        pending_output.push(line.to_owned());
    }

    if parsed.tally.is_none() {
        let mut result = TestResult::new(INCOMPLETE_RUN_NAME, TestStatus::Error, cpu);
        result.elf_path = elf_path.to_path_buf();
        result.failure_reason = Some("Runner output ended before the summary".to_owned());
        result.error_type = Some("crash".to_owned());
        result.output_lines = std::mem::take(&mut pending_output);
        parsed.results.push(result);
    }

    parsed.trailing_output = pending_output;
    parsed
}

struct ResultLine<'a> {
    name: &'a str,
    status: TestStatus,
    message: Option<&'a str>,
}

fn parse_result(line: &str) -> Option<ResultLine<'_>> {
    let parts: Vec<&str> = line.split(':').collect();
    let idx = parts.iter().position(|p| status_of(p).is_some())?;
    if idx == 0 {
        return None;
    }

    let name = parts[idx - 1].trim();
    if name.is_empty() || name.contains(char::is_whitespace) {
        return None;
    }
    // Kernel printf output can look like `Checking:PASS`; only generated
    // test names or Unity's `file:line:` form count as results
    let located = idx >= 2 && parts[idx - 2].trim().parse::<u32>().is_ok();
    if !located && !name.starts_with(TEST_FN_PREFIX) {
        return None;
    }

    let status = status_of(parts[idx])?;
    let message = if idx + 1 < parts.len() {
        let rest = line
            .splitn(idx + 2, ':')
            .nth(idx + 1)
            .map(str::trim)
            .unwrap_or_default();
        (!rest.is_empty()).then_some(rest)
    } else {
        None
    };

    Some(ResultLine {
        name,
        status,
        message,
    })
}

fn status_of(token: &str) -> Option<TestStatus> {
    match token {
        "PASS" => Some(TestStatus::Pass),
        "FAIL" => Some(TestStatus::Fail),
        "IGNORE" => Some(TestStatus::Skip),
        _ => None,
    }
}

fn parse_perf(line: &str) -> Option<(&str, u64)> {
    let rest = line.strip_prefix(PERF_TAG)?.trim_start();
    let (name, count) = rest.rsplit_once(": ")?;
    let count = count.trim().strip_suffix("cycles")?.trim().parse().ok()?;
    Some((name.trim(), count))
}

fn parse_tally(line: &str) -> Option<Tally> {
    let words: Vec<&str> = line.split_whitespace().collect();
    match words.as_slice() {
        [tests, "Tests", failures, "Failures", ignored, "Ignored"] => Some(Tally {
            tests: tests.parse().ok()?,
            failures: failures.parse().ok()?,
            ignored: ignored.parse().ok()?,
        }),
        _ => None,
    }
}

fn is_separator(line: &str) -> bool {
    line.len() >= 3 && line.chars().all(|c| c == '-')
}
