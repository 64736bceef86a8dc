//! Report data model

use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Test execution status
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TestStatus {
    /// Passed
    Pass,
    /// Failed an assertion
    Fail,
    /// Ignored by the runner
    Skip,
    /// Did not finish in time
    Timeout,
    /// Crashed or could not be run
    Error,
}

impl TestStatus {
    /// Upper-case label, as serialized
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pass => "PASS",
            Self::Fail => "FAIL",
            Self::Skip => "SKIP",
            Self::Timeout => "TIMEOUT",
            Self::Error => "ERROR",
        }
    }

    /// Check if the status counts as a failure
    #[must_use]
    pub const fn is_failure(self) -> bool {
        matches!(self, Self::Fail | Self::Error | Self::Timeout)
    }
}

impl fmt::Display for TestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one test
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TestResult {
    /// Test function name
    pub test_name: String,
    /// Outcome
    pub status: TestStatus,
    /// Wall time in seconds
    pub duration: f64,
    /// Target CPU
    pub cpu: String,
    /// Binary the test ran from
    pub elf_path: PathBuf,
    /// Why the test failed
    #[serde(default)]
    pub failure_reason: Option<String>,
    /// Why the test was skipped
    #[serde(default)]
    pub skip_reason: Option<String>,
    /// Output printed by the test
    #[serde(default)]
    pub output_lines: Vec<String>,
    /// When the result was recorded
    pub timestamp: DateTime<Utc>,
    /// Peak memory in bytes
    #[serde(default)]
    pub memory_usage: Option<u64>,
    /// Cycles measured by the PMU backend
    #[serde(default)]
    pub cycles: Option<u64>,
    /// Process exit code
    #[serde(default)]
    pub exit_code: Option<i32>,
    /// Failure category such as "assertion", "timeout" or "crash"
    #[serde(default)]
    pub error_type: Option<String>,
}

impl TestResult {
    /// Create a result with only the required fields set
    #[must_use]
    pub fn new(test_name: impl Into<String>, status: TestStatus, cpu: impl Into<String>) -> Self {
        Self {
            test_name: test_name.into(),
            status,
            duration: 0.0,
            cpu: cpu.into(),
            elf_path: PathBuf::new(),
            failure_reason: None,
            skip_reason: None,
            output_lines: Vec::new(),
            timestamp: Utc::now(),
            memory_usage: None,
            cycles: None,
            exit_code: None,
            error_type: None,
        }
    }

    /// Failure reason, or the skip reason when there is none
    #[must_use]
    pub fn reason(&self) -> &str {
        self.failure_reason
            .as_deref()
            .or(self.skip_reason.as_deref())
            .unwrap_or("")
    }
}

/// Per-status counts of a report
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    /// Passed tests
    pub passed: usize,
    /// Failed tests
    pub failed: usize,
    /// Skipped tests
    pub skipped: usize,
    /// Timed out tests
    pub timed_out: usize,
    /// Errored tests
    pub errors: usize,
}

impl StatusCounts {
    /// Count the statuses of a result list
    #[must_use]
    pub fn tally(results: &[TestResult]) -> Self {
        results.iter().fold(Self::default(), |mut counts, r| {
            match r.status {
                TestStatus::Pass => counts.passed += 1,
                TestStatus::Fail => counts.failed += 1,
                TestStatus::Skip => counts.skipped += 1,
                TestStatus::Timeout => counts.timed_out += 1,
                TestStatus::Error => counts.errors += 1,
            }
            counts
        })
    }

    /// Sum of all counts
    #[must_use]
    pub const fn total(&self) -> usize {
        self.passed + self.failed + self.skipped + self.timed_out + self.errors
    }
}

/// Complete test run report
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TestReport {
    /// Run identifier
    pub run_id: String,
    /// Run start
    pub start_time: DateTime<Utc>,
    /// Run end
    pub end_time: DateTime<Utc>,
    /// Target CPU
    pub cpu: String,
    /// Tests executed
    pub total_tests: usize,
    /// Passed tests
    pub passed: usize,
    /// Failed tests
    pub failed: usize,
    /// Skipped tests
    pub skipped: usize,
    /// Timed out tests
    #[serde(default)]
    pub timed_out: usize,
    /// Errored tests
    #[serde(default)]
    pub errors: usize,
    /// Individual results
    #[serde(default)]
    pub results: Vec<TestResult>,
    /// Human-readable summary line
    #[serde(default)]
    pub summary: String,
    /// Run duration in seconds
    #[serde(default)]
    pub duration: f64,
}

impl TestReport {
    /// Build a report, deriving counts, duration and summary from the results
    #[must_use]
    pub fn new(
        run_id: impl Into<String>,
        cpu: impl Into<String>,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        results: Vec<TestResult>,
    ) -> Self {
        let counts = StatusCounts::tally(&results);
        let mut report = Self {
            run_id: run_id.into(),
            start_time,
            end_time,
            cpu: cpu.into(),
            total_tests: results.len(),
            passed: counts.passed,
            failed: counts.failed,
            skipped: counts.skipped,
            timed_out: counts.timed_out,
            errors: counts.errors,
            results,
            summary: String::new(),
            duration: 0.0,
        };
        report.refresh();
        report
    }

    /// Recompute duration and summary from the stored counts
    pub fn refresh(&mut self) {
        self.duration = duration_seconds(self.start_time, self.end_time);
        self.summary = self.render_summary();
    }

    /// Per-status counts
    #[must_use]
    pub const fn status_counts(&self) -> StatusCounts {
        StatusCounts {
            passed: self.passed,
            failed: self.failed,
            skipped: self.skipped,
            timed_out: self.timed_out,
            errors: self.errors,
        }
    }

    /// Percentage of all tests that `count` represents
    #[must_use]
    pub fn rate(&self, count: usize) -> f64 {
        if self.total_tests == 0 {
            0.0
        } else {
            count as f64 / self.total_tests as f64 * 100.0
        }
    }

    /// Failed, errored and timed out tests
    pub fn failed_tests(&self) -> impl Iterator<Item = &TestResult> {
        self.results.iter().filter(|r| r.status.is_failure())
    }

    /// Passed tests
    pub fn passed_tests(&self) -> impl Iterator<Item = &TestResult> {
        self.results.iter().filter(|r| r.status == TestStatus::Pass)
    }

    /// Skipped tests
    pub fn skipped_tests(&self) -> impl Iterator<Item = &TestResult> {
        self.results.iter().filter(|r| r.status == TestStatus::Skip)
    }

    /// Check if nothing failed, errored or timed out
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.failed == 0 && self.errors == 0 && self.timed_out == 0
    }

    fn render_summary(&self) -> String {
        if self.total_tests == 0 {
            return "No tests executed".to_owned();
        }

        let mut summary = format!(
            "Tests: {} total, {} passed ({:.1}%), {} failed ({:.1}%), {} skipped ({:.1}%)",
            self.total_tests,
            self.passed,
            self.rate(self.passed),
            self.failed,
            self.rate(self.failed),
            self.skipped,
            self.rate(self.skipped),
        );
        if self.timed_out > 0 {
            summary.push_str(&format!(
                ", {} timed out ({:.1}%)",
                self.timed_out,
                self.rate(self.timed_out)
            ));
        }
        if self.errors > 0 {
            summary.push_str(&format!(
                ", {} errors ({:.1}%)",
                self.errors,
                self.rate(self.errors)
            ));
        }
        summary
    }
}

fn duration_seconds(start: DateTime<Utc>, end: DateTime<Utc>) -> f64 {
    let delta = end - start;
    delta
        .num_microseconds()
        .map_or(delta.num_seconds() as f64, |us| us as f64 / 1_000_000.0)
}
