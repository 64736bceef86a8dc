//! Report Parsing and Rendering Tests
//!
//! Tests for the runner log parser, the report model and the Markdown and
//! HTML output.
//! Run with: cargo test --test report_tests

use std::path::Path;

use chrono::{Duration, TimeZone, Utc};
use cmsis_nn_harness::regs::SimDebugRegisters;
use cmsis_nn_harness::report::markdown::{group_thousands, status_emoji};
use cmsis_nn_harness::report::parse::INCOMPLETE_RUN_NAME;
use cmsis_nn_harness::report::{
    parse_log, render_html, render_markdown, StatusCounts, TestReport, TestResult, TestStatus,
};
use cmsis_nn_harness::runner::{Backend, CaseFailure, ModelCase, Runner, Tally};

const FULL_LOG: &str = "\
Booting CMSIS-NN tests
[PERF] test__conv2d_s8_0: 18342 cycles
test__conv2d_s8_0:PASS
[PERF] test__add_s16_3: 912 cycles
test__add_s16_3:FAIL:Model run (PMU) failed: test__add_s16_3
test__svdf_s8_1:IGNORE:no MVE on this core
-----------------------
3 Tests 1 Failures 1 Ignored
FAIL
";

fn report_from(results: Vec<TestResult>) -> TestReport {
    let start = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
    TestReport::new("run-1", "cortex-m55", start, start + Duration::seconds(3), results)
}

// =============================================================================
// Parser Tests
// =============================================================================

#[test]
fn parse_full_log() {
    let parsed = parse_log(FULL_LOG, "cortex-m55", Path::new("build/test_nn.elf"));
    assert!(parsed.complete());
    assert_eq!(
        parsed.tally,
        Some(Tally {
            tests: 3,
            failures: 1,
            ignored: 1
        })
    );

    let names: Vec<&str> = parsed.results.iter().map(|r| r.test_name.as_str()).collect();
    assert_eq!(
        names,
        ["test__conv2d_s8_0", "test__add_s16_3", "test__svdf_s8_1"]
    );
    let statuses: Vec<TestStatus> = parsed.results.iter().map(|r| r.status).collect();
    assert_eq!(
        statuses,
        [TestStatus::Pass, TestStatus::Fail, TestStatus::Skip]
    );
}

#[test]
fn parse_attaches_cycles_and_output() {
    let parsed = parse_log(FULL_LOG, "cortex-m55", Path::new("build/test_nn.elf"));
    let conv = &parsed.results[0];
    assert_eq!(conv.cycles, Some(18342));
    assert_eq!(conv.cpu, "cortex-m55");
    assert_eq!(conv.elf_path, Path::new("build/test_nn.elf"));
    assert_eq!(
        conv.output_lines,
        [
            "Booting CMSIS-NN tests",
            "[PERF] test__conv2d_s8_0: 18342 cycles"
        ]
    );
}

#[test]
fn parse_failure_reason() {
    let parsed = parse_log(FULL_LOG, "cortex-m55", Path::new(""));
    let add = &parsed.results[1];
    assert_eq!(
        add.failure_reason.as_deref(),
        Some("Model run (PMU) failed: test__add_s16_3")
    );
    assert_eq!(add.error_type.as_deref(), Some("assertion"));
    assert_eq!(add.cycles, Some(912));
}

#[test]
fn parse_skip_reason() {
    let parsed = parse_log(FULL_LOG, "cortex-m55", Path::new(""));
    let svdf = &parsed.results[2];
    assert_eq!(svdf.skip_reason.as_deref(), Some("no MVE on this core"));
    assert_eq!(svdf.failure_reason, None);
    assert_eq!(svdf.reason(), "no MVE on this core");
}

#[test]
fn parse_unity_location_lines() {
    let log = "\
tests/test_add.c:57:test__add_s8_0:PASS
tests/test_add.c:88:test__add_s8_1:FAIL: Expected 12 Was 13
-----------------------
2 Tests 1 Failures 0 Ignored
FAIL
";
    let parsed = parse_log(log, "cortex-m4", Path::new(""));
    assert_eq!(parsed.results.len(), 2);
    assert_eq!(parsed.results[0].test_name, "test__add_s8_0");
    assert_eq!(
        parsed.results[1].failure_reason.as_deref(),
        Some("Expected 12 Was 13")
    );
}

#[test]
fn kernel_printf_status_stays_output() {
    let log = "\
Checking:PASS
requant:FAIL:scale out of range
test__a:PASS
-----------------------
1 Tests 0 Failures 0 Ignored
OK
";
    let parsed = parse_log(log, "cortex-m55", Path::new(""));
    assert_eq!(parsed.results.len(), 1);
    assert_eq!(parsed.results[0].test_name, "test__a");
    assert_eq!(
        parsed.results[0].output_lines,
        ["Checking:PASS", "requant:FAIL:scale out of range"]
    );
    assert_eq!(parsed.tally.unwrap().tests, 1);
}

#[test]
fn truncated_log_adds_error_result() {
    let log = "\
test__a:PASS
HardFault at 0x0800_1234
";
    let parsed = parse_log(log, "cortex-m55", Path::new("a.elf"));
    assert!(!parsed.complete());
    assert_eq!(parsed.results.len(), 2);

    let crash = &parsed.results[1];
    assert_eq!(crash.test_name, INCOMPLETE_RUN_NAME);
    assert_eq!(crash.status, TestStatus::Error);
    assert_eq!(crash.error_type.as_deref(), Some("crash"));
    assert_eq!(crash.output_lines, ["HardFault at 0x0800_1234"]);
}

#[test]
fn trailing_output_after_summary() {
    let log = "\
test__a:PASS
-----------------------
1 Tests 0 Failures 0 Ignored
OK
Simulation complete
";
    let parsed = parse_log(log, "cortex-m55", Path::new(""));
    assert_eq!(parsed.results.len(), 1);
    assert_eq!(parsed.trailing_output, ["Simulation complete"]);
}

#[test]
fn empty_log_is_incomplete() {
    let parsed = parse_log("", "cortex-m55", Path::new(""));
    assert!(!parsed.complete());
    assert_eq!(parsed.results.len(), 1);
    assert_eq!(parsed.results[0].status, TestStatus::Error);
}

struct Scripted(&'static str, i32);

impl ModelCase for Scripted {
    fn name(&self) -> &str {
        self.0
    }

    fn init(&mut self) -> Result<(), CaseFailure> {
        Ok(())
    }

    fn run(&mut self) -> Result<(), CaseFailure> {
        CaseFailure::check(self.1)
    }
}

#[test]
fn runner_output_parses_back() {
    let mut runner = Runner::new(Backend::Pmu, SimDebugRegisters::with_step(250));
    let mut out = String::new();
    runner
        .run_case(&mut Scripted("test__a", 0), &mut out)
        .unwrap();
    runner
        .run_case(&mut Scripted("test__b", -1), &mut out)
        .unwrap();
    let tally = runner.finish(&mut out).unwrap();

    let parsed = parse_log(&out, "cortex-m55", Path::new(""));
    assert_eq!(parsed.tally, Some(tally));
    assert_eq!(parsed.results[0].status, TestStatus::Pass);
    assert_eq!(parsed.results[0].cycles, Some(250));
    assert_eq!(parsed.results[1].status, TestStatus::Fail);
    assert_eq!(parsed.results[1].cycles, Some(250));
}

// =============================================================================
// Model Tests
// =============================================================================

#[test]
fn report_counts_and_duration() {
    let report = report_from(vec![
        TestResult::new("test__a", TestStatus::Pass, "cortex-m55"),
        TestResult::new("test__b", TestStatus::Fail, "cortex-m55"),
        TestResult::new("test__c", TestStatus::Skip, "cortex-m55"),
        TestResult::new("test__d", TestStatus::Pass, "cortex-m55"),
    ]);
    assert_eq!(report.total_tests, 4);
    assert_eq!(
        report.status_counts(),
        StatusCounts {
            passed: 2,
            failed: 1,
            skipped: 1,
            timed_out: 0,
            errors: 0
        }
    );
    assert!((report.duration - 3.0).abs() < f64::EPSILON);
    assert!(!report.is_success());
    assert_eq!(report.failed_tests().count(), 1);
    assert_eq!(report.passed_tests().count(), 2);
    assert_eq!(report.skipped_tests().count(), 1);
}

#[test]
fn report_summary_text() {
    let report = report_from(vec![
        TestResult::new("test__a", TestStatus::Pass, "cortex-m55"),
        TestResult::new("test__b", TestStatus::Fail, "cortex-m55"),
        TestResult::new("test__c", TestStatus::Skip, "cortex-m55"),
        TestResult::new("test__d", TestStatus::Pass, "cortex-m55"),
    ]);
    assert_eq!(
        report.summary,
        "Tests: 4 total, 2 passed (50.0%), 1 failed (25.0%), 1 skipped (25.0%)"
    );
}

#[test]
fn report_summary_mentions_errors_and_timeouts() {
    let report = report_from(vec![
        TestResult::new("test__a", TestStatus::Timeout, "cortex-m55"),
        TestResult::new("test__b", TestStatus::Error, "cortex-m55"),
    ]);
    assert!(report.summary.ends_with(", 1 timed out (50.0%), 1 errors (50.0%)"));
    assert_eq!(report.failed_tests().count(), 2);
}

#[test]
fn empty_report() {
    let report = report_from(Vec::new());
    assert_eq!(report.summary, "No tests executed");
    assert!(report.is_success());
    assert!(report.rate(0).abs() < f64::EPSILON);
}

#[test]
fn status_serializes_uppercase() {
    assert_eq!(serde_json::to_string(&TestStatus::Skip).unwrap(), "\"SKIP\"");
    assert_eq!(
        serde_json::from_str::<TestStatus>("\"TIMEOUT\"").unwrap(),
        TestStatus::Timeout
    );
}

#[test]
fn report_json_roundtrip() {
    let mut result = TestResult::new("test__a", TestStatus::Fail, "cortex-m55");
    result.failure_reason = Some("Expected 1 Was 2".to_owned());
    result.cycles = Some(1000);
    let report = report_from(vec![result]);

    let json = serde_json::to_string(&report).unwrap();
    let back: TestReport = serde_json::from_str(&json).unwrap();
    assert_eq!(back, report);
}

// =============================================================================
// Markdown Tests
// =============================================================================

#[test]
fn markdown_has_summary_and_table() {
    let report = report_from(vec![
        TestResult::new("test__a", TestStatus::Pass, "cortex-m55"),
        TestResult::new("test__b", TestStatus::Skip, "cortex-m55"),
    ]);
    let md = render_markdown(&report);
    assert!(md.starts_with("# CMSIS-NN Test Report\n"));
    assert!(md.contains("- **CPU:** cortex-m55\n"));
    assert!(md.contains("- **Run ID:** run-1\n"));
    assert!(md.contains("- **Start Time:** 2024-05-01 12:00:00\n"));
    assert!(md.contains("- **Duration:** 3.00 seconds\n"));
    assert!(md.contains("| ✅ Passed | 1 | 50.0% |"));
    assert!(md.contains("| test__a | ✅ PASS | 0.00 |  |"));
    assert!(!md.contains("Failed Tests Details"));
    assert!(!md.contains("Timed Out"));
}

#[test]
fn markdown_failure_details() {
    let mut result = TestResult::new("test__b", TestStatus::Fail, "cortex-m55");
    result.failure_reason = Some("Model run (PMU) failed: test__b".to_owned());
    result.cycles = Some(1_234_567);
    result.exit_code = Some(1);
    result.output_lines = (0..40).map(|i| format!("line {i}")).collect();
    let md = render_markdown(&report_from(vec![result]));

    assert!(md.contains("## Failed Tests Details"));
    assert!(md.contains("### test__b"));
    assert!(md.contains("- **Cycles:** 1,234,567\n"));
    assert!(md.contains("- **Exit Code:** 1\n"));
    assert!(md.contains("line 29\n"));
    assert!(!md.contains("line 30\n"));
    assert!(md.contains("... (truncated)"));
}

#[test]
fn emoji_per_status() {
    assert_eq!(status_emoji(TestStatus::Pass), "✅");
    assert_eq!(status_emoji(TestStatus::Fail), "❌");
    assert_eq!(status_emoji(TestStatus::Error), "💥");
}

#[test]
fn thousands_grouping() {
    assert_eq!(group_thousands(12), "12");
    assert_eq!(group_thousands(123_456), "123,456");
    assert_eq!(group_thousands(1_000_000), "1,000,000");
}

// =============================================================================
// HTML Tests
// =============================================================================

#[test]
fn html_has_header_cards_and_table() {
    let report = report_from(vec![
        TestResult::new("test__a", TestStatus::Pass, "cortex-m55"),
        TestResult::new("test__b", TestStatus::Skip, "cortex-m55"),
    ]);
    let html = render_html(&report);
    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(html.contains("<title>CMSIS-NN Test Report - cortex-m55</title>"));
    assert!(html.contains("<p><strong>Run ID:</strong> run-1</p>"));
    assert!(html.contains("<p><strong>Start Time:</strong> 2024-05-01 12:00:00</p>"));
    assert!(html.contains("<p><strong>Duration:</strong> 3.00 seconds</p>"));
    assert!(html.contains("<h3>1</h3><p>Passed<br>(50.0%)</p>"));
    assert!(html.contains("<h3>0</h3><p>Failed<br>(0.0%)</p>"));
    assert!(html.contains("<td>test__a</td><td class=\"status-pass\">PASS</td>"));
    assert!(html.contains("<td class=\"status-skip\">SKIP</td>"));
    assert!(html.contains("<tr id=\"details-1\" class=\"hidden\">"));
    assert!(html.trim_end().ends_with("</html>"));
}

#[test]
fn html_details_and_escaping() {
    let mut result = TestResult::new("test__b", TestStatus::Fail, "cortex-m55");
    result.failure_reason = Some("Expected <1> & got 2".to_owned());
    result.cycles = Some(1_234_567);
    result.exit_code = Some(1);
    result.output_lines = (0..25).map(|i| format!("line {i}")).collect();
    let html = render_html(&report_from(vec![result]));

    assert!(html.contains("<td>Expected &lt;1&gt; &amp; got 2</td>"));
    assert!(!html.contains("Expected <1>"));
    assert!(html.contains("<p><strong>Cycles:</strong> 1,234,567</p>"));
    assert!(html.contains("<p><strong>Exit Code:</strong> 1</p>"));
    assert!(html.contains("line 19\n"));
    assert!(!html.contains("line 20\n"));
    assert!(html.contains("... (truncated)</pre>"));
}
