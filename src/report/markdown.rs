//! Markdown rendering of test reports

use std::fmt::Write;

use super::model::{TestReport, TestResult, TestStatus};
use crate::config::reports::MARKDOWN_OUTPUT_LINES;

/// Timestamp format shown in rendered reports
pub(crate) const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Render a report as a Markdown document
#[must_use]
pub fn render_markdown(report: &TestReport) -> String {
    let counts = report.status_counts();
    let mut md = String::new();

    // Writing into a String cannot fail.
    let _ = write!(
        md,
        "# CMSIS-NN Test Report\n\n\
         ## Summary\n\n\
         - **CPU:** {}\n\
         - **Run ID:** {}\n\
         - **Start Time:** {}\n\
         - **Duration:** {:.2} seconds\n\
         - **Total Tests:** {}\n\n\
         ## Results Overview\n\n\
         | Status | Count | Percentage |\n\
         |--------|-------|------------|\n",
        report.cpu,
        report.run_id,
        report.start_time.format(TIME_FORMAT),
        report.duration,
        report.total_tests,
    );

    let mut row = |label: &str, count: usize| {
        let _ = writeln!(md, "| {label} | {count} | {:.1}% |", report.rate(count));
    };
    row("✅ Passed", counts.passed);
    row("❌ Failed", counts.failed);
    row("⏭️ Skipped", counts.skipped);
    if counts.timed_out > 0 {
        row("⏰ Timed Out", counts.timed_out);
    }
    if counts.errors > 0 {
        row("💥 Errors", counts.errors);
    }

    md.push_str("\n## Test Results\n\n");
    md.push_str("| Test Name | Status | Duration (s) | Failure Reason |\n");
    md.push_str("|-----------|--------|--------------|----------------|\n");
    for result in &report.results {
        let _ = writeln!(
            md,
            "| {} | {} {} | {:.2} | {} |",
            result.test_name,
            status_emoji(result.status),
            result.status,
            result.duration,
            result.reason(),
        );
    }

    let mut failed = report.failed_tests().peekable();
    if failed.peek().is_some() {
        md.push_str("\n## Failed Tests Details\n\n");
        for result in failed {
            write_failure(&mut md, result);
        }
    }

    md
}

fn write_failure(md: &mut String, result: &TestResult) {
    let _ = write!(
        md,
        "### {}\n\n\
         - **Status:** {}\n\
         - **Duration:** {:.2} seconds\n\
         - **ELF Path:** `{}`\n\
         - **Timestamp:** {}\n",
        result.test_name,
        result.status,
        result.duration,
        result.elf_path.display(),
        result.timestamp.format(TIME_FORMAT),
    );

    if let Some(cycles) = result.cycles.filter(|&c| c > 0) {
        let _ = writeln!(md, "- **Cycles:** {}", group_thousands(cycles));
    }
    if let Some(bytes) = result.memory_usage.filter(|&b| b > 0) {
        let _ = writeln!(md, "- **Memory Usage:** {} bytes", group_thousands(bytes));
    }
    if let Some(code) = result.exit_code {
        let _ = writeln!(md, "- **Exit Code:** {code}");
    }
    if let Some(reason) = &result.failure_reason {
        let _ = writeln!(md, "- **Failure Reason:** {reason}");
    }

    if !result.output_lines.is_empty() {
        md.push_str("\n**Output:**\n```\n");
        for line in result.output_lines.iter().take(MARKDOWN_OUTPUT_LINES) {
            md.push_str(line);
            md.push('\n');
        }
        if result.output_lines.len() > MARKDOWN_OUTPUT_LINES {
            md.push_str("... (truncated)\n");
        }
        md.push_str("```\n\n");
    }
}

/// Emoji shown next to a status
#[must_use]
pub const fn status_emoji(status: TestStatus) -> &'static str {
    match status {
        TestStatus::Pass => "✅",
        TestStatus::Fail => "❌",
        TestStatus::Skip => "⏭️",
        TestStatus::Timeout => "⏰",
        TestStatus::Error => "💥",
    }
}

/// Format a count with `,` thousands separators
#[must_use]
pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
