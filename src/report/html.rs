//! HTML rendering of test reports
//!
//! A single self-contained page: run header, status cards and a results
//! table whose rows expand to show per-test details.

use std::fmt::Write;

use super::markdown::{group_thousands, TIME_FORMAT};
use super::model::{TestReport, TestResult};
use crate::config::reports::HTML_OUTPUT_LINES;

const STYLE: &str = "\
body { font-family: Arial, sans-serif; margin: 20px; }
.header { background-color: #f0f0f0; padding: 20px; border-radius: 5px; }
.summary { display: flex; gap: 20px; margin: 20px 0; }
.summary-card { background-color: #e8f4fd; padding: 15px; border-radius: 5px; text-align: center; min-width: 120px; }
.passed { background-color: #d4edda; }
.failed { background-color: #f8d7da; }
.skipped { background-color: #fff3cd; }
.results-table { width: 100%; border-collapse: collapse; margin: 20px 0; }
.results-table th, .results-table td { border: 1px solid #ddd; padding: 8px; text-align: left; }
.results-table th { background-color: #f2f2f2; }
.status-pass { color: green; font-weight: bold; }
.status-fail { color: red; font-weight: bold; }
.status-skip { color: orange; font-weight: bold; }
.status-timeout { color: purple; font-weight: bold; }
.status-error { color: darkred; font-weight: bold; }
.failure-details { background-color: #f8f9fa; padding: 10px; border-left: 4px solid #dc3545; margin: 5px 0; }
.expandable { cursor: pointer; }
.hidden { display: none; }
";

const SCRIPT: &str = "\
function toggleDetails(id) {
    document.getElementById('details-' + id).classList.toggle('hidden');
}
";

/// Render a report as a standalone HTML page
#[must_use]
pub fn render_html(report: &TestReport) -> String {
    let counts = report.status_counts();
    let mut html = String::new();

    // Writing into a String cannot fail.
    let _ = write!(
        html,
        "<!DOCTYPE html>\n<html>\n<head>\n\
         <meta charset=\"utf-8\">\n\
         <title>CMSIS-NN Test Report - {cpu}</title>\n\
         <style>\n{STYLE}</style>\n\
         <script>\n{SCRIPT}</script>\n\
         </head>\n<body>\n\
         <div class=\"header\">\n\
         <h1>CMSIS-NN Test Report</h1>\n\
         <p><strong>CPU:</strong> {cpu}</p>\n\
         <p><strong>Run ID:</strong> {run_id}</p>\n\
         <p><strong>Start Time:</strong> {start}</p>\n\
         <p><strong>Duration:</strong> {duration:.2} seconds</p>\n\
         <p><strong>Summary:</strong> {summary}</p>\n\
         </div>\n\
         <div class=\"summary\">\n",
        cpu = escape(&report.cpu),
        run_id = escape(&report.run_id),
        start = report.start_time.format(TIME_FORMAT),
        duration = report.duration,
        summary = escape(&report.summary),
    );

    for (class, label, count) in [
        ("passed", "Passed", counts.passed),
        ("failed", "Failed", counts.failed),
        ("skipped", "Skipped", counts.skipped),
    ] {
        let _ = writeln!(
            html,
            "<div class=\"summary-card {class}\"><h3>{count}</h3><p>{label}<br>({:.1}%)</p></div>",
            report.rate(count),
        );
    }

    html.push_str(
        "</div>\n<h2>Test Results</h2>\n\
         <table class=\"results-table\">\n<thead>\n<tr>\
         <th>Test Name</th><th>Status</th><th>Duration (s)</th>\
         <th>Failure Reason</th><th>Details</th>\
         </tr>\n</thead>\n<tbody>\n",
    );
    for (id, result) in report.results.iter().enumerate() {
        write_row(&mut html, id, result);
    }
    html.push_str("</tbody>\n</table>\n</body>\n</html>\n");

    html
}

fn write_row(html: &mut String, id: usize, result: &TestResult) {
    let status = result.status.to_string();
    let _ = write!(
        html,
        "<tr>\
         <td>{name}</td>\
         <td class=\"status-{class}\">{status}</td>\
         <td>{duration:.2}</td>\
         <td>{reason}</td>\
         <td><button class=\"expandable\" onclick=\"toggleDetails({id})\">Show Details</button></td>\
         </tr>\n\
         <tr id=\"details-{id}\" class=\"hidden\"><td colspan=\"5\"><div class=\"failure-details\">\n\
         <p><strong>ELF Path:</strong> {elf}</p>\n\
         <p><strong>Timestamp:</strong> {timestamp}</p>\n",
        name = escape(&result.test_name),
        class = status.to_ascii_lowercase(),
        duration = result.duration,
        reason = escape(result.reason()),
        elf = escape(&result.elf_path.display().to_string()),
        timestamp = result.timestamp.format(TIME_FORMAT),
    );

    if let Some(cycles) = result.cycles.filter(|&c| c > 0) {
        let _ = writeln!(html, "<p><strong>Cycles:</strong> {}</p>", group_thousands(cycles));
    }
    if let Some(bytes) = result.memory_usage.filter(|&b| b > 0) {
        let _ = writeln!(
            html,
            "<p><strong>Memory Usage:</strong> {} bytes</p>",
            group_thousands(bytes)
        );
    }
    if let Some(code) = result.exit_code {
        let _ = writeln!(html, "<p><strong>Exit Code:</strong> {code}</p>");
    }

    if !result.output_lines.is_empty() {
        html.push_str("<p><strong>Output:</strong></p><pre>");
        for line in result.output_lines.iter().take(HTML_OUTPUT_LINES) {
            html.push_str(&escape(line));
            html.push('\n');
        }
        if result.output_lines.len() > HTML_OUTPUT_LINES {
            html.push_str("... (truncated)");
        }
        html.push_str("</pre>\n");
    }

    html.push_str("</div></td></tr>\n");
}

/// Escape text for use in HTML content and attribute values
#[must_use]
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup() {
        assert_eq!(escape("a < b && c > \"d\""), "a &lt; b &amp;&amp; c &gt; &quot;d&quot;");
        assert_eq!(escape("plain"), "plain");
    }
}
