//! Test result reporting
//!
//! Turns runner output into structured reports, renders them as Markdown or
//! HTML and keeps them on disk as JSON.

pub mod html;
pub mod markdown;
pub mod model;
pub mod parse;
pub mod storage;

pub use html::render_html;
pub use markdown::render_markdown;
pub use model::{StatusCounts, TestReport, TestResult, TestStatus};
pub use parse::{parse_log, ParsedLog};
pub use storage::{ReportMeta, ReportStorage, ReportSummary, Trend};

use std::path::PathBuf;

/// Result type alias for report operations
pub type Result<T> = std::result::Result<T, ReportError>;

/// Errors raised while storing or loading reports
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    /// I/O error on the report directory or a report file
    #[error("I/O error: {source}")]
    Io {
        /// Underlying I/O error
        #[from]
        source: std::io::Error,
    },

    /// Report file is not valid report JSON
    #[error("Invalid report {path}: {source}")]
    Json {
        /// File that failed to parse
        path: PathBuf,
        /// Underlying JSON error
        source: serde_json::Error,
    },

    /// Report could not be serialized
    #[error("Failed to serialize report: {0}")]
    Serialize(#[source] serde_json::Error),
}
