//! Report storage and retrieval
//!
//! Reports are pretty-printed JSON files named
//! `test_report_{cpu}_{YYYYmmdd_HHMMSS}.json` inside one directory.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use chrono::{DateTime, TimeDelta, Utc};
use serde::Deserialize;

use super::html::render_html;
use super::markdown::render_markdown;
use super::model::TestReport;
use super::{ReportError, Result};
use crate::config::reports::{
    FILE_PREFIX, FILE_TIMESTAMP_FORMAT, SUMMARY_SCAN_LIMIT, TREND_BAND_PERCENT, TREND_MIN_RUNS,
};

const SECONDS_PER_DAY: u64 = 24 * 60 * 60;

/// Pass rate trend across recent runs
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Trend {
    /// Newer runs pass noticeably more often
    Improving,
    /// Newer runs pass noticeably less often
    Declining,
    /// No significant change, or too few runs to tell
    Stable,
    /// No runs in the window
    NoData,
}

impl Trend {
    /// Snake-case label
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Improving => "improving",
            Self::Declining => "declining",
            Self::Stable => "stable",
            Self::NoData => "no_data",
        }
    }
}

/// Metadata of a stored report
#[derive(Clone, Debug, PartialEq)]
pub struct ReportMeta {
    /// Report file
    pub path: PathBuf,
    /// Target CPU
    pub cpu: String,
    /// Run start
    pub start_time: DateTime<Utc>,
    /// Run duration in seconds
    pub duration: f64,
    /// Tests executed
    pub total_tests: usize,
    /// Passed tests
    pub passed: usize,
    /// Failed tests
    pub failed: usize,
    /// Skipped tests
    pub skipped: usize,
}

/// Aggregate statistics over recent reports
#[derive(Clone, Debug, PartialEq)]
pub struct ReportSummary {
    /// Reports in the window
    pub total_runs: usize,
    /// Mean run duration in seconds
    pub avg_duration: f64,
    /// Overall pass rate in percent
    pub avg_pass_rate: f64,
    /// Tests across all runs
    pub total_tests: usize,
    /// Pass rate trend
    pub trend: Trend,
    /// Oldest and newest run start in the window
    pub date_range: Option<(DateTime<Utc>, DateTime<Utc>)>,
}

impl ReportSummary {
    fn empty() -> Self {
        Self {
            total_runs: 0,
            avg_duration: 0.0,
            avg_pass_rate: 0.0,
            total_tests: 0,
            trend: Trend::NoData,
            date_range: None,
        }
    }
}

#[derive(Deserialize)]
struct MetaFields {
    #[serde(default = "unknown_cpu")]
    cpu: String,
    start_time: DateTime<Utc>,
    #[serde(default)]
    duration: f64,
    #[serde(default)]
    total_tests: usize,
    #[serde(default)]
    passed: usize,
    #[serde(default)]
    failed: usize,
    #[serde(default)]
    skipped: usize,
}

fn unknown_cpu() -> String {
    "unknown".to_owned()
}

/// Directory of stored reports
#[derive(Clone, Debug)]
pub struct ReportStorage {
    dir: PathBuf,
}

impl ReportStorage {
    /// Open a report directory, creating it if needed
    ///
    /// # Errors
    ///
    /// Fails if the directory cannot be created.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Report directory
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File stem used for a report
    #[must_use]
    pub fn file_stem(report: &TestReport) -> String {
        format!(
            "{FILE_PREFIX}{}_{}",
            report.cpu,
            report.start_time.format(FILE_TIMESTAMP_FORMAT)
        )
    }

    /// Save a report as JSON
    ///
    /// # Errors
    ///
    /// Fails on serialization or write errors.
    pub fn save(&self, report: &TestReport) -> Result<PathBuf> {
        let path = self.dir.join(format!("{}.json", Self::file_stem(report)));
        let json = serde_json::to_string_pretty(report).map_err(ReportError::Serialize)?;
        fs::write(&path, json)?;
        info!("report: saved {}", path.display());
        Ok(path)
    }

    /// Save the Markdown rendering of a report next to its JSON
    ///
    /// # Errors
    ///
    /// Fails on write errors.
    pub fn save_markdown(&self, report: &TestReport) -> Result<PathBuf> {
        let path = self.dir.join(format!("{}.md", Self::file_stem(report)));
        fs::write(&path, render_markdown(report))?;
        Ok(path)
    }

    /// Save the HTML rendering of a report next to its JSON
    ///
    /// # Errors
    ///
    /// Fails on write errors.
    pub fn save_html(&self, report: &TestReport) -> Result<PathBuf> {
        let path = self.dir.join(format!("{}.html", Self::file_stem(report)));
        fs::write(&path, render_html(report))?;
        Ok(path)
    }

    /// Load a report file
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read or is not a report.
    pub fn load(&self, path: &Path) -> Result<TestReport> {
        let data = fs::read_to_string(path)?;
        serde_json::from_str(&data).map_err(|source| ReportError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    /// List stored reports, newest first
    ///
    /// Unreadable or malformed files are skipped. A `limit` of zero means no
    /// limit.
    ///
    /// # Errors
    ///
    /// Fails if the directory cannot be read.
    pub fn list(&self, cpu: Option<&str>, limit: usize) -> Result<Vec<ReportMeta>> {
        let mut metas = Vec::new();

        for path in self.report_files("json")? {
            let fields = match fs::read_to_string(&path)
                .ok()
                .and_then(|data| serde_json::from_str::<MetaFields>(&data).ok())
            {
                Some(fields) => fields,
                None => {
                    debug!("report: skipping unreadable {}", path.display());
                    continue;
                }
            };

            if cpu.is_some_and(|c| c != fields.cpu) {
                continue;
            }

            metas.push(ReportMeta {
                path,
                cpu: fields.cpu,
                start_time: fields.start_time,
                duration: fields.duration,
                total_tests: fields.total_tests,
                passed: fields.passed,
                failed: fields.failed,
                skipped: fields.skipped,
            });
        }

        metas.sort_by(|a, b| b.start_time.cmp(&a.start_time));
        if limit > 0 {
            metas.truncate(limit);
        }
        Ok(metas)
    }

    /// Most recent report
    ///
    /// # Errors
    ///
    /// Fails if the directory or the newest report cannot be read.
    pub fn latest(&self, cpu: Option<&str>) -> Result<Option<TestReport>> {
        match self.list(cpu, 1)?.first() {
            Some(meta) => self.load(&meta.path).map(Some),
            None => Ok(None),
        }
    }

    /// Statistics over the last `days` days
    ///
    /// # Errors
    ///
    /// Fails if the directory cannot be read.
    pub fn summary(&self, cpu: Option<&str>, days: i64) -> Result<ReportSummary> {
        self.summary_at(cpu, days, Utc::now())
    }

    /// Statistics over the `days` days before `now`
    ///
    /// # Errors
    ///
    /// Fails if the directory cannot be read.
    pub fn summary_at(
        &self,
        cpu: Option<&str>,
        days: i64,
        now: DateTime<Utc>,
    ) -> Result<ReportSummary> {
        // Windows reaching past the representable range include everything
        let cutoff = TimeDelta::try_days(days)
            .and_then(|window| now.checked_sub_signed(window))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        let recent: Vec<ReportMeta> = self
            .list(cpu, SUMMARY_SCAN_LIMIT)?
            .into_iter()
            .filter(|m| m.start_time >= cutoff)
            .collect();

        if recent.is_empty() {
            return Ok(ReportSummary::empty());
        }

        let total_runs = recent.len();
        let avg_duration = recent.iter().map(|m| m.duration).sum::<f64>() / total_runs as f64;
        let total_tests: usize = recent.iter().map(|m| m.total_tests).sum();

        let trend = if total_runs >= TREND_MIN_RUNS {
            // Newest first: the front half is the newer one.
            let mid = total_runs / 2;
            let newer = pass_rate(&recent[..mid]);
            let older = pass_rate(&recent[mid..]);
            if newer > older + TREND_BAND_PERCENT {
                Trend::Improving
            } else if newer < older - TREND_BAND_PERCENT {
                Trend::Declining
            } else {
                Trend::Stable
            }
        } else {
            Trend::Stable
        };

        Ok(ReportSummary {
            total_runs,
            avg_duration,
            avg_pass_rate: pass_rate(&recent),
            total_tests,
            trend,
            date_range: Some((recent[total_runs - 1].start_time, recent[0].start_time)),
        })
    }

    /// Remove report files last modified more than `keep_days` days ago
    ///
    /// Returns the number of files removed.
    ///
    /// # Errors
    ///
    /// Fails if the directory cannot be read.
    pub fn cleanup(&self, keep_days: u64) -> Result<usize> {
        let cutoff = keep_days
            .checked_mul(SECONDS_PER_DAY)
            .map(Duration::from_secs)
            .and_then(|age| SystemTime::now().checked_sub(age))
            .unwrap_or(SystemTime::UNIX_EPOCH);

        let mut removed = 0;
        let mut files = self.report_files("json")?;
        files.extend(self.report_files("md")?);
        files.extend(self.report_files("html")?);

        for path in files {
            let modified = match fs::metadata(&path).and_then(|m| m.modified()) {
                Ok(modified) => modified,
                Err(_) => continue,
            };
            if modified < cutoff && fs::remove_file(&path).is_ok() {
                removed += 1;
            }
        }

        if removed > 0 {
            info!("report: removed {} old report files", removed);
        }
        Ok(removed)
    }

    fn report_files(&self, extension: &str) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            let matches = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with(FILE_PREFIX))
                && path.extension().and_then(|e| e.to_str()) == Some(extension);
            if matches {
                files.push(path);
            }
        }
        Ok(files)
    }
}

fn pass_rate(metas: &[ReportMeta]) -> f64 {
    let total: usize = metas.iter().map(|m| m.total_tests).sum();
    if total == 0 {
        return 0.0;
    }
    let passed: usize = metas.iter().map(|m| m.passed).sum();
    passed as f64 / total as f64 * 100.0
}
