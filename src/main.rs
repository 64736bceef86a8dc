//! `nn-report`: turn CMSIS-NN runner logs into stored test reports
//!
//! Usage:
//!   nn-report parse run.log --cpu cortex-m55 --elf build/test_add.elf --markdown --html
//!   fvp-run ... | nn-report parse -
//!   nn-report list --cpu cortex-m55
//!   nn-report summary --days 7
//!   nn-report cleanup --keep-days 30

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use cmsis_nn_harness::config::{reports, DEFAULT_CPU};
use cmsis_nn_harness::report::{parse_log, ReportStorage, TestReport};

#[derive(Parser, Debug)]
#[command(name = "nn-report", version, about = "CMSIS-NN test report tool")]
struct Cli {
    /// Report directory
    #[arg(long, global = true, default_value = reports::DEFAULT_DIR)]
    dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse a runner log and store the report
    Parse {
        /// Log file, or `-` for stdin
        log: PathBuf,
        /// Target CPU
        #[arg(long, default_value = DEFAULT_CPU)]
        cpu: String,
        /// Binary the log came from
        #[arg(long, default_value = "")]
        elf: PathBuf,
        /// Run identifier (defaults to the start timestamp)
        #[arg(long)]
        run_id: Option<String>,
        /// Also write a Markdown report
        #[arg(long)]
        markdown: bool,
        /// Also write an HTML report
        #[arg(long)]
        html: bool,
    },
    /// List stored reports
    List {
        /// Only reports for this CPU
        #[arg(long)]
        cpu: Option<String>,
        /// Maximum reports to show (0 = all)
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Summarize recent reports
    Summary {
        /// Only reports for this CPU
        #[arg(long)]
        cpu: Option<String>,
        /// Look-back window in days
        #[arg(long, default_value_t = reports::SUMMARY_DAYS)]
        days: i64,
    },
    /// Delete old report files
    Cleanup {
        /// Keep files modified within this many days
        #[arg(long, default_value_t = reports::KEEP_DAYS)]
        keep_days: u64,
    },
}

fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("warn".parse()?))
        .init();

    let cli = Cli::parse();
    let storage = ReportStorage::new(&cli.dir)
        .with_context(|| format!("opening report directory {}", cli.dir.display()))?;

    match cli.command {
        Command::Parse {
            log,
            cpu,
            elf,
            run_id,
            markdown,
            html,
        } => {
            let start = Utc::now();
            let text = read_log(&log)?;
            let parsed = parse_log(&text, &cpu, &elf);
            let end = Utc::now();

            let run_id = run_id
                .unwrap_or_else(|| start.format(reports::FILE_TIMESTAMP_FORMAT).to_string());
            let report = TestReport::new(run_id, cpu, start, end, parsed.results);

            let json = storage.save(&report)?;
            println!("{}", report.summary);
            println!("Saved {}", json.display());
            if markdown {
                let md = storage.save_markdown(&report)?;
                println!("Saved {}", md.display());
            }
            if html {
                let page = storage.save_html(&report)?;
                println!("Saved {}", page.display());
            }

            if report.is_success() {
                Ok(ExitCode::SUCCESS)
            } else {
                Ok(ExitCode::FAILURE)
            }
        }
        Command::List { cpu, limit } => {
            let metas = storage.list(cpu.as_deref(), limit)?;
            if metas.is_empty() {
                println!("No reports found in {}", storage.dir().display());
            }
            for meta in metas {
                println!(
                    "{}  {:<12} {:>4} tests  {:>4} passed  {:>4} failed  {:>4} skipped  {:>8.2}s  {}",
                    meta.start_time.format("%Y-%m-%d %H:%M:%S"),
                    meta.cpu,
                    meta.total_tests,
                    meta.passed,
                    meta.failed,
                    meta.skipped,
                    meta.duration,
                    meta.path.display(),
                );
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Summary { cpu, days } => {
            let summary = storage.summary(cpu.as_deref(), days)?;
            println!("Runs (last {days} days): {}", summary.total_runs);
            println!("Total tests          : {}", summary.total_tests);
            println!("Average duration     : {:.2}s", summary.avg_duration);
            println!("Average pass rate    : {:.1}%", summary.avg_pass_rate);
            println!("Trend                : {}", summary.trend.as_str());
            if let Some((first, last)) = summary.date_range {
                println!("Date range           : {first} .. {last}");
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Cleanup { keep_days } => {
            let removed = storage.cleanup(keep_days)?;
            println!("Removed {removed} report files");
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn read_log(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("reading log from stdin")?;
        Ok(text)
    } else {
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
    }
}
