//! System configuration and harness constants
//!
//! Compile-time constants for the test harness. Platform selection itself is
//! done with Cargo features; the values here describe the chosen platform and
//! the host-side report layout.

use crate::types::Backend;

/// True when the simulated (FVP) platform is compiled in
pub const SIMULATED: bool = !cfg!(all(feature = "embedded", not(feature = "fvp")));

/// Default target CPU for reports
pub const DEFAULT_CPU: &str = "cortex-m55";

/// Core clock used to convert cycles to microseconds (Apollo4 @ 96MHz)
pub const CORE_CLOCK_HZ: u32 = 96_000_000;

/// Backend used when the runner is not told otherwise
pub const DEFAULT_BACKEND: Backend = if SIMULATED {
    Backend::Fvp
} else {
    Backend::Pmu
};

/// Alignment of heap blocks, matching what `malloc` guarantees
pub const HEAP_ALIGN: usize = core::mem::align_of::<u128>();

/// Capacity of the copy of a runner line sent to the log
pub const LINE_CAPACITY: usize = 160;

/// Tag that prefixes cycle count lines in runner output
pub const PERF_TAG: &str = "[PERF]";

/// Prefix of generated test function names
pub const TEST_FN_PREFIX: &str = "test__";

/// Message reported when the cycle counter cannot be enabled
pub const PMU_UNAVAILABLE_MSG: &str = "PMU/DWT not available on this build/board.";

/// Linker sections for TCM placement on hardware
pub mod sections {
    //! Section names used by the TCM placement macros

    /// Generic tightly coupled memory
    pub const TCM: &str = crate::tcm_section!(tcm);

    /// Instruction TCM
    pub const ITCM: &str = crate::tcm_section!(itcm);

    /// Data TCM
    pub const DTCM: &str = crate::tcm_section!(dtcm);
}

/// Host report settings
pub mod reports {
    //! Report file naming and rendering limits

    /// Default directory for stored reports
    pub const DEFAULT_DIR: &str = "reports";

    /// File name prefix of stored reports
    pub const FILE_PREFIX: &str = "test_report_";

    /// Timestamp format embedded in report file names
    pub const FILE_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

    /// Output lines kept per failed test in Markdown reports
    pub const MARKDOWN_OUTPUT_LINES: usize = 30;

    /// Output lines kept per test in HTML reports
    pub const HTML_OUTPUT_LINES: usize = 20;

    /// Reports scanned when building a summary
    pub const SUMMARY_SCAN_LIMIT: usize = 100;

    /// Default look-back window for summaries in days
    pub const SUMMARY_DAYS: i64 = 7;

    /// Default retention for cleanup in days
    pub const KEEP_DAYS: u64 = 30;

    /// Pass rate change (percentage points) that counts as a trend
    pub const TREND_BAND_PERCENT: f64 = 5.0;

    /// Runs needed before a trend is computed
    pub const TREND_MIN_RUNS: usize = 4;
}
