//! Shared types used across the harness
//!
//! Small value types passed between the platform shim, the runner and the
//! host-side reporting.

use core::fmt;

/// Timer handle, the harness equivalent of `ns_timer_t`
///
/// Both fields are plain counters owned by whichever platform drives the
/// timer. The simulated platform never advances `duration`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TimerHandle {
    /// Start time in platform ticks
    pub start_time: u32,
    /// Last measured duration in microseconds
    pub duration: u32,
}

impl TimerHandle {
    /// Create a zeroed timer handle
    #[must_use]
    pub const fn new() -> Self {
        Self {
            start_time: 0,
            duration: 0,
        }
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for TimerHandle {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "Timer(start={}, dur={}us)", self.start_time, self.duration);
    }
}

/// Execution backend for a test runner
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Backend {
    /// Correctness run, no cycle counting (FVP)
    Fvp,
    /// Performance run measured with the DWT cycle counter
    Pmu,
}

impl Backend {
    /// Short label used in failure messages
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Fvp => "FVP",
            Self::Pmu => "PMU",
        }
    }
}

impl Default for Backend {
    fn default() -> Self {
        crate::config::DEFAULT_BACKEND
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for Backend {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "{}", self.label());
    }
}

/// Memory region an item may be placed in
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum MemoryRegion {
    /// Default linker placement
    #[default]
    Default,
    /// Tightly coupled memory
    Tcm,
    /// Instruction TCM
    Itcm,
    /// Data TCM
    Dtcm,
}

impl MemoryRegion {
    /// Linker section requested for this region
    #[must_use]
    pub const fn requested_section(self) -> Option<&'static str> {
        use crate::config::sections;
        match self {
            Self::Default => None,
            Self::Tcm => Some(sections::TCM),
            Self::Itcm => Some(sections::ITCM),
            Self::Dtcm => Some(sections::DTCM),
        }
    }

    /// Linker section actually applied on the active platform
    ///
    /// The simulated platform ignores placement, so everything lands in
    /// default storage there.
    #[must_use]
    pub const fn effective_section(self) -> Option<&'static str> {
        if crate::config::SIMULATED {
            None
        } else {
            self.requested_section()
        }
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for MemoryRegion {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Default => defmt::write!(f, "default"),
            Self::Tcm => defmt::write!(f, "TCM"),
            Self::Itcm => defmt::write!(f, "ITCM"),
            Self::Dtcm => defmt::write!(f, "DTCM"),
        }
    }
}

/// Elapsed cycles read from the DWT counter
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Cycles(pub u32);

impl Cycles {
    /// Raw cycle count
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Convert to microseconds at the given core clock
    #[must_use]
    pub const fn as_micros(self, core_clock_hz: u32) -> u32 {
        let per_us = core_clock_hz / 1_000_000;
        if per_us == 0 {
            0
        } else {
            self.0 / per_us
        }
    }
}

impl fmt::Debug for Cycles {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Cycles({})", self.0)
    }
}

impl fmt::Display for Cycles {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for Cycles {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "{} cycles", self.0);
    }
}
