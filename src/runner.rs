//! Test case runner
//!
//! Runs generated model cases through either backend and prints Unity-style
//! result lines:
//!
//! ```text
//! [PERF] test__conv2d_s8_0: 18342 cycles
//! test__conv2d_s8_0:PASS
//! test__add_s16_3:FAIL:Model run (PMU) failed: test__add_s16_3
//! -----------------------
//! 2 Tests 1 Failures 0 Ignored
//! FAIL
//! ```
//!
//! The FVP backend only checks correctness. The PMU backend additionally
//! measures the run with the DWT cycle counter.

use core::fmt::{self, Write};

use heapless::String;

use crate::config::{LINE_CAPACITY, PERF_TAG, PMU_UNAVAILABLE_MSG};
use crate::pmu::Pmu;
use crate::regs::{CmsisDefaults, DebugRegisterDefs, DebugRegisters};
pub use crate::types::Backend;
use crate::types::Cycles;

/// Non-zero status code returned by a model case
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[error("status {code}")]
pub struct CaseFailure {
    /// Status code reported by the case
    pub code: i32,
}

impl CaseFailure {
    /// Convert a C-style status code (`0` = success)
    ///
    /// # Errors
    ///
    /// Returns the failure for any non-zero status.
    pub const fn check(code: i32) -> Result<(), Self> {
        if code == 0 {
            Ok(())
        } else {
            Err(Self { code })
        }
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for CaseFailure {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "status {}", self.code);
    }
}

/// A generated model test case
pub trait ModelCase {
    /// Test function name, e.g. `test__conv2d_s8_0`
    fn name(&self) -> &str;

    /// Prepare buffers and quantization parameters
    ///
    /// # Errors
    ///
    /// Returns the status code of a failed initialization.
    fn init(&mut self) -> Result<(), CaseFailure>;

    /// Run the model once and check its output
    ///
    /// # Errors
    ///
    /// Returns the status code of a failed run.
    fn run(&mut self) -> Result<(), CaseFailure>;
}

/// Stage at which a case failed
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailureStage {
    /// `init` returned an error
    Init,
    /// The cycle counter could not be enabled
    PmuUnavailable,
    /// `run` returned an error
    Run,
}

/// Result of one case
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    /// Case passed
    Pass,
    /// Case failed at the given stage
    Fail(FailureStage, Option<CaseFailure>),
}

/// Outcome of running one case
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CaseOutcome {
    /// Pass or failure
    pub verdict: Verdict,
    /// Cycles measured by the PMU backend
    pub cycles: Option<Cycles>,
}

impl CaseOutcome {
    /// Check if the case passed
    #[must_use]
    pub const fn passed(&self) -> bool {
        matches!(self.verdict, Verdict::Pass)
    }
}

/// Tally of executed cases
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Tally {
    /// Cases run
    pub tests: u32,
    /// Cases failed
    pub failures: u32,
    /// Cases ignored
    pub ignored: u32,
}

impl Tally {
    /// Check if every case passed
    #[must_use]
    pub const fn ok(&self) -> bool {
        self.failures == 0
    }
}

/// Runs model cases against one backend
pub struct Runner<R, D = CmsisDefaults> {
    backend: Backend,
    pmu: Pmu<R, D>,
    tally: Tally,
}

impl<R: DebugRegisters> Runner<R> {
    /// Create a runner over debug registers laid out per CMSIS
    pub fn new(backend: Backend, regs: R) -> Self {
        Self::with_pmu(backend, Pmu::new(regs))
    }
}

impl<R: DebugRegisters, D: DebugRegisterDefs> Runner<R, D> {
    /// Create a runner around an existing cycle counter driver
    pub fn with_pmu(backend: Backend, pmu: Pmu<R, D>) -> Self {
        Self {
            backend,
            pmu,
            tally: Tally::default(),
        }
    }

    /// Selected backend
    pub const fn backend(&self) -> Backend {
        self.backend
    }

    /// Cases counted so far
    pub const fn tally(&self) -> Tally {
        self.tally
    }

    /// Release the register file
    pub fn into_registers(self) -> R {
        self.pmu.into_inner()
    }

    /// Run one case and write its result lines to `out`
    ///
    /// # Errors
    ///
    /// Only fails if writing to `out` fails.
    pub fn run_case<C, W>(&mut self, case: &mut C, out: &mut W) -> Result<CaseOutcome, fmt::Error>
    where
        C: ModelCase + ?Sized,
        W: Write,
    {
        let outcome = self.execute(case);
        let name = case.name();

        if let Some(cycles) = outcome.cycles {
            write_perf(out, name, cycles)?;
            out.write_char('\n')?;
        }

        match outcome.verdict {
            Verdict::Pass => {
                info!("runner: {} passed", name);
                writeln!(out, "{name}:PASS")?;
            }
            Verdict::Fail(stage, failure) => {
                // Log copy is left empty if it overflows; `out` gets the full line
                let mut message: String<LINE_CAPACITY> = String::new();
                let _ = write_failure_message(&mut message, stage, self.backend, name);
                warn!("runner: {} failed ({})", name, message.as_str());
                if let Some(CaseFailure { code }) = failure {
                    debug!("runner: status code {}", code);
                }
                write!(out, "{name}:FAIL:")?;
                write_failure_message(out, stage, self.backend, name)?;
                out.write_char('\n')?;
                self.tally.failures += 1;
            }
        }
        self.tally.tests += 1;

        Ok(outcome)
    }

    /// Record a case that was skipped
    ///
    /// # Errors
    ///
    /// Only fails if writing to `out` fails.
    pub fn ignore<W: Write>(&mut self, name: &str, reason: &str, out: &mut W) -> fmt::Result {
        writeln!(out, "{name}:IGNORE:{reason}")?;
        self.tally.tests += 1;
        self.tally.ignored += 1;
        Ok(())
    }

    /// Print the closing summary and return the tally
    ///
    /// # Errors
    ///
    /// Only fails if writing to `out` fails.
    pub fn finish<W: Write>(&mut self, out: &mut W) -> Result<Tally, fmt::Error> {
        let tally = self.tally;
        writeln!(out, "-----------------------")?;
        writeln!(
            out,
            "{} Tests {} Failures {} Ignored",
            tally.tests, tally.failures, tally.ignored
        )?;
        writeln!(out, "{}", if tally.ok() { "OK" } else { "FAIL" })?;
        Ok(tally)
    }

    fn execute<C: ModelCase + ?Sized>(&mut self, case: &mut C) -> CaseOutcome {
        if let Err(failure) = case.init() {
            return CaseOutcome {
                verdict: Verdict::Fail(FailureStage::Init, Some(failure)),
                cycles: None,
            };
        }

        match self.backend {
            Backend::Fvp => CaseOutcome {
                verdict: verdict_of(case.run()),
                cycles: None,
            },
            Backend::Pmu => {
                if self.pmu.init().is_err() {
                    return CaseOutcome {
                        verdict: Verdict::Fail(FailureStage::PmuUnavailable, None),
                        cycles: None,
                    };
                }
                let (result, cycles) = self.pmu.measure(|| case.run());
                CaseOutcome {
                    verdict: verdict_of(result),
                    cycles: Some(cycles),
                }
            }
        }
    }
}

fn verdict_of(result: Result<(), CaseFailure>) -> Verdict {
    match result {
        Ok(()) => Verdict::Pass,
        Err(failure) => Verdict::Fail(FailureStage::Run, Some(failure)),
    }
}

/// Write the `[PERF]` line for a measured case, without the newline
///
/// # Errors
///
/// Only fails if writing to `out` fails.
pub fn write_perf<W: Write + ?Sized>(out: &mut W, name: &str, cycles: Cycles) -> fmt::Result {
    write!(out, "{PERF_TAG} {name}: {cycles} cycles")
}

/// Write the failure message for a stage
///
/// # Errors
///
/// Only fails if writing to `out` fails.
pub fn write_failure_message<W: Write + ?Sized>(
    out: &mut W,
    stage: FailureStage,
    backend: Backend,
    name: &str,
) -> fmt::Result {
    match stage {
        FailureStage::Init => write!(out, "Model init failed: {name}"),
        FailureStage::PmuUnavailable => out.write_str(PMU_UNAVAILABLE_MSG),
        FailureStage::Run => write!(out, "Model run ({}) failed: {name}", backend.label()),
    }
}
