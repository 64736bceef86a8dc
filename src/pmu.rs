//! DWT cycle counter helpers
//!
//! Measures how many core cycles a model run takes. The sequence is the
//! classic CMSIS one: enable trace in DEMCR, unlock the DWT, zero CYCCNT,
//! enable the counter, then bracket the work with barriers.

use core::marker::PhantomData;

use crate::regs::{dsb, isb, CmsisDefaults, DebugReg, DebugRegisterDefs, DebugRegisters};
use crate::types::Cycles;

/// Cycle counter errors
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum PmuError {
    /// The core has no usable DWT cycle counter
    #[error("PMU/DWT not available on this build/board.")]
    Unavailable,
}

#[cfg(feature = "embedded")]
impl defmt::Format for PmuError {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Unavailable => defmt::write!(f, "PMU unavailable"),
        }
    }
}

/// Cycle counter driver over a debug register file
///
/// Bit positions and the unlock key come from the definition set `D`.
#[derive(Debug)]
pub struct Pmu<R, D = CmsisDefaults> {
    regs: R,
    // TRCENA was clear before init and is ours to release
    trace_owned: bool,
    defs: PhantomData<D>,
}

impl<R: DebugRegisters> Pmu<R> {
    /// Wrap a debug register file laid out per CMSIS
    pub const fn new(regs: R) -> Self {
        Self::with_defs(regs)
    }
}

impl<R: DebugRegisters, D: DebugRegisterDefs> Pmu<R, D> {
    /// Wrap a debug register file laid out per a vendor definition set
    pub const fn with_defs(regs: R) -> Self {
        Self {
            regs,
            trace_owned: false,
            defs: PhantomData,
        }
    }

    /// Release the register file
    pub fn into_inner(self) -> R {
        self.regs
    }

    /// Enable trace and start the cycle counter from zero
    ///
    /// # Errors
    ///
    /// Returns [`PmuError::Unavailable`] when the DWT reports no cycle
    /// counter or the enable bit does not stick.
    pub fn init(&mut self) -> Result<(), PmuError> {
        let demcr = self.regs.read(DebugReg::Demcr);
        if demcr & D::COREDEBUG_DEMCR_TRCENA_MSK == 0 {
            self.regs
                .write(DebugReg::Demcr, demcr | D::COREDEBUG_DEMCR_TRCENA_MSK);
            self.trace_owned = true;
        }

        if self.regs.read(DebugReg::DwtCtrl) & D::DWT_CTRL_NOCYCCNT_MSK != 0 {
            warn!("pmu: DWT has no cycle counter");
            return Err(PmuError::Unavailable);
        }

        self.regs.write(DebugReg::DwtLar, D::DWT_LAR_KEY);
        self.regs.write(DebugReg::DwtCyccnt, 0);
        self.regs
            .modify(DebugReg::DwtCtrl, |ctrl| ctrl | D::DWT_CTRL_CYCCNTENA_MSK);

        if self.regs.read(DebugReg::DwtCtrl) & D::DWT_CTRL_CYCCNTENA_MSK == 0 {
            warn!("pmu: cycle counter enable did not stick");
            return Err(PmuError::Unavailable);
        }

        debug!("pmu: cycle counter enabled");
        Ok(())
    }

    /// Stop the cycle counter
    ///
    /// Trace is only released if [`Pmu::init`] was the one to enable it; a
    /// debugger that had TRCENA set keeps it.
    pub fn deinit(&mut self) {
        self.regs
            .modify(DebugReg::DwtCtrl, |ctrl| ctrl & !D::DWT_CTRL_CYCCNTENA_MSK);
        if self.trace_owned {
            self.regs
                .modify(DebugReg::Demcr, |demcr| demcr & !D::COREDEBUG_DEMCR_TRCENA_MSK);
            self.trace_owned = false;
        }
    }

    /// Zero the counter and fence so the measured region starts clean
    pub fn reset_start(&mut self) {
        self.regs.write(DebugReg::DwtCyccnt, 0);
        dsb();
        isb();
    }

    /// Fence and read the cycles elapsed since [`Pmu::reset_start`]
    pub fn stop_read_cycles(&mut self) -> Cycles {
        dsb();
        isb();
        Cycles(self.regs.read(DebugReg::DwtCyccnt))
    }

    /// Read the counter without resetting it
    pub fn now(&mut self) -> u32 {
        self.regs.read(DebugReg::DwtCyccnt)
    }

    /// Run `f` between a reset and a read of the counter
    pub fn measure<T, F>(&mut self, f: F) -> (T, Cycles)
    where
        F: FnOnce() -> T,
    {
        self.reset_start();
        let out = f();
        let cycles = self.stop_read_cycles();
        (out, cycles)
    }
}
