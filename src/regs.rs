//! Debug and trace register definitions
//!
//! CoreDebug and DWT addresses and bit fields needed for cycle counting.
//! [`DebugRegisterDefs`] carries the CMSIS values as defaults; a vendor set
//! overrides only the constants it actually defines and inherits the rest,
//! so both paths resolve to the same final values.
//!
//! Register access goes through [`DebugRegisters`]: MMIO on hardware, an
//! in-memory register file ([`SimDebugRegisters`]) everywhere else.

use core::marker::PhantomData;

/// CoreDebug / DWT definitions with CMSIS fallbacks
pub trait DebugRegisterDefs {
    /// CoreDebug block base address
    const CORE_DEBUG_BASE: u32 = 0xE000_EDF0;
    /// DWT block base address
    const DWT_BASE: u32 = 0xE000_1000;

    /// DEMCR offset inside the CoreDebug block
    const DEMCR_OFFSET: u32 = 0x00C;
    /// CTRL offset inside the DWT block
    const DWT_CTRL_OFFSET: u32 = 0x000;
    /// CYCCNT offset inside the DWT block
    const DWT_CYCCNT_OFFSET: u32 = 0x004;
    /// LAR offset inside the DWT block
    const DWT_LAR_OFFSET: u32 = 0xFB0;

    /// DWT CTRL cycle counter enable bit
    const DWT_CTRL_CYCCNTENA_POS: u32 = 0;
    /// DWT CTRL cycle counter enable mask
    const DWT_CTRL_CYCCNTENA_MSK: u32 = 1 << Self::DWT_CTRL_CYCCNTENA_POS;
    /// DWT CTRL "no cycle counter" bit
    const DWT_CTRL_NOCYCCNT_POS: u32 = 25;
    /// DWT CTRL "no cycle counter" mask
    const DWT_CTRL_NOCYCCNT_MSK: u32 = 1 << Self::DWT_CTRL_NOCYCCNT_POS;

    /// DEMCR trace enable bit
    const COREDEBUG_DEMCR_TRCENA_POS: u32 = 24;
    /// DEMCR trace enable mask
    const COREDEBUG_DEMCR_TRCENA_MSK: u32 = 1 << Self::COREDEBUG_DEMCR_TRCENA_POS;

    /// Key written to LAR to unlock DWT registers
    const DWT_LAR_KEY: u32 = 0xC5AC_CE55;
}

/// Plain CMSIS definitions, used when no vendor set is present
#[derive(Clone, Copy, Debug, Default)]
pub struct CmsisDefaults;

impl DebugRegisterDefs for CmsisDefaults {}

/// Debug registers touched by the harness
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DebugReg {
    /// CoreDebug Exception and Monitor Control
    Demcr,
    /// DWT Control
    DwtCtrl,
    /// DWT Cycle Count
    DwtCyccnt,
    /// DWT Lock Access
    DwtLar,
}

impl DebugReg {
    /// Absolute address of the register under a definition set
    #[must_use]
    pub const fn address<D: DebugRegisterDefs>(self) -> u32 {
        match self {
            Self::Demcr => D::CORE_DEBUG_BASE + D::DEMCR_OFFSET,
            Self::DwtCtrl => D::DWT_BASE + D::DWT_CTRL_OFFSET,
            Self::DwtCyccnt => D::DWT_BASE + D::DWT_CYCCNT_OFFSET,
            Self::DwtLar => D::DWT_BASE + D::DWT_LAR_OFFSET,
        }
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for DebugReg {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Demcr => defmt::write!(f, "DEMCR"),
            Self::DwtCtrl => defmt::write!(f, "DWT_CTRL"),
            Self::DwtCyccnt => defmt::write!(f, "DWT_CYCCNT"),
            Self::DwtLar => defmt::write!(f, "DWT_LAR"),
        }
    }
}

/// Read/write access to the debug registers
pub trait DebugRegisters {
    /// Read a register
    fn read(&mut self, reg: DebugReg) -> u32;

    /// Write a register
    fn write(&mut self, reg: DebugReg, value: u32);

    /// Read-modify-write a register
    fn modify<F>(&mut self, reg: DebugReg, f: F)
    where
        F: FnOnce(u32) -> u32,
    {
        let value = self.read(reg);
        self.write(reg, f(value));
    }
}

impl<R: DebugRegisters> DebugRegisters for &mut R {
    fn read(&mut self, reg: DebugReg) -> u32 {
        (**self).read(reg)
    }

    fn write(&mut self, reg: DebugReg, value: u32) {
        (**self).write(reg, value);
    }
}

/// Data synchronization barrier
#[inline(always)]
pub fn dsb() {
    #[cfg(feature = "embedded")]
    cortex_m::asm::dsb();
    #[cfg(not(feature = "embedded"))]
    core::sync::atomic::fence(core::sync::atomic::Ordering::SeqCst);
}

/// Instruction synchronization barrier
#[inline(always)]
pub fn isb() {
    #[cfg(feature = "embedded")]
    cortex_m::asm::isb();
    #[cfg(not(feature = "embedded"))]
    core::sync::atomic::fence(core::sync::atomic::Ordering::SeqCst);
}

/// In-memory debug register file
///
/// Models the parts of DEMCR and DWT the harness uses, with bit positions
/// taken from the definition set `D`. While trace and the cycle counter are
/// both enabled, every CYCCNT read first advances the counter by `step`,
/// standing in for the work done since the last read.
#[derive(Clone, Debug, Default)]
pub struct SimDebugRegisters<D = CmsisDefaults> {
    demcr: u32,
    ctrl: u32,
    cyccnt: u32,
    unlocked: bool,
    step: u32,
    no_cycle_counter: bool,
    defs: PhantomData<D>,
}

impl SimDebugRegisters {
    /// Register file with a working cycle counter that does not advance
    #[must_use]
    pub const fn new() -> Self {
        Self::with_step(0)
    }

    /// Register file whose counter advances by `step` on each read
    #[must_use]
    pub const fn with_step(step: u32) -> Self {
        Self::with_defs(step)
    }

    /// Register file of a core built without a cycle counter
    #[must_use]
    pub const fn without_cycle_counter() -> Self {
        Self {
            ctrl: CmsisDefaults::DWT_CTRL_NOCYCCNT_MSK,
            no_cycle_counter: true,
            ..Self::with_step(0)
        }
    }
}

impl<D: DebugRegisterDefs> SimDebugRegisters<D> {
    /// Register file laid out by a vendor definition set
    #[must_use]
    pub const fn with_defs(step: u32) -> Self {
        Self {
            demcr: 0,
            ctrl: 0,
            cyccnt: 0,
            unlocked: false,
            step,
            no_cycle_counter: false,
            defs: PhantomData,
        }
    }

    /// Advance the counter as if `cycles` had elapsed
    pub fn advance(&mut self, cycles: u32) {
        if self.counting() {
            self.cyccnt = self.cyccnt.wrapping_add(cycles);
        }
    }

    /// Check if the unlock key has been written to LAR
    #[must_use]
    pub const fn is_unlocked(&self) -> bool {
        self.unlocked
    }

    /// Check if trace and the cycle counter are both enabled
    #[must_use]
    pub const fn counting(&self) -> bool {
        self.demcr & D::COREDEBUG_DEMCR_TRCENA_MSK != 0
            && self.ctrl & D::DWT_CTRL_CYCCNTENA_MSK != 0
    }
}

impl<D: DebugRegisterDefs> DebugRegisters for SimDebugRegisters<D> {
    fn read(&mut self, reg: DebugReg) -> u32 {
        match reg {
            DebugReg::Demcr => self.demcr,
            DebugReg::DwtCtrl => self.ctrl,
            DebugReg::DwtCyccnt => {
                let step = self.step;
                self.advance(step);
                self.cyccnt
            }
            // LAR is write-only
            DebugReg::DwtLar => 0,
        }
    }

    fn write(&mut self, reg: DebugReg, value: u32) {
        match reg {
            DebugReg::Demcr => self.demcr = value,
            DebugReg::DwtCtrl => {
                self.ctrl = if self.no_cycle_counter {
                    (value & !D::DWT_CTRL_CYCCNTENA_MSK) | D::DWT_CTRL_NOCYCCNT_MSK
                } else {
                    value & !D::DWT_CTRL_NOCYCCNT_MSK
                };
            }
            DebugReg::DwtCyccnt => self.cyccnt = value,
            DebugReg::DwtLar => self.unlocked = value == D::DWT_LAR_KEY,
        }
    }
}

#[cfg(feature = "embedded")]
pub use mmio::MmioDebugRegisters;

#[cfg(feature = "embedded")]
mod mmio {
    #![allow(unsafe_code)]

    use core::marker::PhantomData;

    use cortex_m::peripheral::{DCB, DWT};

    use super::{CmsisDefaults, DebugReg, DebugRegisterDefs, DebugRegisters};

    /// Volatile access to the real CoreDebug and DWT blocks
    ///
    /// Owns the `DCB` and `DWT` peripherals so nothing else can touch the
    /// same registers. Addresses come from the definition set `D`.
    pub struct MmioDebugRegisters<D = CmsisDefaults> {
        _dcb: DCB,
        _dwt: DWT,
        defs: PhantomData<D>,
    }

    impl MmioDebugRegisters {
        /// Take over the debug blocks at the CMSIS addresses
        #[must_use]
        pub fn new(dcb: DCB, dwt: DWT) -> Self {
            Self::with_defs(dcb, dwt)
        }
    }

    impl<D: DebugRegisterDefs> MmioDebugRegisters<D> {
        /// Take over the debug blocks at a vendor set's addresses
        #[must_use]
        pub fn with_defs(dcb: DCB, dwt: DWT) -> Self {
            Self {
                _dcb: dcb,
                _dwt: dwt,
                defs: PhantomData,
            }
        }

        fn ptr(reg: DebugReg) -> *mut u32 {
            reg.address::<D>() as usize as *mut u32
        }
    }

    impl<D: DebugRegisterDefs> DebugRegisters for MmioDebugRegisters<D> {
        fn read(&mut self, reg: DebugReg) -> u32 {
            // SAFETY: fixed, aligned system-control-space address; exclusive
            // ownership of DCB/DWT is held by self.
            unsafe { core::ptr::read_volatile(Self::ptr(reg)) }
        }

        fn write(&mut self, reg: DebugReg, value: u32) {
            // SAFETY: as for read.
            unsafe { core::ptr::write_volatile(Self::ptr(reg), value) }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demcr_address() {
        assert_eq!(DebugReg::Demcr.address::<CmsisDefaults>(), 0xE000_EDFC);
    }

    #[test]
    fn lar_reads_as_zero() {
        let mut regs = SimDebugRegisters::new();
        regs.write(DebugReg::DwtLar, CmsisDefaults::DWT_LAR_KEY);
        assert!(regs.is_unlocked());
        assert_eq!(regs.read(DebugReg::DwtLar), 0);
    }
}
