//! Cortex-M platform for real silicon
//!
//! Interrupt control goes through PRIMASK, sleep through WFI with the
//! SLEEPDEEP / SLEEPONEXIT bits in SCB, and the timer through the DWT cycle
//! counter.

#![allow(unsafe_code)]

use cortex_m::peripheral::SCB;

use super::{CoreControl, InterruptControl, Platform, PowerControl, SleepControl, TimerControl};
use crate::config::CORE_CLOCK_HZ;
use crate::pmu::Pmu;
use crate::regs::{CmsisDefaults, DebugRegisterDefs, MmioDebugRegisters};
use crate::types::{Cycles, TimerHandle};

/// Hardware platform
///
/// `D` selects the debug register definitions used for the cycle counter.
pub struct CortexM<D = CmsisDefaults> {
    scb: SCB,
    pmu: Pmu<MmioDebugRegisters<D>, D>,
    core_clock_hz: u32,
    cycle_counter: bool,
}

impl CortexM {
    /// Take the core peripherals and build the platform
    ///
    /// Returns `None` if the peripherals were already taken.
    #[must_use]
    pub fn take() -> Option<Self> {
        let p = cortex_m::Peripherals::take()?;
        Some(Self::new(
            p.SCB,
            MmioDebugRegisters::new(p.DCB, p.DWT),
            CORE_CLOCK_HZ,
        ))
    }
}

impl<D: DebugRegisterDefs> CortexM<D> {
    /// Build the platform from its peripherals
    #[must_use]
    pub fn new(scb: SCB, regs: MmioDebugRegisters<D>, core_clock_hz: u32) -> Self {
        Self {
            scb,
            pmu: Pmu::with_defs(regs),
            core_clock_hz,
            cycle_counter: false,
        }
    }

    /// Access the cycle counter driver
    pub fn pmu(&mut self) -> &mut Pmu<MmioDebugRegisters<D>, D> {
        &mut self.pmu
    }
}

impl<D: DebugRegisterDefs> TimerControl for CortexM<D> {
    fn timer_start(&mut self, timer: &mut TimerHandle) {
        timer.start_time = self.pmu.now();
    }

    fn timer_read_us(&mut self, timer: &mut TimerHandle) -> u32 {
        if !self.cycle_counter {
            return timer.duration;
        }
        let elapsed = self.pmu.now().wrapping_sub(timer.start_time);
        timer.duration = Cycles(elapsed).as_micros(self.core_clock_hz);
        timer.duration
    }
}

impl<D: DebugRegisterDefs> CoreControl for CortexM<D> {
    fn core_init(&mut self) {
        self.cycle_counter = self.pmu.init().is_ok();
        info!("cortex-m: core init, cycle counter {}", self.cycle_counter);
    }

    fn core_deinit(&mut self) {
        if self.cycle_counter {
            self.pmu.deinit();
            self.cycle_counter = false;
        }
    }
}

impl<D: DebugRegisterDefs> PowerControl for CortexM<D> {
    fn power_init(&mut self) {
        self.scb.clear_sleepdeep();
        self.scb.clear_sleeponexit();
    }

    // Nothing was acquired by power_init.
    fn power_deinit(&mut self) {}

    fn low_power_init(&mut self) {
        self.scb.set_sleeponexit();
    }

    fn low_power_exit(&mut self) {
        self.scb.clear_sleeponexit();
    }
}

impl<D: DebugRegisterDefs> InterruptControl for CortexM<D> {
    fn interrupt_master_enable(&mut self) {
        // SAFETY: the harness runs single-threaded with no critical sections
        // open across this call.
        unsafe { cortex_m::interrupt::enable() };
    }

    fn interrupt_master_disable(&mut self) {
        cortex_m::interrupt::disable();
    }
}

impl<D: DebugRegisterDefs> SleepControl for CortexM<D> {
    fn sleep(&mut self) {
        self.scb.clear_sleepdeep();
        cortex_m::asm::dsb();
        cortex_m::asm::wfi();
    }

    fn deep_sleep(&mut self) {
        self.scb.set_sleepdeep();
        cortex_m::asm::dsb();
        cortex_m::asm::wfi();
        self.scb.clear_sleepdeep();
    }
}

impl<D: DebugRegisterDefs> Platform for CortexM<D> {
    fn name(&self) -> &'static str {
        "cortex-m"
    }
}
