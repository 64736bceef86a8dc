//! Hardware Abstraction Shim
//!
//! Test runners talk to the platform through the capability traits below.
//! Two implementations exist: [`fvp::Fvp`] turns every call into a no-op so
//! binaries run unmodified on the Fixed Virtual Platform, and
//! `cortex::CortexM` (feature `embedded`) drives real Cortex-M silicon.
//! [`platform::ActivePlatform`] names whichever one the build selected.

pub mod fvp;
pub mod heap;
pub mod platform;
pub mod tcm;

#[cfg(feature = "embedded")]
pub mod cortex;

use crate::types::TimerHandle;

/// Timer lifecycle (`ns_timer_*`)
pub trait TimerControl {
    /// Zero both fields of the handle
    fn timer_init(&mut self, timer: &mut TimerHandle) {
        *timer = TimerHandle::new();
    }

    /// Mark the start of a measurement
    fn timer_start(&mut self, timer: &mut TimerHandle);

    /// Update and return the elapsed time in microseconds
    fn timer_read_us(&mut self, timer: &mut TimerHandle) -> u32;
}

/// Core bring-up (`ns_core_init` / `ns_core_deinit`)
pub trait CoreControl {
    /// Initialize the core
    fn core_init(&mut self);

    /// Release the core
    fn core_deinit(&mut self);
}

/// Power management (`ns_power_*`, `am_bsp_low_power_*`)
pub trait PowerControl {
    /// Configure power for running tests
    fn power_init(&mut self);

    /// Undo [`PowerControl::power_init`]
    fn power_deinit(&mut self);

    /// Enter the board low-power configuration
    fn low_power_init(&mut self);

    /// Leave the board low-power configuration
    fn low_power_exit(&mut self);
}

/// Interrupt master switch (`am_hal_interrupt_master_*`)
pub trait InterruptControl {
    /// Globally enable interrupts
    fn interrupt_master_enable(&mut self);

    /// Globally disable interrupts
    fn interrupt_master_disable(&mut self);
}

/// System sleep (`am_hal_sysctrl_sleep`)
pub trait SleepControl {
    /// Normal sleep until the next interrupt
    fn sleep(&mut self);

    /// Deep sleep until the next wake-up source
    fn deep_sleep(&mut self);
}

/// Everything a test runner needs from the platform
pub trait Platform:
    TimerControl + CoreControl + PowerControl + InterruptControl + SleepControl
{
    /// Human-readable platform name
    fn name(&self) -> &'static str;

    /// Bring the platform up in the order test runners expect
    fn bring_up(&mut self) {
        self.core_init();
        self.power_init();
        self.interrupt_master_enable();
    }

    /// Tear the platform down in reverse bring-up order
    fn tear_down(&mut self) {
        self.interrupt_master_disable();
        self.power_deinit();
        self.core_deinit();
    }
}
