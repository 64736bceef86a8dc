//! Simulated platform for the Fixed Virtual Platform
//!
//! Every power, interrupt and sleep call is a no-op. The timer never reads a
//! clock: `timer_start` resets the start field and `timer_read_us` hands back
//! the stored duration, which stays zero. Code that measures elapsed time
//! through this timer therefore sees a constant.

use super::{CoreControl, InterruptControl, Platform, PowerControl, SleepControl, TimerControl};
use crate::types::TimerHandle;

/// No-op platform used on FVP and on the host
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Fvp;

impl Fvp {
    /// Create the simulated platform
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl TimerControl for Fvp {
    fn timer_start(&mut self, timer: &mut TimerHandle) {
        timer.start_time = 0;
    }

    fn timer_read_us(&mut self, timer: &mut TimerHandle) -> u32 {
        timer.duration
    }
}

impl CoreControl for Fvp {
    fn core_init(&mut self) {
        trace!("fvp: core_init");
    }

    fn core_deinit(&mut self) {
        trace!("fvp: core_deinit");
    }
}

impl PowerControl for Fvp {
    fn power_init(&mut self) {}

    fn power_deinit(&mut self) {}

    fn low_power_init(&mut self) {}

    fn low_power_exit(&mut self) {}
}

impl InterruptControl for Fvp {
    fn interrupt_master_enable(&mut self) {}

    fn interrupt_master_disable(&mut self) {}
}

impl SleepControl for Fvp {
    fn sleep(&mut self) {}

    fn deep_sleep(&mut self) {}
}

impl Platform for Fvp {
    fn name(&self) -> &'static str {
        "fvp"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_resets_only_start_time() {
        let mut fvp = Fvp::new();
        let mut timer = TimerHandle {
            start_time: 77,
            duration: 5,
        };
        fvp.timer_start(&mut timer);
        assert_eq!(timer.start_time, 0);
        assert_eq!(timer.duration, 5);
    }

    #[test]
    fn read_returns_stored_duration() {
        let mut fvp = Fvp::new();
        let mut timer = TimerHandle::new();
        fvp.timer_init(&mut timer);
        fvp.timer_start(&mut timer);
        assert_eq!(fvp.timer_read_us(&mut timer), 0);
        assert_eq!(fvp.timer_read_us(&mut timer), 0);
    }
}
