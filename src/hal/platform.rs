//! Build-time platform selection
//!
//! `embedded` without `fvp` selects the Cortex-M platform; every other
//! combination selects the simulated one.

#[cfg(all(feature = "embedded", not(feature = "fvp")))]
pub use super::cortex::CortexM as ActivePlatform;

#[cfg(not(all(feature = "embedded", not(feature = "fvp"))))]
pub use super::fvp::Fvp as ActivePlatform;

/// Obtain the active platform
///
/// On hardware this takes the core peripherals and returns `None` on a
/// second call. The simulated platform can always be obtained.
#[must_use]
pub fn take() -> Option<ActivePlatform> {
    #[cfg(all(feature = "embedded", not(feature = "fvp")))]
    {
        ActivePlatform::take()
    }
    #[cfg(not(all(feature = "embedded", not(feature = "fvp"))))]
    {
        Some(ActivePlatform::new())
    }
}
