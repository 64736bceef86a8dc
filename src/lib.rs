//! CMSIS-NN Test Harness Platform Layer
//!
//! Lets the same CMSIS-NN kernel test code run on real Cortex-M silicon and
//! on an Arm Fixed Virtual Platform (FVP). Hardware calls that test runners
//! make (timers, power, interrupts, sleep, heap, TCM placement) go through
//! capability traits whose implementation is chosen at build time.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    HOST (std feature)                        │
//! │  Log Parser  │  Markdown Renderer  │  Report Storage  │ CLI  │
//! ├─────────────────────────────────────────────────────────────┤
//! │                    RUNNER LAYER                              │
//! │  Model Cases  │  Backend (FVP / PMU)  │  Unity-style Output  │
//! ├─────────────────────────────────────────────────────────────┤
//! │                  PLATFORM SHIM (hal)                         │
//! │  Timer │ Core │ Power │ Interrupts │ Sleep │ Heap │ TCM      │
//! ├─────────────────────────────────────────────────────────────┤
//! │               DEBUG REGISTERS (regs, pmu)                    │
//! │       CoreDebug DEMCR  │  DWT CTRL / CYCCNT / LAR            │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Platform selection
//!
//! - `std` (default): host build, simulated platform, reporting
//! - `embedded`: `no_std` target build with the Cortex-M platform
//! - `embedded` + `fvp`: `no_std` target build with the simulated platform

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

extern crate alloc;

// Must come first so the logging macros are visible to every module below.
#[macro_use]
mod fmt;

/// System configuration and constants
pub mod config;

/// Shared types used across modules
pub mod types;

/// Hardware Abstraction Shim
///
/// Capability traits plus simulated and Cortex-M implementations.
pub mod hal;

/// Debug and trace register definitions
pub mod regs;

/// DWT cycle counter helpers
pub mod pmu;

/// Backend-selecting test case runner
pub mod runner;

/// Test result reporting
///
/// Log parsing, Markdown rendering and JSON report storage.
#[cfg(feature = "std")]
pub mod report;

/// Prelude module for common imports
pub mod prelude {
    //! Convenient re-exports for common types and traits.

    pub use crate::config::*;
    pub use crate::types::*;

    pub use crate::hal::{
        CoreControl, InterruptControl, Platform, PowerControl, SleepControl, TimerControl,
    };
    pub use crate::hal::heap::{allocate, free, HeapBlock};
    pub use crate::hal::platform::ActivePlatform;

    pub use crate::pmu::{Pmu, PmuError};
    pub use crate::regs::{CmsisDefaults, DebugRegisterDefs, DebugRegisters};
    pub use crate::runner::{Backend, CaseFailure, ModelCase, Runner};
}
