//! Cycle Counter Tests
//!
//! Tests for the DWT enable sequence and cycle measurement against the
//! simulated register file.
//! Run with: cargo test --test pmu_tests

use cmsis_nn_harness::pmu::{Pmu, PmuError};
use cmsis_nn_harness::regs::{
    CmsisDefaults, DebugReg, DebugRegisterDefs, DebugRegisters, SimDebugRegisters,
};
use cmsis_nn_harness::types::Cycles;

/// Vendor header that moves the trace enable bit
#[derive(Clone, Debug, Default)]
struct RelocatedTraceDefs;

impl DebugRegisterDefs for RelocatedTraceDefs {
    const COREDEBUG_DEMCR_TRCENA_POS: u32 = 20;
}

// =============================================================================
// Init Tests
// =============================================================================

#[test]
fn init_enables_trace_and_counter() {
    let mut pmu = Pmu::new(SimDebugRegisters::new());
    assert_eq!(pmu.init(), Ok(()));

    let mut regs = pmu.into_inner();
    assert!(regs.is_unlocked());
    assert!(regs.counting());
    assert_ne!(
        regs.read(DebugReg::Demcr) & CmsisDefaults::COREDEBUG_DEMCR_TRCENA_MSK,
        0
    );
}

#[test]
fn init_zeroes_counter() {
    let mut regs = SimDebugRegisters::new();
    regs.write(DebugReg::DwtCyccnt, 5000);
    let mut pmu = Pmu::new(regs);
    pmu.init().unwrap();
    assert_eq!(pmu.now(), 0);
}

#[test]
fn init_preserves_other_demcr_bits() {
    let mut regs = SimDebugRegisters::new();
    regs.write(DebugReg::Demcr, 0x0000_0401);
    let mut pmu = Pmu::new(&mut regs);
    pmu.init().unwrap();
    assert_eq!(
        regs.read(DebugReg::Demcr),
        0x0000_0401 | CmsisDefaults::COREDEBUG_DEMCR_TRCENA_MSK
    );
}

#[test]
fn init_without_cycle_counter_is_unavailable() {
    let mut pmu = Pmu::new(SimDebugRegisters::without_cycle_counter());
    assert_eq!(pmu.init(), Err(PmuError::Unavailable));
    assert!(!pmu.into_inner().counting());
}

#[test]
fn unavailable_message() {
    assert_eq!(
        PmuError::Unavailable.to_string(),
        "PMU/DWT not available on this build/board."
    );
}

#[test]
fn init_is_repeatable() {
    let mut pmu = Pmu::new(SimDebugRegisters::with_step(7));
    pmu.init().unwrap();
    pmu.init().unwrap();
    assert!(pmu.into_inner().counting());
}

#[test]
fn init_uses_vendor_bit_positions() {
    let mut regs = SimDebugRegisters::<RelocatedTraceDefs>::with_defs(25);
    let mut pmu = Pmu::<_, RelocatedTraceDefs>::with_defs(&mut regs);
    pmu.init().unwrap();
    let ((), cycles) = pmu.measure(|| ());
    assert_eq!(cycles, Cycles(25));

    assert_eq!(regs.read(DebugReg::Demcr), 1 << 20);
    assert_eq!(
        regs.read(DebugReg::Demcr) & CmsisDefaults::COREDEBUG_DEMCR_TRCENA_MSK,
        0
    );
    assert!(regs.counting());
}

#[test]
fn deinit_releases_trace_it_enabled() {
    let mut regs = SimDebugRegisters::<RelocatedTraceDefs>::with_defs(0);
    let mut pmu = Pmu::<_, RelocatedTraceDefs>::with_defs(&mut regs);
    pmu.init().unwrap();
    pmu.deinit();
    assert_eq!(regs.read(DebugReg::Demcr), 0);
}

#[test]
fn deinit_keeps_trace_enabled_by_debugger() {
    let mut regs = SimDebugRegisters::new();
    regs.write(
        DebugReg::Demcr,
        0x0000_0001 | CmsisDefaults::COREDEBUG_DEMCR_TRCENA_MSK,
    );
    let mut pmu = Pmu::new(&mut regs);
    pmu.init().unwrap();
    pmu.deinit();

    assert!(!regs.counting());
    assert_eq!(
        regs.read(DebugReg::Demcr),
        0x0000_0001 | CmsisDefaults::COREDEBUG_DEMCR_TRCENA_MSK
    );
}

// =============================================================================
// Measurement Tests
// =============================================================================

#[test]
fn reset_then_read_reports_elapsed() {
    let mut regs = SimDebugRegisters::new();
    let mut pmu = Pmu::new(&mut regs);
    pmu.init().unwrap();
    pmu.reset_start();
    drop(pmu);

    regs.advance(1234);
    let mut pmu = Pmu::new(&mut regs);
    assert_eq!(pmu.stop_read_cycles(), Cycles(1234));
}

#[test]
fn measure_returns_closure_value() {
    let mut pmu = Pmu::new(SimDebugRegisters::with_step(500));
    pmu.init().unwrap();
    let (value, cycles) = pmu.measure(|| 6 * 7);
    assert_eq!(value, 42);
    assert_eq!(cycles, Cycles(500));
}

#[test]
fn measure_restarts_each_time() {
    let mut pmu = Pmu::new(SimDebugRegisters::with_step(100));
    pmu.init().unwrap();
    let (_, first) = pmu.measure(|| ());
    let (_, second) = pmu.measure(|| ());
    assert_eq!(first, second);
}

#[test]
fn counter_stays_put_without_init() {
    let mut pmu = Pmu::new(SimDebugRegisters::with_step(100));
    let ((), cycles) = pmu.measure(|| ());
    assert_eq!(cycles, Cycles(0));
}

#[test]
fn deinit_stops_counting() {
    let mut pmu = Pmu::new(SimDebugRegisters::with_step(10));
    pmu.init().unwrap();
    pmu.deinit();

    let mut regs = pmu.into_inner();
    assert!(!regs.counting());
    assert_eq!(
        regs.read(DebugReg::DwtCtrl) & CmsisDefaults::DWT_CTRL_CYCCNTENA_MSK,
        0
    );
    assert_eq!(
        regs.read(DebugReg::Demcr) & CmsisDefaults::COREDEBUG_DEMCR_TRCENA_MSK,
        0
    );
}

// =============================================================================
// Cycles Tests
// =============================================================================

#[test]
fn cycles_to_micros() {
    assert_eq!(Cycles(96_000).as_micros(96_000_000), 1000);
    assert_eq!(Cycles(95).as_micros(96_000_000), 0);
    // Clocks under 1 MHz cannot be converted
    assert_eq!(Cycles(1000).as_micros(500_000), 0);
}

#[test]
fn cycles_display() {
    assert_eq!(Cycles(18342).to_string(), "18342");
    assert_eq!(format!("{:?}", Cycles(1)), "Cycles(1)");
}
