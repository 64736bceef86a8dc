//! TCM placement markers (`NS_PUT_IN_TCM`, `NS_PUT_IN_ITCM`, `NS_PUT_IN_DTCM`)
//!
//! Wrap items that should live in tightly coupled memory:
//!
//! ```
//! cmsis_nn_harness::put_in_dtcm! {
//!     static SCRATCH: [u8; 64] = [0; 64];
//! }
//! assert_eq!(SCRATCH.len(), 64);
//! ```
//!
//! On hardware each item gets a `#[link_section]` for the matching region.
//! On the simulated platform the items are emitted unchanged and land in
//! default storage, so placement-dependent timing is not exercised there.

/// Linker section name of a TCM region
///
/// Shared by the placement macros and [`crate::config::sections`].
#[doc(hidden)]
#[macro_export]
macro_rules! tcm_section {
    (tcm) => {
        ".tcm"
    };
    (itcm) => {
        ".itcm"
    };
    (dtcm) => {
        ".dtcm"
    };
}

#[cfg(all(feature = "embedded", not(feature = "fvp")))]
mod placed {
    /// Place items in TCM
    #[macro_export]
    macro_rules! put_in_tcm {
        ($($item:item)*) => { $( #[link_section = $crate::tcm_section!(tcm)] $item )* };
    }

    /// Place items in instruction TCM
    #[macro_export]
    macro_rules! put_in_itcm {
        ($($item:item)*) => { $( #[link_section = $crate::tcm_section!(itcm)] $item )* };
    }

    /// Place items in data TCM
    #[macro_export]
    macro_rules! put_in_dtcm {
        ($($item:item)*) => { $( #[link_section = $crate::tcm_section!(dtcm)] $item )* };
    }
}

#[cfg(not(all(feature = "embedded", not(feature = "fvp"))))]
mod unplaced {
    /// Place items in TCM (ignored on this platform)
    #[macro_export]
    macro_rules! put_in_tcm {
        ($($item:item)*) => { $( $item )* };
    }

    /// Place items in instruction TCM (ignored on this platform)
    #[macro_export]
    macro_rules! put_in_itcm {
        ($($item:item)*) => { $( $item )* };
    }

    /// Place items in data TCM (ignored on this platform)
    #[macro_export]
    macro_rules! put_in_dtcm {
        ($($item:item)*) => { $( $item )* };
    }
}

/// True when the placement macros emit link sections
pub const PLACEMENT_APPLIED: bool = !crate::config::SIMULATED;
