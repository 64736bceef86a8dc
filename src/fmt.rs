//! Logging shims
//!
//! `defmt` on target, `tracing` on the host, nothing when neither is built.
//! Only plain `{}` placeholders are used so one format string works for both.

#![allow(unused_macros)]

macro_rules! trace {
    ($($arg:tt)*) => {{
        #[cfg(feature = "embedded")]
        ::defmt::trace!($($arg)*);
        #[cfg(all(feature = "std", not(feature = "embedded")))]
        ::tracing::trace!($($arg)*);
        #[cfg(not(any(feature = "std", feature = "embedded")))]
        let _ = ::core::format_args!($($arg)*);
    }};
}

macro_rules! debug {
    ($($arg:tt)*) => {{
        #[cfg(feature = "embedded")]
        ::defmt::debug!($($arg)*);
        #[cfg(all(feature = "std", not(feature = "embedded")))]
        ::tracing::debug!($($arg)*);
        #[cfg(not(any(feature = "std", feature = "embedded")))]
        let _ = ::core::format_args!($($arg)*);
    }};
}

macro_rules! info {
    ($($arg:tt)*) => {{
        #[cfg(feature = "embedded")]
        ::defmt::info!($($arg)*);
        #[cfg(all(feature = "std", not(feature = "embedded")))]
        ::tracing::info!($($arg)*);
        #[cfg(not(any(feature = "std", feature = "embedded")))]
        let _ = ::core::format_args!($($arg)*);
    }};
}

macro_rules! warn {
    ($($arg:tt)*) => {{
        #[cfg(feature = "embedded")]
        ::defmt::warn!($($arg)*);
        #[cfg(all(feature = "std", not(feature = "embedded")))]
        ::tracing::warn!($($arg)*);
        #[cfg(not(any(feature = "std", feature = "embedded")))]
        let _ = ::core::format_args!($($arg)*);
    }};
}

/// Low-power print, the harness replacement for `ns_lp_printf`.
///
/// Prints through `defmt::println!` on target.
#[cfg(feature = "embedded")]
#[macro_export]
macro_rules! lp_print {
    ($($arg:tt)*) => {
        ::defmt::println!($($arg)*)
    };
}

/// Low-power print, the harness replacement for `ns_lp_printf`.
///
/// Prints to stdout on the host.
#[cfg(all(feature = "std", not(feature = "embedded")))]
#[macro_export]
macro_rules! lp_print {
    ($($arg:tt)*) => {
        ::std::println!($($arg)*)
    };
}

/// Low-power print, the harness replacement for `ns_lp_printf`.
///
/// Discarded when no output backend is built in.
#[cfg(not(any(feature = "std", feature = "embedded")))]
#[macro_export]
macro_rules! lp_print {
    ($($arg:tt)*) => {{
        let _ = ::core::format_args!($($arg)*);
    }};
}
