// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

use std::sync::{atomic::AtomicBool, atomic::Ordering};

#[doc(hidden)]
pub use log as _log;

#[macro_export]
macro_rules! info {
    ($msg:literal, $($arg:tt)+) => {
        trigger_log::_log::info!(target: concat!("trigger.emulator::", module_path!()), $msg, $($arg)+);
    };
    ($msg:literal) => {
        trigger_log::_log::info!(target: concat!("trigger.emulator::", module_path!()), $msg);
    };
}

#[macro_export]
macro_rules! warn {
    ($msg:literal, $($arg:tt)+) => {
        trigger_log::_log::warn!(target: concat!("trigger.emulator::", module_path!()), $msg, $($arg)+);
    };
    ($msg:literal) => {
        trigger_log::_log::warn!(target: concat!("trigger.emulator::", module_path!()), $msg);
    };
}

/// Log a diagnostic message at info level if diagnostics logging is enabled.
///
/// Used for per-boundary detail which would flood the log at any real engine speed.
#[macro_export]
macro_rules! diagnostic {
    ($msg:literal, $($arg:tt)+) => {
        if trigger_log::is_diagnostics_enabled() {
             trigger_log::_log::info!(target: concat!("trigger.emulator::", module_path!()), $msg, $($arg)+);
        }
    };
    ($msg:literal) => {
        if trigger_log::is_diagnostics_enabled() {
            trigger_log::_log::info!(target: concat!("trigger.emulator::", module_path!()), $msg);
        }
    };
}

static DIAGNOSTICS_ENABLED: AtomicBool = AtomicBool::new(false);

#[inline]
pub fn is_diagnostics_enabled() -> bool {
    DIAGNOSTICS_ENABLED.load(Ordering::Acquire)
}

/// Initialize the logging.
///
/// Only sets the diagnostics switch. The `log` backend is installed by the binary.
pub fn init_logging(with_diagnostics: bool) {
    DIAGNOSTICS_ENABLED.store(with_diagnostics, Ordering::Release);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostics_switch() {
        init_logging(true);
        assert!(is_diagnostics_enabled());
        init_logging(false);
        assert!(!is_diagnostics_enabled());
    }
}
