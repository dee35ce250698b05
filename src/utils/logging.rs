//! Logger setup and the per-tick logging gate.
//!
//! Tick-level messages fire every second while the monitor runs, so they go
//! through `log_tick!`, which only forwards to `log::debug!` when verbose
//! logging was switched on at startup:
//! ```ignore
//! use crate::log_tick;
//!
//! log_tick!("tick recorded for {}", date);
//! ```

use std::sync::atomic::{AtomicBool, Ordering};

static TICK_LOGS: AtomicBool = AtomicBool::new(false);

/// Read `ANKLEWATCH_DEBUG` the same way everywhere.
pub fn debug_requested() -> bool {
    std::env::var("ANKLEWATCH_DEBUG")
        .map(|value| value == "1" || value.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

/// Install the global logger. `RUST_LOG` still wins over the default level.
pub fn init(debug: bool) {
    let default_level = if debug {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    let _ = env_logger::Builder::new()
        .filter_level(default_level)
        .parse_default_env()
        .try_init();

    set_tick_logging(debug);
}

pub fn set_tick_logging(enabled: bool) {
    TICK_LOGS.store(enabled, Ordering::Relaxed);
}

pub fn tick_logging_enabled() -> bool {
    TICK_LOGS.load(Ordering::Relaxed)
}

/// Debug log that is dropped unless tick logging is enabled.
#[macro_export]
macro_rules! log_tick {
    ($($arg:tt)*) => {
        if $crate::utils::logging::tick_logging_enabled() {
            log::debug!($($arg)*);
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tick_flag_toggles() {
        set_tick_logging(true);
        assert!(tick_logging_enabled());
        set_tick_logging(false);
        assert!(!tick_logging_enabled());
    }
}
