//! Logging setup
//!
//! Everything in the crate logs through the `log` facade. Processes embedding
//! Strata pick the backend; the `strata` binary and the tests use
//! `env_logger`. `RUST_LOG` always overrides the default filter.
//!
//! ```no_run
//! strata::logging::init(false);
//! log::info!("ready");
//! ```

use env_logger::{Builder, Env};

/// Default filter when the debug flag is off
pub const DEFAULT_FILTER: &str = "info";

/// Default filter when the debug flag is on
pub const DEBUG_FILTER: &str = "debug";

/// Filter used when `RUST_LOG` is unset
pub fn default_filter(debug: bool) -> &'static str {
    if debug {
        DEBUG_FILTER
    } else {
        DEFAULT_FILTER
    }
}

/// Install `env_logger` as the global logger.
///
/// Returns false if a logger was already installed.
pub fn init(debug: bool) -> bool {
    Builder::from_env(Env::default().default_filter_or(default_filter(debug)))
        .format_timestamp_millis()
        .try_init()
        .is_ok()
}

/// Capture-friendly logger for tests; repeated calls are harmless
pub fn init_for_tests() {
    let _ = Builder::from_env(Env::default().default_filter_or(DEBUG_FILTER))
        .is_test(true)
        .try_init();
}
