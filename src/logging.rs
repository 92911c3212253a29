//! Logger setup.
//!
//! Native builds log through `env_logger` (`RUST_LOG` still overrides the
//! configured level); WASM builds log to the browser console.

use crate::config::LogLevel;

/// Install the global logger. Calling it twice is harmless.
#[cfg(not(target_arch = "wasm32"))]
pub fn init(level: LogLevel) {
    let result = env_logger::Builder::new()
        .filter_level(level.to_level_filter())
        .parse_default_env()
        .format_timestamp_millis()
        .try_init();

    if result.is_ok() {
        log::debug!("Logger initialised at {}", level.name());
    }
}

/// Install the console logger and panic hook. Calling it twice is harmless.
#[cfg(target_arch = "wasm32")]
pub fn init(level: LogLevel) {
    console_error_panic_hook::set_once();

    let log_level = level.to_level_filter().to_level().unwrap_or(log::Level::Error);
    if console_log::init_with_level(log_level).is_ok() {
        log::debug!("Console logger initialised at {}", level.name());
    }
}
