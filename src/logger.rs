//! Logging setup.
//!
//! The browser build routes the `log` facade to the devtools console through
//! `console_log`. Native builds (unit tests) install nothing, so records are
//! dropped.

use log::{Level, SetLoggerError};

/// Verbosity for this build: everything down to debug in dev builds.
pub fn level_for(debug_build: bool) -> Level {
    if debug_build {
        Level::Debug
    } else {
        Level::Info
    }
}

/// Install the console logger. Fails if a logger is already set.
#[cfg(target_arch = "wasm32")]
pub fn init(level: Level) -> Result<(), SetLoggerError> {
    console_log::init_with_level(level)
}

#[cfg(not(target_arch = "wasm32"))]
pub fn init(level: Level) -> Result<(), SetLoggerError> {
    log::set_max_level(level.to_level_filter());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn release_builds_skip_debug_records() {
        assert_eq!(level_for(true), Level::Debug);
        assert_eq!(level_for(false), Level::Info);
        assert!(Level::Debug > level_for(false));
    }
}
