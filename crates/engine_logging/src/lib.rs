#![deny(missing_docs)]
//! Shared logging utilities for the converter workspace.
//!
//! This crate provides the `engine_*` logging macros used across the codebase,
//! the log file location used by the command-line front end, and a minimal
//! test initializer for the global logger.

use std::path::Path;

/// Default log file written by the front end, relative to the working directory.
pub const LOG_FILE_NAME: &str = "comic-convert.log";

/// Returns the log file path inside `dir`.
pub fn log_file_in(dir: &Path) -> std::path::PathBuf {
    dir.join(LOG_FILE_NAME)
}

/// Picks the console level for a run: `Debug` when verbose, `Info` otherwise.
pub fn level_for(verbose: bool) -> log::LevelFilter {
    if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    }
}

/// Logs a trace-level message using the global logging facade.
#[macro_export]
macro_rules! engine_trace {
    ($($arg:tt)*) => {{
        log::trace!($($arg)*);
    }};
}

/// Logs an info-level message using the global logging facade.
#[macro_export]
macro_rules! engine_info {
    ($($arg:tt)*) => {{
        log::info!($($arg)*);
    }};
}

/// Logs a debug-level message using the global logging facade.
#[macro_export]
macro_rules! engine_debug {
    ($($arg:tt)*) => {{
        log::debug!($($arg)*);
    }};
}

/// Logs a warn-level message using the global logging facade.
#[macro_export]
macro_rules! engine_warn {
    ($($arg:tt)*) => {{
        log::warn!($($arg)*);
    }};
}

/// Logs an error-level message using the global logging facade.
#[macro_export]
macro_rules! engine_error {
    ($($arg:tt)*) => {{
        log::error!($($arg)*);
    }};
}

/// Initializes a simple terminal logger for use in unit tests.
///
/// This safely no-ops if another logger has already been initialized.
pub fn initialize_for_tests() {
    use simplelog::{ColorChoice, CombinedLogger, Config, TermLogger, TerminalMode};

    // Use debug level in debug builds, info in release builds.
    let level = level_for(cfg!(debug_assertions));

    // Ignore the error if a logger was already set by another test.
    let _ = CombinedLogger::init(vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbose_raises_level_to_debug() {
        assert_eq!(level_for(true), log::LevelFilter::Debug);
        assert_eq!(level_for(false), log::LevelFilter::Info);
    }

    #[test]
    fn log_file_lands_in_given_directory() {
        let path = log_file_in(Path::new("/tmp/run"));
        assert!(path.ends_with(LOG_FILE_NAME));
        assert!(path.starts_with("/tmp/run"));
    }

    #[test]
    fn test_logger_init_is_idempotent() {
        initialize_for_tests();
        initialize_for_tests();
        engine_info!("logger ready");
    }
}
