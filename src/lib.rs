// agent-check library - public API

// Re-export error types
pub mod error;
pub use error::{CheckError, Result};

// Module declarations
pub mod commands;
pub mod core;
pub mod ui;

// Re-export commonly used types
pub use crate::core::evaluator::{CheckRun, PerformanceData};
pub use crate::core::severity::Severity;
pub use crate::core::threshold::{RangeSpec, Thresholds};

/// Initialize logging on stderr; stdout is reserved for the plugin line.
/// `RUST_LOG` overrides the level picked from the verbosity count.
pub fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        _ => log::LevelFilter::Debug,
    };

    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .target(env_logger::Target::Stderr)
        .init();
}
