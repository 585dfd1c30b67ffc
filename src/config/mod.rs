//! Configuration for log capture.
//!
//! Values come from an INI file section and are then overridden by whatever
//! the surrounding runner parsed from its command line.

mod ini_file;
mod types;

pub use ini_file::INI_SECTION;
pub use types::{CaptureConfig, CliOverrides, ConfigError, DEFAULT_LOG_DATE_FORMAT, DEFAULT_LOG_FORMAT};
