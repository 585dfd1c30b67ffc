//! Per-test log capture for Rust test runners.
//!
//! femtocatch owns a small logger hierarchy ([`Manager`], [`FemtoLogger`])
//! and captures what it emits while a test runs. [`CaptureSession`] attaches
//! a handler for a scope and restores the hierarchy afterwards;
//! [`CatchLogPlugin`] drives one session per test phase and attaches the
//! captured text to the item's report; [`LogCaptureFixture`] lets the
//! running test inspect and adjust the capture.
//!
//! With the default features, records logged through the `log` and
//! `tracing` facades are routed into the hierarchy as well.

pub mod config;
mod control;
pub mod filters;
pub mod fixture;
pub mod formatter;
mod handler;
pub mod handlers;
mod level;
#[cfg(feature = "log-compat")]
pub mod log_compat;
mod log_record;
mod logger;
pub mod manager;
pub mod plugin;
mod rate_limited_warner;
pub mod scoped;
mod session;
#[cfg(feature = "tracing-compat")]
pub mod tracing_compat;
mod verbosity;

#[cfg(test)]
mod test_utils;

pub use config::{CaptureConfig, CliOverrides, ConfigError};
pub use control::{HandlerHost, LevelControl};
pub use filters::{FemtoFilter, NameFilter};
pub use fixture::{
    CallStyleLogCaptureFixture, CaptureHandle, CompatLogCaptureFixture, CompatWarning,
    FixtureError, LogCapture, LogCaptureFixture, RecordTuple, WarningRecorder,
};
pub use formatter::{
    DefaultFormatter, FemtoFormatter, FormatError, PatternFormatter, SharedFormatter,
};
pub use handler::{FemtoHandlerTrait, HandlerConfig, HandlerError, SharedHandler, same_handler};
pub use handlers::{FemtoStreamHandler, LogCaptureHandler};
pub use level::{FemtoLevel, LevelRegistry};
#[cfg(feature = "log-compat")]
pub use log_compat::{FemtoLogAdapter, install_global_logger};
pub use log_record::{FemtoLogRecord, RecordMetadata, render_template};
pub use logger::FemtoLogger;
pub use manager::{Manager, ROOT_LOGGER};
pub use plugin::{CatchLogPlugin, ItemState, Phase, PhaseCapture, PhaseError, ReportSection, TestItem};
pub use scoped::{GuardStack, Release, ScopedHandlerGuard, ScopedLevelGuard};
pub use session::{CaptureOptions, CaptureScopeState, CaptureSession, SessionError};
#[cfg(feature = "tracing-compat")]
pub use tracing_compat::FemtoTracingLayer;
pub use verbosity::VerbosityLevelTable;
