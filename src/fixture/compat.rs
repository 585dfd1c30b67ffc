//! Deprecated fixture surfaces kept for older test suites.
//!
//! Both adapters forward to [`LogCaptureFixture`] and record a
//! [`CompatWarning`] the first time each deprecated entry point is used.

use std::fmt;
use std::sync::Arc;

use delegate::delegate;
use parking_lot::Mutex;

use super::{FixtureError, LogCapture, LogCaptureFixture, RecordTuple};
use crate::handlers::LogCaptureHandler;
use crate::level::FemtoLevel;
use crate::log_record::FemtoLogRecord;
use crate::scoped::ScopedLevelGuard;

/// Code attached to every deprecation warning raised by the adapters.
pub const COMPAT_WARNING_CODE: &str = "L1";

/// A deprecation notice raised against a test item.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompatWarning {
    pub code: &'static str,
    pub message: String,
}

impl CompatWarning {
    fn deprecated(old: &str, new: &str) -> Self {
        Self {
            code: COMPAT_WARNING_CODE,
            message: format!("{old} is deprecated, use {new} instead"),
        }
    }
}

impl fmt::Display for CompatWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "W{} {}", self.code, self.message)
    }
}

/// Per-item warning list. Clones share the list.
#[derive(Clone, Default)]
pub struct WarningRecorder {
    warnings: Arc<Mutex<Vec<CompatWarning>>>,
}

impl WarningRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `warning` unless an identical one is already present.
    pub fn warn(&self, warning: CompatWarning) {
        let mut warnings = self.warnings.lock();
        if warnings.contains(&warning) {
            return;
        }
        warnings.push(warning);
    }

    /// Snapshot in first-seen order.
    pub fn warnings(&self) -> Vec<CompatWarning> {
        self.warnings.lock().clone()
    }
}

/// Fixture accepting the legacy mixed-case method names.
#[derive(Clone)]
pub struct CompatLogCaptureFixture {
    inner: LogCaptureFixture,
    warnings: WarningRecorder,
}

#[allow(non_snake_case)]
impl CompatLogCaptureFixture {
    pub fn new(inner: LogCaptureFixture, warnings: WarningRecorder) -> Self {
        Self { inner, warnings }
    }

    /// Deprecated spelling of [`LogCapture::set_level`].
    pub fn setLevel(&self, level: FemtoLevel, logger: Option<&str>) -> Result<(), FixtureError> {
        self.warnings
            .warn(CompatWarning::deprecated("'caplog.setLevel()'", "'caplog.set_level()'"));
        self.inner.set_level(level, logger)
    }

    /// Deprecated spelling of [`LogCapture::at_level`].
    pub fn atLevel(
        &self,
        level: FemtoLevel,
        logger: Option<&str>,
    ) -> Result<ScopedLevelGuard, FixtureError> {
        self.warnings
            .warn(CompatWarning::deprecated("'caplog.atLevel()'", "'caplog.at_level()'"));
        self.inner.at_level(level, logger)
    }
}

impl LogCapture for CompatLogCaptureFixture {
    delegate! {
        to self.inner {
            fn handler(&self) -> Result<Arc<LogCaptureHandler>, FixtureError>;
            fn records(&self) -> Result<Vec<FemtoLogRecord>, FixtureError>;
            fn record_tuples(&self) -> Result<Vec<RecordTuple>, FixtureError>;
            fn text(&self) -> Result<String, FixtureError>;
            fn set_level(&self, level: FemtoLevel, logger: Option<&str>) -> Result<(), FixtureError>;
            fn at_level(&self, level: FemtoLevel, logger: Option<&str>) -> Result<ScopedLevelGuard, FixtureError>;
        }
    }
}

/// Fixture for suites that read captures through call syntax.
///
/// Reading records, tuples or text warns once each; level control is
/// forwarded silently.
#[derive(Clone)]
pub struct CallStyleLogCaptureFixture {
    inner: LogCaptureFixture,
    warnings: WarningRecorder,
}

impl CallStyleLogCaptureFixture {
    pub fn new(inner: LogCaptureFixture, warnings: WarningRecorder) -> Self {
        Self { inner, warnings }
    }

    fn warn_call(&self, name: &str) {
        self.warnings.warn(CompatWarning::deprecated(
            &format!("'caplog.{name}()' syntax"),
            &format!("'caplog.{name}' property"),
        ));
    }
}

impl LogCapture for CallStyleLogCaptureFixture {
    delegate! {
        to self.inner {
            fn handler(&self) -> Result<Arc<LogCaptureHandler>, FixtureError>;
            fn set_level(&self, level: FemtoLevel, logger: Option<&str>) -> Result<(), FixtureError>;
            fn at_level(&self, level: FemtoLevel, logger: Option<&str>) -> Result<ScopedLevelGuard, FixtureError>;
        }
    }

    fn records(&self) -> Result<Vec<FemtoLogRecord>, FixtureError> {
        self.warn_call("records");
        self.inner.records()
    }

    fn record_tuples(&self) -> Result<Vec<RecordTuple>, FixtureError> {
        self.warn_call("record_tuples");
        self.inner.record_tuples()
    }

    fn text(&self) -> Result<String, FixtureError> {
        self.warn_call("text");
        self.inner.text()
    }
}
