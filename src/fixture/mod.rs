//! Test-facing access to the capture of the running phase.
//!
//! The plugin publishes each phase's [`LogCaptureHandler`] into a
//! [`CaptureHandle`]; fixtures read through the handle so they always see
//! the phase currently executing and fail with
//! [`FixtureError::NoActiveCapture`] between phases.

mod compat;

use std::sync::Arc;

use parking_lot::RwLock;
use thiserror::Error;

use crate::control::LevelControl;
use crate::handlers::LogCaptureHandler;
use crate::level::FemtoLevel;
use crate::log_record::FemtoLogRecord;
use crate::manager::Manager;
use crate::scoped::ScopedLevelGuard;

pub use compat::{
    CallStyleLogCaptureFixture, CompatLogCaptureFixture, CompatWarning, WarningRecorder,
    COMPAT_WARNING_CODE,
};

/// Errors raised by fixture access.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FixtureError {
    /// No phase is capturing, so there is nothing to read or adjust.
    #[error("no log capture is active for this test item")]
    NoActiveCapture,
}

/// Slot holding the capture handler of the phase in progress.
///
/// Clones share the slot. The handle never owns the capture: retracting it
/// leaves the handler with whoever published it.
#[derive(Clone, Default)]
pub struct CaptureHandle {
    slot: Arc<RwLock<Option<Arc<LogCaptureHandler>>>>,
}

impl CaptureHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish(&self, handler: Arc<LogCaptureHandler>) {
        *self.slot.write() = Some(handler);
    }

    /// Empty the slot, returning the handler that was published.
    pub fn retract(&self) -> Option<Arc<LogCaptureHandler>> {
        self.slot.write().take()
    }

    pub fn current(&self) -> Result<Arc<LogCaptureHandler>, FixtureError> {
        self.slot.read().clone().ok_or(FixtureError::NoActiveCapture)
    }

    pub fn is_active(&self) -> bool {
        self.slot.read().is_some()
    }
}

/// Tuple form of a record: logger name, level and rendered message.
pub type RecordTuple = (String, FemtoLevel, String);

/// Read and adjust the active capture.
pub trait LogCapture {
    /// The handler capturing the current phase.
    fn handler(&self) -> Result<Arc<LogCaptureHandler>, FixtureError>;

    /// Records captured so far, oldest first.
    fn records(&self) -> Result<Vec<FemtoLogRecord>, FixtureError> {
        Ok(self.handler()?.records())
    }

    /// Records reduced to `(logger, level, message)` for assertions.
    fn record_tuples(&self) -> Result<Vec<RecordTuple>, FixtureError> {
        Ok(self
            .records()?
            .iter()
            .map(|r| (r.logger().to_owned(), r.level(), r.message().to_owned()))
            .collect())
    }

    /// Captured text.
    fn text(&self) -> Result<String, FixtureError> {
        Ok(self.handler()?.text())
    }

    /// Set the capture threshold, or the level of `logger` when named.
    fn set_level(&self, level: FemtoLevel, logger: Option<&str>) -> Result<(), FixtureError>;

    /// Like [`set_level`](Self::set_level), restored when the guard drops.
    fn at_level(&self, level: FemtoLevel, logger: Option<&str>)
    -> Result<ScopedLevelGuard, FixtureError>;
}

/// Canonical fixture over a [`CaptureHandle`].
#[derive(Clone)]
pub struct LogCaptureFixture {
    handle: CaptureHandle,
    manager: Arc<Manager>,
}

impl LogCaptureFixture {
    pub fn new(handle: CaptureHandle, manager: Arc<Manager>) -> Self {
        Self { handle, manager }
    }

    fn level_target(&self, logger: Option<&str>) -> Result<Arc<dyn LevelControl>, FixtureError> {
        match logger {
            Some(name) => Ok(self.manager.get_logger(Some(name))),
            None => Ok(self.handle.current()?),
        }
    }
}

impl LogCapture for LogCaptureFixture {
    fn handler(&self) -> Result<Arc<LogCaptureHandler>, FixtureError> {
        self.handle.current()
    }

    fn set_level(&self, level: FemtoLevel, logger: Option<&str>) -> Result<(), FixtureError> {
        self.level_target(logger)?.set_level(level);
        Ok(())
    }

    fn at_level(
        &self,
        level: FemtoLevel,
        logger: Option<&str>,
    ) -> Result<ScopedLevelGuard, FixtureError> {
        Ok(ScopedLevelGuard::enter(self.level_target(logger)?, level))
    }
}
