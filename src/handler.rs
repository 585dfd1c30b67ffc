//! Handler trait and the per-handler configuration shared by implementations.

use std::any::Any;
use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

use parking_lot::RwLock;
use thiserror::Error;

use crate::control::LevelControl;
use crate::filters::FemtoFilter;
use crate::formatter::SharedFormatter;
use crate::level::FemtoLevel;
use crate::log_record::FemtoLogRecord;

/// Handler trait object as stored by loggers.
pub type SharedHandler = Arc<dyn FemtoHandlerTrait>;

/// Errors raised by handler operations.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// The handler was closed before the operation.
    #[error("handler is closed")]
    Closed,
    /// Writing to the underlying stream failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    /// Implementation specific failure.
    #[error("{0}")]
    Message(String),
}

/// Level, filter and formatter settings owned by a handler.
///
/// Settings may change while records are flowing; every accessor takes
/// `&self`.
pub struct HandlerConfig {
    level: AtomicU8,
    filters: RwLock<Vec<Arc<dyn FemtoFilter>>>,
    formatter: RwLock<Option<SharedFormatter>>,
}

impl Default for HandlerConfig {
    fn default() -> Self {
        Self {
            level: AtomicU8::new(FemtoLevel::NOTSET.value()),
            filters: RwLock::new(Vec::new()),
            formatter: RwLock::new(None),
        }
    }
}

impl HandlerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_filter(&self, filter: Arc<dyn FemtoFilter>) {
        self.filters.write().push(filter);
    }

    pub fn remove_filter(&self, filter: &Arc<dyn FemtoFilter>) -> bool {
        let mut filters = self.filters.write();
        if let Some(pos) = filters
            .iter()
            .position(|f| Arc::as_ptr(f) as *const () == Arc::as_ptr(filter) as *const ())
        {
            filters.remove(pos);
            true
        } else {
            false
        }
    }

    pub fn set_formatter(&self, formatter: SharedFormatter) {
        *self.formatter.write() = Some(formatter);
    }

    pub fn formatter(&self) -> Option<SharedFormatter> {
        self.formatter.read().clone()
    }

    /// Return `true` if every configured filter approves the record.
    pub fn passes_filters(&self, record: &FemtoLogRecord) -> bool {
        self.filters.read().iter().all(|f| f.should_log(record))
    }
}

impl LevelControl for HandlerConfig {
    fn level(&self) -> FemtoLevel {
        FemtoLevel::new(self.level.load(Ordering::Relaxed))
    }

    fn set_level(&self, level: FemtoLevel) {
        self.level.store(level.value(), Ordering::Relaxed);
    }
}

/// Trait implemented by all log handlers.
///
/// Handlers are shared between loggers and may receive records from any
/// thread, so implementations synchronise their own state.
pub trait FemtoHandlerTrait: Send + Sync {
    /// Level, filter and formatter settings.
    fn config(&self) -> &HandlerConfig;

    /// Consume a record that already passed the level and filter gates.
    fn emit(&self, record: &FemtoLogRecord) -> Result<(), HandlerError>;

    /// Gate `record` on the handler level and filters, then emit it.
    ///
    /// Returns whether the record was emitted.
    fn handle(&self, record: &FemtoLogRecord) -> Result<bool, HandlerError> {
        let config = self.config();
        if record.level() < config.level() || !config.passes_filters(record) {
            return Ok(false);
        }
        self.emit(record)?;
        Ok(true)
    }

    /// Flush buffered output. Returns `true` on success.
    fn flush(&self) -> bool {
        true
    }

    /// Release resources held by the handler. Must be idempotent.
    fn close(&self) -> Result<(), HandlerError> {
        Ok(())
    }

    /// Return the handler as `Any` for downcasting.
    fn as_any(&self) -> &dyn Any;
}

/// Identity comparison for handler trait objects.
///
/// Compares data pointers only; vtable pointers for the same object may
/// differ between codegen units.
pub fn same_handler(a: &SharedHandler, b: &SharedHandler) -> bool {
    Arc::as_ptr(a) as *const () == Arc::as_ptr(b) as *const ()
}
