//! Core logger implementation for the femtocatch hierarchy.
//!
//! This module provides the [`FemtoLogger`] struct which applies level and
//! filter checks, stamps records with their level name and call site, and
//! dispatches them synchronously to its handlers and those of its ancestors.

mod convenience_methods;

use std::fmt;
use std::panic::Location;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

use log::warn;
// parking_lot avoids poisoning and matches crate-wide locking strategy
use parking_lot::RwLock;

use crate::control::{HandlerHost, LevelControl};
use crate::filters::FemtoFilter;
use crate::handler::{SharedHandler, same_handler};
use crate::level::{FemtoLevel, LevelRegistry};
use crate::log_record::{FemtoLogRecord, RecordMetadata};
use crate::rate_limited_warner::RateLimitedWarner;

/// A named node in the logger hierarchy.
pub struct FemtoLogger {
    /// Dotted name, `root` for the hierarchy root.
    name: String,
    parent: Option<Arc<FemtoLogger>>,
    level: AtomicU8,
    propagate: AtomicBool,
    handlers: RwLock<Vec<SharedHandler>>,
    filters: RwLock<Vec<Arc<dyn FemtoFilter>>>,
    level_names: Arc<LevelRegistry>,
    failure_warner: RateLimitedWarner,
}

impl fmt::Debug for FemtoLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FemtoLogger")
            .field("name", &self.name)
            .field("level", &self.level())
            .field("handlers", &self.handlers.read().len())
            .finish()
    }
}

impl FemtoLogger {
    /// Create a detached logger with its own level registry.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_parent(name.into(), None, Arc::new(LevelRegistry::new()))
    }

    /// Create a logger below `parent`, sharing the hierarchy's registry.
    pub(crate) fn with_parent(
        name: String,
        parent: Option<Arc<FemtoLogger>>,
        level_names: Arc<LevelRegistry>,
    ) -> Self {
        Self {
            name,
            parent,
            level: AtomicU8::new(FemtoLevel::NOTSET.value()),
            propagate: AtomicBool::new(true),
            handlers: RwLock::new(Vec::new()),
            filters: RwLock::new(Vec::new()),
            level_names,
            failure_warner: RateLimitedWarner::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<&Arc<FemtoLogger>> {
        self.parent.as_ref()
    }

    /// First non-`NOTSET` level found walking up the hierarchy.
    pub fn effective_level(&self) -> FemtoLevel {
        let mut current = Some(self);
        while let Some(logger) = current {
            let level = logger.level();
            if level != FemtoLevel::NOTSET {
                return level;
            }
            current = logger.parent.as_deref();
        }
        FemtoLevel::NOTSET
    }

    /// Return whether a record at `level` would pass this logger's threshold.
    pub fn is_enabled_for(&self, level: FemtoLevel) -> bool {
        level >= self.effective_level()
    }

    pub fn propagate(&self) -> bool {
        self.propagate.load(Ordering::SeqCst)
    }

    pub fn set_propagate(&self, flag: bool) {
        self.propagate.store(flag, Ordering::SeqCst);
    }

    /// Snapshot of the attached handlers.
    pub fn handlers(&self) -> Vec<SharedHandler> {
        self.handlers.read().clone()
    }

    /// Remove all handlers from this logger.
    pub fn clear_handlers(&self) {
        self.handlers.write().clear();
    }

    /// Attach a filter to this logger.
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

    pub fn clear_filters(&self) {
        self.filters.write().clear();
    }

    /// Log a `%`-style template at `level`.
    ///
    /// Returns `true` when the record passed the level and filter checks and
    /// was handed to the handlers.
    #[track_caller]
    pub fn log(&self, level: FemtoLevel, template: &str, args: &[&dyn fmt::Display]) -> bool {
        if !self.is_enabled_for(level) {
            return false;
        }
        let record = self.make_record(level, template, args, RecordMetadata::at(Location::caller()));
        self.handle(record)
    }

    /// Build a record owned by this logger, naming the level via the
    /// hierarchy's registry.
    pub fn make_record(
        &self,
        level: FemtoLevel,
        template: &str,
        args: &[&dyn fmt::Display],
        metadata: RecordMetadata,
    ) -> FemtoLogRecord {
        FemtoLogRecord::with_args(&self.name, level, template, args)
            .with_metadata(metadata)
            .with_level_name(self.level_names.level_name(level))
    }

    /// Run an already-constructed record through this logger.
    ///
    /// The record is checked against the logger's effective level and
    /// filters before being dispatched.
    pub fn handle(&self, record: FemtoLogRecord) -> bool {
        if !self.is_enabled_for(record.level()) || !self.passes_all_filters(&record) {
            return false;
        }
        self.call_handlers(&record);
        true
    }

    /// Return `true` if every configured filter approves the record.
    fn passes_all_filters(&self, record: &FemtoLogRecord) -> bool {
        self.filters.read().iter().all(|f| f.should_log(record))
    }

    /// Hand `record` to this logger's handlers and, while `propagate` holds,
    /// to every ancestor's handlers.
    ///
    /// The handler list is cloned before dispatch so a handler that logs
    /// from inside `emit` does not contend with the list lock.
    fn call_handlers(&self, record: &FemtoLogRecord) {
        let mut current = Some(self);
        while let Some(logger) = current {
            for handler in logger.handlers() {
                if let Err(err) = handler.handle(record) {
                    self.failure_warner.record_failure();
                    self.failure_warner.warn_if_due(|count| {
                        warn!("FemtoLogger: {count} handler error(s); latest: {err}");
                    });
                }
            }
            if !logger.propagate() {
                break;
            }
            current = logger.parent.as_deref();
        }
    }
}

impl LevelControl for FemtoLogger {
    fn level(&self) -> FemtoLevel {
        FemtoLevel::new(self.level.load(Ordering::Relaxed))
    }

    fn set_level(&self, level: FemtoLevel) {
        self.level.store(level.value(), Ordering::Relaxed);
    }
}

impl HandlerHost for FemtoLogger {
    fn has_handler(&self, handler: &SharedHandler) -> bool {
        self.handlers.read().iter().any(|h| same_handler(h, handler))
    }

    fn add_handler(&self, handler: SharedHandler) {
        self.handlers.write().push(handler);
    }

    fn remove_handler(&self, handler: &SharedHandler) -> bool {
        let mut handlers = self.handlers.write();
        if let Some(pos) = handlers.iter().position(|h| same_handler(h, handler)) {
            handlers.remove(pos);
            true
        } else {
            false
        }
    }
}
