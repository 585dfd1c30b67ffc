//! A simple handler that accumulates records in memory for test assertions.
//!
//! This module is shared across multiple test modules so that each one does
//! not need its own copy of the same boilerplate.

use crate::handler::{FemtoHandlerTrait, HandlerConfig, HandlerError};
use crate::log_record::FemtoLogRecord;
use parking_lot::Mutex;
use std::any::Any;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Handler that stores every record it receives for later inspection.
#[derive(Default)]
pub struct CollectingHandler {
    config: HandlerConfig,
    records: Arc<Mutex<Vec<FemtoLogRecord>>>,
    fail_close: AtomicBool,
    closes: AtomicUsize,
}

impl CollectingHandler {
    /// Create a new empty handler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a handler whose `close` always fails.
    pub fn failing_close() -> Self {
        let handler = Self::default();
        handler.fail_close.store(true, Ordering::Relaxed);
        handler
    }

    /// Return a snapshot of all records received so far.
    pub fn collected(&self) -> Vec<FemtoLogRecord> {
        self.records.lock().clone()
    }

    /// Number of times `close` was called.
    pub fn close_count(&self) -> usize {
        self.closes.load(Ordering::Relaxed)
    }
}

impl FemtoHandlerTrait for CollectingHandler {
    fn config(&self) -> &HandlerConfig {
        &self.config
    }

    fn emit(&self, record: &FemtoLogRecord) -> Result<(), HandlerError> {
        self.records.lock().push(record.clone());
        Ok(())
    }

    fn close(&self) -> Result<(), HandlerError> {
        self.closes.fetch_add(1, Ordering::Relaxed);
        if self.fail_close.load(Ordering::Relaxed) {
            return Err(HandlerError::Message("close failed".into()));
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
