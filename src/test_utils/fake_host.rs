//! In-memory [`HandlerHost`] used to exercise guards without a hierarchy.

use std::sync::atomic::{AtomicU8, Ordering};

use parking_lot::Mutex;

use crate::control::{HandlerHost, LevelControl};
use crate::handler::{SharedHandler, same_handler};
use crate::level::FemtoLevel;

/// Records level writes and handler attachments.
pub struct FakeHost {
    level: AtomicU8,
    handlers: Mutex<Vec<SharedHandler>>,
    level_writes: Mutex<Vec<FemtoLevel>>,
}

impl FakeHost {
    pub fn new(level: FemtoLevel) -> Self {
        Self {
            level: AtomicU8::new(level.value()),
            handlers: Mutex::new(Vec::new()),
            level_writes: Mutex::new(Vec::new()),
        }
    }

    /// Number of times `handler` is attached.
    pub fn attachments(&self, handler: &SharedHandler) -> usize {
        self.handlers
            .lock()
            .iter()
            .filter(|h| same_handler(h, handler))
            .count()
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.lock().len()
    }

    /// Every level written so far, in order.
    pub fn level_writes(&self) -> Vec<FemtoLevel> {
        self.level_writes.lock().clone()
    }
}

impl LevelControl for FakeHost {
    fn level(&self) -> FemtoLevel {
        FemtoLevel::new(self.level.load(Ordering::Relaxed))
    }

    fn set_level(&self, level: FemtoLevel) {
        self.level_writes.lock().push(level);
        self.level.store(level.value(), Ordering::Relaxed);
    }
}

impl HandlerHost for FakeHost {
    fn has_handler(&self, handler: &SharedHandler) -> bool {
        self.attachments(handler) > 0
    }

    fn add_handler(&self, handler: SharedHandler) {
        self.handlers.lock().push(handler);
    }

    fn remove_handler(&self, handler: &SharedHandler) -> bool {
        let mut handlers = self.handlers.lock();
        match handlers.iter().position(|h| same_handler(h, handler)) {
            Some(pos) => {
                handlers.remove(pos);
                true
            }
            None => false,
        }
    }
}
