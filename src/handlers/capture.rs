//! In-memory capturing handler.
//!
//! [`LogCaptureHandler`] keeps every record it receives and, when a
//! formatter is configured, the rendered text as it arrives. Both buffers
//! live behind one mutex so a snapshot never observes a record without its
//! text or vice versa.

use std::any::Any;

use parking_lot::Mutex;

use crate::control::LevelControl;
use crate::formatter::{DefaultFormatter, FemtoFormatter};
use crate::handler::{FemtoHandlerTrait, HandlerConfig, HandlerError};
use crate::level::FemtoLevel;
use crate::log_record::FemtoLogRecord;

#[derive(Default)]
struct Buffer {
    records: Vec<FemtoLogRecord>,
    text: String,
    closed: bool,
}

/// Handler that buffers records and their formatted rendering.
#[derive(Default)]
pub struct LogCaptureHandler {
    config: HandlerConfig,
    buffer: Mutex<Buffer>,
}

impl LogCaptureHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the captured records in arrival order.
    pub fn records(&self) -> Vec<FemtoLogRecord> {
        self.buffer.lock().records.clone()
    }

    /// Number of captured records.
    pub fn len(&self) -> usize {
        self.buffer.lock().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Captured text.
    ///
    /// With a formatter configured this is the text accumulated at emit
    /// time. Otherwise the buffered records are replayed through
    /// [`DefaultFormatter`].
    pub fn text(&self) -> String {
        let buffer = self.buffer.lock();
        if self.config.formatter().is_some() {
            return buffer.text.clone();
        }
        buffer.records.iter().fold(String::new(), |mut out, record| {
            out.push_str(&DefaultFormatter.format(record));
            out.push('\n');
            out
        })
    }

    /// Discard captured records and text.
    pub fn clear(&self) {
        let mut buffer = self.buffer.lock();
        buffer.records.clear();
        buffer.text.clear();
    }

    pub fn is_closed(&self) -> bool {
        self.buffer.lock().closed
    }
}

impl FemtoHandlerTrait for LogCaptureHandler {
    fn config(&self) -> &HandlerConfig {
        &self.config
    }

    fn emit(&self, record: &FemtoLogRecord) -> Result<(), HandlerError> {
        // Format outside the lock; formatters may be slow.
        let rendered = self.config.formatter().map(|f| f.format(record));
        let mut buffer = self.buffer.lock();
        if buffer.closed {
            return Err(HandlerError::Closed);
        }
        buffer.records.push(record.clone());
        if let Some(line) = rendered {
            buffer.text.push_str(&line);
            buffer.text.push('\n');
        }
        Ok(())
    }

    fn close(&self) -> Result<(), HandlerError> {
        let mut buffer = self.buffer.lock();
        buffer.closed = true;
        buffer.text.shrink_to_fit();
        buffer.records.shrink_to_fit();
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl LevelControl for LogCaptureHandler {
    fn level(&self) -> FemtoLevel {
        self.config.level()
    }

    fn set_level(&self, level: FemtoLevel) {
        self.config.set_level(level);
    }
}
