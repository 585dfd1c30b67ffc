//! Stream-based logging handler implementation.
//!
//! This module defines `FemtoStreamHandler`, which formats log records and
//! writes them to any `io::Write` sink. The run-wide console handler is one
//! of these, so writes are serialised through a mutex and each record is
//! written as a single line.

use std::any::Any;
use std::io::{self, Write};

use log::warn;
use parking_lot::Mutex;

use crate::control::LevelControl;
use crate::formatter::{DefaultFormatter, SharedFormatter};
use crate::handler::{FemtoHandlerTrait, HandlerConfig, HandlerError};
use crate::level::FemtoLevel;
use crate::log_record::FemtoLogRecord;

struct Sink {
    writer: Box<dyn Write + Send>,
    closed: bool,
}

/// Handler that writes formatted log records to an `io::Write` stream.
pub struct FemtoStreamHandler {
    config: HandlerConfig,
    sink: Mutex<Sink>,
}

impl FemtoStreamHandler {
    /// Create a new handler writing to `stdout`.
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }

    /// Create a new handler writing to `stderr`.
    pub fn stderr() -> Self {
        Self::new(io::stderr())
    }

    /// Create a handler writing to `writer`.
    pub fn new<W>(writer: W) -> Self
    where
        W: Write + Send + 'static,
    {
        Self {
            config: HandlerConfig::new(),
            sink: Mutex::new(Sink {
                writer: Box::new(writer),
                closed: false,
            }),
        }
    }

    /// Create a handler writing to `writer` with `formatter` preconfigured.
    pub fn with_formatter<W>(writer: W, formatter: SharedFormatter) -> Self
    where
        W: Write + Send + 'static,
    {
        let handler = Self::new(writer);
        handler.config.set_formatter(formatter);
        handler
    }
}

impl FemtoHandlerTrait for FemtoStreamHandler {
    fn config(&self) -> &HandlerConfig {
        &self.config
    }

    fn emit(&self, record: &FemtoLogRecord) -> Result<(), HandlerError> {
        let line = match self.config.formatter() {
            Some(formatter) => formatter.format(record),
            None => SharedFormatter::new(DefaultFormatter).format(record),
        };
        let mut sink = self.sink.lock();
        if sink.closed {
            return Err(HandlerError::Closed);
        }
        writeln!(sink.writer, "{line}")?;
        sink.writer.flush()?;
        Ok(())
    }

    fn flush(&self) -> bool {
        // Release the sink before warning; the warning may route back here.
        let result = self.sink.lock().writer.flush();
        match result {
            Ok(()) => true,
            Err(err) => {
                warn!("FemtoStreamHandler flush error: {err}");
                false
            }
        }
    }

    fn close(&self) -> Result<(), HandlerError> {
        let mut sink = self.sink.lock();
        if sink.closed {
            return Ok(());
        }
        sink.closed = true;
        sink.writer.flush()?;
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl LevelControl for FemtoStreamHandler {
    fn level(&self) -> FemtoLevel {
        self.config.level()
    }

    fn set_level(&self, level: FemtoLevel) {
        self.config.set_level(level);
    }
}
