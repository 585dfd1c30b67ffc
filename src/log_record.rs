//! Log record representation for the femtocatch capture layer.
//!
//! This module defines the `FemtoLogRecord` struct that captures log events
//! along with their contextual metadata such as timestamps, source location,
//! and thread information.

use std::fmt::{self, Write as _};
use std::panic::Location;
use std::thread::{self, ThreadId};
use std::time::SystemTime;

use crate::level::FemtoLevel;

/// Additional context associated with a log record.
#[derive(Clone, Debug)]
pub struct RecordMetadata {
    /// Rust module path where the log call originated.
    pub module_path: String,
    /// Source file path for the log call.
    pub filename: String,
    /// Line number in the source file.
    pub line_number: u32,
    /// Time the record was created.
    pub timestamp: SystemTime,
    /// ID of the thread that created the record.
    pub thread_id: ThreadId,
    /// Name of the thread that created the record (if any).
    pub thread_name: Option<String>,
}

impl RecordMetadata {
    /// Capture timestamp and thread info from the current execution context.
    fn capture_runtime() -> (SystemTime, ThreadId, Option<String>) {
        let current = thread::current();
        (
            SystemTime::now(),
            current.id(),
            current.name().map(ToString::to_string),
        )
    }

    /// Metadata pointing at `location`.
    pub fn at(location: &Location<'_>) -> Self {
        Self {
            filename: location.file().to_owned(),
            line_number: location.line(),
            ..Self::default()
        }
    }
}

impl Default for RecordMetadata {
    fn default() -> Self {
        let (timestamp, thread_id, thread_name) = Self::capture_runtime();
        Self {
            module_path: String::new(),
            filename: String::new(),
            line_number: 0,
            timestamp,
            thread_id,
            thread_name,
        }
    }
}

/// An emitted log event.
///
/// Records are immutable once built: the message is rendered from the
/// template when the record is created, so arguments mutated afterwards do
/// not change what a capture buffer reports.
#[derive(Clone, Debug)]
pub struct FemtoLogRecord {
    logger: String,
    level: FemtoLevel,
    level_name: String,
    template: String,
    message: String,
    metadata: RecordMetadata,
}

impl FemtoLogRecord {
    /// Construct a record from an already rendered message.
    ///
    /// The message is stored verbatim and doubles as the template.
    pub fn new(logger: &str, level: FemtoLevel, message: &str) -> Self {
        Self {
            logger: logger.to_owned(),
            level,
            level_name: level.to_string(),
            template: message.to_owned(),
            message: message.to_owned(),
            metadata: RecordMetadata::default(),
        }
    }

    /// Construct a record from a `%`-style template and its arguments.
    pub fn with_args(
        logger: &str,
        level: FemtoLevel,
        template: &str,
        args: &[&dyn fmt::Display],
    ) -> Self {
        Self {
            logger: logger.to_owned(),
            level,
            level_name: level.to_string(),
            template: template.to_owned(),
            message: render_template(template, args),
            metadata: RecordMetadata::default(),
        }
    }

    /// Replace the metadata, refreshing the runtime fields.
    pub fn with_metadata(mut self, mut metadata: RecordMetadata) -> Self {
        let (timestamp, thread_id, thread_name) = RecordMetadata::capture_runtime();
        metadata.timestamp = timestamp;
        metadata.thread_id = thread_id;
        metadata.thread_name = thread_name;
        self.metadata = metadata;
        self
    }

    /// Override the level name, typically from a hierarchy's registry.
    pub fn with_level_name(mut self, name: impl Into<String>) -> Self {
        self.level_name = name.into();
        self
    }

    pub fn logger(&self) -> &str {
        &self.logger
    }

    pub fn level(&self) -> FemtoLevel {
        self.level
    }

    pub fn level_name(&self) -> &str {
        &self.level_name
    }

    /// The raw message template before interpolation.
    pub fn template(&self) -> &str {
        &self.template
    }

    /// The interpolated message.
    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn metadata(&self) -> &RecordMetadata {
        &self.metadata
    }
}

impl fmt::Display for FemtoLogRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.level_name, self.message)
    }
}

/// Interpolate `%s`/`%d` placeholders in `template` with `args`.
///
/// `%%` yields a literal percent sign. Placeholders beyond the supplied
/// arguments, and unknown conversions, are copied through unchanged.
pub fn render_template(template: &str, args: &[&dyn fmt::Display]) -> String {
    if args.is_empty() && !template.contains("%%") {
        return template.to_owned();
    }
    let mut out = String::with_capacity(template.len());
    let mut remaining = args.iter();
    let mut chars = template.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        match chars.peek().copied() {
            Some('%') => {
                chars.next();
                out.push('%');
            }
            Some(conv @ ('s' | 'd')) => match remaining.next() {
                Some(arg) => {
                    chars.next();
                    let _ = write!(out, "{arg}");
                }
                None => {
                    chars.next();
                    out.push('%');
                    out.push(conv);
                }
            },
            _ => out.push('%'),
        }
    }
    out
}
