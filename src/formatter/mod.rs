//! Formatter implementations used by capture and console handlers.
//!
//! Provides the core [`FemtoFormatter`] trait alongside a shareable trait
//! object wrapper, the basic fallback layout and the configurable
//! [`PatternFormatter`].

use std::{fmt, sync::Arc};

use crate::log_record::FemtoLogRecord;

mod pattern;

pub use pattern::{FormatError, PatternFormatter};

/// Layout used when replaying records that were captured without a formatter.
pub const BASIC_FORMAT: &str = "%(levelname)s:%(name)s:%(message)s";

/// Trait for formatting log records into strings.
///
/// Implementors must be thread-safe (`Send + Sync`) so formatters can be
/// shared across threads in a logging system.
pub trait FemtoFormatter: Send + Sync {
    /// Format a log record into a string representation.
    fn format(&self, record: &FemtoLogRecord) -> String;
}

/// Shared formatter trait object used across handlers.
#[derive(Clone)]
pub struct SharedFormatter {
    inner: Arc<dyn FemtoFormatter + Send + Sync>,
}

impl SharedFormatter {
    /// Create a shared formatter from an owned formatter implementation.
    pub fn new<F>(formatter: F) -> Self
    where
        F: FemtoFormatter + Send + Sync + 'static,
    {
        let inner: Arc<dyn FemtoFormatter + Send + Sync> = Arc::new(formatter);
        Self { inner }
    }

    /// Wrap an existing shared formatter trait object.
    pub fn from_arc(inner: Arc<dyn FemtoFormatter + Send + Sync>) -> Self {
        Self { inner }
    }

    /// Format a log record using the wrapped formatter instance.
    pub fn format(&self, record: &FemtoLogRecord) -> String {
        self.inner.format(record)
    }
}

impl FemtoFormatter for SharedFormatter {
    fn format(&self, record: &FemtoLogRecord) -> String {
        self.inner.format(record)
    }
}

impl fmt::Debug for SharedFormatter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SharedFormatter(<dyn FemtoFormatter>)")
    }
}

/// Renders records with [`BASIC_FORMAT`].
#[derive(Copy, Clone, Debug)]
pub struct DefaultFormatter;

impl FemtoFormatter for DefaultFormatter {
    fn format(&self, record: &FemtoLogRecord) -> String {
        format!(
            "{}:{}:{}",
            record.level_name(),
            record.logger(),
            record.message()
        )
    }
}

impl FemtoFormatter for Arc<dyn FemtoFormatter + Send + Sync> {
    fn format(&self, record: &FemtoLogRecord) -> String {
        (**self).format(record)
    }
}

impl FemtoFormatter for Box<dyn FemtoFormatter + Send + Sync> {
    fn format(&self, record: &FemtoLogRecord) -> String {
        (**self).format(record)
    }
}

#[cfg(test)]
mod tests {
    //! Tests for formatter implementations.

    use super::*;
    use crate::level::FemtoLevel;
    use static_assertions::assert_impl_all;

    #[test]
    fn shared_formatter_is_send_sync() {
        assert_impl_all!(SharedFormatter: Send, Sync);
        assert_impl_all!(Arc<dyn FemtoFormatter + Send + Sync>: Send, Sync);
    }

    #[test]
    fn default_formatter_formats_basic_record() {
        let record = FemtoLogRecord::new("test", FemtoLevel::INFO, "hello");
        assert_eq!(DefaultFormatter.format(&record), "INFO:test:hello");
    }

    #[test]
    fn default_formatter_matches_basic_pattern() {
        let pattern = PatternFormatter::new(BASIC_FORMAT, None).expect("basic format parses");
        let record = FemtoLogRecord::new("app.db", FemtoLevel::ERROR, "gone");
        assert_eq!(pattern.format(&record), DefaultFormatter.format(&record));
    }

    #[test]
    fn shared_formatter_forwards() {
        let shared = SharedFormatter::new(DefaultFormatter);
        let record = FemtoLogRecord::new("core", FemtoLevel::WARNING, "careful");
        assert_eq!(shared.format(&record), "WARNING:core:careful");
    }
}
