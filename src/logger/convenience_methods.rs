//! Convenience logging methods for stdlib-style usage.
//!
//! Each method forwards to [`FemtoLogger::log`] with a fixed level and keeps
//! the caller's location through `#[track_caller]`.

use std::fmt::Display;

use crate::level::FemtoLevel;

use super::FemtoLogger;

impl FemtoLogger {
    /// Log a message at DEBUG level.
    #[track_caller]
    pub fn debug(&self, template: &str, args: &[&dyn Display]) -> bool {
        self.log(FemtoLevel::DEBUG, template, args)
    }

    /// Log a message at INFO level.
    ///
    /// # Examples
    ///
    /// ```
    /// use femtocatch::FemtoLogger;
    ///
    /// let logger = FemtoLogger::new("app");
    /// // Detached loggers default to NOTSET, so everything passes.
    /// assert!(logger.info("server started on port %s", &[&8080]));
    /// ```
    #[track_caller]
    pub fn info(&self, template: &str, args: &[&dyn Display]) -> bool {
        self.log(FemtoLevel::INFO, template, args)
    }

    /// Log a message at WARNING level.
    #[track_caller]
    pub fn warning(&self, template: &str, args: &[&dyn Display]) -> bool {
        self.log(FemtoLevel::WARNING, template, args)
    }

    /// Log a message at ERROR level.
    #[track_caller]
    pub fn error(&self, template: &str, args: &[&dyn Display]) -> bool {
        self.log(FemtoLevel::ERROR, template, args)
    }

    /// Log a message at CRITICAL level.
    #[track_caller]
    pub fn critical(&self, template: &str, args: &[&dyn Display]) -> bool {
        self.log(FemtoLevel::CRITICAL, template, args)
    }
}
