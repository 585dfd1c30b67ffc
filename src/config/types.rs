//! Capture configuration values and the errors raised while building them.

use std::io;

use thiserror::Error;

use crate::formatter::{FormatError, PatternFormatter, SharedFormatter};
use crate::level::{FemtoLevel, LevelRegistry};
use crate::verbosity::VerbosityLevelTable;

/// Per-record layout used when none is configured.
pub const DEFAULT_LOG_FORMAT: &str = "%(filename)-25s %(lineno)4d %(levelname)-8s %(message)s";

/// Date layout used when none is configured.
pub const DEFAULT_LOG_DATE_FORMAT: &str = "%H:%M:%S";

/// Errors that abort a run before any test executes.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An extra level token is neither numeric nor a registered name.
    #[error("'{0}' is not recognized as a logging level name.")]
    UnknownLevelName(String),
    /// A numeric extra level lies outside the defined range.
    #[error(
        "'{value}' is ignored as not being in the valid logging levels range: {min}({}) - {max}({})",
        .min.value(),
        .max.value()
    )]
    LevelOutOfRange {
        value: i64,
        min: FemtoLevel,
        max: FemtoLevel,
    },
    /// The log format or date format does not parse.
    #[error(transparent)]
    Format(#[from] FormatError),
    /// A configuration key holds a value of the wrong shape.
    #[error("invalid value '{value}' for '{key}'")]
    InvalidValue { key: String, value: String },
    /// The configuration file does not exist.
    #[error("{0} doesn't exist")]
    NotFound(String),
    /// The configuration file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
    /// The encoding label is not known.
    #[error("unknown encoding {0}")]
    UnknownEncoding(String),
    /// The file bytes are not valid in the requested encoding.
    #[error("{path} is not valid {encoding}")]
    Decode { path: String, encoding: &'static str },
    /// The file is not valid INI.
    #[error("{path} is invalid: {message}")]
    Parse { path: String, message: String },
}

/// Settings consumed by the capture plugin.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CaptureConfig {
    pub log_format: String,
    pub log_date_format: Option<String>,
    /// Attach captured text to reports.
    pub log_print: bool,
    /// Count of repeated verbosity flags.
    pub verbosity: usize,
    /// Extra level tokens, numeric or registered names.
    pub log_level_extra: Vec<String>,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            log_format: DEFAULT_LOG_FORMAT.to_owned(),
            log_date_format: Some(DEFAULT_LOG_DATE_FORMAT.to_owned()),
            log_print: true,
            verbosity: 0,
            log_level_extra: Vec::new(),
        }
    }
}

impl CaptureConfig {
    /// Layer command line values over this configuration.
    ///
    /// A value given on the command line wins; extra levels from both
    /// sources are kept, file values first.
    pub fn with_overrides(mut self, cli: CliOverrides) -> Self {
        if cli.no_print_logs {
            self.log_print = false;
        }
        if let Some(format) = cli.log_format {
            self.log_format = format;
        }
        if let Some(date_format) = cli.log_date_format {
            self.log_date_format = Some(date_format);
        }
        if let Some(verbosity) = cli.verbosity {
            self.verbosity = verbosity;
        }
        self.log_level_extra.extend(cli.log_level_extra);
        self
    }

    /// Build the record formatter shared by every capture handler.
    pub fn formatter(&self) -> Result<SharedFormatter, ConfigError> {
        let formatter = PatternFormatter::new(&self.log_format, self.log_date_format.as_deref())?;
        Ok(SharedFormatter::new(formatter))
    }

    /// Build the verbosity table, resolving names through `registry`.
    pub fn verbosity_table(&self, registry: &LevelRegistry) -> Result<VerbosityLevelTable, ConfigError> {
        VerbosityLevelTable::build(&self.log_level_extra, registry)
    }
}

/// Values parsed from the command line by the surrounding runner.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CliOverrides {
    pub no_print_logs: bool,
    pub log_format: Option<String>,
    pub log_date_format: Option<String>,
    pub verbosity: Option<usize>,
    pub log_level_extra: Vec<String>,
}

impl CliOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn no_print_logs(mut self) -> Self {
        self.no_print_logs = true;
        self
    }

    pub fn with_log_format(mut self, format: impl Into<String>) -> Self {
        self.log_format = Some(format.into());
        self
    }

    pub fn with_log_date_format(mut self, date_format: impl Into<String>) -> Self {
        self.log_date_format = Some(date_format.into());
        self
    }

    pub fn with_verbosity(mut self, verbosity: usize) -> Self {
        self.verbosity = Some(verbosity);
        self
    }

    /// Register one extra level token. May be repeated.
    pub fn with_log_level_extra(mut self, token: impl Into<String>) -> Self {
        self.log_level_extra.push(token.into());
        self
    }
}
