//! Compatibility bridge for the Rust `log` crate.
//!
//! This module provides `FemtoLogAdapter`, an implementation of `log::Log`
//! that routes records into a femtocatch [`Manager`]. Code under test that
//! logs through `log::info!` and friends is then captured like any record
//! logged through a [`FemtoLogger`](crate::FemtoLogger).

use std::borrow::Cow;
use std::sync::{Arc, OnceLock};

use log::{Metadata, Record};

use crate::level::FemtoLevel;
use crate::log_record::{FemtoLogRecord, RecordMetadata};
use crate::manager::{self, Manager};

/// Adapter implementing the Rust `log::Log` trait.
///
/// The adapter resolves a logger from each record's target, converts the
/// record to a [`FemtoLogRecord`] and hands it to that logger.
pub struct FemtoLogAdapter {
    manager: Arc<Manager>,
}

impl FemtoLogAdapter {
    /// Route records into `manager`. Registers the `TRACE` level name.
    pub fn new(manager: Arc<Manager>) -> Self {
        manager.add_level_name(FemtoLevel::TRACE, "TRACE");
        Self { manager }
    }

    pub fn manager(&self) -> &Arc<Manager> {
        &self.manager
    }
}

impl From<log::Level> for FemtoLevel {
    fn from(level: log::Level) -> Self {
        match level {
            log::Level::Trace => FemtoLevel::TRACE,
            log::Level::Debug => FemtoLevel::DEBUG,
            log::Level::Info => FemtoLevel::INFO,
            log::Level::Warn => FemtoLevel::WARNING,
            log::Level::Error => FemtoLevel::ERROR,
        }
    }
}

fn normalise_target(target: &str) -> Cow<'_, str> {
    if target.contains("::") {
        Cow::Owned(target.replace("::", "."))
    } else {
        Cow::Borrowed(target)
    }
}

fn is_enabled_by_global_max(level: log::Level) -> bool {
    log::max_level() >= level.to_level_filter()
}

impl log::Log for FemtoLogAdapter {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        is_enabled_by_global_max(metadata.level())
    }

    fn log(&self, record: &Record<'_>) {
        if !is_enabled_by_global_max(record.level()) {
            return;
        }
        let target = normalise_target(record.target());
        let logger = self.manager.get_logger(Some(target.as_ref()));
        let level = FemtoLevel::from(record.level());
        if !logger.is_enabled_for(level) {
            return;
        }

        let metadata = RecordMetadata {
            module_path: record.module_path().unwrap_or_default().to_string(),
            filename: record.file().unwrap_or_default().to_string(),
            line_number: record.line().unwrap_or(0),
            ..Default::default()
        };
        let message: Cow<'_, str> = match record.args().as_str() {
            Some(literal) => Cow::Borrowed(literal),
            None => Cow::Owned(record.args().to_string()),
        };
        let femto_record = FemtoLogRecord::new(logger.name(), level, &message)
            .with_metadata(metadata)
            .with_level_name(self.manager.level_names().level_name(level));
        logger.handle(femto_record);
    }

    fn flush(&self) {
        self.manager.flush_all_handlers();
    }
}

static INSTALL_RESULT: OnceLock<bool> = OnceLock::new();

/// Install an adapter over [`manager::global`] as the global Rust logger.
///
/// Returns `true` on success. When a different global logger is already set,
/// installation fails and `false` is returned. Subsequent calls return the
/// cached outcome.
pub fn install_global_logger() -> bool {
    *INSTALL_RESULT.get_or_init(|| {
        let adapter = FemtoLogAdapter::new(manager::global());
        if log::set_boxed_logger(Box::new(adapter)).is_err() {
            return false;
        }
        log::set_max_level(log::LevelFilter::Trace);
        true
    })
}

#[cfg(test)]
mod tests {
    //! Unit tests for the `log` crate bridge.

    use super::*;
    use crate::control::{HandlerHost, LevelControl};
    use crate::handler::SharedHandler;
    use crate::test_utils::collecting_handler::CollectingHandler;
    use log::Log;
    use rstest::rstest;
    use serial_test::serial;

    #[rstest]
    #[case(log::Level::Trace, FemtoLevel::TRACE)]
    #[case(log::Level::Debug, FemtoLevel::DEBUG)]
    #[case(log::Level::Info, FemtoLevel::INFO)]
    #[case(log::Level::Warn, FemtoLevel::WARNING)]
    #[case(log::Level::Error, FemtoLevel::ERROR)]
    fn level_mapping_is_direct(#[case] level: log::Level, #[case] expected: FemtoLevel) {
        assert_eq!(FemtoLevel::from(level), expected);
    }

    fn attach(manager: &Manager, name: &str) -> Arc<CollectingHandler> {
        log::set_max_level(log::LevelFilter::Trace);
        let handler = Arc::new(CollectingHandler::new());
        manager
            .get_logger(Some(name))
            .add_handler(Arc::clone(&handler) as SharedHandler);
        handler
    }

    #[rstest]
    #[serial]
    fn adapter_dispatches_records_to_target_logger() {
        let manager = Arc::new(Manager::new());
        manager.root().set_level(FemtoLevel::NOTSET);
        let adapter = FemtoLogAdapter::new(Arc::clone(&manager));
        let handler = attach(&manager, "bridge.test");

        adapter.log(
            &log::Record::builder()
                .args(format_args!("hello"))
                .level(log::Level::Info)
                .target("bridge.test")
                .module_path(Some("bridge::test"))
                .file(Some("lib.rs"))
                .line(Some(42))
                .build(),
        );

        let records = handler.collected();
        assert_eq!(records.len(), 1);
        let rec = &records[0];
        assert_eq!(rec.logger(), "bridge.test");
        assert_eq!(rec.level_name(), "INFO");
        assert_eq!(rec.message(), "hello");
        assert_eq!(rec.metadata().module_path, "bridge::test");
        assert_eq!(rec.metadata().filename, "lib.rs");
        assert_eq!(rec.metadata().line_number, 42);
    }

    #[rstest]
    #[serial]
    fn adapter_normalises_rust_module_targets() {
        let manager = Arc::new(Manager::new());
        let adapter = FemtoLogAdapter::new(Arc::clone(&manager));
        let handler = attach(&manager, "bridge.mod");

        adapter.log(
            &log::Record::builder()
                .args(format_args!("normalised"))
                .level(log::Level::Error)
                .target("bridge::mod")
                .build(),
        );

        let records = handler.collected();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].logger(), "bridge.mod");
    }

    #[rstest]
    #[serial]
    fn log_respects_logger_threshold() {
        let manager = Arc::new(Manager::new());
        let adapter = FemtoLogAdapter::new(Arc::clone(&manager));
        let handler = attach(&manager, "bridge.level");
        manager.get_logger(Some("bridge.level")).set_level(FemtoLevel::WARNING);

        for (level, text) in [(log::Level::Info, "info"), (log::Level::Warn, "warn")] {
            adapter.log(
                &log::Record::builder()
                    .args(format_args!("{text}"))
                    .level(level)
                    .target("bridge.level")
                    .build(),
            );
        }

        let records = handler.collected();
        assert_eq!(records.len(), 1, "only WARNING should pass threshold");
        assert_eq!(records[0].level_name(), "WARNING");
        assert_eq!(records[0].message(), "warn");
    }

    #[rstest]
    #[serial]
    fn trace_records_carry_registered_name() {
        let manager = Arc::new(Manager::new());
        manager.root().set_level(FemtoLevel::NOTSET);
        let adapter = FemtoLogAdapter::new(Arc::clone(&manager));
        let handler = attach(&manager, "bridge.trace");

        adapter.log(
            &log::Record::builder()
                .args(format_args!("fine grained"))
                .level(log::Level::Trace)
                .target("bridge.trace")
                .build(),
        );

        let records = handler.collected();
        assert_eq!(records[0].level(), FemtoLevel::TRACE);
        assert_eq!(records[0].level_name(), "TRACE");
    }

    #[rstest]
    #[serial]
    fn install_routes_log_macros_into_global_hierarchy() {
        assert!(install_global_logger());
        assert!(install_global_logger(), "second install reuses the outcome");
        let handler = attach(&manager::global(), "bridge.global");
        log::error!(target: "bridge::global", "captured {}", 42);
        let records = handler.collected();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].message(), "captured 42");
        let shared = Arc::clone(&handler) as SharedHandler;
        assert!(manager::global().get_logger(Some("bridge.global")).remove_handler(&shared));
    }
}
