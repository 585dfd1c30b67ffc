//! Compatibility bridge for the `tracing` ecosystem.
//!
//! [`FemtoTracingLayer`] is a `tracing_subscriber` layer that turns every
//! event into a [`FemtoLogRecord`] and hands it to the logger named after
//! the event target. The `message` field becomes the record message; other
//! fields are appended as `key=value` pairs.

use std::fmt::{self, Write as _};
use std::sync::Arc;

use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, Layer};

use crate::level::FemtoLevel;
use crate::log_record::{FemtoLogRecord, RecordMetadata};
use crate::manager::Manager;

/// Layer forwarding `tracing` events into a [`Manager`].
pub struct FemtoTracingLayer {
    manager: Arc<Manager>,
}

impl FemtoTracingLayer {
    /// Forward events into `manager`. Registers the `TRACE` level name.
    pub fn new(manager: Arc<Manager>) -> Self {
        manager.add_level_name(FemtoLevel::TRACE, "TRACE");
        Self { manager }
    }
}

fn map_level(level: &tracing::Level) -> FemtoLevel {
    match *level {
        tracing::Level::TRACE => FemtoLevel::TRACE,
        tracing::Level::DEBUG => FemtoLevel::DEBUG,
        tracing::Level::INFO => FemtoLevel::INFO,
        tracing::Level::WARN => FemtoLevel::WARNING,
        tracing::Level::ERROR => FemtoLevel::ERROR,
    }
}

#[derive(Default)]
struct MessageVisitor {
    message: String,
    fields: String,
}

impl MessageVisitor {
    fn push_field(&mut self, name: &str, value: fmt::Arguments<'_>) {
        if !self.fields.is_empty() {
            self.fields.push(' ');
        }
        let _ = write!(self.fields, "{name}={value}");
    }

    fn into_message(self) -> String {
        match (self.message.is_empty(), self.fields.is_empty()) {
            (_, true) => self.message,
            (true, false) => self.fields,
            (false, false) => format!("{} {}", self.message, self.fields),
        }
    }
}

impl Visit for MessageVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_owned();
        } else {
            self.push_field(field.name(), format_args!("{value}"));
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{value:?}");
        } else {
            self.push_field(field.name(), format_args!("{value:?}"));
        }
    }
}

impl<S: Subscriber> Layer<S> for FemtoTracingLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        let target = metadata.target().replace("::", ".");
        let logger = self.manager.get_logger(Some(target.as_str()));
        let level = map_level(metadata.level());
        if !logger.is_enabled_for(level) {
            return;
        }

        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);
        let record_metadata = RecordMetadata {
            module_path: metadata.module_path().unwrap_or_default().to_owned(),
            filename: metadata.file().unwrap_or_default().to_owned(),
            line_number: metadata.line().unwrap_or(0),
            ..Default::default()
        };
        let record = FemtoLogRecord::new(logger.name(), level, &visitor.into_message())
            .with_metadata(record_metadata)
            .with_level_name(self.manager.level_names().level_name(level));
        logger.handle(record);
    }
}
