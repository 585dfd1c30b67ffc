//! Registry mapping logger names to instances.
//!
//! A [`Manager`] owns one logger hierarchy: the root logger, every named
//! logger created below it and the level name registry they share. Most code
//! receives a manager explicitly; [`global`] returns the process-wide
//! instance the `log` and `tracing` bridges feed.

use std::collections::{HashMap, hash_map::Entry};
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::RwLock;

use crate::control::LevelControl;
use crate::level::{FemtoLevel, LevelRegistry};
use crate::logger::FemtoLogger;

/// Name under which the root logger is registered.
pub const ROOT_LOGGER: &str = "root";

/// Owner of a logger hierarchy.
pub struct Manager {
    root: Arc<FemtoLogger>,
    loggers: RwLock<HashMap<String, Arc<FemtoLogger>>>,
    level_names: Arc<LevelRegistry>,
}

impl Default for Manager {
    fn default() -> Self {
        Self::new()
    }
}

impl Manager {
    /// Create a hierarchy whose root logger starts at `WARNING`.
    pub fn new() -> Self {
        let level_names = Arc::new(LevelRegistry::new());
        let root = Arc::new(FemtoLogger::with_parent(
            ROOT_LOGGER.to_string(),
            None,
            Arc::clone(&level_names),
        ));
        root.set_level(FemtoLevel::WARNING);
        Self {
            root,
            loggers: RwLock::new(HashMap::new()),
            level_names,
        }
    }

    pub fn root(&self) -> Arc<FemtoLogger> {
        Arc::clone(&self.root)
    }

    pub fn level_names(&self) -> &Arc<LevelRegistry> {
        &self.level_names
    }

    /// Register a display name for an extra level.
    pub fn add_level_name(&self, level: FemtoLevel, name: &str) {
        self.level_names.add_level_name(level, name);
    }

    /// Retrieve an existing logger or create it, creating missing ancestors.
    ///
    /// `None`, an empty name and `root` all return the root logger. Names
    /// with empty dotted segments are normalised by dropping those segments.
    pub fn get_logger(&self, name: Option<&str>) -> Arc<FemtoLogger> {
        let segments: Vec<&str> = name
            .unwrap_or_default()
            .split('.')
            .filter(|s| !s.is_empty())
            .collect();
        if segments.is_empty() || segments == [ROOT_LOGGER] {
            return self.root();
        }

        if let Some(logger) = self.loggers.read().get(&segments.join(".")) {
            return Arc::clone(logger);
        }

        let mut loggers = self.loggers.write();
        let mut parent = self.root();
        let mut path = String::new();
        for segment in segments {
            if !path.is_empty() {
                path.push('.');
            }
            path.push_str(segment);
            parent = match loggers.entry(path.clone()) {
                Entry::Occupied(o) => Arc::clone(o.get()),
                Entry::Vacant(v) => {
                    let logger = Arc::new(FemtoLogger::with_parent(
                        path.clone(),
                        Some(parent),
                        Arc::clone(&self.level_names),
                    ));
                    Arc::clone(v.insert(logger))
                }
            };
        }
        parent
    }

    /// Flush every handler attached anywhere in the hierarchy.
    ///
    /// Returns `false` if any handler reported a failed flush.
    pub fn flush_all_handlers(&self) -> bool {
        let mut loggers: Vec<Arc<FemtoLogger>> = self.loggers.read().values().cloned().collect();
        loggers.push(self.root());
        loggers
            .iter()
            .flat_map(|logger| logger.handlers())
            .fold(true, |ok, handler| handler.flush() && ok)
    }

    /// Names of every logger created so far, excluding the root.
    pub fn logger_names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.loggers.read().keys().cloned().collect();
        names.sort();
        names
    }
}

static MANAGER: Lazy<Arc<Manager>> = Lazy::new(|| Arc::new(Manager::new()));

/// The process-wide hierarchy.
pub fn global() -> Arc<Manager> {
    Arc::clone(&MANAGER)
}
