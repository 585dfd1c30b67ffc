//! Numeric log levels and the name registry shared by a logger hierarchy.
//!
//! Levels are plain numbers so callers can declare extra severities between
//! the standard ones. [`LevelRegistry`] maps names to numbers in both
//! directions and is consulted when records are created and when textual
//! level declarations are resolved.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use parking_lot::RwLock;

/// Numeric severity threshold. Larger values are more severe.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FemtoLevel(u8);

impl FemtoLevel {
    pub const NOTSET: Self = Self(0);
    pub const TRACE: Self = Self(5);
    pub const DEBUG: Self = Self(10);
    pub const INFO: Self = Self(20);
    pub const WARNING: Self = Self(30);
    pub const WARN: Self = Self::WARNING;
    pub const ERROR: Self = Self(40);
    pub const CRITICAL: Self = Self(50);
    pub const FATAL: Self = Self::CRITICAL;

    /// Lowest level accepted by configuration.
    pub const MIN_DEFINED: Self = Self::NOTSET;
    /// Highest level accepted by configuration.
    pub const MAX_DEFINED: Self = Self::CRITICAL;

    /// The five standard severities, most severe first.
    pub const STANDARD: [Self; 5] = [
        Self::CRITICAL,
        Self::ERROR,
        Self::WARNING,
        Self::INFO,
        Self::DEBUG,
    ];

    pub const fn new(value: u8) -> Self {
        Self(value)
    }

    pub const fn value(self) -> u8 {
        self.0
    }

    /// Return the standard name for this level, if it has one.
    pub fn standard_name(self) -> Option<&'static str> {
        match self.0 {
            0 => Some("NOTSET"),
            10 => Some("DEBUG"),
            20 => Some("INFO"),
            30 => Some("WARNING"),
            40 => Some("ERROR"),
            50 => Some("CRITICAL"),
            _ => None,
        }
    }
}

impl From<u8> for FemtoLevel {
    fn from(value: u8) -> Self {
        Self(value)
    }
}

impl From<FemtoLevel> for u8 {
    fn from(level: FemtoLevel) -> Self {
        level.0
    }
}

impl fmt::Display for FemtoLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.standard_name() {
            Some(name) => f.write_str(name),
            None => write!(f, "Level {}", self.0),
        }
    }
}

#[derive(Default)]
struct LevelNames {
    by_level: BTreeMap<FemtoLevel, String>,
    by_name: HashMap<String, FemtoLevel>,
}

/// Bidirectional level name table.
///
/// Names match exactly, as registered. Registering a name for a level that
/// already has one replaces the display name but keeps the old name
/// resolvable, matching how aliases such as `WARN` and `FATAL` behave.
pub struct LevelRegistry {
    names: RwLock<LevelNames>,
}

impl Default for LevelRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl LevelRegistry {
    /// Create a registry holding the standard level names and aliases.
    pub fn new() -> Self {
        let registry = Self {
            names: RwLock::new(LevelNames::default()),
        };
        for level in [FemtoLevel::NOTSET]
            .into_iter()
            .chain(FemtoLevel::STANDARD.into_iter().rev())
        {
            if let Some(name) = level.standard_name() {
                registry.add_level_name(level, name);
            }
        }
        let mut names = registry.names.write();
        names.by_name.insert("WARN".into(), FemtoLevel::WARNING);
        names.by_name.insert("FATAL".into(), FemtoLevel::CRITICAL);
        drop(names);
        registry
    }

    /// Associate `name` with `level`.
    pub fn add_level_name(&self, level: FemtoLevel, name: &str) {
        let key = name.trim().to_owned();
        let mut names = self.names.write();
        names.by_level.insert(level, key.clone());
        names.by_name.insert(key, level);
    }

    /// Return the display name for `level`, or `Level N` when unregistered.
    pub fn level_name(&self, level: FemtoLevel) -> String {
        self.names
            .read()
            .by_level
            .get(&level)
            .cloned()
            .unwrap_or_else(|| format!("Level {}", level.value()))
    }

    /// Resolve a registered level name.
    pub fn lookup(&self, name: &str) -> Option<FemtoLevel> {
        self.names
            .read()
            .by_name
            .get(name.trim())
            .copied()
    }

    /// All registered numeric levels in ascending order.
    pub fn levels(&self) -> Vec<FemtoLevel> {
        self.names.read().by_level.keys().copied().collect()
    }
}
