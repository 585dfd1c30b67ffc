//! Mapping from a verbosity count to a console threshold.
//!
//! The table holds the five standard severities plus any extra levels the
//! run declares, deduplicated and sorted most severe first. Ordinal 0 is
//! the quietest setting; each additional verbosity step moves one level
//! down until the table runs out.

use crate::config::ConfigError;
use crate::level::{FemtoLevel, LevelRegistry};

/// Ordinal to level table built once per run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VerbosityLevelTable {
    levels: Vec<FemtoLevel>,
}

impl Default for VerbosityLevelTable {
    fn default() -> Self {
        Self {
            levels: FemtoLevel::STANDARD.to_vec(),
        }
    }
}

impl VerbosityLevelTable {
    /// Build the table from extra level tokens.
    ///
    /// A token that parses as an integer is taken as a numeric level and
    /// must lie within `NOTSET..=CRITICAL`. Any other token must name a
    /// level known to `registry`.
    pub fn build<S: AsRef<str>>(extras: &[S], registry: &LevelRegistry) -> Result<Self, ConfigError> {
        let mut levels = FemtoLevel::STANDARD.to_vec();
        for token in extras {
            levels.push(parse_level(token.as_ref(), registry)?);
        }
        levels.sort_unstable_by(|a, b| b.cmp(a));
        levels.dedup();
        Ok(Self { levels })
    }

    /// Threshold for verbosity count `verbosity`, saturating at the most
    /// verbose level.
    pub fn resolve(&self, verbosity: usize) -> FemtoLevel {
        let last = self.levels.len().saturating_sub(1);
        self.levels
            .get(verbosity.min(last))
            .copied()
            .unwrap_or(FemtoLevel::CRITICAL)
    }

    /// Levels by ordinal, most severe first.
    pub fn levels(&self) -> &[FemtoLevel] {
        &self.levels
    }

    pub fn max_ordinal(&self) -> usize {
        self.levels.len().saturating_sub(1)
    }
}

fn parse_level(token: &str, registry: &LevelRegistry) -> Result<FemtoLevel, ConfigError> {
    let token = token.trim();
    match token.parse::<i64>() {
        Ok(value) => {
            let min = i64::from(FemtoLevel::MIN_DEFINED.value());
            let max = i64::from(FemtoLevel::MAX_DEFINED.value());
            if !(min..=max).contains(&value) {
                return Err(ConfigError::LevelOutOfRange {
                    value,
                    min: FemtoLevel::MIN_DEFINED,
                    max: FemtoLevel::MAX_DEFINED,
                });
            }
            // Range checked above.
            Ok(FemtoLevel::new(value as u8))
        }
        Err(_) => registry
            .lookup(token)
            .ok_or_else(|| ConfigError::UnknownLevelName(token.to_owned())),
    }
}
