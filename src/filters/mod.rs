//! Filtering components for log records.
//!
//! Provides the [`FemtoFilter`] trait along with the name-prefix filter used
//! to scope captures to one branch of the logger hierarchy.

use crate::log_record::FemtoLogRecord;

pub mod name_filter;

pub use name_filter::NameFilter;

/// Trait implemented by all log filters.
///
/// Filters are `Send + Sync` so they can be shared across threads.
pub trait FemtoFilter: Send + Sync {
    /// Return `true` if `record` should be processed.
    fn should_log(&self, record: &FemtoLogRecord) -> bool;
}

impl<F> FemtoFilter for F
where
    F: Fn(&FemtoLogRecord) -> bool + Send + Sync,
{
    fn should_log(&self, record: &FemtoLogRecord) -> bool {
        self(record)
    }
}
