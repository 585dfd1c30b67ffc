//! Logger-name filter.

use crate::{filters::FemtoFilter, log_record::FemtoLogRecord};

/// Accepts records from the named logger and its descendants.
///
/// `app.db` matches `app.db` and `app.db.pool` but not `app.dbx`. An empty
/// name accepts everything.
#[derive(Clone, Debug, Default)]
pub struct NameFilter {
    name: String,
}

impl NameFilter {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl FemtoFilter for NameFilter {
    fn should_log(&self, record: &FemtoLogRecord) -> bool {
        if self.name.is_empty() {
            return true;
        }
        match record.logger().strip_prefix(self.name.as_str()) {
            Some(rest) => rest.is_empty() || rest.starts_with('.'),
            None => false,
        }
    }
}
