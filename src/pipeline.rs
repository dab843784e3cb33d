//! The full rewrite for one record: validate, migrate, update.
//!
//! Pure text in, text out. Reading and writing the document is the
//! caller's job.

use crate::model::{CourseMatcher, RecordError, StatusRecord};
use crate::table::{self, UpdateOutcome};

/// Result of applying one record to a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Applied {
    /// Tables that gained the Progress column on the way.
    pub tables_migrated: usize,
    pub outcome: UpdateOutcome,
}

impl Applied {
    pub fn document(&self) -> &str {
        &self.outcome.document
    }
}

/// Apply `record` to `text`.
///
/// Fails only when the record has no course name; the document is not
/// touched in that case, not even migrated.
pub fn apply(
    text: &str,
    record: &StatusRecord,
    matcher: &CourseMatcher,
) -> Result<Applied, RecordError> {
    record.course_name()?;

    let migration = table::migrate(text);
    let outcome = table::update(&migration.document, matcher, record);

    Ok(Applied {
        tables_migrated: migration.tables_migrated,
        outcome,
    })
}
