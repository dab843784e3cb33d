//! Human-readable summaries of migrations, updates, and sync runs.

use std::fmt;

use crate::model::Rejection;
use crate::table::{MatchedRow, TermAttempt, UpdateOutcome};

/// One line describing what a search term turned up.
pub(super) fn format_attempt(attempt: &TermAttempt) -> String {
    let mut line = format!(
        "term '{}': {} candidate(s)",
        attempt.term, attempt.candidates
    );
    if !attempt.rejected.is_empty() {
        let rejected = attempt
            .rejected
            .iter()
            .map(|(name, reason)| format!("{name} ({})", format_rejection(reason)))
            .collect::<Vec<_>>()
            .join(", ");
        line.push_str(&format!(", rejected {rejected}"));
    }
    if attempt.accepted {
        line.push_str(", accepted");
    }
    line
}

pub(super) fn format_rejection(reason: &Rejection) -> String {
    match reason {
        Rejection::Excluded(term) => format!("excluded by '{term}'"),
        Rejection::MissingRequired => "no required term".to_string(),
    }
}

/// The one-line result of updating a course.
pub(super) fn format_outcome(course_name: &str, outcome: &UpdateOutcome) -> String {
    match &outcome.matched {
        Some(row) => format_match(row),
        None => {
            let tried = outcome
                .attempts
                .iter()
                .map(|a| format!("'{}'", a.term))
                .collect::<Vec<_>>()
                .join(", ");
            format!("No row matched {course_name} (tried {tried})")
        }
    }
}

fn format_match(row: &MatchedRow) -> String {
    format!(
        "Updated {} (matched '{}', line {})",
        row.name, row.term, row.line
    )
}

/// Running totals for `coursebook sync`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(super) struct SyncSummary {
    pub updated: usize,
    pub unmatched: usize,
    pub skipped: usize,
    pub tables_migrated: usize,
}

impl fmt::Display for SyncSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} updated, {} unmatched, {} skipped",
            self.updated, self.unmatched, self.skipped
        )?;
        if self.tables_migrated > 0 {
            write!(f, "; added Progress column to {} table(s)", self.tables_migrated)?;
        }
        Ok(())
    }
}
