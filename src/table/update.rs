//! Rewrite the row describing one course.
//!
//! Search terms are tried in priority order. For each term, every data row
//! whose first cell contains the term is a candidate, in document order.
//! Candidates are screened by the matcher's exclusion and required filters;
//! the first survivor is rewritten and the search stops. A term whose
//! candidates are all rejected falls through to the next term.

use tracing::debug;

use crate::model::{CourseMatcher, Rejection, StatusRecord};

use super::{Document, Row, Table, escape_cell};

/// What happened when one search term was tried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermAttempt {
    pub term: String,
    /// Rows whose name cell contained the term.
    pub candidates: usize,
    /// Candidates passed over, with their name cell.
    pub rejected: Vec<(String, Rejection)>,
    pub accepted: bool,
}

/// The row that was rewritten.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchedRow {
    pub term: String,
    /// The course-name cell, as found.
    pub name: String,
    /// 0-based index of the table among the document's tables.
    pub table: usize,
    /// 1-based line number in the document.
    pub line: usize,
    pub before: String,
    pub after: String,
}

/// Result of an update: the new text, the match (if any), and the search trace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateOutcome {
    pub document: String,
    pub matched: Option<MatchedRow>,
    pub attempts: Vec<TermAttempt>,
}

impl UpdateOutcome {
    pub fn is_matched(&self) -> bool {
        self.matched.is_some()
    }
}

/// Find the course's row in `text` and rewrite it from `record`.
///
/// When nothing matches, the returned document is `text` unchanged.
pub fn update(text: &str, matcher: &CourseMatcher, record: &StatusRecord) -> UpdateOutcome {
    let mut doc = Document::parse(text);
    let (matched, attempts) = update_document(&mut doc, matcher, record);
    UpdateOutcome {
        document: if matched.is_some() {
            doc.render()
        } else {
            text.to_string()
        },
        matched,
        attempts,
    }
}

fn update_document(
    doc: &mut Document,
    matcher: &CourseMatcher,
    record: &StatusRecord,
) -> (Option<MatchedRow>, Vec<TermAttempt>) {
    let tables = doc.tables();
    let mut attempts = Vec::new();

    for term in &matcher.terms {
        let mut attempt = TermAttempt {
            term: term.clone(),
            candidates: 0,
            rejected: Vec::new(),
            accepted: false,
        };

        let found = find_row(doc, &tables, matcher, term, &mut attempt);
        debug!(
            term = %term,
            candidates = attempt.candidates,
            rejected = attempt.rejected.len(),
            accepted = found.is_some(),
            "searched for course row"
        );

        let Some((index, table, line, row)) = found else {
            attempts.push(attempt);
            continue;
        };

        attempt.accepted = true;
        attempts.push(attempt);

        let before = doc.line(line).to_string();
        let rebuilt = rebuild_row(table, &row, record).render();
        doc.set_line(line, rebuilt.clone());

        let matched = MatchedRow {
            term: term.clone(),
            name: row.cell(0).unwrap_or_default().to_string(),
            table: index,
            line: line + 1,
            before,
            after: rebuilt,
        };
        return (Some(matched), attempts);
    }

    (None, attempts)
}

/// First accepted row for `term`, with its table, the table's index, and the
/// row's line index.
fn find_row<'t>(
    doc: &Document,
    tables: &'t [Table],
    matcher: &CourseMatcher,
    term: &str,
    attempt: &mut TermAttempt,
) -> Option<(usize, &'t Table, usize, Row)> {
    for (index, table) in tables.iter().enumerate() {
        for &line in &table.rows {
            let Some(row) = Row::parse(doc.line(line)) else {
                continue;
            };
            if row.width() != table.columns.len() {
                continue;
            }
            let name = row.cell(0).unwrap_or_default();
            if !matcher.contains(name, term) {
                continue;
            }

            attempt.candidates += 1;
            match matcher.screen(name) {
                Ok(()) => return Some((index, table, line, row)),
                Err(reason) => attempt.rejected.push((name.to_string(), reason)),
            }
        }
    }
    None
}

/// Which column holds which field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ColumnLayout {
    status: Option<usize>,
    repo: Option<usize>,
    progress: Option<usize>,
    notes: Option<usize>,
    completion: Option<usize>,
}

impl ColumnLayout {
    /// Columns found by header name. Status and Repo Link fall back to
    /// the second and third positions when their headers are missing and
    /// no named column already holds that position.
    fn of(table: &Table) -> Self {
        let width = table.columns.len();
        let named = |name: &str| table.column(name).filter(|&i| i > 0);

        let status = named("Status");
        let repo = named("Repo Link");
        let progress = named("Progress");
        let notes = named("Notes");
        let completion = named("Completion Date");

        let owned = [status, repo, progress, notes, completion];
        let fallback = |i: usize| (i < width && !owned.contains(&Some(i))).then_some(i);

        Self {
            status: status.or_else(|| fallback(1)),
            repo: repo.or_else(|| fallback(2)),
            progress,
            notes,
            completion,
        }
    }
}

/// Rebuild a row from the record.
///
/// The name cell is kept. Notes fall back to the row's existing notes when
/// the record has none. Cells without a role are emptied.
fn rebuild_row(table: &Table, row: &Row, record: &StatusRecord) -> Row {
    let layout = ColumnLayout::of(table);
    let mut cells = vec![String::new(); table.columns.len()];
    cells[0] = row.cell(0).unwrap_or_default().to_string();

    let mut set = |index: Option<usize>, value: String| {
        if let Some(i) = index {
            cells[i] = value;
        }
    };

    set(layout.status, escape_cell(record.status.as_str()));
    set(layout.repo, escape_cell(&record.repo_cell()));
    set(layout.progress, record.progress_cell());
    let notes = if record.notes.trim().is_empty() {
        layout
            .notes
            .and_then(|i| row.cell(i))
            .unwrap_or_default()
            .to_string()
    } else {
        escape_cell(&record.notes)
    };
    set(layout.notes, notes);
    set(layout.completion, escape_cell(&record.completion_date));

    Row::from_cells(row.indent(), &cells)
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::model::Status;

    const TABLE: &str = "\
| Course | Status | Repo Link | Progress | Notes | Completion Date |
|--------|--------|-----------|----------|-------|-----------------|
| [CS50](https://cs50.harvard.edu/x) | Not Started | | | Lectures first | |
| [CS50W](https://cs50.harvard.edu/web) | Not Started | | | | |
| How to Code - Simple Data | Not Started | | | | |
";

    fn sample_record() -> StatusRecord {
        StatusRecord {
            course_name: "CS50's Introduction to Computer Science".into(),
            status: Status::InProgress,
            repo_link: "https://github.com/x/cs50".into(),
            progress_percentage: 40,
            ..StatusRecord::default()
        }
    }

    fn cs50_matcher() -> CourseMatcher {
        CourseMatcher::new("CS50's Introduction to Computer Science", ["CS50"])
            .exclude(["CS50W", "Web Programming"])
    }

    fn lines(text: &str) -> Vec<&str> {
        text.lines().collect()
    }

    #[test]
    fn rewrites_only_the_matching_row() {
        let outcome = update(TABLE, &cs50_matcher(), &sample_record());

        let before = lines(TABLE);
        let after = lines(&outcome.document);
        assert_eq!(before.len(), after.len());
        for (i, (b, a)) in before.iter().zip(after.iter()).enumerate() {
            if i == 2 {
                assert_eq!(
                    *a,
                    "| [CS50](https://cs50.harvard.edu/x) | In Progress | [Repo](https://github.com/x/cs50) | 40% | Lectures first | |"
                );
            } else {
                assert_eq!(a, b);
            }
        }

        let matched = outcome.matched.unwrap();
        assert_eq!(matched.term, "CS50");
        assert_eq!(matched.name, "[CS50](https://cs50.harvard.edu/x)");
        assert_eq!(matched.table, 0);
        assert_eq!(matched.line, 3);
    }

    #[test]
    fn exclusion_disambiguates_sibling_course() {
        let text = "\
| Course | Status | Repo Link | Progress | Notes | Completion Date |
|---|---|---|---|---|---|
| [CS50W](https://cs50.harvard.edu/web) | Not Started | | | | |
| [CS50](https://cs50.harvard.edu/x) | Not Started | | | | |
";
        let matcher = CourseMatcher::new("CS50", Vec::<String>::new())
            .exclude(["CS50W", "Web Programming"]);
        let outcome = update(text, &matcher, &sample_record());

        let after = lines(&outcome.document);
        assert_eq!(after[2], lines(text)[2]);
        assert!(after[3].contains("In Progress"));

        let attempt = &outcome.attempts[0];
        assert_eq!(attempt.candidates, 2);
        assert_eq!(
            attempt.rejected,
            [(
                "[CS50W](https://cs50.harvard.edu/web)".to_string(),
                Rejection::Excluded("CS50W".into())
            )]
        );
    }

    #[test]
    fn required_terms_select_the_variant() {
        let matcher = CourseMatcher::new("CS50", Vec::<String>::new()).require(["CS50W"]);
        let outcome = update(TABLE, &matcher, &sample_record());

        assert_eq!(
            outcome.matched.unwrap().name,
            "[CS50W](https://cs50.harvard.edu/web)"
        );
    }

    #[test]
    fn falls_through_to_next_term_when_all_rejected() {
        let matcher = CourseMatcher::new("CS50W", ["Simple Data"]).exclude(["CS50W"]);
        let outcome = update(TABLE, &matcher, &sample_record());

        assert_eq!(outcome.attempts.len(), 2);
        assert!(!outcome.attempts[0].accepted);
        assert_eq!(outcome.attempts[0].candidates, 1);
        assert!(outcome.attempts[1].accepted);
        assert_eq!(outcome.matched.unwrap().name, "How to Code - Simple Data");
    }

    #[test]
    fn earlier_term_wins_over_document_order() {
        let matcher = CourseMatcher::new("Simple Data", ["CS50"]);
        let outcome = update(TABLE, &matcher, &sample_record());

        assert_eq!(outcome.attempts.len(), 1);
        assert_eq!(outcome.matched.unwrap().term, "Simple Data");
    }

    #[test]
    fn no_match_returns_document_unchanged() {
        let matcher = CourseMatcher::new("Programming Languages", Vec::<String>::new());
        let outcome = update(TABLE, &matcher, &sample_record());

        assert!(!outcome.is_matched());
        assert_eq!(outcome.document, TABLE);
        assert_eq!(outcome.attempts.len(), 1);
        assert_eq!(outcome.attempts[0].candidates, 0);
    }

    #[test]
    fn case_insensitive_matching() {
        let matcher = CourseMatcher::new("simple data", Vec::<String>::new()).case_sensitive(false);
        let outcome = update(TABLE, &matcher, &sample_record());
        assert!(outcome.is_matched());

        let strict = CourseMatcher::new("simple data", Vec::<String>::new());
        assert!(!update(TABLE, &strict, &sample_record()).is_matched());
    }

    #[test]
    fn record_notes_replace_existing_notes() {
        let mut record = sample_record();
        record.notes = "Problem set 2 | done".into();
        record.completion_date = "2025-03-01".into();

        let outcome = update(TABLE, &cs50_matcher(), &record);
        let row = outcome.matched.unwrap().after;
        assert_eq!(
            row,
            r"| [CS50](https://cs50.harvard.edu/x) | In Progress | [Repo](https://github.com/x/cs50) | 40% | Problem set 2 \| done | 2025-03-01 |"
        );
    }

    #[test]
    fn legacy_four_column_row_keeps_its_width() {
        let text = "\
| Course | Status | Repo Link | Notes |
|---|---|---|---|
| [CS50](url) | Not Started | | |
";
        let matcher = CourseMatcher::new("CS50's Introduction to Computer Science", ["CS50"]);
        let outcome = update(text, &matcher, &sample_record());

        assert_eq!(
            lines(&outcome.document)[2],
            "| [CS50](url) | In Progress | [Repo](https://github.com/x/cs50) | |"
        );
    }

    #[test]
    fn header_and_separator_never_match() {
        let matcher = CourseMatcher::new("Course", Vec::<String>::new());
        let outcome = update(TABLE, &matcher, &sample_record());
        assert!(!outcome.is_matched());
    }

    #[test]
    fn duplicate_rows_only_first_is_rewritten() {
        let text = "\
| Course | Status | Repo Link |
|---|---|---|
| CS50 | Not Started | |
| CS50 | Not Started | |
";
        let matcher = CourseMatcher::new("CS50", Vec::<String>::new());
        let outcome = update(text, &matcher, &sample_record());

        let after = lines(&outcome.document);
        assert_eq!(after[2], "| CS50 | In Progress | [Repo](https://github.com/x/cs50) |");
        assert_eq!(after[3], "| CS50 | Not Started | |");
    }

    #[test]
    fn unknown_columns_become_empty_filler() {
        let text = "\
| Course | Status | Repo Link | Platform |
|---|---|---|---|
| CS50 | Not Started | | edX |
";
        let matcher = CourseMatcher::new("CS50", Vec::<String>::new());
        let outcome = update(text, &matcher, &sample_record());

        assert_eq!(
            lines(&outcome.document)[2],
            "| CS50 | In Progress | [Repo](https://github.com/x/cs50) | |"
        );
    }

    #[test]
    fn rows_with_wrong_width_are_skipped() {
        let text = "\
| Course | Status | Repo Link |
|---|---|---|
| CS50 | Not Started |
";
        let matcher = CourseMatcher::new("CS50", Vec::<String>::new());
        assert!(!update(text, &matcher, &sample_record()).is_matched());
    }

    #[test]
    fn positional_fallback_yields_to_named_columns() {
        let text = "\
| Course | Progress | Status |
|---|---|---|
| CS50 | | Not Started |
";
        let matcher = CourseMatcher::new("CS50", Vec::<String>::new());
        let outcome = update(text, &matcher, &sample_record());

        assert_eq!(lines(&outcome.document)[2], "| CS50 | 40% | In Progress |");
    }

    #[test]
    fn notes_column_is_never_treated_as_status() {
        let text = "\
| Course | Notes | Repo Link |
|---|---|---|
| CS50 | Lectures first | |
";
        let doc = Document::parse(text);
        let layout = ColumnLayout::of(&doc.tables()[0]);
        assert_eq!(layout.status, None);
        assert_eq!(layout.notes, Some(1));
        assert_eq!(layout.repo, Some(2));

        let mut record = sample_record();
        record.notes = "Week 3".into();
        let matcher = CourseMatcher::new("CS50", Vec::<String>::new());
        let outcome = update(text, &matcher, &record);

        assert_eq!(
            lines(&outcome.document)[2],
            "| CS50 | Week 3 | [Repo](https://github.com/x/cs50) |"
        );
    }

    #[test]
    fn matched_row_reports_its_table() {
        let text = "\
| Course | Status | Repo Link |
|---|---|---|
| SICP | Not Started | |

| Course | Status | Repo Link |
|---|---|---|
| CS50 | Not Started | |
";
        let matcher = CourseMatcher::new("CS50", Vec::<String>::new());
        let matched = update(text, &matcher, &sample_record()).matched.unwrap();

        assert_eq!(matched.table, 1);
        assert_eq!(matched.line, 7);
    }
}
