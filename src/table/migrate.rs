//! Add the Progress column to legacy tables.
//!
//! Runs once per document: if any table already carries the current
//! header, the document is left alone. Otherwise every legacy table gets
//! `Progress` inserted after `Repo Link` in its header, one more dash cell
//! in its separator, and an empty cell in each data row.

use tracing::debug;

use super::{Document, LEGACY_HEADER, PROGRESS_HEADER, Row};

/// Result of a migration pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Migration {
    pub document: String,
    /// How many tables gained the Progress column.
    pub tables_migrated: usize,
}

impl Migration {
    pub fn changed(&self) -> bool {
        self.tables_migrated > 0
    }
}

/// Migrate every legacy table in `text`.
pub fn migrate(text: &str) -> Migration {
    let mut doc = Document::parse(text);
    let tables_migrated = migrate_document(&mut doc);
    Migration {
        document: if tables_migrated > 0 {
            doc.render()
        } else {
            text.to_string()
        },
        tables_migrated,
    }
}

fn migrate_document(doc: &mut Document) -> usize {
    let tables = doc.tables();

    if tables.iter().any(|t| t.has_header(&PROGRESS_HEADER)) {
        debug!("progress column already present, skipping migration");
        return 0;
    }

    let mut migrated = 0;
    for table in tables.iter().filter(|t| t.has_header(&LEGACY_HEADER)) {
        // Always 3: right after Repo Link.
        let Some(at) = table.column("Repo Link").map(|i| i + 1) else {
            continue;
        };

        let Some(header) = Row::parse(doc.line(table.header_line)) else {
            continue;
        };
        let new_header = Row::from_cells(header.indent(), &PROGRESS_HEADER);
        doc.set_line(table.header_line, new_header.render());

        let sep_line = table.separator_line();
        if let Some(mut separator) = Row::parse(doc.line(sep_line)) {
            let segment = separator_segment(separator.segment(at - 1).unwrap_or("---"));
            separator.insert_segment(at, segment);
            doc.set_line(sep_line, separator.render());
        }

        for &line in &table.rows {
            if let Some(mut row) = Row::parse(doc.line(line)) {
                row.insert_segment(at, " ".to_string());
                doc.set_line(line, row.render());
            }
        }

        debug!(
            line = table.header_line + 1,
            rows = table.rows.len(),
            "added progress column"
        );
        migrated += 1;
    }

    migrated
}

/// A dash cell styled like its neighbour, minus any alignment colons.
fn separator_segment(neighbour: &str) -> String {
    let segment = neighbour.replace(':', "-");
    if segment.trim().is_empty() {
        "---".to_string()
    } else {
        segment
    }
}
