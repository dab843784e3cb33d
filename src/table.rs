//! Markdown progress tables.
//!
//! A document is held as a list of lines with their terminators, so that
//! lines nobody touches are written back byte-for-byte. Tables are found by
//! shape: a header row, a separator row with the same cell count, then every
//! following pipe-delimited line up to the first line that isn't one.
//!
//! ```text
//! | Course | Status | Repo Link | Progress | Notes | Completion Date |
//! |--------|--------|-----------|----------|-------|-----------------|
//! | [CS50](https://cs50.harvard.edu/x) | In Progress | [Repo](...) | 40% | | |
//! ```
//!
//! Edits go through line indices, never through text search, so two rows
//! with identical text can't be confused.

mod migrate;
mod update;

pub use migrate::migrate;
pub use update::{MatchedRow, TermAttempt, UpdateOutcome, update};

/// The header shape before the Progress column existed.
pub const LEGACY_HEADER: [&str; 5] = ["Course", "Status", "Repo Link", "Notes", "Completion Date"];

/// The current header shape.
pub const PROGRESS_HEADER: [&str; 6] = [
    "Course",
    "Status",
    "Repo Link",
    "Progress",
    "Notes",
    "Completion Date",
];

/// A markdown document split into lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    lines: Vec<Line>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Line {
    text: String,
    /// `"\n"`, `"\r\n"`, or empty for a final line with no newline.
    ending: String,
}

impl Document {
    pub fn parse(text: &str) -> Self {
        let lines = text
            .split_inclusive('\n')
            .map(|raw| {
                let (text, ending) = if let Some(t) = raw.strip_suffix("\r\n") {
                    (t, "\r\n")
                } else if let Some(t) = raw.strip_suffix('\n') {
                    (t, "\n")
                } else {
                    (raw, "")
                };
                Line {
                    text: text.to_string(),
                    ending: ending.to_string(),
                }
            })
            .collect();
        Self { lines }
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        for line in &self.lines {
            out.push_str(&line.text);
            out.push_str(&line.ending);
        }
        out
    }

    pub fn line(&self, index: usize) -> &str {
        &self.lines[index].text
    }

    /// Replace a line's text, keeping its terminator.
    pub fn set_line(&mut self, index: usize, text: String) {
        self.lines[index].text = text;
    }

    /// Every table in the document, in document order.
    pub fn tables(&self) -> Vec<Table> {
        let mut tables = Vec::new();
        let mut i = 0;

        while i + 1 < self.lines.len() {
            let (Some(header), Some(separator)) = (Row::parse(self.line(i)), Row::parse(self.line(i + 1)))
            else {
                i += 1;
                continue;
            };

            if !separator.is_separator() || separator.width() != header.width() {
                i += 1;
                continue;
            }

            let mut end = i + 2;
            while end < self.lines.len() && Row::parse(self.line(end)).is_some() {
                end += 1;
            }

            tables.push(Table {
                header_line: i,
                columns: header.cells().iter().map(ToString::to_string).collect(),
                rows: (i + 2..end).collect(),
            });
            i = end;
        }

        tables
    }
}

/// A table located in a [`Document`], addressed by line index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub header_line: usize,
    /// Trimmed header cells.
    pub columns: Vec<String>,
    /// Line indices of the data rows.
    pub rows: Vec<usize>,
}

impl Table {
    pub fn separator_line(&self) -> usize {
        self.header_line + 1
    }

    /// Position of the column whose header is `name`, ignoring case.
    pub fn column(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.eq_ignore_ascii_case(name))
    }

    pub fn has_header(&self, expected: &[&str]) -> bool {
        self.columns.len() == expected.len()
            && self.columns.iter().zip(expected).all(|(c, e)| c == e)
    }
}

/// One pipe-delimited line, split into raw cell segments.
///
/// Segments keep their surrounding whitespace so that a row can be
/// reassembled exactly. Escaped pipes (`\|`) stay inside their cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    indent: String,
    segments: Vec<String>,
}

impl Row {
    /// Parse a line that starts and ends with `|`.
    pub fn parse(line: &str) -> Option<Self> {
        let body = line.trim_end();
        let trimmed = body.trim_start();
        let indent = &body[..body.len() - trimmed.len()];

        if trimmed.len() < 2 || !trimmed.starts_with('|') || !trimmed.ends_with('|') {
            return None;
        }
        let inner = &trimmed[1..trimmed.len() - 1];
        if inner.ends_with('\\') {
            // The closing pipe is escaped, so the row never closes.
            return None;
        }

        Some(Self {
            indent: indent.to_string(),
            segments: split_unescaped(inner),
        })
    }

    /// Build a row from cell values, rendered as `| a | b |` with empty cells as `| |`.
    pub fn from_cells<S: AsRef<str>>(indent: &str, cells: &[S]) -> Self {
        let segments = cells
            .iter()
            .map(|c| {
                let c = c.as_ref();
                if c.is_empty() {
                    " ".to_string()
                } else {
                    format!(" {c} ")
                }
            })
            .collect();
        Self {
            indent: indent.to_string(),
            segments,
        }
    }

    /// Number of cells.
    pub fn width(&self) -> usize {
        self.segments.len()
    }

    pub fn indent(&self) -> &str {
        &self.indent
    }

    /// Trimmed cell text.
    pub fn cells(&self) -> Vec<&str> {
        self.segments.iter().map(|s| s.trim()).collect()
    }

    pub fn cell(&self, index: usize) -> Option<&str> {
        self.segments.get(index).map(|s| s.trim())
    }

    /// Whether every cell is a run of dashes, optionally colon-aligned.
    pub fn is_separator(&self) -> bool {
        self.cells().iter().all(|c| {
            let dashes = c.trim_start_matches(':').trim_end_matches(':');
            !dashes.is_empty() && dashes.chars().all(|ch| ch == '-')
        })
    }

    /// Insert a raw segment at `index`, or at the end if the row is shorter.
    pub fn insert_segment(&mut self, index: usize, segment: String) {
        let index = index.min(self.segments.len());
        self.segments.insert(index, segment);
    }

    pub fn segment(&self, index: usize) -> Option<&str> {
        self.segments.get(index).map(String::as_str)
    }

    pub fn render(&self) -> String {
        format!("{}|{}|", self.indent, self.segments.join("|"))
    }
}

/// Escape characters that would break a cell.
pub fn escape_cell(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut escaped = false;
    for ch in value.chars() {
        match ch {
            '\r' | '\n' => out.push(' '),
            '|' if !escaped => out.push_str("\\|"),
            _ => out.push(ch),
        }
        escaped = ch == '\\' && !escaped;
    }
    out.trim().to_string()
}

fn split_unescaped(inner: &str) -> Vec<String> {
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut escaped = false;

    for ch in inner.chars() {
        if ch == '|' && !escaped {
            segments.push(std::mem::take(&mut current));
        } else {
            current.push(ch);
        }
        escaped = ch == '\\' && !escaped;
    }
    segments.push(current);
    segments
}
