//! Status records: one course's progress snapshot, read from `status.json`.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Errors that make a record unusable for an update.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecordError {
    #[error("status record has no course name")]
    MissingCourseName,
}

/// A course's progress snapshot.
///
/// Every key is optional on the wire. Missing keys and JSON `null`
/// both fall back to the default: `Not Started`, zero progress, empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusRecord {
    #[serde(default, deserialize_with = "nullable")]
    pub course_name: String,

    #[serde(default, deserialize_with = "nullable")]
    pub status: Status,

    #[serde(default, deserialize_with = "nullable")]
    pub repo_link: String,

    #[serde(default, deserialize_with = "nullable")]
    pub progress_percentage: u32,

    #[serde(default, deserialize_with = "nullable")]
    pub notes: String,

    #[serde(default, deserialize_with = "nullable")]
    pub completion_date: String,

    /// Carried through but never written to the document.
    #[serde(default, deserialize_with = "nullable")]
    pub last_updated: String,
}

impl StatusRecord {
    /// The trimmed course name, or [`RecordError::MissingCourseName`] if blank.
    pub fn course_name(&self) -> Result<&str, RecordError> {
        let name = self.course_name.trim();
        if name.is_empty() {
            return Err(RecordError::MissingCourseName);
        }
        Ok(name)
    }

    /// The Repo Link cell: `[Repo](<url>)`, or empty when there is no link.
    pub fn repo_cell(&self) -> String {
        let link = self.repo_link.trim();
        if link.is_empty() {
            String::new()
        } else {
            format!("[Repo]({link})")
        }
    }

    /// The Progress cell: `<n>%`, or empty at zero. Capped at 100.
    pub fn progress_cell(&self) -> String {
        match self.progress_percentage {
            0 => String::new(),
            n => format!("{}%", n.min(100)),
        }
    }
}

/// Where a course stands.
///
/// Unknown values are kept verbatim so free-form statuses survive a round trip.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Status {
    #[default]
    NotStarted,
    InProgress,
    Completed,
    Other(String),
}

impl Status {
    pub fn as_str(&self) -> &str {
        match self {
            Self::NotStarted => "Not Started",
            Self::InProgress => "In Progress",
            Self::Completed => "Completed",
            Self::Other(s) => s,
        }
    }
}

impl From<String> for Status {
    fn from(s: String) -> Self {
        match s.as_str() {
            "Not Started" => Self::NotStarted,
            "In Progress" => Self::InProgress,
            "Completed" => Self::Completed,
            _ => Self::Other(s),
        }
    }
}

impl From<Status> for String {
    fn from(status: Status) -> Self {
        match status {
            Status::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Treat an explicit `null` the same as a missing key.
fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
