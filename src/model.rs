//! Core data model: status records and the matchers that locate their rows.

mod matcher;
mod record;

pub use matcher::{CourseMatcher, Rejection};
pub use record::{RecordError, Status, StatusRecord};
