//! Coursebook configuration.
//!
//! Loaded from the first of `--config <path>`, `./coursebook.toml`, or
//! `<config dir>/coursebook/config.toml`. Defaults apply when none exist.
//!
//! ```toml
//! document = "README.md"
//! case-sensitive = true
//!
//! [courses.cs50]
//! fallback-terms = ["CS50"]
//! exclusion-terms = ["CS50W", "Web Programming"]
//!
//! [courses.cs50w]
//! fallback-terms = ["CS50's Web Programming", "CS50W"]
//! required-terms = ["CS50W", "Web Programming"]
//! ```

use std::{
    collections::BTreeMap,
    fs, io,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::model::CourseMatcher;

/// Errors loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("invalid config at {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Coursebook configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct Config {
    /// The progress document, relative to the working directory.
    pub document: PathBuf,

    /// Default matching mode for courses without their own setting.
    pub case_sensitive: bool,

    /// File name looked for in each course directory.
    pub status_file: String,

    /// Directory names never searched for status files.
    pub skip: Vec<String>,

    /// Course profiles, keyed by course directory name.
    pub courses: BTreeMap<String, CourseProfile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            document: PathBuf::from("README.md"),
            case_sensitive: true,
            status_file: "status.json".to_string(),
            skip: vec![".git".into(), ".github".into(), "target".into()],
            courses: BTreeMap::new(),
        }
    }
}

/// How to find one course's row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct CourseProfile {
    /// First search term. Defaults to the record's course name.
    pub primary_term: Option<String>,
    pub fallback_terms: Vec<String>,
    pub exclusion_terms: Vec<String>,
    pub required_terms: Vec<String>,
    /// Overrides the top-level `case-sensitive`.
    pub case_sensitive: Option<bool>,
}

impl Config {
    /// Load config from an explicit path or the usual locations.
    ///
    /// An explicit path must exist. The usual locations may be absent.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        for path in Self::candidate_paths() {
            if path.is_file() {
                return Self::from_file(&path);
            }
        }

        Ok(Self::default())
    }

    /// `./coursebook.toml`, then `<config dir>/coursebook/config.toml`.
    pub fn candidate_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("coursebook.toml")];
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("coursebook").join("config.toml"));
        }
        paths
    }

    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn parse(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    /// Build the matcher for a course.
    ///
    /// The profile's primary term (or `course_name`) leads, then its fallbacks.
    /// Courses without a profile match on their name alone.
    pub fn matcher(&self, course: Option<&str>, course_name: &str) -> CourseMatcher {
        let Some(profile) = course.and_then(|c| self.courses.get(c)) else {
            return CourseMatcher::new(course_name, Vec::<String>::new())
                .case_sensitive(self.case_sensitive);
        };

        let primary = profile.primary_term.as_deref().unwrap_or(course_name);
        CourseMatcher::new(primary, &profile.fallback_terms)
            .exclude(&profile.exclusion_terms)
            .require(&profile.required_terms)
            .case_sensitive(profile.case_sensitive.unwrap_or(self.case_sensitive))
    }
}
