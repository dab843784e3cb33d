//! Find course status files under a project root.
//!
//! Walks the tree with `ignore`, so `.gitignore` is respected. Hidden
//! directories are walked too, since status files sometimes live under
//! `.github/`. Directories named in `skip` are never entered.

use std::path::{Path, PathBuf};

use ignore::WalkBuilder;
use tracing::debug;

/// A discovered status file and the course key it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusFile {
    /// Name of the directory holding the file, used to look up a course profile.
    pub course: String,
    pub path: PathBuf,
}

/// Every file named `file_name` under `root`, sorted by path.
///
/// Files directly in `root` have no course directory and are ignored.
pub fn status_files(root: &Path, file_name: &str, skip: &[String]) -> Vec<StatusFile> {
    let skip_owned: Vec<String> = skip.to_vec();
    let mut builder = WalkBuilder::new(root);
    builder
        .hidden(false)
        .filter_entry(move |entry| {
            if entry.file_type().is_some_and(|ft| ft.is_dir()) {
                let name = entry.file_name().to_string_lossy();
                if skip_owned.iter().any(|s| s == name.as_ref()) {
                    return false;
                }
            }
            true
        })
        .sort_by_file_name(Ord::cmp);

    let mut found: Vec<StatusFile> = builder
        .build()
        .flatten()
        .filter(|entry| entry.file_type().is_some_and(|ft| ft.is_file()))
        .filter(|entry| entry.file_name() == file_name)
        .filter_map(|entry| {
            let path = entry.into_path();
            let parent = path.parent()?;
            if parent == root {
                return None;
            }
            let course = parent.file_name()?.to_string_lossy().into_owned();
            Some(StatusFile { course, path })
        })
        .collect();

    found.sort_by(|a, b| a.path.cmp(&b.path));
    debug!(root = %root.display(), count = found.len(), "discovered status files");
    found
}
