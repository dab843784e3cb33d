//! CLI interface for coursebook.
//!
//! Keeps a markdown progress table in step with per-course `status.json` files.
//! Every command reads the document once and writes it at most once.
//!
//! - `coursebook migrate`: add the Progress column to legacy tables.
//! - `coursebook update <status.json>`: rewrite one course's row.
//! - `coursebook sync`: rewrite every course found under a root directory.
//!
//! A course that can't be found in the table is a warning, not a failure.
//! Only a document that can't be read or written ends the run with an error.

mod report;

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::discover;
use crate::model::{CourseMatcher, StatusRecord};
use crate::pipeline::{self, Applied};
use crate::storage::{self, StorageError};
use crate::table;

use report::{SyncSummary, format_attempt, format_outcome};

/// Coursebook: keep a markdown progress table up to date.
#[derive(Debug, Parser)]
#[command(name = "coursebook", after_long_help = WORKFLOW_HELP)]
pub struct Cli {
    /// Config file (default: ./coursebook.toml, then the user config dir).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Progress document to update (overrides `document` in the config).
    #[arg(long, global = true)]
    document: Option<PathBuf>,

    /// Print the updated document to stdout instead of writing it.
    #[arg(long, global = true)]
    dry_run: bool,

    /// More diagnostics on stderr. Repeat for the per-term search trace.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only report errors.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

const WORKFLOW_HELP: &str = r#"Workflow:
  1. coursebook migrate
     → adds a Progress column to `| Course | Status | Repo Link | Notes | Completion Date |` tables
  2. coursebook update cs50/status.json --term CS50 --exclude CS50W --exclude "Web Programming"
  3. coursebook sync --dry-run
     → applies every <course>/status.json, printing the result

Course profiles in coursebook.toml replace the --term/--exclude flags:
  [courses.cs50]
  fallback-terms = ["CS50"]
  exclusion-terms = ["CS50W", "Web Programming"]"#;

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Add the Progress column to legacy tables.
    ///
    /// Does nothing if any table already has it.
    Migrate,

    /// Update one course's row from its status file.
    ///
    /// Search terms are tried in order: the course name (or the profile's
    /// primary term), the profile's fallback terms, then each `--term`.
    Update {
        /// Path to the course's status file.
        status_file: PathBuf,

        /// Course profile to use (default: the status file's directory name).
        #[arg(long)]
        course: Option<String>,

        #[command(flatten)]
        matching: MatchArgs,
    },

    /// Update every course whose status file is found under `--root`.
    Sync {
        /// Directory to search for course status files.
        #[arg(long, default_value = ".")]
        root: PathBuf,
    },
}

/// Flags that extend a course profile.
#[derive(Debug, Args)]
pub struct MatchArgs {
    /// Extra search term, tried after the profile's terms. Repeatable.
    #[arg(long = "term")]
    terms: Vec<String>,

    /// Reject rows whose course cell contains this. Repeatable.
    #[arg(long = "exclude")]
    exclusions: Vec<String>,

    /// Only accept rows whose course cell contains one of these. Repeatable.
    #[arg(long = "require")]
    required: Vec<String>,

    /// Match terms without regard to case.
    #[arg(long)]
    ignore_case: bool,
}

impl MatchArgs {
    fn extend(&self, mut matcher: CourseMatcher) -> CourseMatcher {
        for term in &self.terms {
            matcher.push_term(term);
        }
        let matcher = matcher.exclude(&self.exclusions).require(&self.required);
        if self.ignore_case {
            matcher.case_sensitive(false)
        } else {
            matcher
        }
    }
}

/// Settings shared by every command.
struct Context {
    config: Config,
    document: PathBuf,
    dry_run: bool,
}

/// Run the CLI, returning an error message on failure.
pub fn run(cli: Cli) -> Result<(), String> {
    let config = Config::load(cli.config.as_deref()).map_err(|e| e.to_string())?;
    let document = cli.document.unwrap_or_else(|| config.document.clone());
    debug!(document = %document.display(), "resolved progress document");

    let ctx = Context {
        config,
        document,
        dry_run: cli.dry_run,
    };

    match cli.command {
        Command::Migrate => cmd_migrate(&ctx),
        Command::Update {
            status_file,
            course,
            matching,
        } => cmd_update(&ctx, &status_file, course.as_deref(), &matching),
        Command::Sync { root } => cmd_sync(&ctx, &root),
    }
}

fn cmd_migrate(ctx: &Context) -> Result<(), String> {
    let text = read_document(ctx)?;
    let migration = table::migrate(&text);

    if migration.changed() {
        eprintln!(
            "Added Progress column to {} table(s)",
            migration.tables_migrated
        );
    } else {
        eprintln!("Already migrated");
    }

    persist(ctx, &text, &migration.document)
}

fn cmd_update(
    ctx: &Context,
    status_file: &Path,
    course: Option<&str>,
    matching: &MatchArgs,
) -> Result<(), String> {
    let text = read_document(ctx)?;

    let Some(record) = load_record(status_file)? else {
        return Ok(());
    };

    let course = course.or_else(|| course_key(status_file));
    let matcher = matching.extend(ctx.config.matcher(course, &record.course_name));

    let Some(applied) = apply(&text, &record, &matcher) else {
        return Ok(());
    };

    if applied.tables_migrated > 0 {
        eprintln!(
            "Added Progress column to {} table(s)",
            applied.tables_migrated
        );
    }
    eprintln!("{}", format_outcome(record.course_name.trim(), &applied.outcome));

    persist(ctx, &text, applied.document())
}

fn cmd_sync(ctx: &Context, root: &Path) -> Result<(), String> {
    let original = read_document(ctx)?;
    let files = discover::status_files(root, &ctx.config.status_file, &ctx.config.skip);
    if files.is_empty() {
        warn!(root = %root.display(), "no status files found");
    }

    let mut text = original.clone();
    let mut summary = SyncSummary::default();

    for file in &files {
        let Some(record) = load_record(&file.path)? else {
            summary.skipped += 1;
            continue;
        };

        let matcher = ctx.config.matcher(Some(file.course.as_str()), &record.course_name);
        let Some(applied) = apply(&text, &record, &matcher) else {
            summary.skipped += 1;
            continue;
        };

        summary.tables_migrated += applied.tables_migrated;
        if applied.outcome.is_matched() {
            summary.updated += 1;
        } else {
            summary.unmatched += 1;
        }
        eprintln!(
            "{}: {}",
            file.course,
            format_outcome(record.course_name.trim(), &applied.outcome)
        );
        text = applied.outcome.document;
    }

    eprintln!("{summary}");
    persist(ctx, &original, &text)
}

fn read_document(ctx: &Context) -> Result<String, String> {
    storage::read_document(&ctx.document).map_err(|e| e.to_string())
}

/// Load a status record. Problems with the file are warnings, reported here.
fn load_record(path: &Path) -> Result<Option<StatusRecord>, String> {
    match storage::load_record(path) {
        Ok(record) => {
            debug!(
                path = %path.display(),
                course = %record.course_name,
                last_updated = %record.last_updated,
                "loaded status record"
            );
            Ok(Some(record))
        }
        Err(e) if e.is_fatal() => Err(e.to_string()),
        Err(e) => {
            warn!("{e}");
            eprintln!("Skipped {}: {}", path.display(), describe_record_error(&e));
            Ok(None)
        }
    }
}

fn describe_record_error(err: &StorageError) -> &'static str {
    match err {
        StorageError::MalformedRecord { .. } => "malformed status file",
        _ => "unreadable status file",
    }
}

/// Run the pipeline, reporting a record without a course name as a warning.
fn apply(text: &str, record: &StatusRecord, matcher: &CourseMatcher) -> Option<Applied> {
    match pipeline::apply(text, record, matcher) {
        Ok(applied) => {
            for attempt in &applied.outcome.attempts {
                debug!("{}", format_attempt(attempt));
            }
            match &applied.outcome.matched {
                Some(row) => info!(before = %row.before, after = %row.after, "rewrote row"),
                None => warn!(course = %record.course_name, "no row matched"),
            }
            Some(applied)
        }
        Err(e) => {
            warn!("{e}");
            eprintln!("Skipped record: {e}");
            None
        }
    }
}

/// Write the document if it changed, or print it for `--dry-run`.
fn persist(ctx: &Context, before: &str, after: &str) -> Result<(), String> {
    if ctx.dry_run {
        print!("{after}");
        return Ok(());
    }

    if before == after {
        debug!("document unchanged, not writing");
        return Ok(());
    }

    storage::write_document(&ctx.document, after).map_err(|e| e.to_string())?;
    info!(document = %ctx.document.display(), "wrote document");
    Ok(())
}

/// The course key for a status file: its directory's name.
fn course_key(status_file: &Path) -> Option<&str> {
    status_file.parent()?.file_name()?.to_str()
}
