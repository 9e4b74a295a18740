//! Publish command implementation.
//!
//! Bridges the sync runner onto a tokio runtime (commands are
//! synchronous at the clap layer) and owns the caller-level retry on
//! ref conflicts: the orchestrator itself never retries, so a 409 here
//! restarts the whole six-step sequence from the current branch head.

use std::path::PathBuf;

use colored::Colorize;
use tracing::warn;

use crate::error::{Error, Result};
use crate::github::GithubClient;
use crate::sync::{publish_notes, NoteStatus, PublishReport};

/// Execute the publish command.
///
/// # Errors
///
/// Fails on configuration, store, or API errors. Conflicts are retried
/// up to `retries` times before surfacing.
pub fn execute(
    message: &str,
    retries: u32,
    dry_run: bool,
    db: Option<&PathBuf>,
    token_env: Option<&str>,
    json: bool,
) -> Result<()> {
    let session = super::load_session(token_env)?;
    let store = super::open_store(db)?;
    let client = GithubClient::new(&session.owner, &session.repo, &session.token)?;

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| Error::Other(format!("Failed to create async runtime: {e}")))?;

    let report = rt.block_on(async {
        let mut attempt = 0;
        loop {
            match publish_notes(&client, &store, &session, message, dry_run).await {
                Err(Error::Conflict) if attempt < retries => {
                    attempt += 1;
                    warn!(attempt, "branch advanced concurrently, restarting publish");
                }
                other => break other,
            }
        }
    })?;

    if json {
        println!("{}", serde_json::to_string(&report)?);
        return Ok(());
    }

    print_report(&report, dry_run);
    Ok(())
}

fn print_report(report: &PublishReport, dry_run: bool) {
    if dry_run {
        println!("{}", "Dry run - nothing was committed.".yellow().bold());
    }

    match (&report.commit_sha, dry_run) {
        (Some(sha), _) => {
            println!(
                "Published {} note(s) in commit {}",
                report.synced,
                sha.get(..12).unwrap_or(sha).bold()
            );
        }
        (None, true) => {
            println!("Would publish {} note(s).", report.synced);
        }
        (None, false) => {
            println!("{}", "Nothing to publish.".green());
        }
    }

    let changed = report.count(&NoteStatus::Changed);
    let fresh = report.count(&NoteStatus::NotSynced);
    if changed + fresh > 0 {
        println!("  {changed} changed, {fresh} new");
    }

    if report.failed > 0 {
        println!(
            "  {} {} note(s) could not be read",
            "failed:".red().bold(),
            report.failed
        );
    }
    for warning in &report.warnings {
        println!("  {} {}", "warning:".yellow().bold(), warning);
    }
}
