//! Status command implementation.
//!
//! Classifies every note in the source directory against the sync
//! store and prints a summary. Read-only: no network calls.

use std::path::PathBuf;

use colored::Colorize;

use crate::error::Result;
use crate::sync::{classify_notes, NoteResult, NoteStatus};

/// Execute the status command.
///
/// # Errors
///
/// Fails if the project is not initialized or the store is unreadable.
pub fn execute(db: Option<&PathBuf>, json: bool) -> Result<()> {
    // Status never talks to the remote, so no token is resolved.
    let (config, dir) = super::load_config()?;
    let session = crate::config::build_offline_session(&config, &dir);
    let store = super::open_store(db)?;

    let (_, results, warnings) = classify_notes(&store, &session)?;

    if json {
        let output = serde_json::json!({
            "project": session.project_path,
            "target": session.target_path,
            "results": results,
            "warnings": warnings,
        });
        println!("{}", serde_json::to_string(&output)?);
        return Ok(());
    }

    print_status(&session.target_path, &results, &warnings);
    Ok(())
}

fn count(results: &[NoteResult], wanted: fn(&NoteStatus) -> bool) -> usize {
    results.iter().filter(|r| wanted(&r.status)).count()
}

/// Print classification results in a human-readable format.
fn print_status(target: &str, results: &[NoteResult], warnings: &[String]) {
    println!("{}", "Publish Status".bold().underline());
    println!();

    if results.is_empty() {
        println!("{}", "No notes found in the source directory.".dimmed());
        return;
    }

    for result in results {
        let label = match &result.status {
            NoteStatus::Synced => "synced    ".green(),
            NoteStatus::Changed => "changed   ".yellow(),
            NoteStatus::NotSynced => "not-synced".blue(),
            NoteStatus::Error { .. } => "error     ".red(),
        };
        match &result.status {
            NoteStatus::Error { message } => {
                println!("  {label}  {} ({message})", result.note_path);
            }
            _ => println!("  {label}  {} -> {}", result.note_path, result.remote_path),
        }
    }

    println!();
    let changed = count(results, |s| matches!(s, NoteStatus::Changed));
    let fresh = count(results, |s| matches!(s, NoteStatus::NotSynced));
    let synced = count(results, |s| matches!(s, NoteStatus::Synced));
    let errors = count(results, |s| matches!(s, NoteStatus::Error { .. }));

    println!(
        "  {} synced, {} changed, {} not-synced, {} errors",
        synced, changed, fresh, errors
    );

    for warning in warnings {
        println!("  {} {}", "warning:".yellow().bold(), warning);
    }

    println!();
    if changed + fresh > 0 {
        println!(
            "{}",
            format!("Run 'lp publish' to push {} note(s) to {target}/.", changed + fresh).dimmed()
        );
    } else if errors == 0 {
        println!("{}", "Everything is published.".green());
    }
}
