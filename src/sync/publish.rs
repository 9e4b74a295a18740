//! Batch publish runner.
//!
//! Gathers the source directory, classifies every note against the
//! sync store, hands the complete desired file set to the commit
//! orchestrator, and persists the new baseline on success. Per-note
//! read failures are aggregated into the report instead of aborting
//! the batch; failures inside the atomic commit sequence abort the
//! whole run, by design.

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info};

use crate::config::SyncSession;
use crate::error::Result;
use crate::github::{publish_tree, GitRemote, PublishFile, TreePublish};
use crate::storage::{SyncRecord, SyncStore};
use crate::sync::notes::{collect_notes, LocalNote};
use crate::sync::status::{classify, NoteStatus};

/// Classification of one note at publish/status time.
#[derive(Debug, Clone, Serialize)]
pub struct NoteResult {
    /// Source-relative note path.
    pub note_path: String,
    /// Slug / destination identity.
    pub slug: String,
    /// Repository-relative destination path.
    pub remote_path: String,
    /// Status relative to the last sync record.
    #[serde(flatten)]
    pub status: NoteStatus,
}

/// Outcome of one publish (or status/dry-run) pass.
#[derive(Debug, Default, Serialize)]
pub struct PublishReport {
    /// Notes included in the publish (or publishable, for dry runs).
    pub synced: usize,
    /// Notes excluded because they could not be read.
    pub failed: usize,
    /// SHA of the created commit; `None` for dry runs and no-op runs.
    pub commit_sha: Option<String>,
    /// Per-note classifications.
    pub results: Vec<NoteResult>,
    /// Human-readable warnings (unreadable notes, implied deletions).
    pub warnings: Vec<String>,
}

impl PublishReport {
    /// Count of notes with the given pre-publish status.
    #[must_use]
    pub fn count(&self, wanted: &NoteStatus) -> usize {
        self.results
            .iter()
            .filter(|r| {
                std::mem::discriminant(&r.status) == std::mem::discriminant(wanted)
            })
            .count()
    }
}

/// Classify every note under the session's source directory.
///
/// Shared by `lp status` (read-only) and `lp publish` (pre-commit
/// pass). Returns the readable notes alongside their classifications
/// and warnings for the unreadable ones.
///
/// # Errors
///
/// Returns an error if the source directory cannot be walked or the
/// store cannot be queried.
pub fn classify_notes(
    store: &SyncStore,
    session: &SyncSession,
) -> Result<(Vec<LocalNote>, Vec<NoteResult>, Vec<String>)> {
    let (notes, note_errors) = collect_notes(&session.source_dir, &session.target_path)?;

    let mut results = Vec::with_capacity(notes.len() + note_errors.len());
    for note in &notes {
        let record = store.get(&session.project_path, &note.note_path)?;
        results.push(NoteResult {
            note_path: note.note_path.clone(),
            slug: note.slug.clone(),
            remote_path: note.remote_path.clone(),
            status: classify(&note.content_hash, &note.slug, record.as_ref()),
        });
    }

    let mut warnings = Vec::new();
    for err in note_errors {
        warnings.push(format!(
            "'{}' could not be read ({}); it is excluded from this publish \
             and any previously published copy will be removed",
            err.note_path, err.message
        ));
        results.push(NoteResult {
            note_path: err.note_path.clone(),
            slug: String::new(),
            remote_path: String::new(),
            status: NoteStatus::Error {
                message: err.message,
            },
        });
    }

    Ok((notes, results, warnings))
}

/// Run a full publish pass for the session.
///
/// The entire readable note set (changed or not) is handed to the
/// orchestrator, because the subtree is replaced wholesale and any
/// omitted file would be deleted remotely. If nothing changed and no
/// stale records exist, the commit is skipped entirely.
///
/// # Errors
///
/// Propagates store and orchestrator errors; a [`Error::Conflict`]
/// from the final ref update means the caller should re-run the whole
/// pass.
///
/// [`Error::Conflict`]: crate::error::Error::Conflict
pub async fn publish_notes<R: GitRemote>(
    remote: &R,
    store: &SyncStore,
    session: &SyncSession,
    message: &str,
    dry_run: bool,
) -> Result<PublishReport> {
    let (notes, results, mut warnings) = classify_notes(store, session)?;

    // Records whose notes left the source set: their remote copies
    // disappear by omission, and their records go after the commit.
    // Unreadable notes land here too, but they already carry a
    // classify-time warning, so they don't get a second one.
    let current_paths: std::collections::HashSet<&str> =
        notes.iter().map(|n| n.note_path.as_str()).collect();
    let error_paths: std::collections::HashSet<&str> = results
        .iter()
        .filter(|r| matches!(r.status, NoteStatus::Error { .. }))
        .map(|r| r.note_path.as_str())
        .collect();
    let stale_records: Vec<SyncRecord> = store
        .list(&session.project_path)?
        .into_iter()
        .filter(|r| !current_paths.contains(r.note_path.as_str()))
        .collect();
    for stale in &stale_records {
        if !error_paths.contains(stale.note_path.as_str()) {
            warnings.push(format!(
                "'{}' no longer exists locally; its published copy will be removed",
                stale.note_path
            ));
        }
    }

    let pending = results
        .iter()
        .any(|r| matches!(r.status, NoteStatus::Changed | NoteStatus::NotSynced));
    let failed = results
        .iter()
        .filter(|r| matches!(r.status, NoteStatus::Error { .. }))
        .count();

    if !pending && stale_records.is_empty() {
        info!("nothing to publish");
        return Ok(PublishReport {
            synced: 0,
            failed,
            commit_sha: None,
            results,
            warnings,
        });
    }

    if dry_run {
        debug!(notes = notes.len(), "dry run, skipping commit");
        return Ok(PublishReport {
            synced: notes.len(),
            failed,
            commit_sha: None,
            results,
            warnings,
        });
    }

    let files: Vec<PublishFile> = notes
        .iter()
        .map(|n| PublishFile {
            path: n.remote_path.clone(),
            content: n.content.clone(),
        })
        .collect();

    let outcome = publish_tree(
        remote,
        &TreePublish {
            branch: &session.branch,
            prefix: &session.target_path,
            message,
            files: &files,
        },
    )
    .await?;

    // New baseline: only written after the ref actually advanced.
    let now = Utc::now().to_rfc3339();
    for note in &notes {
        store.upsert(
            &session.project_path,
            &SyncRecord {
                note_path: note.note_path.clone(),
                slug: note.slug.clone(),
                remote_sha: outcome.blob_shas[&note.remote_path].clone(),
                content_hash: note.content_hash.clone(),
                last_sync: now.clone(),
            },
        )?;
    }
    for stale in &stale_records {
        store.delete(&session.project_path, &stale.note_path)?;
    }

    Ok(PublishReport {
        synced: notes.len(),
        failed,
        commit_sha: Some(outcome.commit_sha),
        results,
        warnings,
    })
}
