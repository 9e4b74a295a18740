//! Sync status classification.
//!
//! Compares a note's current content hash and slug against its last
//! recorded publish baseline. The remote is never queried here; the
//! local record is the source of truth for "what did we last push".

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::storage::SyncRecord;

/// Publish status of one note relative to its sync record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum NoteStatus {
    /// Hash and slug both match the record; nothing to do.
    Synced,
    /// Content changed, or the slug changed (a rename moves the remote
    /// path, so it forces a re-publish even with identical content).
    Changed,
    /// No prior record; never published.
    NotSynced,
    /// Reading or hashing the note failed.
    Error {
        /// Human-readable failure description.
        message: String,
    },
}

impl std::fmt::Display for NoteStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Synced => write!(f, "synced"),
            Self::Changed => write!(f, "changed"),
            Self::NotSynced => write!(f, "not-synced"),
            Self::Error { message } => write!(f, "error: {message}"),
        }
    }
}

/// SHA-256 of raw note bytes, as lowercase hex.
#[must_use]
pub fn content_hash(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// Classify a note against its last sync record.
#[must_use]
pub fn classify(current_hash: &str, slug: &str, record: Option<&SyncRecord>) -> NoteStatus {
    match record {
        None => NoteStatus::NotSynced,
        Some(rec) if rec.content_hash == current_hash && rec.slug == slug => NoteStatus::Synced,
        Some(_) => NoteStatus::Changed,
    }
}
