//! Local note collection.
//!
//! Walks the configured source directory and turns each file into a
//! publish candidate: markdown notes get a slug-derived remote path
//! directly under the target subtree, attachments keep their relative
//! path. Unreadable files become per-note errors instead of aborting
//! the walk; the caller decides how to report them.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::error::Result;
use crate::github::types::FileContent;
use crate::sync::status::content_hash;

/// A file eligible for publishing.
#[derive(Debug, Clone)]
pub struct LocalNote {
    /// Absolute path on disk.
    pub local_path: PathBuf,
    /// Source-relative path, the sync-record key.
    pub note_path: String,
    /// Slug the remote path is derived from.
    pub slug: String,
    /// Repository-relative destination path.
    pub remote_path: String,
    /// Content, typed for the blob encoder.
    pub content: FileContent,
    /// SHA-256 of the raw bytes.
    pub content_hash: String,
}

/// A file that could not be read or decoded.
#[derive(Debug, Clone)]
pub struct NoteError {
    /// Source-relative path.
    pub note_path: String,
    /// Failure description.
    pub message: String,
}

/// Derive a URL slug from a file stem.
///
/// Lowercases, maps whitespace and underscores to hyphens, drops
/// everything else non-alphanumeric, and collapses hyphen runs.
#[must_use]
pub fn slugify(stem: &str) -> String {
    let mut slug = String::with_capacity(stem.len());
    let mut last_hyphen = true;
    for ch in stem.chars() {
        if ch.is_alphanumeric() {
            slug.extend(ch.to_lowercase());
            last_hyphen = false;
        } else if (ch.is_whitespace() || ch == '-' || ch == '_') && !last_hyphen {
            slug.push('-');
            last_hyphen = true;
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

/// Collect every publishable file under `source_dir`.
///
/// Markdown files map to `{target}/{slug}.md`; everything else keeps
/// its source-relative path under the target. Hidden files and
/// directories (dot-prefixed) are skipped. Files that fail to read
/// are returned separately as [`NoteError`]s.
///
/// # Errors
///
/// Returns an error only if the source directory itself cannot be
/// listed; per-file failures land in the second tuple element.
pub fn collect_notes(source_dir: &Path, target: &str) -> Result<(Vec<LocalNote>, Vec<NoteError>)> {
    let mut notes = Vec::new();
    let mut errors = Vec::new();
    walk(source_dir, source_dir, target, &mut notes, &mut errors)?;
    // Stable order keeps commit trees and reports deterministic.
    notes.sort_by(|a, b| a.note_path.cmp(&b.note_path));
    Ok((notes, errors))
}

fn walk(
    root: &Path,
    dir: &Path,
    target: &str,
    notes: &mut Vec<LocalNote>,
    errors: &mut Vec<NoteError>,
) -> Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if name.starts_with('.') {
            continue;
        }

        if path.is_dir() {
            walk(root, &path, target, notes, errors)?;
            continue;
        }

        let note_path = relative_path(root, &path);
        match read_note(&path, &note_path, target) {
            Ok(note) => notes.push(note),
            Err(message) => {
                warn!(note = note_path, "skipping unreadable note: {message}");
                errors.push(NoteError { note_path, message });
            }
        }
    }
    Ok(())
}

fn relative_path(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

fn read_note(path: &Path, note_path: &str, target: &str) -> std::result::Result<LocalNote, String> {
    let bytes = fs::read(path).map_err(|e| e.to_string())?;
    let hash = content_hash(&bytes);

    let is_markdown = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("md"));

    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .ok_or_else(|| "file has no name".to_string())?;

    let (slug, remote_path) = if is_markdown {
        let slug = slugify(&stem);
        if slug.is_empty() {
            return Err(format!("'{stem}' produces an empty slug"));
        }
        let remote = format!("{target}/{slug}.md");
        (slug, remote)
    } else {
        // Attachments keep their relative layout under the target.
        (slugify(&stem), format!("{target}/{note_path}"))
    };

    let content = match String::from_utf8(bytes) {
        Ok(text) => FileContent::Text(text),
        Err(err) => FileContent::Binary(err.into_bytes()),
    };

    Ok(LocalNote {
        local_path: path.to_path_buf(),
        note_path: note_path.to_string(),
        slug,
        remote_path,
        content,
        content_hash: hash,
    })
}
