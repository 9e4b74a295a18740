//! SQLite-backed sync-record store.
//!
//! One global database holds the publish baseline for every project,
//! scoped by project path. A record is written only after a successful
//! publish and deleted when its note leaves the source set; between
//! runs it is what lets the status resolver classify notes without
//! querying the remote.

use std::path::Path;
use std::time::Duration;

use rusqlite::{Connection, OptionalExtension};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Schema for the sync-record table.
///
/// Timestamps are RFC 3339 strings; SHAs and hashes are lowercase hex.
const SCHEMA_SQL: &str = "
CREATE TABLE IF NOT EXISTS sync_records (
    project_path TEXT NOT NULL,
    note_path    TEXT NOT NULL,
    slug         TEXT NOT NULL,
    remote_sha   TEXT NOT NULL,
    content_hash TEXT NOT NULL,
    last_sync    TEXT NOT NULL,
    PRIMARY KEY (project_path, note_path)
);

CREATE INDEX IF NOT EXISTS idx_sync_records_project
    ON sync_records(project_path);
";

/// Per-note publish baseline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncRecord {
    /// Source-relative note path, the lookup key within a project.
    pub note_path: String,
    /// Slug the note was last published under. A slug change forces a
    /// re-publish even when the content hash matches, because the
    /// remote path depends on it.
    pub slug: String,
    /// Blob SHA of the note content on the remote.
    pub remote_sha: String,
    /// SHA-256 of the note bytes at publish time.
    pub content_hash: String,
    /// RFC 3339 timestamp of the last successful publish.
    pub last_sync: String,
}

/// SQLite store of [`SyncRecord`]s.
#[derive(Debug)]
pub struct SyncStore {
    conn: Connection,
}

impl SyncStore {
    /// Open (creating if needed) the store at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or the schema
    /// cannot be applied.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.busy_timeout(Duration::from_secs(5))?;
        conn.execute_batch(SCHEMA_SQL)?;
        Ok(Self { conn })
    }

    /// Fetch the record for one note, if any.
    ///
    /// # Errors
    ///
    /// Returns an error on query failure.
    pub fn get(&self, project_path: &str, note_path: &str) -> Result<Option<SyncRecord>> {
        let record = self
            .conn
            .query_row(
                "SELECT note_path, slug, remote_sha, content_hash, last_sync
                 FROM sync_records
                 WHERE project_path = ?1 AND note_path = ?2",
                (project_path, note_path),
                |row| {
                    Ok(SyncRecord {
                        note_path: row.get(0)?,
                        slug: row.get(1)?,
                        remote_sha: row.get(2)?,
                        content_hash: row.get(3)?,
                        last_sync: row.get(4)?,
                    })
                },
            )
            .optional()?;
        Ok(record)
    }

    /// Insert or replace the record for one note.
    ///
    /// # Errors
    ///
    /// Returns an error on write failure.
    pub fn upsert(&self, project_path: &str, record: &SyncRecord) -> Result<()> {
        self.conn.execute(
            "INSERT INTO sync_records
                (project_path, note_path, slug, remote_sha, content_hash, last_sync)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(project_path, note_path) DO UPDATE SET
                slug = excluded.slug,
                remote_sha = excluded.remote_sha,
                content_hash = excluded.content_hash,
                last_sync = excluded.last_sync",
            (
                project_path,
                &record.note_path,
                &record.slug,
                &record.remote_sha,
                &record.content_hash,
                &record.last_sync,
            ),
        )?;
        Ok(())
    }

    /// Delete the record for one note. No-op if absent.
    ///
    /// # Errors
    ///
    /// Returns an error on write failure.
    pub fn delete(&self, project_path: &str, note_path: &str) -> Result<()> {
        self.conn.execute(
            "DELETE FROM sync_records WHERE project_path = ?1 AND note_path = ?2",
            (project_path, note_path),
        )?;
        Ok(())
    }

    /// All records for a project, ordered by note path.
    ///
    /// # Errors
    ///
    /// Returns an error on query failure.
    pub fn list(&self, project_path: &str) -> Result<Vec<SyncRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT note_path, slug, remote_sha, content_hash, last_sync
             FROM sync_records
             WHERE project_path = ?1
             ORDER BY note_path",
        )?;
        let rows = stmt.query_map([project_path], |row| {
            Ok(SyncRecord {
                note_path: row.get(0)?,
                slug: row.get(1)?,
                remote_sha: row.get(2)?,
                content_hash: row.get(3)?,
                last_sync: row.get(4)?,
            })
        })?;
        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn record(note_path: &str, hash: &str) -> SyncRecord {
        SyncRecord {
            note_path: note_path.to_string(),
            slug: "a-note".to_string(),
            remote_sha: "blob1".to_string(),
            content_hash: hash.to_string(),
            last_sync: "2026-01-15T10:00:00Z".to_string(),
        }
    }

    fn open_store(dir: &TempDir) -> SyncStore {
        SyncStore::open(&dir.path().join("test.db")).unwrap()
    }

    #[test]
    fn test_get_missing_returns_none() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir);
        assert!(store.get("/p", "notes/a.md").unwrap().is_none());
    }

    #[test]
    fn test_upsert_then_get() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir);
        let rec = record("notes/a.md", "h1");
        store.upsert("/p", &rec).unwrap();
        assert_eq!(store.get("/p", "notes/a.md").unwrap().unwrap(), rec);
    }

    #[test]
    fn test_upsert_replaces_existing() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir);
        store.upsert("/p", &record("notes/a.md", "h1")).unwrap();
        store.upsert("/p", &record("notes/a.md", "h2")).unwrap();
        let fetched = store.get("/p", "notes/a.md").unwrap().unwrap();
        assert_eq!(fetched.content_hash, "h2");
        assert_eq!(store.list("/p").unwrap().len(), 1);
    }

    #[test]
    fn test_records_are_project_scoped() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir);
        store.upsert("/p1", &record("notes/a.md", "h1")).unwrap();
        assert!(store.get("/p2", "notes/a.md").unwrap().is_none());
        assert_eq!(store.list("/p1").unwrap().len(), 1);
        assert!(store.list("/p2").unwrap().is_empty());
    }

    #[test]
    fn test_delete_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir);
        store.upsert("/p", &record("notes/a.md", "h1")).unwrap();
        store.delete("/p", "notes/a.md").unwrap();
        store.delete("/p", "notes/a.md").unwrap();
        assert!(store.get("/p", "notes/a.md").unwrap().is_none());
    }

    #[test]
    fn test_list_ordered_by_note_path() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir);
        store.upsert("/p", &record("notes/b.md", "h")).unwrap();
        store.upsert("/p", &record("notes/a.md", "h")).unwrap();
        let paths: Vec<String> = store
            .list("/p")
            .unwrap()
            .into_iter()
            .map(|r| r.note_path)
            .collect();
        assert_eq!(paths, vec!["notes/a.md", "notes/b.md"]);
    }
}
