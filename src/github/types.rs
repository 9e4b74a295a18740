//! Wire types for the GitHub Git Data API.
//!
//! These mirror the JSON request/response shapes of the low-level
//! blob/tree/commit/ref endpoints. Only the fields we consume are
//! deserialized; everything else is ignored.

use serde::{Deserialize, Serialize};

/// Git mode string for a regular (non-executable) file.
pub const MODE_FILE: &str = "100644";

/// Object type of a tree entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    /// File content object.
    Blob,
    /// Directory listing object.
    Tree,
    /// Submodule pointer.
    Commit,
}

/// One entry of a git tree: `{path, mode, type, sha}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeEntry {
    /// Repository-relative path, `/`-separated.
    pub path: String,
    /// Mode string, e.g. `100644` for a regular file.
    pub mode: String,
    /// Object type.
    #[serde(rename = "type")]
    pub kind: ObjectKind,
    /// Content-addressed object id.
    pub sha: String,
}

impl TreeEntry {
    /// Build a regular-file blob entry.
    #[must_use]
    pub fn blob(path: impl Into<String>, sha: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            mode: MODE_FILE.to_string(),
            kind: ObjectKind::Blob,
            sha: sha.into(),
        }
    }
}

/// Content handed to blob creation: the encoder picks the wire encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileContent {
    /// UTF-8 text, sent verbatim with encoding `utf-8`.
    Text(String),
    /// Raw bytes, base64-encoded on the wire.
    Binary(Vec<u8>),
}

impl FileContent {
    /// Byte length of the underlying content.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Text(s) => s.len(),
            Self::Binary(b) => b.len(),
        }
    }

    /// Returns true for zero-length content.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One file of a publish batch: remote path plus content.
#[derive(Debug, Clone)]
pub struct PublishFile {
    /// Repository-relative destination path.
    pub path: String,
    /// File content.
    pub content: FileContent,
}

// ── Response shapes ───────────────────────────────────────────

/// `GET /git/ref/heads/{branch}` response; we use `object.sha`.
#[derive(Debug, Deserialize)]
pub struct RefResponse {
    pub object: RefObject,
}

/// Target object of a ref.
#[derive(Debug, Deserialize)]
pub struct RefObject {
    pub sha: String,
}

/// `GET /git/commits/{sha}` response; we use `tree.sha`.
#[derive(Debug, Deserialize)]
pub struct CommitResponse {
    pub tree: TreeRef,
}

/// Tree pointer inside a commit.
#[derive(Debug, Deserialize)]
pub struct TreeRef {
    pub sha: String,
}

/// Response carrying only a new object id (`POST /git/blobs`, etc.).
#[derive(Debug, Deserialize)]
pub struct ShaResponse {
    pub sha: String,
}

/// `GET /git/trees/{sha}?recursive=1` response.
///
/// The API caps recursive listings; `truncated` flags an incomplete
/// listing, which we refuse to build on (a partial base would silently
/// drop preserved files).
#[derive(Debug, Deserialize)]
pub struct TreeResponse {
    pub tree: Vec<TreeEntry>,
    #[serde(default)]
    pub truncated: bool,
}

// ── Request shapes ────────────────────────────────────────────

/// `POST /git/blobs` body.
#[derive(Debug, Serialize)]
pub struct CreateBlobRequest<'a> {
    pub content: &'a str,
    /// `utf-8` or `base64`.
    pub encoding: &'a str,
}

/// `POST /git/trees` body. No `base_tree`: the entry list is the
/// complete replacement tree.
#[derive(Debug, Serialize)]
pub struct CreateTreeRequest<'a> {
    pub tree: &'a [TreeEntry],
}

/// `POST /git/commits` body. Exactly one parent: linear history.
#[derive(Debug, Serialize)]
pub struct CreateCommitRequest<'a> {
    pub message: &'a str,
    pub tree: &'a str,
    pub parents: &'a [&'a str],
}

/// `PATCH /git/refs/heads/{branch}` body.
#[derive(Debug, Serialize)]
pub struct UpdateRefRequest<'a> {
    pub sha: &'a str,
}
