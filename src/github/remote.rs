//! Git Data API trait seam.
//!
//! The commit orchestrator talks to the remote exclusively through
//! this trait, so tests can drive it against an in-memory fake with
//! scripted failures. Implemented for real by [`GithubClient`].
//!
//! [`GithubClient`]: crate::github::client::GithubClient

use crate::error::Result;
use crate::github::types::{FileContent, TreeEntry};

/// The seven Git Data operations the publish protocol needs.
///
/// All methods are read-only or create fresh content-addressed
/// objects, except [`GitRemote::advance_ref`], which is the single
/// shared-state mutation.
pub trait GitRemote: Send + Sync {
    /// Resolve a branch name to its head commit SHA.
    fn branch_head(&self, branch: &str) -> impl std::future::Future<Output = Result<String>> + Send;

    /// Resolve a commit SHA to its tree SHA.
    fn commit_tree(
        &self,
        commit_sha: &str,
    ) -> impl std::future::Future<Output = Result<String>> + Send;

    /// Create a blob, returning its SHA.
    fn create_blob(
        &self,
        content: &FileContent,
    ) -> impl std::future::Future<Output = Result<String>> + Send;

    /// Full recursive listing of a tree.
    fn tree_entries(
        &self,
        tree_sha: &str,
    ) -> impl std::future::Future<Output = Result<Vec<TreeEntry>>> + Send;

    /// Create a tree from a flat entry list, returning its SHA.
    fn create_tree(
        &self,
        entries: &[TreeEntry],
    ) -> impl std::future::Future<Output = Result<String>> + Send;

    /// Create a commit with exactly one parent, returning its SHA.
    fn create_commit(
        &self,
        message: &str,
        tree_sha: &str,
        parent_sha: &str,
    ) -> impl std::future::Future<Output = Result<String>> + Send;

    /// Point the branch ref at a new commit.
    fn advance_ref(
        &self,
        branch: &str,
        commit_sha: &str,
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}
