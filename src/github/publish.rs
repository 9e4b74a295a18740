//! The atomic publish protocol.
//!
//! Six strictly sequential steps: resolve branch, resolve tree, create
//! blobs, build the replacement tree, create the commit, advance the
//! ref. Steps 1-5 only read or create fresh content-addressed objects,
//! so nothing observable changes until the final ref update. Observers
//! of the branch see either the old tree or the new one, never an
//! intermediate state.
//!
//! There is no retry and no rollback here. A failure in steps 1-5
//! leaves the remote exactly as it was; a conflict in step 6 leaves
//! the branch untouched (the staged objects become unreachable
//! garbage) and the caller restarts from step 1.

use std::collections::BTreeMap;

use tracing::{debug, info};

use crate::error::Result;
use crate::github::remote::GitRemote;
use crate::github::tree::{ensure_unique_paths, replace_subtree};
use crate::github::types::{PublishFile, TreeEntry};

/// One atomic publish: replace the `prefix` subtree of `branch` with
/// `files`, preserving everything outside the prefix.
#[derive(Debug)]
pub struct TreePublish<'a> {
    /// Branch to advance.
    pub branch: &'a str,
    /// Target subtree; entries under it are replaced by `files`.
    pub prefix: &'a str,
    /// Commit message.
    pub message: &'a str,
    /// Complete desired content of the subtree. Anything currently
    /// under the prefix and absent here is deleted by omission.
    pub files: &'a [PublishFile],
}

/// Result of a successful publish.
#[derive(Debug)]
pub struct PublishOutcome {
    /// SHA of the commit the branch now points at.
    pub commit_sha: String,
    /// SHA of the new root tree.
    pub tree_sha: String,
    /// Blob SHA per published path; persisted into sync records.
    pub blob_shas: BTreeMap<String, String>,
}

/// Run the six-step publish sequence against `remote`.
///
/// Duplicate destination paths are rejected up front, before any
/// network call.
///
/// # Errors
///
/// Propagates the first failing step unchanged: [`Error::NotFound`]
/// for a missing branch, [`Error::Conflict`] for a concurrent ref
/// update in the final step, or any other typed API error. On error
/// the branch ref is guaranteed to still point at its prior commit.
///
/// [`Error::NotFound`]: crate::error::Error::NotFound
/// [`Error::Conflict`]: crate::error::Error::Conflict
pub async fn publish_tree<R: GitRemote>(
    remote: &R,
    publish: &TreePublish<'_>,
) -> Result<PublishOutcome> {
    ensure_unique_paths(publish.files.iter().map(|f| f.path.as_str()))?;

    // 1. ResolveBranch
    let parent_sha = remote.branch_head(publish.branch).await?;
    debug!(branch = publish.branch, parent = %parent_sha, "resolved branch head");

    // 2. ResolveTree
    let base_tree_sha = remote.commit_tree(&parent_sha).await?;

    // 3. CreateBlobs, sequentially
    let mut blob_shas = BTreeMap::new();
    for file in publish.files {
        let sha = remote.create_blob(&file.content).await?;
        debug!(path = file.path, sha = %sha, "created blob");
        blob_shas.insert(file.path.clone(), sha);
    }

    // 4. BuildTree scoped to the target prefix
    let base_entries = remote.tree_entries(&base_tree_sha).await?;
    let new_items: Vec<TreeEntry> = publish
        .files
        .iter()
        .map(|f| TreeEntry::blob(f.path.clone(), blob_shas[&f.path].clone()))
        .collect();
    let entries = replace_subtree(&base_entries, new_items, Some(publish.prefix))?;
    let tree_sha = remote.create_tree(&entries).await?;

    // 5. CreateCommit, single parent
    let commit_sha = remote
        .create_commit(publish.message, &tree_sha, &parent_sha)
        .await?;

    // 6. AdvanceRef: the only mutation of shared state
    remote.advance_ref(publish.branch, &commit_sha).await?;

    info!(
        branch = publish.branch,
        commit = %commit_sha,
        files = publish.files.len(),
        "published"
    );

    Ok(PublishOutcome {
        commit_sha,
        tree_sha,
        blob_shas,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::github::types::{FileContent, ObjectKind};
    use sha2::{Digest, Sha256};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// In-memory Git remote with content-addressed blobs/trees and
    /// scripted failures.
    #[derive(Default)]
    struct FakeRemote {
        state: Mutex<FakeState>,
        /// Number of upcoming `advance_ref` calls that fail with Conflict.
        conflicts_remaining: AtomicUsize,
        /// Whether blob creation fails (simulated network error).
        fail_blobs: std::sync::atomic::AtomicBool,
        /// Total API calls observed.
        calls: AtomicUsize,
    }

    #[derive(Default)]
    struct FakeState {
        refs: HashMap<String, String>,
        commits: HashMap<String, String>, // commit sha -> tree sha
        trees: HashMap<String, Vec<TreeEntry>>,
        commit_counter: u64,
    }

    fn content_sha(label: &str, payload: &[u8]) -> String {
        let mut hasher = Sha256::new();
        hasher.update(label.as_bytes());
        hasher.update(payload);
        format!("{:x}", hasher.finalize())
    }

    impl FakeRemote {
        /// Seed a branch whose head commit holds `entries`.
        fn seeded(branch: &str, entries: Vec<TreeEntry>) -> Self {
            let remote = Self::default();
            {
                let mut state = remote.state.lock().unwrap();
                let tree_sha = "base-tree".to_string();
                state.trees.insert(tree_sha.clone(), entries);
                state.commits.insert("c0".to_string(), tree_sha);
                state.refs.insert(branch.to_string(), "c0".to_string());
            }
            remote
        }

        fn head(&self, branch: &str) -> String {
            self.state.lock().unwrap().refs[branch].clone()
        }

        fn tree_of_head(&self, branch: &str) -> Vec<TreeEntry> {
            let state = self.state.lock().unwrap();
            let commit = &state.refs[branch];
            let tree = &state.commits[commit];
            state.trees[tree].clone()
        }
    }

    impl GitRemote for FakeRemote {
        async fn branch_head(&self, branch: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.state
                .lock()
                .unwrap()
                .refs
                .get(branch)
                .cloned()
                .ok_or_else(|| Error::NotFound {
                    path: format!("git/ref/heads/{branch}"),
                })
        }

        async fn commit_tree(&self, commit_sha: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.state
                .lock()
                .unwrap()
                .commits
                .get(commit_sha)
                .cloned()
                .ok_or_else(|| Error::NotFound {
                    path: format!("git/commits/{commit_sha}"),
                })
        }

        async fn create_blob(&self, content: &FileContent) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_blobs.load(Ordering::SeqCst) {
                return Err(Error::Api {
                    status: 500,
                    body: "blob store unavailable".into(),
                });
            }
            let payload = match content {
                FileContent::Text(s) => s.as_bytes().to_vec(),
                FileContent::Binary(b) => b.clone(),
            };
            Ok(content_sha("blob", &payload))
        }

        async fn tree_entries(&self, tree_sha: &str) -> Result<Vec<TreeEntry>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.state
                .lock()
                .unwrap()
                .trees
                .get(tree_sha)
                .cloned()
                .ok_or_else(|| Error::NotFound {
                    path: format!("git/trees/{tree_sha}"),
                })
        }

        async fn create_tree(&self, entries: &[TreeEntry]) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let fingerprint = serde_json::to_vec(entries).unwrap();
            let sha = content_sha("tree", &fingerprint);
            self.state
                .lock()
                .unwrap()
                .trees
                .insert(sha.clone(), entries.to_vec());
            Ok(sha)
        }

        async fn create_commit(
            &self,
            _message: &str,
            tree_sha: &str,
            _parent_sha: &str,
        ) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut state = self.state.lock().unwrap();
            state.commit_counter += 1;
            // Commit objects carry timestamps in real git, so two
            // identical publishes still yield distinct commit SHAs.
            let sha = format!("c{}", state.commit_counter);
            state.commits.insert(sha.clone(), tree_sha.to_string());
            Ok(sha)
        }

        async fn advance_ref(&self, branch: &str, commit_sha: &str) -> Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self
                .conflicts_remaining
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok()
            {
                return Err(Error::Conflict);
            }
            self.state
                .lock()
                .unwrap()
                .refs
                .insert(branch.to_string(), commit_sha.to_string());
            Ok(())
        }
    }

    fn text_file(path: &str, content: &str) -> PublishFile {
        PublishFile {
            path: path.to_string(),
            content: FileContent::Text(content.to_string()),
        }
    }

    fn base_entries() -> Vec<TreeEntry> {
        vec![
            TreeEntry::blob("other/file.md", "a1"),
            TreeEntry::blob("blog/old.md", "a2"),
        ]
    }

    #[tokio::test]
    async fn test_publish_replaces_subtree_and_advances_ref() {
        let remote = FakeRemote::seeded("main", base_entries());
        let files = [text_file("blog/new.md", "# New post")];
        let outcome = publish_tree(
            &remote,
            &TreePublish {
                branch: "main",
                prefix: "blog",
                message: "publish notes",
                files: &files,
            },
        )
        .await
        .unwrap();

        assert_eq!(remote.head("main"), outcome.commit_sha);
        let paths: Vec<String> = remote
            .tree_of_head("main")
            .iter()
            .map(|e| e.path.clone())
            .collect();
        assert_eq!(paths, vec!["other/file.md", "blog/new.md"]);
        assert!(outcome.blob_shas.contains_key("blog/new.md"));
    }

    #[tokio::test]
    async fn test_missing_branch_propagates_not_found() {
        let remote = FakeRemote::seeded("main", vec![]);
        let files = [text_file("blog/a.md", "x")];
        let err = publish_tree(
            &remote,
            &TreePublish {
                branch: "gone",
                prefix: "blog",
                message: "m",
                files: &files,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_blob_failure_leaves_remote_unchanged() {
        let remote = FakeRemote::seeded("main", base_entries());
        remote.fail_blobs.store(true, Ordering::SeqCst);
        let files = [text_file("blog/new.md", "x")];
        let err = publish_tree(
            &remote,
            &TreePublish {
                branch: "main",
                prefix: "blog",
                message: "m",
                files: &files,
            },
        )
        .await
        .unwrap_err();

        assert!(matches!(err, Error::Api { status: 500, .. }));
        assert_eq!(remote.head("main"), "c0");
        let paths: Vec<String> = remote
            .tree_of_head("main")
            .iter()
            .map(|e| e.path.clone())
            .collect();
        assert_eq!(paths, vec!["other/file.md", "blog/old.md"]);
    }

    #[tokio::test]
    async fn test_conflict_keeps_prior_head_and_retry_succeeds() {
        let remote = FakeRemote::seeded("main", base_entries());
        remote.conflicts_remaining.store(1, Ordering::SeqCst);
        let files = [text_file("blog/new.md", "x")];
        let publish = TreePublish {
            branch: "main",
            prefix: "blog",
            message: "m",
            files: &files,
        };

        let err = publish_tree(&remote, &publish).await.unwrap_err();
        assert!(matches!(err, Error::Conflict));
        // Blobs/tree/commit were staged, but the branch is untouched.
        assert_eq!(remote.head("main"), "c0");

        // A full re-run from step 1 succeeds and yields the expected tree.
        let outcome = publish_tree(&remote, &publish).await.unwrap();
        assert_eq!(remote.head("main"), outcome.commit_sha);
        let paths: Vec<String> = remote
            .tree_of_head("main")
            .iter()
            .map(|e| e.path.clone())
            .collect();
        assert_eq!(paths, vec!["other/file.md", "blog/new.md"]);
    }

    #[tokio::test]
    async fn test_idempotent_at_content_level_not_commit_level() {
        let remote = FakeRemote::seeded("main", base_entries());
        let files = [text_file("blog/new.md", "same content")];
        let publish = TreePublish {
            branch: "main",
            prefix: "blog",
            message: "m",
            files: &files,
        };

        let first = publish_tree(&remote, &publish).await.unwrap();
        let second = publish_tree(&remote, &publish).await.unwrap();

        assert_ne!(first.commit_sha, second.commit_sha);
        assert_eq!(first.tree_sha, second.tree_sha);
        assert_eq!(first.blob_shas, second.blob_shas);
    }

    #[tokio::test]
    async fn test_duplicate_paths_rejected_before_any_call() {
        let remote = FakeRemote::seeded("main", base_entries());
        let files = [text_file("blog/a.md", "1"), text_file("blog/a.md", "2")];
        let err = publish_tree(
            &remote,
            &TreePublish {
                branch: "main",
                prefix: "blog",
                message: "m",
                files: &files,
            },
        )
        .await
        .unwrap_err();

        assert!(matches!(err, Error::DuplicatePath { .. }));
        assert_eq!(remote.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_empty_file_set_empties_the_subtree() {
        let remote = FakeRemote::seeded("main", base_entries());
        publish_tree(
            &remote,
            &TreePublish {
                branch: "main",
                prefix: "blog",
                message: "remove everything",
                files: &[],
            },
        )
        .await
        .unwrap();

        let paths: Vec<String> = remote
            .tree_of_head("main")
            .iter()
            .map(|e| e.path.clone())
            .collect();
        assert_eq!(paths, vec!["other/file.md"]);
    }

    #[test]
    fn test_fake_remote_filters_nothing_extra() {
        // Guard: the seeded base includes only blob entries, matching
        // what a recursive listing of leaf paths looks like.
        let remote = FakeRemote::seeded("main", base_entries());
        assert!(remote
            .tree_of_head("main")
            .iter()
            .all(|e| e.kind == ObjectKind::Blob));
    }
}
