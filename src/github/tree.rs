//! Replacement-tree construction.
//!
//! A publish replaces one subtree of the repository while preserving
//! everything outside it. The remote's create-tree call takes a flat
//! list of leaf entries and reconstructs directory nodes itself, so
//! the builder only ever deals in blob paths.
//!
//! Delete-by-omission: any existing entry under the target prefix that
//! is not in the new item set simply isn't re-listed, and disappears
//! from the new tree.

use std::collections::HashSet;

use crate::error::{Error, Result};
use crate::github::types::{ObjectKind, TreeEntry};

/// Check whether `path` falls under `prefix` (or is the prefix itself).
///
/// Matching is per path segment: prefix `blog` covers `blog` and
/// `blog/post.md` but not `blog-drafts/post.md`.
#[must_use]
pub fn is_under(path: &str, prefix: &str) -> bool {
    path == prefix || path.strip_prefix(prefix).is_some_and(|rest| rest.starts_with('/'))
}

/// Reject duplicate remote paths within one batch.
///
/// The create-tree call would otherwise resolve duplicates by
/// construction order, silently dropping one file.
///
/// # Errors
///
/// Returns [`Error::DuplicatePath`] naming the first repeated path.
pub fn ensure_unique_paths<'a, I>(paths: I) -> Result<()>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen = HashSet::new();
    for path in paths {
        if !seen.insert(path) {
            return Err(Error::DuplicatePath {
                path: path.to_string(),
            });
        }
    }
    Ok(())
}

/// Compute the replacement entry list for a new tree.
///
/// With no `prefix`, the result is exactly `new_items`: a full
/// replacement independent of the base tree. With a `prefix`, blob
/// entries of `base` outside the prefix are preserved unchanged,
/// everything inside the prefix is dropped, and `new_items` is
/// appended. Directory (`tree`-type) entries are never carried over;
/// the remote rebuilds them from the blob paths.
///
/// An empty `new_items` with a prefix empties that subtree. That is
/// the intended way to delete every published file, not an error.
///
/// # Errors
///
/// Returns [`Error::DuplicatePath`] if `new_items` repeats a path.
pub fn replace_subtree(
    base: &[TreeEntry],
    new_items: Vec<TreeEntry>,
    prefix: Option<&str>,
) -> Result<Vec<TreeEntry>> {
    ensure_unique_paths(new_items.iter().map(|e| e.path.as_str()))?;

    let Some(prefix) = prefix else {
        return Ok(new_items);
    };

    let mut entries: Vec<TreeEntry> = base
        .iter()
        .filter(|e| e.kind == ObjectKind::Blob && !is_under(&e.path, prefix))
        .cloned()
        .collect();
    entries.extend(new_items);
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::types::MODE_FILE;

    fn tree_dir(path: &str) -> TreeEntry {
        TreeEntry {
            path: path.to_string(),
            mode: "040000".to_string(),
            kind: ObjectKind::Tree,
            sha: "d1".to_string(),
        }
    }

    fn paths(entries: &[TreeEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.path.as_str()).collect()
    }

    #[test]
    fn test_is_under_segment_boundaries() {
        assert!(is_under("blog", "blog"));
        assert!(is_under("blog/post.md", "blog"));
        assert!(is_under("blog/2024/post.md", "blog"));
        assert!(!is_under("blog-drafts/post.md", "blog"));
        assert!(!is_under("other/blog/post.md", "blog"));
    }

    #[test]
    fn test_no_prefix_is_full_replacement() {
        let base = vec![
            TreeEntry::blob("keep/me.md", "a1"),
            TreeEntry::blob("and/me.md", "a2"),
        ];
        let items = vec![TreeEntry::blob("only/this.md", "b1")];
        let result = replace_subtree(&base, items.clone(), None).unwrap();
        assert_eq!(result, items);
    }

    #[test]
    fn test_scoped_replacement_drops_old_and_keeps_outside() {
        // Base tree has other/file.md and blog/old.md; new items replace
        // the blog subtree with blog/new.md only.
        let base = vec![
            TreeEntry::blob("other/file.md", "a1"),
            TreeEntry::blob("blog/old.md", "a2"),
        ];
        let items = vec![TreeEntry::blob("blog/new.md", "b1")];
        let result = replace_subtree(&base, items, Some("blog")).unwrap();
        assert_eq!(paths(&result), vec!["other/file.md", "blog/new.md"]);
    }

    #[test]
    fn test_outside_entries_survive_unchanged() {
        let base = vec![TreeEntry::blob("docs/readme.md", "a1")];
        let result =
            replace_subtree(&base, vec![TreeEntry::blob("blog/x.md", "b1")], Some("blog"))
                .unwrap();
        assert_eq!(result[0], TreeEntry::blob("docs/readme.md", "a1"));
        assert_eq!(result[0].mode, MODE_FILE);
    }

    #[test]
    fn test_directory_entries_are_not_relisted() {
        let base = vec![
            tree_dir("other"),
            TreeEntry::blob("other/file.md", "a1"),
            tree_dir("blog"),
            TreeEntry::blob("blog/old.md", "a2"),
        ];
        let result =
            replace_subtree(&base, vec![TreeEntry::blob("blog/new.md", "b1")], Some("blog"))
                .unwrap();
        assert_eq!(paths(&result), vec!["other/file.md", "blog/new.md"]);
    }

    #[test]
    fn test_empty_items_empties_the_subtree() {
        let base = vec![
            TreeEntry::blob("blog/a.md", "a1"),
            TreeEntry::blob("blog/b.md", "a2"),
            TreeEntry::blob("index.html", "a3"),
        ];
        let result = replace_subtree(&base, vec![], Some("blog")).unwrap();
        assert_eq!(paths(&result), vec!["index.html"]);
    }

    #[test]
    fn test_prefix_matching_everything_deletes_all() {
        let base = vec![TreeEntry::blob("blog/a.md", "a1")];
        let result = replace_subtree(&base, vec![], Some("blog")).unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_duplicate_paths_rejected() {
        let items = vec![
            TreeEntry::blob("blog/same.md", "b1"),
            TreeEntry::blob("blog/same.md", "b2"),
        ];
        let err = replace_subtree(&[], items, Some("blog")).unwrap_err();
        assert!(matches!(err, Error::DuplicatePath { path } if path == "blog/same.md"));
    }

    #[test]
    fn test_prefix_equal_file_path_is_replaced() {
        // A blob sitting exactly at the prefix path counts as inside.
        let base = vec![TreeEntry::blob("blog", "a1")];
        let result = replace_subtree(&base, vec![], Some("blog")).unwrap();
        assert!(result.is_empty());
    }
}
