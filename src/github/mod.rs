//! GitHub Git Data API integration.
//!
//! Everything needed to turn a set of local files into one atomic
//! commit on a remote branch:
//!
//! - [`client`] - authenticated HTTP wrapper with typed status mapping
//! - [`encode`] - chunked base64 for blob payloads
//! - [`tree`] - replacement-tree construction (delete-by-omission)
//! - [`publish`] - the six-step commit orchestrator
//! - [`contents`] - single-file get/put/delete outside the atomic path
//! - [`remote`] - the [`remote::GitRemote`] trait seam for testing

pub mod client;
pub mod contents;
pub mod encode;
pub mod publish;
pub mod remote;
pub mod tree;
pub mod types;

pub use client::GithubClient;
pub use publish::{publish_tree, PublishOutcome, TreePublish};
pub use remote::GitRemote;
pub use types::{FileContent, PublishFile, TreeEntry};
