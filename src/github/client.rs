//! Authenticated GitHub API client.
//!
//! Thin wrapper over `reqwest` that owns the status-code-to-error
//! mapping: 401 becomes [`Error::Auth`], 404 [`Error::NotFound`] with
//! the requested path, 409 [`Error::Conflict`], and any other non-2xx
//! [`Error::Api`] with status and body text. No retries happen here;
//! callers retry or surface the failure.

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::github::encode::to_base64;
use crate::github::remote::GitRemote;
use crate::github::types::{
    CommitResponse, CreateBlobRequest, CreateCommitRequest, CreateTreeRequest, FileContent,
    RefResponse, ShaResponse, TreeEntry, TreeResponse, UpdateRefRequest,
};

const API_BASE: &str = "https://api.github.com";
const ACCEPT_JSON: &str = "application/vnd.github+json";
const USER_AGENT: &str = concat!("leafpress-cli/", env!("CARGO_PKG_VERSION"));

/// Client for one `{owner}/{repo}` target.
///
/// Every request carries the bearer token and the fixed `Accept`
/// header; `Content-Type: application/json` is set per request body.
#[derive(Debug)]
pub struct GithubClient {
    http: reqwest::Client,
    /// `{api_base}/repos/{owner}/{repo}`
    repo_base: String,
}

impl GithubClient {
    /// Create a client for `owner/repo` against api.github.com.
    ///
    /// # Errors
    ///
    /// Returns an error if the token contains non-header characters or
    /// the underlying HTTP client cannot be constructed.
    pub fn new(owner: &str, repo: &str, token: &str) -> Result<Self> {
        Self::with_api_base(API_BASE, owner, repo, token)
    }

    /// Create a client against a custom API base (GitHub Enterprise,
    /// local test servers).
    ///
    /// # Errors
    ///
    /// Same failure modes as [`GithubClient::new`].
    pub fn with_api_base(api_base: &str, owner: &str, repo: &str, token: &str) -> Result<Self> {
        let mut auth = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|_| Error::InvalidArgument("token contains invalid characters".into()))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_JSON));

        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            http,
            repo_base: format!(
                "{}/repos/{}/{}",
                api_base.trim_end_matches('/'),
                owner,
                repo
            ),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.repo_base, path)
    }

    /// Map a non-success status to its typed error, consuming the body
    /// for diagnostics on the generic path.
    async fn check(path: &str, response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        match status {
            StatusCode::UNAUTHORIZED => Err(Error::Auth),
            StatusCode::NOT_FOUND => Err(Error::NotFound {
                path: path.to_string(),
            }),
            StatusCode::CONFLICT => Err(Error::Conflict),
            _ => {
                let body = response.text().await.unwrap_or_default();
                Err(Error::Api {
                    status: status.as_u16(),
                    body,
                })
            }
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        debug!(path, "GET");
        let response = self.http.get(self.url(path)).send().await?;
        Ok(Self::check(path, response).await?.json().await?)
    }

    pub(crate) async fn send_json<B, T>(&self, method: Method, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        debug!(path, method = %method, "request");
        let response = self
            .http
            .request(method, self.url(path))
            .json(body)
            .send()
            .await?;
        Ok(Self::check(path, response).await?.json().await?)
    }

    /// Issue a mutating request whose response body we don't consume.
    /// Empty bodies (e.g. DELETE responses) are fine here.
    pub(crate) async fn send_unit<B>(&self, method: Method, path: &str, body: &B) -> Result<()>
    where
        B: Serialize + ?Sized,
    {
        debug!(path, method = %method, "request");
        let response = self
            .http
            .request(method, self.url(path))
            .json(body)
            .send()
            .await?;
        Self::check(path, response).await?;
        Ok(())
    }

    /// GET returning `None` on 404 instead of an error, for read paths
    /// where absence is an expected outcome.
    pub(crate) async fn get_json_optional<T: DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<Option<T>> {
        match self.get_json(path).await {
            Ok(value) => Ok(Some(value)),
            Err(Error::NotFound { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    // ── Git Data API operations ───────────────────────────────

    /// Resolve a branch name to its head commit SHA.
    ///
    /// A missing branch surfaces as [`Error::NotFound`]: unlike a
    /// missing file, there is nothing sensible to fall back to.
    ///
    /// # Errors
    ///
    /// Any typed API error.
    pub async fn branch_head(&self, branch: &str) -> Result<String> {
        let resp: RefResponse = self
            .get_json(&format!("git/ref/heads/{}", encode_segment(branch)))
            .await?;
        Ok(resp.object.sha)
    }

    /// Resolve a commit SHA to its tree SHA.
    ///
    /// # Errors
    ///
    /// Any typed API error.
    pub async fn commit_tree(&self, commit_sha: &str) -> Result<String> {
        let resp: CommitResponse = self.get_json(&format!("git/commits/{commit_sha}")).await?;
        Ok(resp.tree.sha)
    }

    /// Create a blob from text or binary content, returning its SHA.
    ///
    /// # Errors
    ///
    /// Any typed API error.
    pub async fn create_blob(&self, content: &FileContent) -> Result<String> {
        let (payload, encoding) = match content {
            FileContent::Text(text) => (text.clone(), "utf-8"),
            FileContent::Binary(bytes) => (to_base64(bytes), "base64"),
        };
        let resp: ShaResponse = self
            .send_json(
                Method::POST,
                "git/blobs",
                &CreateBlobRequest {
                    content: &payload,
                    encoding,
                },
            )
            .await?;
        Ok(resp.sha)
    }

    /// Fetch the full recursive listing of a tree.
    ///
    /// # Errors
    ///
    /// Fails if the API truncated the listing: building a replacement
    /// tree on a partial base would silently drop preserved files.
    pub async fn tree_entries(&self, tree_sha: &str) -> Result<Vec<TreeEntry>> {
        let resp: TreeResponse = self
            .get_json(&format!("git/trees/{tree_sha}?recursive=1"))
            .await?;
        if resp.truncated {
            return Err(Error::Other(format!(
                "recursive listing of tree {tree_sha} was truncated by the API; \
                 refusing to build a replacement tree from a partial base"
            )));
        }
        Ok(resp.tree)
    }

    /// Create a tree from a flat entry list, returning its SHA.
    ///
    /// # Errors
    ///
    /// Any typed API error.
    pub async fn create_tree(&self, entries: &[TreeEntry]) -> Result<String> {
        let resp: ShaResponse = self
            .send_json(Method::POST, "git/trees", &CreateTreeRequest { tree: entries })
            .await?;
        Ok(resp.sha)
    }

    /// Create a commit with exactly one parent, returning its SHA.
    ///
    /// # Errors
    ///
    /// Any typed API error.
    pub async fn create_commit(
        &self,
        message: &str,
        tree_sha: &str,
        parent_sha: &str,
    ) -> Result<String> {
        let resp: ShaResponse = self
            .send_json(
                Method::POST,
                "git/commits",
                &CreateCommitRequest {
                    message,
                    tree: tree_sha,
                    parents: &[parent_sha],
                },
            )
            .await?;
        Ok(resp.sha)
    }

    /// Advance the branch ref to a new commit. The single step that
    /// mutates shared state; a concurrent update surfaces as
    /// [`Error::Conflict`] and the branch is left untouched.
    ///
    /// # Errors
    ///
    /// Any typed API error.
    pub async fn advance_ref(&self, branch: &str, commit_sha: &str) -> Result<()> {
        self.send_unit(
            Method::PATCH,
            &format!("git/refs/heads/{}", encode_segment(branch)),
            &UpdateRefRequest { sha: commit_sha },
        )
        .await
    }
}

impl GitRemote for GithubClient {
    async fn branch_head(&self, branch: &str) -> Result<String> {
        Self::branch_head(self, branch).await
    }

    async fn commit_tree(&self, commit_sha: &str) -> Result<String> {
        Self::commit_tree(self, commit_sha).await
    }

    async fn create_blob(&self, content: &FileContent) -> Result<String> {
        Self::create_blob(self, content).await
    }

    async fn tree_entries(&self, tree_sha: &str) -> Result<Vec<TreeEntry>> {
        Self::tree_entries(self, tree_sha).await
    }

    async fn create_tree(&self, entries: &[TreeEntry]) -> Result<String> {
        Self::create_tree(self, entries).await
    }

    async fn create_commit(
        &self,
        message: &str,
        tree_sha: &str,
        parent_sha: &str,
    ) -> Result<String> {
        Self::create_commit(self, message, tree_sha, parent_sha).await
    }

    async fn advance_ref(&self, branch: &str, commit_sha: &str) -> Result<()> {
        Self::advance_ref(self, branch, commit_sha).await
    }
}

// ── Path encoding ─────────────────────────────────────────────

/// Percent-encode one path segment (RFC 3986 unreserved set kept).
fn encode_segment(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    for byte in segment.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char);
            }
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

/// Percent-encode a repository file path, segment by segment, keeping
/// the `/` separators literal.
#[must_use]
pub(crate) fn encode_path(path: &str) -> String {
    path.split('/').map(encode_segment).collect::<Vec<_>>().join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_segment_passthrough() {
        assert_eq!(encode_segment("post-2024_v1.md"), "post-2024_v1.md");
    }

    #[test]
    fn test_encode_segment_reserved() {
        assert_eq!(encode_segment("a b"), "a%20b");
        assert_eq!(encode_segment("a&b?c"), "a%26b%3Fc");
        assert_eq!(encode_segment("100%"), "100%25");
    }

    #[test]
    fn test_encode_path_keeps_separators() {
        assert_eq!(encode_path("blog/my post.md"), "blog/my%20post.md");
        assert_eq!(encode_path("a/b/c"), "a/b/c");
    }

    #[test]
    fn test_encode_path_utf8() {
        assert_eq!(encode_path("notes/café.md"), "notes/caf%C3%A9.md");
    }

    #[test]
    fn test_client_rejects_bad_token() {
        let err = GithubClient::new("owner", "repo", "bad\ntoken").unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }
}
