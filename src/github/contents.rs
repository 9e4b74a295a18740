//! Single-file operations via the contents API.
//!
//! Used by `lp file get|put|rm` for one-off reads and writes outside
//! the atomic publish path. A 404 on the read path means absence and
//! comes back as `None`; writes require the prior content SHA for
//! updates (optimistic concurrency, same contract as the ref update).

use reqwest::Method;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::github::client::{encode_path, GithubClient};
use crate::github::encode::{from_base64, to_base64};

/// A file fetched through the contents API, decoded to raw bytes.
#[derive(Debug, Clone)]
pub struct RemoteFile {
    /// Repository-relative path.
    pub path: String,
    /// Content SHA (needed to update or delete the file).
    pub sha: String,
    /// Decoded file bytes.
    pub content: Vec<u8>,
}

/// Result of a contents-API write.
#[derive(Debug, Clone)]
pub struct WriteOutcome {
    /// SHA of the new content object.
    pub content_sha: String,
    /// SHA of the commit the write created.
    pub commit_sha: String,
}

#[derive(Debug, Deserialize)]
struct ContentsResponse {
    path: String,
    sha: String,
    content: Option<String>,
    encoding: Option<String>,
}

#[derive(Debug, Serialize)]
struct PutContentsRequest<'a> {
    message: &'a str,
    content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<&'a str>,
    branch: &'a str,
}

#[derive(Debug, Serialize)]
struct DeleteContentsRequest<'a> {
    message: &'a str,
    sha: &'a str,
    branch: &'a str,
}

#[derive(Debug, Deserialize)]
struct PutContentsResponse {
    content: ContentSha,
    commit: ContentSha,
}

#[derive(Debug, Deserialize)]
struct ContentSha {
    sha: String,
}

impl GithubClient {
    /// Fetch a single file, or `None` if it does not exist.
    ///
    /// Absence is a normal outcome on this path, unlike a missing
    /// branch ref, which stays an error.
    ///
    /// # Errors
    ///
    /// Any typed API error other than 404, or a corrupt base64 payload.
    pub async fn get_file(&self, path: &str, branch: &str) -> Result<Option<RemoteFile>> {
        let endpoint = format!("contents/{}?ref={}", encode_path(path), branch);
        let Some(resp) = self.get_json_optional::<ContentsResponse>(&endpoint).await? else {
            return Ok(None);
        };

        let content = match (resp.content, resp.encoding.as_deref()) {
            (Some(encoded), Some("base64") | None) => from_base64(&encoded)
                .map_err(|e| crate::error::Error::Other(format!("corrupt content payload: {e}")))?,
            (Some(raw), Some(_)) => raw.into_bytes(),
            // Large files come back without inline content.
            (None, _) => Vec::new(),
        };

        Ok(Some(RemoteFile {
            path: resp.path,
            sha: resp.sha,
            content,
        }))
    }

    /// Create or update a single file on `branch`.
    ///
    /// Pass the prior content SHA for updates; omit it for creates.
    ///
    /// # Errors
    ///
    /// [`Error::Conflict`] on a stale SHA, or any other typed API error.
    ///
    /// [`Error::Conflict`]: crate::error::Error::Conflict
    pub async fn put_file(
        &self,
        path: &str,
        message: &str,
        content: &[u8],
        prior_sha: Option<&str>,
        branch: &str,
    ) -> Result<WriteOutcome> {
        let endpoint = format!("contents/{}", encode_path(path));
        let body = PutContentsRequest {
            message,
            content: to_base64(content),
            sha: prior_sha,
            branch,
        };
        let resp: PutContentsResponse = self.send_json(Method::PUT, &endpoint, &body).await?;
        Ok(WriteOutcome {
            content_sha: resp.content.sha,
            commit_sha: resp.commit.sha,
        })
    }

    /// Delete a single file on `branch`. Requires the current content
    /// SHA. The response body is not consumed.
    ///
    /// # Errors
    ///
    /// [`Error::Conflict`] on a stale SHA, or any other typed API error.
    ///
    /// [`Error::Conflict`]: crate::error::Error::Conflict
    pub async fn delete_file(
        &self,
        path: &str,
        message: &str,
        sha: &str,
        branch: &str,
    ) -> Result<()> {
        let endpoint = format!("contents/{}", encode_path(path));
        let body = DeleteContentsRequest {
            message,
            sha,
            branch,
        };
        self.send_unit(Method::DELETE, &endpoint, &body).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::io::{Read as _, Write as _};
    use std::net::TcpListener;

    /// Bind a localhost listener that answers one request with a 404.
    fn serve_not_found() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        std::thread::spawn(move || {
            if let Ok((mut stream, _)) = listener.accept() {
                let mut buf = [0u8; 4096];
                let _ = stream.read(&mut buf);
                let body = r#"{"message":"Not Found"}"#;
                let response = format!(
                    "HTTP/1.1 404 Not Found\r\n\
                     content-type: application/json\r\n\
                     content-length: {}\r\n\
                     connection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = stream.write_all(response.as_bytes());
            }
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn test_get_file_absence_is_none_not_error() {
        let client =
            GithubClient::with_api_base(&serve_not_found(), "octo", "site", "tok").unwrap();
        let file = client.get_file("blog/missing.md", "main").await.unwrap();
        assert!(file.is_none());
    }

    #[tokio::test]
    async fn test_missing_ref_stays_an_error() {
        let client =
            GithubClient::with_api_base(&serve_not_found(), "octo", "site", "tok").unwrap();
        let err = client.branch_head("gone").await.unwrap_err();
        assert!(matches!(err, Error::NotFound { path } if path.contains("gone")));
    }

    #[test]
    fn test_put_request_skips_sha_for_creates() {
        let body = PutContentsRequest {
            message: "add",
            content: "aGk=".into(),
            sha: None,
            branch: "main",
        };
        let json = serde_json::to_value(&body).unwrap();
        assert!(json.get("sha").is_none());
        assert_eq!(json["branch"], "main");
    }

    #[test]
    fn test_put_request_includes_sha_for_updates() {
        let body = PutContentsRequest {
            message: "update",
            content: "aGk=".into(),
            sha: Some("abc123"),
            branch: "main",
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["sha"], "abc123");
    }

    #[test]
    fn test_contents_response_decodes_wrapped_base64() {
        let resp: ContentsResponse = serde_json::from_str(
            r#"{
                "path": "blog/post.md",
                "sha": "abc",
                "content": "aGVsbG8g\nd29ybGQ=\n",
                "encoding": "base64"
            }"#,
        )
        .unwrap();
        let decoded = from_base64(resp.content.as_deref().unwrap()).unwrap();
        assert_eq!(decoded, b"hello world");
    }
}
