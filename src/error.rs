//! Error types for Leafpress CLI.
//!
//! Provides structured error handling with:
//! - Machine-readable error codes (`ErrorCode`)
//! - Category-based exit codes (2=db, 3=not_found, 4=validation, etc.)
//! - Retryability flags (only stale-write conflicts are retryable)
//! - Context-aware recovery hints
//! - Structured JSON output for piped / non-TTY consumers

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for Leafpress operations.
pub type Result<T> = std::result::Result<T, Error>;

// ── Error Code ────────────────────────────────────────────────

/// Machine-readable error codes grouped by category.
///
/// Each code maps to a SCREAMING_SNAKE string and a category-based
/// exit code. Agents match on the string; shell scripts on the exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Database (exit 2)
    NotInitialized,
    AlreadyInitialized,
    DatabaseError,

    // Not Found (exit 3)
    RemoteNotFound,

    // Validation (exit 4)
    InvalidArgument,
    DuplicatePath,

    // Auth (exit 5)
    AuthError,
    MissingToken,

    // Conflict (exit 6)
    RefConflict,

    // Config (exit 7)
    ConfigError,

    // I/O (exit 8)
    IoError,
    JsonError,

    // Remote API (exit 9)
    ApiError,
    HttpError,

    // Internal (exit 1)
    InternalError,
}

impl ErrorCode {
    /// Machine-readable SCREAMING_SNAKE code string.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        match self {
            Self::NotInitialized => "NOT_INITIALIZED",
            Self::AlreadyInitialized => "ALREADY_INITIALIZED",
            Self::DatabaseError => "DATABASE_ERROR",
            Self::RemoteNotFound => "REMOTE_NOT_FOUND",
            Self::InvalidArgument => "INVALID_ARGUMENT",
            Self::DuplicatePath => "DUPLICATE_PATH",
            Self::AuthError => "AUTH_ERROR",
            Self::MissingToken => "MISSING_TOKEN",
            Self::RefConflict => "REF_CONFLICT",
            Self::ConfigError => "CONFIG_ERROR",
            Self::IoError => "IO_ERROR",
            Self::JsonError => "JSON_ERROR",
            Self::ApiError => "API_ERROR",
            Self::HttpError => "HTTP_ERROR",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }

    /// Category-based exit code (1-9).
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::InternalError => 1,
            Self::NotInitialized | Self::AlreadyInitialized | Self::DatabaseError => 2,
            Self::RemoteNotFound => 3,
            Self::InvalidArgument | Self::DuplicatePath => 4,
            Self::AuthError | Self::MissingToken => 5,
            Self::RefConflict => 6,
            Self::ConfigError => 7,
            Self::IoError | Self::JsonError => 8,
            Self::ApiError | Self::HttpError => 9,
        }
    }

    /// Whether the caller should retry the whole publish sequence.
    ///
    /// True only for ref conflicts: the branch advanced under us and a
    /// fresh run starting from ResolveBranch will see the new head.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::RefConflict)
    }
}

// ── Error Enum ────────────────────────────────────────────────

/// Errors that can occur in Leafpress operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Not initialized: run `lp init` first")]
    NotInitialized,

    #[error("Already initialized at {path}")]
    AlreadyInitialized { path: PathBuf },

    /// HTTP 401 from the remote. Fatal, never retried.
    #[error("Authentication failed (HTTP 401): check your token")]
    Auth,

    /// No token in the configured environment variable.
    #[error("No token found in ${var}")]
    MissingToken { var: String },

    /// HTTP 404 from the remote, carrying the requested path.
    #[error("Remote object not found: {path}")]
    NotFound { path: String },

    /// HTTP 409 from the remote: the branch ref moved under us.
    #[error("Ref update conflict: branch advanced concurrently")]
    Conflict,

    /// Any other non-2xx response, with status and body for diagnostics.
    #[error("API error (HTTP {status}): {body}")]
    Api { status: u16, body: String },

    /// Two notes in one batch mapped to the same remote path.
    #[error("Duplicate remote path in batch: {path}")]
    DuplicatePath { path: String },

    #[error("Transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Map this error to its structured `ErrorCode`.
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::NotInitialized => ErrorCode::NotInitialized,
            Self::AlreadyInitialized { .. } => ErrorCode::AlreadyInitialized,
            Self::Auth => ErrorCode::AuthError,
            Self::MissingToken { .. } => ErrorCode::MissingToken,
            Self::NotFound { .. } => ErrorCode::RemoteNotFound,
            Self::Conflict => ErrorCode::RefConflict,
            Self::Api { .. } => ErrorCode::ApiError,
            Self::DuplicatePath { .. } => ErrorCode::DuplicatePath,
            Self::Http(_) => ErrorCode::HttpError,
            Self::Database(_) => ErrorCode::DatabaseError,
            Self::Io(_) => ErrorCode::IoError,
            Self::Json(_) => ErrorCode::JsonError,
            Self::InvalidArgument(_) => ErrorCode::InvalidArgument,
            Self::Config(_) => ErrorCode::ConfigError,
            Self::Other(_) => ErrorCode::InternalError,
        }
    }

    /// Category-based exit code, delegating to the `ErrorCode`.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        self.error_code().exit_code()
    }

    /// Context-aware recovery hint for agents and humans.
    ///
    /// Returns `None` if no actionable suggestion exists.
    #[must_use]
    pub fn hint(&self) -> Option<String> {
        match self {
            Self::NotInitialized => {
                Some("Run `lp init` to create a leafpress.json config".to_string())
            }

            Self::AlreadyInitialized { path } => Some(format!(
                "Config already exists at {}. Use `--force` to overwrite.",
                path.display()
            )),

            Self::Auth => Some(
                "The token was rejected. Generate a token with `repo` scope \
                 and export it in the configured environment variable."
                    .to_string(),
            ),

            Self::MissingToken { var } => Some(format!(
                "Export a GitHub token: export {var}=ghp_... \
                 (or pass --token-env to read a different variable)"
            )),

            Self::Conflict => Some(
                "The branch moved while publishing. Re-run `lp publish` \
                 to retry from the new branch head."
                    .to_string(),
            ),

            Self::NotFound { path } => Some(format!(
                "The remote has no object at '{path}'. Check the branch \
                 and repository in leafpress.json."
            )),

            Self::DuplicatePath { path } => Some(format!(
                "Two notes slug to the same remote path '{path}'. \
                 Rename one of them."
            )),

            Self::Api { .. }
            | Self::Http(_)
            | Self::Database(_)
            | Self::Io(_)
            | Self::Json(_)
            | Self::InvalidArgument(_)
            | Self::Config(_)
            | Self::Other(_) => None,
        }
    }

    /// Structured JSON representation for machine consumption.
    ///
    /// Includes error code, message, retryability, exit code, and
    /// optional recovery hint. Agents parse this instead of stderr text.
    #[must_use]
    pub fn to_structured_json(&self) -> serde_json::Value {
        let code = self.error_code();
        let mut obj = serde_json::json!({
            "error": {
                "code": code.as_str(),
                "message": self.to_string(),
                "retryable": code.is_retryable(),
                "exit_code": code.exit_code(),
            }
        });

        if let Some(hint) = self.hint() {
            obj["error"]["hint"] = serde_json::Value::String(hint);
        }

        obj
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflict_is_the_only_retryable_code() {
        assert!(ErrorCode::RefConflict.is_retryable());
        assert!(!ErrorCode::AuthError.is_retryable());
        assert!(!ErrorCode::RemoteNotFound.is_retryable());
        assert!(!ErrorCode::ApiError.is_retryable());
    }

    #[test]
    fn test_exit_codes_by_category() {
        assert_eq!(Error::Auth.exit_code(), 5);
        assert_eq!(Error::Conflict.exit_code(), 6);
        assert_eq!(
            Error::NotFound {
                path: "refs/heads/main".into()
            }
            .exit_code(),
            3
        );
        assert_eq!(
            Error::Api {
                status: 500,
                body: "oops".into()
            }
            .exit_code(),
            9
        );
    }

    #[test]
    fn test_structured_json_shape() {
        let err = Error::Conflict;
        let json = err.to_structured_json();
        assert_eq!(json["error"]["code"], "REF_CONFLICT");
        assert_eq!(json["error"]["retryable"], true);
        assert_eq!(json["error"]["exit_code"], 6);
        assert!(json["error"]["hint"].is_string());
    }

    #[test]
    fn test_not_found_carries_path() {
        let err = Error::NotFound {
            path: "git/commits/abc123".into(),
        };
        assert!(err.to_string().contains("git/commits/abc123"));
    }
}
