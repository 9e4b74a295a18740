//! Configuration management.
//!
//! A project is defined by a `leafpress.json` at its root, discovered
//! by walking up from the current directory (anchored at the git
//! toplevel when available, so subdirectories of a repo resolve to the
//! same project). The token is never stored in the file; it is read
//! from an environment variable at session construction.
//!
//! The sync-state database is global (`~/.leafpress/leafpress.db`),
//! with records scoped by project path.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Project config file name.
pub const CONFIG_FILE: &str = "leafpress.json";

/// Default environment variable holding the API token.
pub const DEFAULT_TOKEN_ENV: &str = "GITHUB_TOKEN";

/// Contents of `leafpress.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Repository owner (user or org).
    pub owner: String,
    /// Repository name.
    pub repo: String,
    /// Branch to publish to.
    #[serde(default = "default_branch")]
    pub branch: String,
    /// Repository subtree the publish is scoped to, e.g. `content/blog`.
    pub target_path: String,
    /// Source directory of notes, relative to the config file.
    #[serde(default = "default_source_dir")]
    pub source_dir: String,
    /// Environment variable to read the token from.
    #[serde(default = "default_token_env")]
    pub token_env: String,
}

fn default_branch() -> String {
    "main".to_string()
}

fn default_source_dir() -> String {
    "notes".to_string()
}

fn default_token_env() -> String {
    DEFAULT_TOKEN_ENV.to_string()
}

impl ProjectConfig {
    /// Validate field shapes that would break remote paths.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for empty fields or a target path
    /// with leading/trailing slashes.
    pub fn validate(&self) -> Result<()> {
        if self.owner.is_empty() || self.repo.is_empty() {
            return Err(Error::Config("owner and repo must be set".into()));
        }
        if self.target_path.is_empty() {
            return Err(Error::Config("target_path must be set".into()));
        }
        if self.target_path.starts_with('/') || self.target_path.ends_with('/') {
            return Err(Error::Config(
                "target_path must not start or end with '/'".into(),
            ));
        }
        Ok(())
    }
}

/// Everything one publish run needs, built per invocation and passed
/// down explicitly. No module-level state.
#[derive(Debug, Clone)]
pub struct SyncSession {
    /// Repository owner.
    pub owner: String,
    /// Repository name.
    pub repo: String,
    /// Branch to publish to.
    pub branch: String,
    /// Target subtree within the repository.
    pub target_path: String,
    /// Bearer token.
    pub token: String,
    /// Absolute project path; scopes sync records in the global DB.
    pub project_path: String,
    /// Absolute source directory of notes.
    pub source_dir: PathBuf,
}

/// Locate the project config by walking up from the current directory.
///
/// Checks the git toplevel first so a subdirectory of the repo does
/// not shadow the real project root, then falls back to walking up
/// from CWD for non-git projects.
#[must_use]
pub fn discover_config_path() -> Option<PathBuf> {
    if let Some(git_root) = git_toplevel() {
        let candidate = git_root.join(CONFIG_FILE);
        if candidate.is_file() {
            return Some(candidate);
        }
    }

    if let Ok(cwd) = env::current_dir() {
        let mut dir = cwd.as_path();
        loop {
            let candidate = dir.join(CONFIG_FILE);
            if candidate.is_file() {
                return Some(candidate);
            }
            match dir.parent() {
                Some(parent) => dir = parent,
                None => break,
            }
        }
    }
    None
}

/// Get the git repository root directory.
fn git_toplevel() -> Option<PathBuf> {
    std::process::Command::new("git")
        .args(["rev-parse", "--show-toplevel"])
        .output()
        .ok()
        .filter(|o| o.status.success())
        .map(|o| PathBuf::from(String::from_utf8_lossy(&o.stdout).trim().to_string()))
}

/// Load and validate the config at `path`.
///
/// # Errors
///
/// Returns an error if the file is missing, malformed, or invalid.
pub fn load_config(path: &Path) -> Result<ProjectConfig> {
    let raw = fs::read_to_string(path)?;
    let config: ProjectConfig = serde_json::from_str(&raw)?;
    config.validate()?;
    Ok(config)
}

/// Write a config file, pretty-printed for hand editing.
///
/// # Errors
///
/// Returns an error if the config is invalid or the write fails.
pub fn write_config(path: &Path, config: &ProjectConfig) -> Result<()> {
    config.validate()?;
    let mut raw = serde_json::to_string_pretty(config)?;
    raw.push('\n');
    fs::write(path, raw)?;
    Ok(())
}

/// Build a [`SyncSession`] from a loaded config.
///
/// `token_env_override` (the `--token-env` flag) takes precedence over
/// the configured variable name.
///
/// # Errors
///
/// Returns [`Error::MissingToken`] if the variable is unset or empty.
pub fn build_session(
    config: &ProjectConfig,
    config_dir: &Path,
    token_env_override: Option<&str>,
) -> Result<SyncSession> {
    build_session_with(config, config_dir, token_env_override, |var| {
        env::var(var).ok()
    })
}

/// [`build_session`] with an injectable environment lookup, so tests
/// don't mutate process-wide state.
///
/// # Errors
///
/// Returns [`Error::MissingToken`] if the variable is unset or empty.
pub fn build_session_with(
    config: &ProjectConfig,
    config_dir: &Path,
    token_env_override: Option<&str>,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<SyncSession> {
    let var = token_env_override.unwrap_or(&config.token_env);
    let token = lookup(var)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| Error::MissingToken {
            var: var.to_string(),
        })?;

    Ok(SyncSession {
        owner: config.owner.clone(),
        repo: config.repo.clone(),
        branch: config.branch.clone(),
        target_path: config.target_path.clone(),
        token,
        project_path: config_dir.display().to_string(),
        source_dir: config_dir.join(&config.source_dir),
    })
}

/// Build a session for read-only commands that never touch the remote
/// (e.g. `lp status`). No token is resolved; the token field is empty.
#[must_use]
pub fn build_offline_session(config: &ProjectConfig, config_dir: &Path) -> SyncSession {
    SyncSession {
        owner: config.owner.clone(),
        repo: config.repo.clone(),
        branch: config.branch.clone(),
        target_path: config.target_path.clone(),
        token: String::new(),
        project_path: config_dir.display().to_string(),
        source_dir: config_dir.join(&config.source_dir),
    }
}

/// Resolve the global database path.
///
/// An explicit `--db` override wins; otherwise `~/.leafpress/leafpress.db`.
#[must_use]
pub fn resolve_db_path(override_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = override_path {
        return Some(path.to_path_buf());
    }
    directories::BaseDirs::new().map(|dirs| dirs.home_dir().join(".leafpress").join("leafpress.db"))
}
