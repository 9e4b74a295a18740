//! Command implementations.

pub mod completions;
pub mod file;
pub mod init;
pub mod publish;
pub mod status;
pub mod version;

use std::path::{Path, PathBuf};

use crate::config::{self, ProjectConfig, SyncSession};
use crate::error::{Error, Result};
use crate::storage::SyncStore;

/// Load the discovered project config and build a session from it.
///
/// Shared preamble for every command that talks to the remote or
/// classifies notes.
fn load_session(token_env: Option<&str>) -> Result<SyncSession> {
    let (config, dir) = load_config()?;
    config::build_session(&config, &dir, token_env)
}

/// Load the discovered project config and the directory it lives in.
fn load_config() -> Result<(ProjectConfig, PathBuf)> {
    let path = config::discover_config_path().ok_or(Error::NotInitialized)?;
    let config = config::load_config(&path)?;
    let dir = path
        .parent()
        .map(Path::to_path_buf)
        .ok_or_else(|| Error::Config("config file has no parent directory".into()))?;
    Ok((config, dir))
}

/// Open the global sync store, creating its directory if needed.
fn open_store(db_override: Option<&PathBuf>) -> Result<SyncStore> {
    let db_path = config::resolve_db_path(db_override.map(PathBuf::as_path))
        .ok_or_else(|| Error::Config("cannot determine home directory".into()))?;
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    SyncStore::open(&db_path)
}
