//! Init command implementation.

use std::env;
use std::path::PathBuf;

use crate::config::{write_config, ProjectConfig, CONFIG_FILE, DEFAULT_TOKEN_ENV};
use crate::error::{Error, Result};

/// Arguments collected from `lp init` flags.
pub struct InitArgs {
    pub owner: String,
    pub repo: String,
    pub branch: String,
    pub target: String,
    pub source: String,
    pub force: bool,
}

/// Write a `leafpress.json` into the current directory.
///
/// # Errors
///
/// Fails if a config already exists (without `--force`) or the
/// arguments don't validate.
pub fn execute(args: &InitArgs, json: bool) -> Result<()> {
    let cwd = env::current_dir()?;
    let path: PathBuf = cwd.join(CONFIG_FILE);

    if path.exists() && !args.force {
        return Err(Error::AlreadyInitialized { path });
    }

    let config = ProjectConfig {
        owner: args.owner.clone(),
        repo: args.repo.clone(),
        branch: args.branch.clone(),
        target_path: args.target.clone(),
        source_dir: args.source.clone(),
        token_env: DEFAULT_TOKEN_ENV.to_string(),
    };
    write_config(&path, &config)?;

    if json {
        let output = serde_json::json!({
            "success": true,
            "config": path.display().to_string(),
        });
        println!("{output}");
    } else {
        println!("Initialized leafpress at {}", path.display());
        println!(
            "Publishing {}/ to {}/{} ({}:{})",
            config.source_dir, config.owner, config.repo, config.branch, config.target_path
        );
        println!("Export a token: export {}=ghp_...", config.token_env);
    }
    Ok(())
}
