//! Single-file command implementations (contents API).

use std::fs;
use std::io::Write;

use crate::cli::FileCommands;
use crate::error::{Error, Result};
use crate::github::GithubClient;

/// Execute a `lp file` subcommand.
///
/// # Errors
///
/// Fails on configuration or API errors; a missing file on `get` is
/// reported as absence, not an error.
pub fn execute(command: &FileCommands, token_env: Option<&str>, json: bool) -> Result<()> {
    let session = super::load_session(token_env)?;
    let client = GithubClient::new(&session.owner, &session.repo, &session.token)?;

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| Error::Other(format!("Failed to create async runtime: {e}")))?;

    match command {
        FileCommands::Get { path, output } => {
            let file = rt.block_on(client.get_file(path, &session.branch))?;
            match file {
                None => {
                    if json {
                        println!("{}", serde_json::json!({ "found": false, "path": path }));
                    } else {
                        println!("Not found: {path}");
                    }
                }
                Some(file) => {
                    if let Some(out) = output {
                        fs::write(out, &file.content)?;
                        if !json {
                            println!("Wrote {} bytes to {}", file.content.len(), out.display());
                        }
                    } else if json {
                        println!(
                            "{}",
                            serde_json::json!({
                                "found": true,
                                "path": file.path,
                                "sha": file.sha,
                                "size": file.content.len(),
                            })
                        );
                    } else {
                        std::io::stdout().write_all(&file.content)?;
                    }
                }
            }
        }

        FileCommands::Put {
            path,
            file,
            message,
        } => {
            let content = fs::read(file)?;
            // Carry the prior SHA when updating, so a stale local view
            // surfaces as a conflict instead of clobbering.
            let prior = rt.block_on(client.get_file(path, &session.branch))?;
            let outcome = rt.block_on(client.put_file(
                path,
                message,
                &content,
                prior.as_ref().map(|f| f.sha.as_str()),
                &session.branch,
            ))?;
            if json {
                println!(
                    "{}",
                    serde_json::json!({
                        "path": path,
                        "content_sha": outcome.content_sha,
                        "commit_sha": outcome.commit_sha,
                    })
                );
            } else {
                println!("Wrote {path} in commit {}", outcome.commit_sha);
            }
        }

        FileCommands::Rm { path, message } => {
            let file = rt
                .block_on(client.get_file(path, &session.branch))?
                .ok_or_else(|| Error::NotFound {
                    path: path.to_string(),
                })?;
            rt.block_on(client.delete_file(path, message, &file.sha, &session.branch))?;
            if json {
                println!("{}", serde_json::json!({ "deleted": true, "path": path }));
            } else {
                println!("Deleted {path}");
            }
        }
    }

    Ok(())
}
