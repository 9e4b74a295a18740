//! Version command implementation.

use crate::error::Result;

/// Print the crate version.
pub fn execute(json: bool) -> Result<()> {
    let version = env!("CARGO_PKG_VERSION");
    if json {
        println!("{}", serde_json::json!({ "version": version }));
        return Ok(());
    }
    println!("lp {version}");
    Ok(())
}
