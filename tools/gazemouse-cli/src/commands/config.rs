//! Show or initialize the configuration file.

use std::path::PathBuf;

use anyhow::Context;
use gazemouse_common::config::{config_file_path, AppConfig};

pub fn show(config: &AppConfig) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(config)?);
    Ok(())
}

pub fn path(explicit: Option<PathBuf>) -> anyhow::Result<()> {
    let path = explicit.unwrap_or_else(config_file_path);
    let status = if path.exists() { "exists" } else { "not created" };
    println!("{} ({status})", path.display());
    Ok(())
}

pub fn init(explicit: Option<PathBuf>, force: bool) -> anyhow::Result<()> {
    let path = explicit.unwrap_or_else(config_file_path);
    if path.exists() && !force {
        anyhow::bail!(
            "{} already exists (use --force to overwrite)",
            path.display()
        );
    }

    AppConfig::default()
        .save_to(&path)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    println!("Wrote default configuration to {}", path.display());
    Ok(())
}
