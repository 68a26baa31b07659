//! Config command handlers.

use anyhow::{Result, bail};
use platen_core::config::{DEFAULT_CONFIG_TEMPLATE, paths};

pub fn path() {
    println!("{}", paths::config_path().display());
}

pub fn init() -> Result<()> {
    let config_path = paths::config_path();
    if config_path.exists() {
        bail!("Config already exists at {}", config_path.display());
    }
    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&config_path, DEFAULT_CONFIG_TEMPLATE)?;
    println!("Created config at {}", config_path.display());
    Ok(())
}
