//! Persisted conversation token.
//!
//! The widget keeps a single opaque conversation identifier across runs,
//! stored as one line at ${PLATEN_HOME}/conversation. The token is minted
//! once (UUIDv4) and sent with every query; nothing else is persisted.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use uuid::Uuid;

/// Loads the conversation token, minting and persisting one if absent.
pub fn load_or_create(path: &Path) -> Result<String> {
    if let Ok(contents) = fs::read_to_string(path) {
        let token = contents.trim();
        if !token.is_empty() {
            return Ok(token.to_string());
        }
    }

    let token = Uuid::new_v4().to_string();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    fs::write(path, &token)
        .with_context(|| format!("Failed to write conversation token to {}", path.display()))?;
    tracing::debug!(token = %token, "minted new conversation token");
    Ok(token)
}
