//! Bearer token storage and retrieval.
//!
//! Persists the single live auth token at `<gossip home>/gossip_auth_token`
//! with restricted permissions (0600). Tokens are never logged in full.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::config::paths;

/// Token storage filename. Matches the storage key the web client used, so
/// the value survives reloads under a stable name.
pub const TOKEN_FILE: &str = "gossip_auth_token";

/// File-backed store for the single live bearer token.
///
/// Exactly one token is live at a time; `save` overwrites, `clear` is
/// idempotent. Storage failures surface as errors so the caller can degrade
/// to an unauthenticated session instead of trusting a phantom write.
#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    /// Creates a store persisting at the given file path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Creates a store at the default location under the gossip home.
    pub fn default_path() -> Self {
        Self::new(paths::gossip_home().join(TOKEN_FILE))
    }

    /// Returns the backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Persists the token, overwriting any existing value.
    ///
    /// # Errors
    /// Returns an error if the storage location cannot be written.
    pub fn save(&self, token: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory {}", parent.display()))?;
        }

        // Write with restricted permissions
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            let mut file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .mode(0o600)
                .open(&self.path)
                .with_context(|| {
                    format!("failed to open {} for writing", self.path.display())
                })?;
            file.write_all(token.as_bytes())
                .with_context(|| format!("failed to write to {}", self.path.display()))?;
        }

        #[cfg(not(unix))]
        {
            fs::write(&self.path, token)
                .with_context(|| format!("failed to write to {}", self.path.display()))?;
        }

        Ok(())
    }

    /// Returns the persisted token, or `None` when no token is stored.
    ///
    /// # Errors
    /// Returns an error if the token file exists but cannot be read.
    pub fn load(&self) -> Result<Option<String>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read token from {}", self.path.display()))?;

        let token = contents.trim();
        if token.is_empty() {
            return Ok(None);
        }
        Ok(Some(token.to_string()))
    }

    /// Removes the persisted token. Clearing an absent token is not an error.
    ///
    /// # Errors
    /// Returns an error if the token file exists but cannot be removed.
    pub fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => {
                Err(e).with_context(|| format!("failed to remove {}", self.path.display()))
            }
        }
    }
}

/// Returns a masked version of a token for logs (first 8 chars + ...).
pub fn mask_token(token: &str) -> String {
    if token.len() <= 12 {
        return "***".to_string();
    }
    format!("{}...", &token[..8])
}
