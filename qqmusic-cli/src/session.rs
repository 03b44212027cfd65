//! Saved login, persisted to `~/.config/qqmusic/session.json`:
//!
//! ```json
//! { "musicid": "123456", "musickey": "Q_H_L_..." }
//! ```
//!
//! `musickey` is the `qm_keyst` cookie of a logged-in y.qq.com session;
//! keys starting with `W_X` come from WeChat login.

use anyhow::{Context, Result};
use qqmusic_api::Credential;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Session {
    #[serde(default)]
    pub musicid: String,
    #[serde(default)]
    pub musickey: String,
}

impl Session {
    /// Load the saved session, or an empty one if none exists.
    pub fn load() -> Result<Self> {
        let path = Self::path()?;
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        serde_json::from_str(&data).context("malformed session file")
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::path()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn clear() -> Result<()> {
        let path = Self::path()?;
        if path.exists() {
            fs::remove_file(&path)?;
        }
        Ok(())
    }

    pub fn credential(&self) -> Result<Credential> {
        Ok(Credential::new(&self.musicid, &self.musickey)?)
    }

    fn path() -> Result<PathBuf> {
        let config = dirs::config_dir().context("cannot determine config directory")?;
        Ok(config.join("qqmusic").join("session.json"))
    }
}
