use std::path::PathBuf;

use thiserror::Error;

pub const TOKEN_VAR: &str = "DISCORD_BOT_TOKEN";
pub const RENDER_DIR_VAR: &str = "CHESS_RENDER_DIR";
pub const STATUS_VAR: &str = "CHESS_BOT_STATUS";

const DEFAULT_STATUS: &str = "Modular Bot!";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{0} environment variable was not set.")]
    Missing(&'static str),
}

/// Process configuration, read from the environment.
#[derive(Clone, PartialEq, Eq)]
pub struct Config {
    pub token: String,
    /// Directory that holds board images until they are delivered.
    pub render_dir: PathBuf,
    /// Presence text shown while the bot is online.
    pub status: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any variable source. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

        let token = get(TOKEN_VAR).ok_or(ConfigError::Missing(TOKEN_VAR))?;
        let render_dir = get(RENDER_DIR_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(std::env::temp_dir);
        let status = get(STATUS_VAR).unwrap_or_else(|| DEFAULT_STATUS.to_string());

        Ok(Self {
            token,
            render_dir,
            status,
        })
    }
}

/// Keeps the token out of logs.
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("token", &"<redacted>")
            .field("render_dir", &self.render_dir)
            .field("status", &self.status)
            .finish()
    }
}
