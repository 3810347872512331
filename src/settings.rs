//! Runtime settings, read from a YAML file and the environment

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable naming the settings file
pub const SETTINGS_PATH_VAR: &str = "BOT_SETTINGS";
pub const DEFAULT_SETTINGS_PATH: &str = "settings.yaml";
/// Overrides `owner_id` from the settings file
pub const OWNER_ID_VAR: &str = "OWNER_ID";
pub const TOKEN_VAR: &str = "DISCORD_TOKEN";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Failed to read settings file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid settings file {path}: {source}")]
    Yaml {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    #[error("Invalid owner id `{0}`")]
    InvalidOwnerId(String),

    #[error("DISCORD_TOKEN must be set")]
    MissingToken,
}

/// Where loaded settings came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsSource {
    File,
    /// No settings file; built-in defaults
    Defaults,
}

/// Bot configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BotSettings {
    /// User who may configure roles and bypasses the role gate
    pub owner_id: Option<u64>,
    /// Prefix for text commands
    pub prefix: String,
    /// Guild id -> moderator role ids
    pub config_file: PathBuf,
    /// Per-member case counters
    pub cases_file: PathBuf,
    pub case_numbering: bool,
    /// DM members before punishing them
    pub notify_targets: bool,
    pub appeal_url: Option<String>,
    pub log_dir: PathBuf,
}

impl Default for BotSettings {
    fn default() -> Self {
        Self {
            owner_id: None,
            prefix: "!".to_string(),
            config_file: PathBuf::from("config.json"),
            cases_file: PathBuf::from("cases.json"),
            case_numbering: true,
            notify_targets: true,
            appeal_url: None,
            log_dir: PathBuf::from("logs"),
        }
    }
}

impl BotSettings {
    /// Load settings from `path`, falling back to defaults when the file does
    /// not exist, then apply overrides from `env`. Runs before logging is up,
    /// so the caller reports the returned [`SettingsSource`].
    ///
    /// # Errors
    ///
    /// Fails on an unreadable or malformed file, or a zero/non-numeric owner id.
    pub fn load(
        path: &Path,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<(Self, SettingsSource), SettingsError> {
        let (mut settings, source) = match std::fs::read_to_string(path) {
            Ok(contents) if contents.trim().is_empty() => (Self::default(), SettingsSource::File),
            Ok(contents) => {
                let settings = serde_yaml::from_str::<Self>(&contents).map_err(|source| {
                    SettingsError::Yaml {
                        path: path.to_path_buf(),
                        source,
                    }
                })?;
                (settings, SettingsSource::File)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                (Self::default(), SettingsSource::Defaults)
            }
            Err(source) => {
                return Err(SettingsError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        if let Some(raw) = env(OWNER_ID_VAR) {
            settings.owner_id = Some(parse_owner_id(&raw)?);
        }
        if settings.owner_id == Some(0) {
            return Err(SettingsError::InvalidOwnerId("0".to_string()));
        }
        Ok((settings, source))
    }

    /// Settings file location, from `BOT_SETTINGS` or the default
    pub fn path(env: impl Fn(&str) -> Option<String>) -> PathBuf {
        env(SETTINGS_PATH_VAR).map_or_else(|| PathBuf::from(DEFAULT_SETTINGS_PATH), PathBuf::from)
    }
}

fn parse_owner_id(raw: &str) -> Result<u64, SettingsError> {
    raw.trim()
        .parse::<u64>()
        .ok()
        .filter(|id| *id != 0)
        .ok_or_else(|| SettingsError::InvalidOwnerId(raw.to_string()))
}

/// The bot token from `DISCORD_TOKEN`
///
/// # Errors
///
/// Fails when the variable is unset or blank.
pub fn discord_token(env: impl Fn(&str) -> Option<String>) -> Result<String, SettingsError> {
    env(TOKEN_VAR)
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
        .ok_or(SettingsError::MissingToken)
}
