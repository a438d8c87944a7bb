//! Startup configuration, loaded once from a JSON file.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use teloxide::types::UserId;

/// Errors that can occur when loading configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to read the config file.
    ReadFile { path: PathBuf, source: std::io::Error },
    /// Failed to parse JSON.
    ParseJson { path: PathBuf, source: serde_json::Error },
    /// Validation error.
    Validation(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReadFile { path, source } => {
                write!(f, "failed to read config file '{}': {}", path.display(), source)
            }
            Self::ParseJson { path, source } => {
                write!(f, "failed to parse config file '{}': {}", path.display(), source)
            }
            Self::Validation(msg) => write!(f, "config validation error: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ReadFile { source, .. } => Some(source),
            Self::ParseJson { source, .. } => Some(source),
            Self::Validation(_) => None,
        }
    }
}

#[derive(Deserialize)]
struct ConfigFile {
    telegram_bot_token: String,
    /// GitHub token with gist scope.
    gist_token: String,
    /// The single operator allowed to delete gists.
    owner_id: u64,
    /// Create public gists instead of secret ones.
    #[serde(default)]
    public_gists: bool,
    /// Override for the gist file name.
    gist_title: Option<String>,
    /// Override for the gist description.
    gist_description: Option<String>,
    /// Leading characters recognized as command prefixes.
    #[serde(default = "default_command_prefixes")]
    command_prefixes: Vec<String>,
    /// Directory for state files (logs). Defaults to current directory.
    data_dir: Option<String>,
}

fn default_command_prefixes() -> Vec<String> {
    vec!["/".to_string(), ".".to_string()]
}

pub struct Config {
    pub telegram_bot_token: String,
    pub gist_token: String,
    /// The single operator allowed to delete gists.
    pub owner_id: UserId,
    pub public_gists: bool,
    pub gist_title: Option<String>,
    pub gist_description: Option<String>,
    pub command_prefixes: Vec<char>,
    /// Directory for state files (logs).
    pub data_dir: PathBuf,
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let config_path = path.as_ref().to_path_buf();
        let content = std::fs::read_to_string(&config_path)
            .map_err(|e| ConfigError::ReadFile { path: config_path.clone(), source: e })?;
        let file: ConfigFile = serde_json::from_str(&content)
            .map_err(|e| ConfigError::ParseJson { path: config_path.clone(), source: e })?;

        // Validate required fields
        if file.telegram_bot_token.is_empty() {
            return Err(ConfigError::Validation("telegram_bot_token is required".into()));
        }
        // Telegram tokens are formatted as {bot_id}:{secret} where bot_id is numeric
        let token_parts: Vec<&str> = file.telegram_bot_token.split(':').collect();
        if token_parts.len() != 2 || token_parts[0].parse::<u64>().is_err() || token_parts[1].is_empty() {
            return Err(ConfigError::Validation(
                "telegram_bot_token appears invalid (expected format: 123456789:ABCdefGHI...)".into()
            ));
        }
        if file.gist_token.is_empty() {
            return Err(ConfigError::Validation("gist_token is required".into()));
        }
        if file.owner_id == 0 {
            return Err(ConfigError::Validation("owner_id must be a real Telegram user id".into()));
        }
        if file.command_prefixes.is_empty() {
            return Err(ConfigError::Validation("command_prefixes must not be empty".into()));
        }
        let command_prefixes = file
            .command_prefixes
            .iter()
            .map(|prefix| {
                let mut chars = prefix.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Ok(c),
                    _ => Err(ConfigError::Validation(format!(
                        "command prefix '{prefix}' must be a single character"
                    ))),
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        let data_dir = file
            .data_dir
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));

        Ok(Self {
            telegram_bot_token: file.telegram_bot_token,
            gist_token: file.gist_token,
            owner_id: UserId(file.owner_id),
            public_gists: file.public_gists,
            gist_title: file.gist_title,
            gist_description: file.gist_description,
            command_prefixes,
            data_dir,
        })
    }

    pub fn is_owner(&self, user_id: UserId) -> bool {
        self.owner_id == user_id
    }
}
