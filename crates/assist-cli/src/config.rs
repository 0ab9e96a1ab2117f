//! Configuration file support

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration for assist
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Chat settings
    pub chat: ChatConfig,
    /// Usage downloader settings
    pub usage: UsageConfig,
}

/// `[chat]` section
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Server hosting `/api/chat-stream`
    pub base_url: Option<String>,
    /// Token budget for each request window
    pub token_budget: Option<usize>,
    /// History file location
    pub history_path: Option<String>,
    /// Tokenizer used for windowing (gpt3, estimate)
    pub tokenizer: Option<String>,
}

/// `[usage]` section
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UsageConfig {
    /// API host (default: https://api.openai.com)
    pub base_url: Option<String>,
    /// Authorization key or `Bearer ...` value
    pub authorization: Option<String>,
    /// Organization id
    pub organization: Option<String>,
}

/// Default chat server
pub const DEFAULT_CHAT_URL: &str = "http://localhost:3000";

impl Config {
    /// Get the config directory
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("ai-assist")
    }

    /// Get the data directory (chat history)
    pub fn data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("ai-assist")
    }

    /// Get the config file path
    pub fn config_path() -> PathBuf {
        if let Ok(path) = std::env::var("AI_ASSIST_CONFIG_PATH") {
            return PathBuf::from(path);
        }
        Self::config_dir().join("config.toml")
    }

    /// Load config from the default location
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    /// Load config from `path`, falling back to defaults on any problem
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!("Failed to parse config file {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!("Failed to read config file {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Save config to `path`
    pub fn save_to(&self, path: &Path) -> std::io::Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let content = toml::to_string_pretty(self).map_err(std::io::Error::other)?;
        fs::write(path, content)
    }

    /// Create a default config file if it doesn't exist
    pub fn init() -> std::io::Result<PathBuf> {
        let path = Self::config_path();
        if path.exists() {
            return Ok(path);
        }

        let default_config = Config {
            chat: ChatConfig {
                base_url: Some(DEFAULT_CHAT_URL.to_string()),
                token_budget: Some(assist_chat::window::DEFAULT_TOKEN_BUDGET),
                history_path: None,
                tokenizer: Some("gpt3".to_string()),
            },
            usage: UsageConfig::default(),
        };

        default_config.save_to(&path)?;
        Ok(path)
    }

    /// Where the chat history lives
    pub fn history_path(&self) -> PathBuf {
        self.chat
            .history_path
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| {
                Self::data_dir().join(format!("{}.json", assist_chat::store::HISTORY_KEY))
            })
    }

    /// Authorization for the usage endpoint: flag, then config, then env
    pub fn authorization(
        &self,
        flag: Option<String>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Option<String> {
        flag.or_else(|| self.usage.authorization.clone())
            .or_else(|| env("OPENAI_API_KEY"))
    }

    /// Organization for the usage endpoint: flag, then config, then env
    pub fn organization(
        &self,
        flag: Option<String>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Option<String> {
        flag.or_else(|| self.usage.organization.clone())
            .or_else(|| env("OPENAI_ORGANIZATION"))
    }
}

/// Process environment lookup for credential fallbacks
pub fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Generate example config content
pub fn example_config() -> &'static str {
    r#"# ai-assist configuration file
# Place at ~/.config/ai-assist/config.toml (Linux) or set AI_ASSIST_CONFIG_PATH

[chat]
# Server exposing POST /api/chat-stream
base_url = "http://localhost:3000"

# Maximum tokens of history sent with each message
token_budget = 3000

# Tokenizer used to measure history (gpt3, estimate)
tokenizer = "gpt3"

# History file (optional, defaults to the local data directory)
# history_path = "~/.local/share/ai-assist/ai-assist-chat-history.json"

[usage]
# base_url = "https://api.openai.com"
# It's recommended to use OPENAI_API_KEY / OPENAI_ORGANIZATION instead
# authorization = "sk-..."
# organization = "org-..."
"#
}
