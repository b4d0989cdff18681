//! Configuration types.
//!
//! These are plain serde structures; loading them from a TOML file and the
//! process environment is the job of `customflow_infrastructure::ConfigService`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Default chat-completion endpoint.
pub const DEFAULT_AI_BASE_URL: &str = "https://api.openai.com/v1/chat/completions";
/// Default vision-capable model.
pub const DEFAULT_AI_MODEL: &str = "gpt-4o";

/// Where orders and audit records are persisted.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Postgres,
    /// Process-local storage, lost on restart. Meant for development and tests.
    Memory,
}

/// Log output style, selected by the release/debug mode flag.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    #[default]
    Debug,
    Release,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub name: String,
    pub max_connections: u32,
    /// Run `schema.sql` before verifying the required tables.
    pub apply_schema: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5432,
            user: "customflow".to_string(),
            password: String::new(),
            name: "customflow".to_string(),
            max_connections: 10,
            apply_schema: false,
        }
    }
}

/// Static settings of the OCR/chat gateway.
///
/// `temperature` and `max_tokens` are only the initial values; the gateway
/// keeps the live copy and lets callers adjust it at runtime.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct AiSettings {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub temperature: f64,
    pub max_tokens: u32,
    pub timeout_secs: u64,
}

impl AiSettings {
    /// True when a non-blank credential is configured.
    pub fn has_api_key(&self) -> bool {
        self.api_key
            .as_deref()
            .is_some_and(|key| !key.trim().is_empty())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

impl Default for AiSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_AI_MODEL.to_string(),
            base_url: DEFAULT_AI_BASE_URL.to_string(),
            temperature: 0.7,
            max_tokens: 1000,
            timeout_secs: 60,
        }
    }
}

/// Root configuration of the server process.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
    pub mode: RunMode,
    pub upload_dir: PathBuf,
    pub storage: StorageBackend,
    pub database: DatabaseConfig,
    pub ai: AiSettings,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 7070,
            mode: RunMode::Debug,
            upload_dir: PathBuf::from("./uploads"),
            storage: StorageBackend::Postgres,
            database: DatabaseConfig::default(),
            ai: AiSettings::default(),
        }
    }
}
