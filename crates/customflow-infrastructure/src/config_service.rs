//! Configuration service implementation.
//!
//! Loads [`ServerConfig`] from an optional TOML file and then applies
//! environment overrides. Variable lookup goes through a caller-supplied
//! function so tests never touch the process environment.

use customflow_core::config::{RunMode, ServerConfig, StorageBackend};
use customflow_core::error::{CustomFlowError, Result};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Variable naming the optional TOML configuration file.
pub const CONFIG_PATH_VAR: &str = "CUSTOMFLOW_CONFIG";

/// Configuration loader.
pub struct ConfigService<F> {
    lookup: F,
}

impl ConfigService<fn(&str) -> Option<String>> {
    /// A loader reading the process environment.
    pub fn from_env() -> Self {
        fn read(key: &str) -> Option<String> {
            std::env::var(key).ok()
        }
        Self { lookup: read }
    }
}

impl<F> ConfigService<F>
where
    F: Fn(&str) -> Option<String>,
{
    pub fn new(lookup: F) -> Self {
        Self { lookup }
    }

    /// Loads the full configuration.
    ///
    /// Reads the file named by `CUSTOMFLOW_CONFIG` when set, falling back to
    /// defaults otherwise, then applies every environment override.
    pub fn load(&self) -> Result<ServerConfig> {
        let mut config = match self.var(CONFIG_PATH_VAR) {
            Some(path) => Self::load_file(Path::new(&path))?,
            None => ServerConfig::default(),
        };
        self.apply_overrides(&mut config)?;
        Ok(config)
    }

    /// Parses a TOML configuration file. Missing keys keep their defaults.
    pub fn load_file(path: &Path) -> Result<ServerConfig> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            CustomFlowError::config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Ok(toml::from_str(&content)?)
    }

    fn apply_overrides(&self, config: &mut ServerConfig) -> Result<()> {
        if let Some(port) = self.parsed::<u16>("PORT")? {
            config.port = port;
        }
        if let Some(mode) = self.var("APP_MODE") {
            config.mode = match mode.to_ascii_lowercase().as_str() {
                "release" | "production" => RunMode::Release,
                _ => RunMode::Debug,
            };
        }
        if let Some(dir) = self.var("UPLOAD_DIR") {
            config.upload_dir = PathBuf::from(dir);
        }
        if let Some(backend) = self.var("STORAGE_BACKEND") {
            config.storage = match backend.to_ascii_lowercase().as_str() {
                "postgres" => StorageBackend::Postgres,
                "memory" => StorageBackend::Memory,
                other => {
                    return Err(CustomFlowError::config(format!(
                        "STORAGE_BACKEND must be postgres or memory, got '{other}'"
                    )));
                }
            };
        }

        let db = &mut config.database;
        if let Some(host) = self.var("DB_HOST") {
            db.host = host;
        }
        if let Some(port) = self.parsed::<u16>("DB_PORT")? {
            db.port = port;
        }
        if let Some(user) = self.var("DB_USER") {
            db.user = user;
        }
        if let Some(password) = self.var("DB_PASSWORD") {
            db.password = password;
        }
        if let Some(name) = self.var("DB_NAME") {
            db.name = name;
        }
        if let Some(apply) = self.parsed::<bool>("DB_APPLY_SCHEMA")? {
            db.apply_schema = apply;
        }

        let ai = &mut config.ai;
        if let Some(key) = self.var("OPENAI_API_KEY") {
            ai.api_key = Some(key);
        }
        if let Some(model) = self.var("OPENAI_MODEL_NAME") {
            ai.model = model;
        }
        if let Some(url) = self.var("OPENAI_BASE_URL") {
            ai.base_url = url;
        }
        if let Some(secs) = self.parsed::<u64>("AI_TIMEOUT_SECS")? {
            ai.timeout_secs = secs;
        }
        Ok(())
    }

    /// Non-empty value of a variable.
    fn var(&self, key: &str) -> Option<String> {
        (self.lookup)(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn parsed<T: FromStr>(&self, key: &str) -> Result<Option<T>> {
        self.var(key)
            .map(|raw| {
                raw.parse::<T>()
                    .map_err(|_| CustomFlowError::config(format!("{key} has invalid value '{raw}'")))
            })
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn service(vars: &[(&str, &str)]) -> ConfigService<impl Fn(&str) -> Option<String>> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ConfigService::new(move |key: &str| map.get(key).cloned())
    }

    #[test]
    fn test_defaults_without_variables() {
        let config = service(&[]).load().unwrap();
        assert_eq!(config, ServerConfig::default());
    }

    #[test]
    fn test_environment_overrides() {
        let config = service(&[
            ("PORT", "9000"),
            ("APP_MODE", "release"),
            ("STORAGE_BACKEND", "memory"),
            ("DB_HOST", "db.internal"),
            ("DB_APPLY_SCHEMA", "true"),
            ("OPENAI_API_KEY", "sk-test"),
            ("OPENAI_MODEL_NAME", "gpt-4o-mini"),
            ("AI_TIMEOUT_SECS", "5"),
        ])
        .load()
        .unwrap();

        assert_eq!(config.port, 9000);
        assert_eq!(config.mode, RunMode::Release);
        assert_eq!(config.storage, StorageBackend::Memory);
        assert_eq!(config.database.host, "db.internal");
        assert!(config.database.apply_schema);
        assert!(config.ai.has_api_key());
        assert_eq!(config.ai.model, "gpt-4o-mini");
        assert_eq!(config.ai.timeout_secs, 5);
    }

    #[test]
    fn test_invalid_values_are_config_errors() {
        let err = service(&[("PORT", "eighty")]).load().unwrap_err();
        assert!(matches!(err, CustomFlowError::Config(_)));

        let err = service(&[("STORAGE_BACKEND", "sqlite")]).load().unwrap_err();
        assert!(matches!(err, CustomFlowError::Config(_)));
    }

    #[test]
    fn test_file_then_environment() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "port = 8081\nupload_dir = \"/data/up\"\n[database]\nname = \"orders\"").unwrap();
        let path = file.path().to_string_lossy().to_string();

        let config = service(&[(CONFIG_PATH_VAR, &path), ("PORT", "8082")])
            .load()
            .unwrap();

        assert_eq!(config.port, 8082);
        assert_eq!(config.upload_dir, PathBuf::from("/data/up"));
        assert_eq!(config.database.name, "orders");
        assert_eq!(config.database.user, "customflow");
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let err = service(&[(CONFIG_PATH_VAR, "/nonexistent/customflow.toml")])
            .load()
            .unwrap_err();
        assert!(matches!(err, CustomFlowError::Config(_)));
    }
}
