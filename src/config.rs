//! Configuration file parser for `catalogo.toml`.
//!
//! The config file is optional; a missing file yields `Config::default()`.
//! Unknown keys do not fail the load; each one is logged with a warning so
//! typos show up at startup.
//!
//! Environment variables (`PORT`, `DATABASE_PATH`) override the file; CLI
//! flags override both and are applied by `main`.
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Config file too large: {0}")]
    TooLarge(String),

    #[error("Invalid value for environment variable {name}: {value}")]
    Env { name: &'static str, value: String },
}

// ============================================================================
// Configuration Structs
// ============================================================================

/// Top-level service configuration.
///
/// All fields use `#[serde(default)]` so any subset of keys can be specified.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
}

/// Address the HTTP listener binds to.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

/// SQLite location and connection pool tuning.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Database file path, or `:memory:`.
    pub path: String,

    pub max_connections: u32,

    /// Seconds to wait for a free pooled connection before failing the request.
    pub acquire_timeout_secs: u64,

    /// Seconds an unused connection stays open.
    pub idle_timeout_secs: u64,

    /// Milliseconds SQLite waits on a locked database before returning SQLITE_BUSY.
    pub busy_timeout_ms: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: "catalogo.db".to_string(),
            max_connections: 5,
            acquire_timeout_secs: 2,
            idle_timeout_secs: 30,
            busy_timeout_ms: 5000,
        }
    }
}

impl Config {
    /// Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    /// Load configuration from a TOML file.
    ///
    /// - Missing file → `Ok(Config::default())`
    /// - Empty file → `Ok(Config::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)` with line number info
    /// - Unknown keys → accepted and logged as a warning
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > Self::MAX_FILE_SIZE => {
                return Err(ConfigError::TooLarge(format!(
                    "Config file is {} bytes (max {} bytes)",
                    meta.len(),
                    Self::MAX_FILE_SIZE
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
            Ok(_) => {}
        }

        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                // File deleted between metadata and read
                tracing::debug!(path = %path.display(), "Config file disappeared, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };

        if content.trim().is_empty() {
            tracing::debug!(path = %path.display(), "Config file is empty, using defaults");
            return Ok(Self::default());
        }

        if let Ok(raw) = content.parse::<toml::Table>() {
            warn_unknown_keys(&raw);
        }

        let config: Config = toml::from_str(&content)?;
        tracing::info!(
            path = %path.display(),
            port = config.server.port,
            database = %config.database.path,
            "Loaded configuration"
        );
        Ok(config)
    }

    /// Apply `PORT` and `DATABASE_PATH` from the process environment.
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|name| std::env::var(name).ok())
    }

    /// Apply overrides from any variable source. Split out so tests need not
    /// touch the real process environment.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup("PORT") {
            self.server.port = port.trim().parse().map_err(|_| ConfigError::Env {
                name: "PORT",
                value: port.clone(),
            })?;
        }
        if let Some(path) = lookup("DATABASE_PATH") {
            if !path.trim().is_empty() {
                self.database.path = path;
            }
        }
        Ok(())
    }
}

fn warn_unknown_keys(raw: &toml::Table) {
    const SECTIONS: [(&str, &[&str]); 2] = [
        ("server", &["host", "port"]),
        (
            "database",
            &[
                "path",
                "max_connections",
                "acquire_timeout_secs",
                "idle_timeout_secs",
                "busy_timeout_ms",
            ],
        ),
    ];

    for (key, value) in raw {
        let Some((_, known)) = SECTIONS.iter().find(|(name, _)| *name == key.as_str()) else {
            tracing::warn!(key = %key, "Unknown key in config file, ignoring");
            continue;
        };
        if let Some(table) = value.as_table() {
            for inner in table.keys() {
                if !known.contains(&inner.as_str()) {
                    tracing::warn!(section = %key, key = %inner, "Unknown key in config file, ignoring");
                }
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn write_config(name: &str, content: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("catalogo_config_test_{name}"));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("catalogo.toml");
        std::fs::write(&path, content).unwrap();
        path
    }

    fn cleanup(path: &Path) {
        if let Some(dir) = path.parent() {
            std::fs::remove_dir_all(dir).ok();
        }
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.database.path, "catalogo.db");
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.database.acquire_timeout_secs, 2);
        assert_eq!(config.database.idle_timeout_secs, 30);
    }

    #[test]
    fn test_missing_file_returns_default() {
        let path = Path::new("/tmp/catalogo_test_nonexistent_config.toml");
        let config = Config::load(path).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_empty_file_returns_default() {
        let path = write_config("empty", "   \n  ");
        let config = Config::load(&path).unwrap();
        assert_eq!(config, Config::default());
        cleanup(&path);
    }

    #[test]
    fn test_partial_config_uses_defaults_for_missing() {
        let path = write_config("partial", "[server]\nport = 8080\n");
        let config = Config::load(&path).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "127.0.0.1"); // default
        assert_eq!(config.database, DatabaseConfig::default());
        cleanup(&path);
    }

    #[test]
    fn test_full_config() {
        let content = r#"
[server]
host = "0.0.0.0"
port = 9000

[database]
path = "/var/lib/catalogo/data.db"
max_connections = 12
acquire_timeout_secs = 7
idle_timeout_secs = 60
busy_timeout_ms = 250
"#;
        let path = write_config("full", content);
        let config = Config::load(&path).unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.database.path, "/var/lib/catalogo/data.db");
        assert_eq!(config.database.max_connections, 12);
        assert_eq!(config.database.acquire_timeout_secs, 7);
        assert_eq!(config.database.idle_timeout_secs, 60);
        assert_eq!(config.database.busy_timeout_ms, 250);
        cleanup(&path);
    }

    #[test]
    fn test_invalid_toml_returns_error() {
        let path = write_config("invalid", "this is not [valid toml");
        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
        assert!(err.to_string().contains("Invalid TOML"));
        cleanup(&path);
    }

    #[test]
    fn test_unknown_keys_accepted() {
        let content = r#"
totally_fake_key = "should not fail"

[server]
port = 4000
colour = "blue"
"#;
        let path = write_config("unknown", content);
        let config = Config::load(&path).unwrap();
        assert_eq!(config.server.port, 4000);
        cleanup(&path);
    }

    #[test]
    fn test_wrong_type_returns_error() {
        let path = write_config("wrongtype", "[server]\nport = \"eighty\"\n");
        assert!(Config::load(&path).is_err());
        cleanup(&path);
    }

    #[test]
    fn test_too_large_file_rejected() {
        let path = write_config("too_large", &"#".repeat(1_048_577));
        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::TooLarge(_)));
        assert!(err.to_string().contains("too large"));
        cleanup(&path);
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> =
            HashMap::from([("PORT", "8081"), ("DATABASE_PATH", "/tmp/other.db")]);
        let mut config = Config::default();
        config
            .apply_overrides(|name| vars.get(name).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.server.port, 8081);
        assert_eq!(config.database.path, "/tmp/other.db");
    }

    #[test]
    fn test_env_override_rejects_bad_port() {
        let mut config = Config::default();
        let err = config
            .apply_overrides(|name| (name == "PORT").then(|| "not-a-port".to_string()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Env { name: "PORT", .. }));
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn test_env_override_ignores_blank_path() {
        let mut config = Config::default();
        config
            .apply_overrides(|name| (name == "DATABASE_PATH").then(|| "  ".to_string()))
            .unwrap();
        assert_eq!(config.database.path, "catalogo.db");
    }
}
