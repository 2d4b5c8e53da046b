use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{KingraphError, Result};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub kingraph: KingraphConfig,
}

/// Engine configuration: where the database lives and how loud to log.
#[derive(Debug, Clone, Deserialize)]
pub struct KingraphConfig {
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for KingraphConfig {
    fn default() -> Self {
        KingraphConfig {
            db_path: default_db_path(),
            log_level: default_log_level(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("kingraph.db")
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration.
    ///
    /// Loads environment variables from a .env file (if present) first, then
    /// reads the toml file named by `KINGRAPH_CONFIG` (default
    /// `./kingraph.toml`). A missing file yields the defaults; a present but
    /// malformed file is an error.
    pub fn load() -> Result<Self> {
        let _ = dotenv::dotenv();

        let config_path = std::env::var("KINGRAPH_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("kingraph.toml"));

        let config = if config_path.exists() {
            let config_str = std::fs::read_to_string(&config_path).map_err(|e| {
                KingraphError::Config(format!("read {}: {}", config_path.display(), e))
            })?;
            toml::from_str(&config_str).map_err(|e| {
                KingraphError::Config(format!("parse {}: {}", config_path.display(), e))
            })?
        } else {
            Config::default()
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    fn validate(&self) -> Result<()> {
        match self.kingraph.log_level.as_str() {
            "error" | "warn" | "info" | "debug" | "trace" => {}
            other => {
                return Err(KingraphError::Config(format!(
                    "log_level must be one of error/warn/info/debug/trace, got {:?}",
                    other
                )))
            }
        }
        if self.kingraph.db_path.as_os_str().is_empty() {
            return Err(KingraphError::Config(
                "db_path must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Get database path
    pub fn db_path(&self) -> &Path {
        &self.kingraph.db_path
    }

    /// Default log filter for the CLI, overridable with RUST_LOG.
    pub fn log_level(&self) -> &str {
        &self.kingraph.log_level
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Serialize config tests that mutate process-wide cwd and env so they don't race.
    static CONFIG_TEST_LOCK: Mutex<()> = Mutex::new(());

    /// Restores cwd when dropped (e.g. on panic).
    struct CwdGuard(std::path::PathBuf);
    impl Drop for CwdGuard {
        fn drop(&mut self) {
            let _ = std::env::set_current_dir(&self.0);
        }
    }

    fn with_config_env(value: Option<&Path>, f: impl FnOnce()) {
        let original = std::env::var("KINGRAPH_CONFIG").ok();
        match value {
            Some(path) => std::env::set_var("KINGRAPH_CONFIG", path),
            None => std::env::remove_var("KINGRAPH_CONFIG"),
        }
        f();
        match original {
            Some(val) => std::env::set_var("KINGRAPH_CONFIG", val),
            None => std::env::remove_var("KINGRAPH_CONFIG"),
        }
    }

    #[test]
    fn test_config_load_success() {
        let _lock = CONFIG_TEST_LOCK.lock().unwrap();
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("kingraph.toml");
        fs::write(
            &config_path,
            "[kingraph]\ndb_path = \"family.db\"\nlog_level = \"debug\"\n",
        )
        .unwrap();

        with_config_env(Some(&config_path), || {
            let config = Config::load().unwrap();
            assert_eq!(config.db_path(), Path::new("family.db"));
            assert_eq!(config.log_level(), "debug");
        });
    }

    #[test]
    fn test_config_defaults_when_file_absent() {
        let _lock = CONFIG_TEST_LOCK.lock().unwrap();
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("does-not-exist.toml");

        with_config_env(Some(&config_path), || {
            let config = Config::load().unwrap();
            assert_eq!(config.db_path(), Path::new("kingraph.db"));
            assert_eq!(config.log_level(), "info");
        });
    }

    #[test]
    fn test_config_partial_file_fills_defaults() {
        let _lock = CONFIG_TEST_LOCK.lock().unwrap();
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("kingraph.toml");
        fs::write(&config_path, "[kingraph]\nlog_level = \"warn\"\n").unwrap();

        with_config_env(Some(&config_path), || {
            let config = Config::load().unwrap();
            assert_eq!(config.db_path(), Path::new("kingraph.db"));
            assert_eq!(config.log_level(), "warn");
        });
    }

    #[test]
    fn test_config_rejects_unknown_log_level() {
        let _lock = CONFIG_TEST_LOCK.lock().unwrap();
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("kingraph.toml");
        fs::write(&config_path, "[kingraph]\nlog_level = \"loud\"\n").unwrap();

        with_config_env(Some(&config_path), || {
            let err = Config::load().unwrap_err();
            assert!(err.to_string().contains("log_level"), "got: {}", err);
        });
    }

    #[test]
    fn test_config_rejects_malformed_toml() {
        let _lock = CONFIG_TEST_LOCK.lock().unwrap();
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("kingraph.toml");
        fs::write(&config_path, "[kingraph\ndb_path = ").unwrap();

        with_config_env(Some(&config_path), || {
            assert!(Config::load().is_err());
        });
    }

    #[test]
    fn test_env_file_can_point_to_config() {
        let _lock = CONFIG_TEST_LOCK.lock().unwrap();
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join("custom.toml"),
            "[kingraph]\nlog_level = \"trace\"\n",
        )
        .unwrap();
        fs::write(temp_dir.path().join(".env"), "KINGRAPH_CONFIG=custom.toml\n").unwrap();

        let original_dir = std::env::current_dir().unwrap();
        let _cwd = CwdGuard(original_dir);
        std::env::set_current_dir(temp_dir.path()).unwrap();

        with_config_env(None, || {
            let config = Config::load().unwrap();
            assert_eq!(config.log_level(), "trace");
        });
    }
}
