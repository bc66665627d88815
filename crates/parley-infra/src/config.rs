//! Configuration loader for Parley.
//!
//! Reads `config.toml` from the data directory (`~/.parley/` in production)
//! and deserializes it into [`ParleyConfig`]. The implicit file falls back to
//! defaults when missing or malformed; an explicitly named file must load.

use std::path::{Path, PathBuf};

use secrecy::SecretString;

use parley_types::config::{BackendConfig, ParleyConfig};
use parley_types::error::ConfigError;

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "PARLEY_DATA_DIR";

const CONFIG_FILE_NAME: &str = "config.toml";

/// Resolve the data directory.
///
/// `$PARLEY_DATA_DIR` wins, then `~/.parley`, then `./.parley`.
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
        return PathBuf::from(dir);
    }

    if let Some(home) = dirs::home_dir() {
        return home.join(".parley");
    }

    PathBuf::from(".parley")
}

/// Load configuration from `{data_dir}/config.toml`.
///
/// - If the file does not exist, returns [`ParleyConfig::default()`].
/// - If the file exists but fails to read or parse, logs a warning and
///   returns the default.
pub async fn load_config(data_dir: &Path) -> ParleyConfig {
    let config_path = data_dir.join(CONFIG_FILE_NAME);

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config.toml found at {}, using defaults", config_path.display());
            return ParleyConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", config_path.display());
            return ParleyConfig::default();
        }
    };

    match toml::from_str::<ParleyConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(
                "Failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            ParleyConfig::default()
        }
    }
}

/// Load configuration from an explicitly named file. Errors are fatal.
pub async fn load_config_file(path: &Path) -> Result<ParleyConfig, ConfigError> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

    toml::from_str(&content).map_err(|e| ConfigError::Parse {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

/// Read the backend API key from the environment variable the config names.
///
/// Blank values count as unset.
pub fn read_api_key(backend: &BackendConfig) -> Option<SecretString> {
    if backend.api_key_env.is_empty() {
        return None;
    }
    std::env::var(&backend.api_key_env)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map(SecretString::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley_types::chat::PromptFormat;
    use parley_types::config::BackendKind;
    use secrecy::ExposeSecret;
    use tempfile::TempDir;

    #[tokio::test]
    async fn load_config_missing_file_returns_default() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(tmp.path()).await;
        assert_eq!(config, ParleyConfig::default());
    }

    #[tokio::test]
    async fn load_config_valid_toml_returns_parsed() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(
            tmp.path().join("config.toml"),
            r#"
window_size = 4

[format]
kind = "zephyr"

[backend]
kind = "ollama"
base_url = "http://localhost:11434"
model = "tinyllama"
"#,
        )
        .await
        .unwrap();

        let config = load_config(tmp.path()).await;
        assert_eq!(config.window_size, 4);
        assert_eq!(config.format, PromptFormat::Zephyr);
        assert_eq!(config.backend.kind, BackendKind::Ollama);
        assert_eq!(config.backend.model, "tinyllama");
    }

    #[tokio::test]
    async fn load_config_invalid_toml_returns_default() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(tmp.path().join("config.toml"), "this is not { valid toml !!!")
            .await
            .unwrap();

        let config = load_config(tmp.path()).await;
        assert_eq!(config, ParleyConfig::default());
    }

    #[tokio::test]
    async fn load_config_file_missing_is_error() {
        let tmp = TempDir::new().unwrap();
        let result = load_config_file(&tmp.path().join("nope.toml")).await;
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }

    #[tokio::test]
    async fn load_config_file_invalid_is_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("bad.toml");
        tokio::fs::write(&path, "window_size = \"many\"").await.unwrap();
        let result = load_config_file(&path).await;
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[tokio::test]
    async fn load_config_file_valid() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("custom.toml");
        tokio::fs::write(&path, "window_size = 7").await.unwrap();
        let config = load_config_file(&path).await.unwrap();
        assert_eq!(config.window_size, 7);
    }

    #[test]
    fn test_resolve_data_dir_from_env() {
        // SAFETY: This test is single-threaded and restores the env var immediately.
        unsafe {
            std::env::set_var(DATA_DIR_ENV, "/tmp/test-parley");
        }
        let dir = resolve_data_dir();
        assert_eq!(dir, PathBuf::from("/tmp/test-parley"));
        unsafe {
            std::env::remove_var(DATA_DIR_ENV);
        }
    }

    #[test]
    fn test_read_api_key() {
        let backend = BackendConfig {
            api_key_env: "PARLEY_TEST_API_KEY_READ".to_string(),
            ..Default::default()
        };
        // SAFETY: The variable name is unique to this test.
        unsafe {
            std::env::set_var("PARLEY_TEST_API_KEY_READ", "sk-test");
        }
        let key = read_api_key(&backend).unwrap();
        assert_eq!(key.expose_secret(), "sk-test");

        unsafe {
            std::env::set_var("PARLEY_TEST_API_KEY_READ", "  ");
        }
        assert!(read_api_key(&backend).is_none());
        unsafe {
            std::env::remove_var("PARLEY_TEST_API_KEY_READ");
        }

        let no_env = BackendConfig {
            api_key_env: String::new(),
            ..Default::default()
        };
        assert!(read_api_key(&no_env).is_none());
    }
}
