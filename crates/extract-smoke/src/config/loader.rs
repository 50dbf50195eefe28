use std::path::{Path, PathBuf};

use reqwest::Url;

use crate::config::schema::SmokeConfig;
use crate::error::ConfigError;

pub const ENV_BACKEND_URL: &str = "EXTRACT_SMOKE_BACKEND_URL";
pub const ENV_PATIENT_ID: &str = "EXTRACT_SMOKE_PATIENT_ID";

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<SmokeConfig, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    load_config_from_str(&content)
}

pub fn load_config_from_str(content: &str) -> Result<SmokeConfig, ConfigError> {
    let config: SmokeConfig = serde_json::from_str(content)?;

    validate_config(&config)?;

    Ok(config)
}

/// `<platform config dir>/extract-smoke/config.json`, if the platform has one.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("extract-smoke").join("config.json"))
}

/// Applies `EXTRACT_SMOKE_*` environment variables on top of `config`.
pub fn apply_env_overrides(config: &mut SmokeConfig) -> Result<(), ConfigError> {
    if let Ok(url) = std::env::var(ENV_BACKEND_URL) {
        if !url.trim().is_empty() {
            config.backend_url = url.trim().to_string();
        }
    }

    if let Ok(raw) = std::env::var(ENV_PATIENT_ID) {
        config.patient_id = raw.trim().parse().map_err(|e| ConfigError::InvalidEnv {
            name: ENV_PATIENT_ID.to_string(),
            reason: format!("expected a non-negative integer: {}", e),
        })?;
    }

    Ok(())
}

pub fn validate_config(config: &SmokeConfig) -> Result<(), ConfigError> {
    let url = Url::parse(config.base_url()).map_err(|e| ConfigError::Validation {
        message: format!("Invalid backend URL '{}': {}", config.backend_url, e),
    })?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::Validation {
            message: format!(
                "Backend URL must use http or https, got '{}'",
                url.scheme()
            ),
        });
    }

    if config.health_timeout_secs == 0 {
        return Err(ConfigError::Validation {
            message: "health_timeout_secs must be greater than zero".to_string(),
        });
    }

    if config.request_timeout_secs == Some(0) {
        return Err(ConfigError::Validation {
            message: "request_timeout_secs must be greater than zero when set".to_string(),
        });
    }

    Ok(())
}
