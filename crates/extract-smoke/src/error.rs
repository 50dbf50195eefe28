use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SmokeError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    #[error("Backend not available: {0}")]
    BackendUnavailable(#[source] BackendError),

    #[error("Failed to write fixture '{path}': {source}")]
    Fixture {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write report '{path}': {source}")]
    Report {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed entry for field '{field}': {source}")]
    MalformedField {
        field: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config JSON: {0}")]
    ParseJson(#[from] serde_json::Error),

    #[error("Config validation failed: {message}")]
    Validation { message: String },

    #[error("Invalid environment variable '{name}': {reason}")]
    InvalidEnv { name: String, reason: String },
}

/// Request stage, used to label transport and decode failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Upload,
    Process,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::Upload => "upload",
            Stage::Process => "process",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Failed to create HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),

    #[error("Backend not reachable at {url}: {source}")]
    Unreachable {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Backend health check returned {status}")]
    Unhealthy { status: u16 },

    #[error("Upload failed: {status}")]
    UploadFailed { status: u16, body: String },

    #[error("Processing failed: {status}")]
    ProcessFailed { status: u16, body: String },

    #[error("Failed to read upload file '{path}': {source}")]
    ReadUpload {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{stage} request failed: {source}")]
    Transport {
        stage: Stage,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to decode {stage} response: {source}")]
    Decode {
        stage: Stage,
        #[source]
        source: reqwest::Error,
    },
}

impl BackendError {
    /// Response body attached to an HTTP failure, if any.
    pub fn body(&self) -> Option<&str> {
        match self {
            BackendError::UploadFailed { body, .. } | BackendError::ProcessFailed { body, .. } => {
                Some(body)
            }
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, SmokeError>;
