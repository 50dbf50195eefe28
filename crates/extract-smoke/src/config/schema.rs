use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:5003";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SmokeConfig {
    #[serde(default = "default_backend_url")]
    pub backend_url: String,
    #[serde(default = "default_patient_id")]
    pub patient_id: u64,
    #[serde(default = "default_health_timeout_secs")]
    pub health_timeout_secs: u64,
    /// Upload and process calls are unbounded unless this is set.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
    #[serde(default = "default_fixture_dir")]
    pub fixture_dir: PathBuf,
}

fn default_backend_url() -> String {
    DEFAULT_BACKEND_URL.to_string()
}

fn default_patient_id() -> u64 {
    1
}

fn default_health_timeout_secs() -> u64 {
    5
}

fn default_fixture_dir() -> PathBuf {
    PathBuf::from(".")
}

impl Default for SmokeConfig {
    fn default() -> Self {
        Self {
            backend_url: default_backend_url(),
            patient_id: default_patient_id(),
            health_timeout_secs: default_health_timeout_secs(),
            request_timeout_secs: None,
            fixture_dir: default_fixture_dir(),
        }
    }
}

impl SmokeConfig {
    /// Base URL without a trailing slash, ready for path joining.
    pub fn base_url(&self) -> &str {
        self.backend_url.trim_end_matches('/')
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url(), path.trim_start_matches('/'))
    }

    pub fn health_timeout(&self) -> Duration {
        Duration::from_secs(self.health_timeout_secs)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}
