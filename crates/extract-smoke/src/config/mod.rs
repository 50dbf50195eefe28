pub mod loader;
pub mod schema;

pub use loader::{
    apply_env_overrides, default_config_path, load_config, load_config_from_str, validate_config,
    ENV_BACKEND_URL, ENV_PATIENT_ID,
};
pub use schema::{SmokeConfig, DEFAULT_BACKEND_URL};
