//! Configuration
//!
//! A single YAML file (explicit, workspace-level or user-level) merged with
//! command-line overrides and the API key from the environment.

mod error;
mod file;

pub use error::{ConfigError, ConfigResult};
pub use file::{
    user_config_path, workspace_config_path, ChatConfig, ConfigLevel, ConfigOverrides, ModelSettings,
    ServerSettings, API_KEY_ENV_VARS, DEFAULT_API_KEY, DEFAULT_MODEL, DEFAULT_PROVIDER,
};
