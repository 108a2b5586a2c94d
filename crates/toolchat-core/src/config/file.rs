//! File-based configuration (YAML)
//!
//! Looked up at an explicit path, then workspace-level
//! (.config/toolchat/config.yaml), then user-level
//! (~/.config/toolchat/config.yaml). Without any file the built-in defaults
//! apply.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::error::{ConfigError, ConfigResult};
use crate::providers::{CompletionOptions, ProviderModelConfig, DEFAULT_API_BASE};

pub const DEFAULT_PROVIDER: &str = "openai";
pub const DEFAULT_MODEL: &str = "qwen3:4b";
pub const DEFAULT_API_KEY: &str = "ollama";

/// Environment variables checked for an API key, in order
pub const API_KEY_ENV_VARS: [&str; 2] = ["TOOLCHAT_API_KEY", "OPENAI_API_KEY"];

/// Where the effective configuration came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigLevel {
    /// Path given on the command line
    Explicit,
    /// Workspace-level config (.config/toolchat/config.yaml in the working directory)
    Workspace,
    /// User-level config (~/.config/toolchat/config.yaml)
    User,
    /// No file found
    Default,
}

impl ConfigLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigLevel::Explicit => "explicit",
            ConfigLevel::Workspace => "workspace",
            ConfigLevel::User => "user",
            ConfigLevel::Default => "default",
        }
    }
}

/// Model endpoint settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelSettings {
    /// Provider ID (`openai`-compatible or `mock`)
    pub provider: String,
    pub model: String,
    pub api_base: String,
    pub api_key: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            provider: DEFAULT_PROVIDER.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            api_key: Some(DEFAULT_API_KEY.to_string()),
            temperature: None,
            max_tokens: None,
        }
    }
}

/// How to reach the tool server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Program to spawn; the running executable when unset
    pub command: Option<String>,
    pub args: Vec<String>,
    /// Streamable HTTP endpoint; takes precedence over `command`
    pub url: Option<String>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            command: None,
            args: vec!["serve".to_string()],
            url: None,
        }
    }
}

/// Command-line values that override the file
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub provider: Option<String>,
    pub model: Option<String>,
    pub api_base: Option<String>,
    /// Program followed by its arguments
    pub server_command: Vec<String>,
    pub server_url: Option<String>,
    pub system_prompt: Option<String>,
}

/// Configuration file structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ChatConfig {
    pub model: ModelSettings,
    pub server: ServerSettings,
    pub system_prompt: Option<String>,
}

impl ChatConfig {
    /// Parse a YAML document; missing keys take their defaults
    pub fn from_yaml(content: &str) -> ConfigResult<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: ChatConfig = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config file that must exist
    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Find and load the effective config
    ///
    /// An explicit path must exist. Otherwise the first existing file of
    /// workspace and user level wins.
    pub fn discover(explicit: Option<&Path>, workspace_root: &Path) -> ConfigResult<(Self, ConfigLevel)> {
        if let Some(path) = explicit {
            return Ok((Self::from_file(path)?, ConfigLevel::Explicit));
        }

        let candidates = [
            (workspace_config_path(workspace_root), ConfigLevel::Workspace),
            (user_config_path(), ConfigLevel::User),
        ];
        for (path, level) in candidates {
            if path.exists() {
                return Ok((Self::from_file(&path)?, level));
            }
        }

        Ok((Self::default(), ConfigLevel::Default))
    }

    /// Write the config as YAML, creating parent directories
    pub fn save(&self, path: impl AsRef<Path>) -> ConfigResult<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_yaml()?)?;
        Ok(())
    }

    pub fn to_yaml(&self) -> ConfigResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Check values that YAML typing cannot
    pub fn validate(&self) -> ConfigResult<()> {
        if self.model.model.trim().is_empty() {
            return Err(ConfigError::Invalid("model.model must not be empty".to_string()));
        }
        if self.model.api_base.trim().is_empty() {
            return Err(ConfigError::Invalid("model.api_base must not be empty".to_string()));
        }
        if let Some(t) = self.model.temperature {
            if !(0.0..=2.0).contains(&t) {
                return Err(ConfigError::Invalid(format!(
                    "model.temperature must be between 0.0 and 2.0, got {}",
                    t
                )));
            }
        }
        Ok(())
    }

    /// Apply command-line overrides
    pub fn merge_cli(&mut self, overrides: &ConfigOverrides) {
        if let Some(provider) = &overrides.provider {
            self.model.provider = provider.clone();
        }
        if let Some(model) = &overrides.model {
            self.model.model = model.clone();
        }
        if let Some(api_base) = &overrides.api_base {
            self.model.api_base = api_base.clone();
        }
        if let Some((program, args)) = overrides.server_command.split_first() {
            self.server.command = Some(program.clone());
            self.server.args = args.to_vec();
            self.server.url = None;
        }
        if let Some(url) = &overrides.server_url {
            self.server.url = Some(url.clone());
        }
        if let Some(prompt) = &overrides.system_prompt {
            self.system_prompt = Some(prompt.clone());
        }
    }

    /// Take the API key from the environment when one is set
    pub fn apply_env(&mut self) {
        self.apply_api_key_from(|name| std::env::var(name).ok());
    }

    fn apply_api_key_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(key) = API_KEY_ENV_VARS
            .iter()
            .filter_map(|name| lookup(name))
            .find(|value| !value.is_empty())
        {
            self.model.api_key = Some(key);
        }
    }

    /// Model settings in the provider's terms
    pub fn provider_model(&self) -> ProviderModelConfig {
        let mut config = ProviderModelConfig::new(&self.model.model).with_api_base(&self.model.api_base);
        if let Some(key) = &self.model.api_key {
            config = config.with_api_key(key);
        }
        config
    }

    /// Sampling options
    pub fn completion_options(&self) -> CompletionOptions {
        let mut options = CompletionOptions::new();
        if let Some(t) = self.model.temperature {
            options = options.with_temperature(t);
        }
        if let Some(max) = self.model.max_tokens {
            options = options.with_max_tokens(max);
        }
        options
    }
}

/// User-level config path (~/.config/toolchat/config.yaml)
pub fn user_config_path() -> PathBuf {
    // XDG config directory (~/.config on Linux, ~/Library/Application Support on macOS)
    let config_dir = dirs::config_dir()
        .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")).join(".config"));
    config_dir.join("toolchat").join("config.yaml")
}

/// Workspace-level config path (.config/toolchat/config.yaml)
pub fn workspace_config_path(workspace_root: impl AsRef<Path>) -> PathBuf {
    workspace_root.as_ref().join(".config").join("toolchat").join("config.yaml")
}
