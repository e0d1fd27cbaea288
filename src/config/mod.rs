use std::path::Path;

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

pub mod validator;

/// Config file read when `CMDASSIST_CONFIG` is not set
pub const DEFAULT_CONFIG_FILE: &str = "cmdassist.toml";

/// Environment variable naming an alternative config file
pub const CONFIG_PATH_ENV: &str = "CMDASSIST_CONFIG";

/// Prefix for environment overrides, e.g. `CMDASSIST_ASSISTANT__MODEL`
pub const ENV_PREFIX: &str = "CMDASSIST";

pub const DEFAULT_INSTRUCTIONS: &str = "The agent is an interface to a command line application. \
The tools available correspond to its commands. Please help the user with their queries, \
executing commands as needed. Be concise, but don't shorten the function names even if they \
look like file paths.";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Settings {
    #[serde(default)]
    pub assistant: AssistantSettings,
    #[serde(default)]
    pub openai: OpenAiSettings,
}

/// Behaviour of the remote assistant and the run loop
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AssistantSettings {
    /// Display name of the remote assistant; defaults to the application name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default = "default_instructions")]
    pub instructions: String,
    /// Delete and recreate an existing assistant of the same name
    #[serde(default)]
    pub replace: bool,
    #[serde(default = "default_model")]
    pub model: String,
    /// Seconds to wait before each run status check
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
    /// Status checks allowed while waiting on the remote side
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,
    /// Name of the command registered on the application
    #[serde(default = "default_command_name")]
    pub command_name: String,
}

impl Default for AssistantSettings {
    fn default() -> Self {
        Self {
            name: None,
            instructions: default_instructions(),
            replace: false,
            model: default_model(),
            poll_interval_secs: default_poll_interval(),
            max_iterations: default_max_iterations(),
            command_name: default_command_name(),
        }
    }
}

/// Connection to the OpenAI API
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OpenAiSettings {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Environment variable containing the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    /// API key; takes precedence over `api_key_env`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Per-request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl Default for OpenAiSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key_env: default_api_key_env(),
            api_key: None,
            timeout_secs: default_timeout(),
        }
    }
}

fn default_instructions() -> String {
    DEFAULT_INSTRUCTIONS.to_string()
}

fn default_model() -> String {
    "gpt-4-1106-preview".to_string()
}

fn default_poll_interval() -> u64 {
    3
}

fn default_max_iterations() -> u32 {
    20
}

fn default_command_name() -> String {
    "ask".to_string()
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

fn default_timeout() -> u64 {
    60
}

impl Settings {
    /// Load settings from `$CMDASSIST_CONFIG` or `cmdassist.toml`, then the environment
    pub fn new() -> Result<Self, anyhow::Error> {
        let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        Self::from_path(path)
    }

    /// Load settings from an optional file, overridden by `CMDASSIST_*` variables
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, anyhow::Error> {
        let s = Config::builder()
            .add_source(File::from(path.as_ref()).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        let settings: Settings = s.try_deserialize()?;

        validator::ConfigValidator::validate(&settings).map_err(|errors| {
            let error_messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            anyhow::anyhow!(
                "Configuration validation failed:\n{}",
                error_messages.join("\n")
            )
        })?;

        Ok(settings)
    }
}
