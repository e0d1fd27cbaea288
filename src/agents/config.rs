//! Configuration for a single assistant instance

use std::time::Duration;

use crate::config::{AssistantSettings, DEFAULT_INSTRUCTIONS};

/// Number of status checks before a waiting run is abandoned
pub const MAX_RUN_ITERATIONS: u32 = 20;

/// Wait before each status check; the remote side is never done immediately
pub const RUN_ITERATION_SLEEP: Duration = Duration::from_secs(3);

/// Model used when creating assistants
pub const DEFAULT_MODEL: &str = "gpt-4-1106-preview";

/// Configuration for an [`Assistant`](crate::agents::core::Assistant)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssistantConfig {
    /// Display name; remote assistants are looked up by it
    pub name: String,
    /// System-level behaviour prompt
    pub instructions: String,
    /// Delete and recreate any remote assistant with the same name
    pub replace: bool,
    pub model: String,
    pub poll_interval: Duration,
    pub max_iterations: u32,
}

impl AssistantConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            instructions: DEFAULT_INSTRUCTIONS.to_string(),
            replace: false,
            model: DEFAULT_MODEL.to_string(),
            poll_interval: RUN_ITERATION_SLEEP,
            max_iterations: MAX_RUN_ITERATIONS,
        }
    }

    /// Build from settings; `fallback_name` is used when no name is configured
    pub fn from_settings(settings: &AssistantSettings, fallback_name: &str) -> Self {
        Self {
            name: settings
                .name
                .clone()
                .unwrap_or_else(|| fallback_name.to_string()),
            instructions: settings.instructions.clone(),
            replace: settings.replace,
            model: settings.model.clone(),
            poll_interval: Duration::from_secs(settings.poll_interval_secs),
            max_iterations: settings.max_iterations,
        }
    }

    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = instructions.into();
        self
    }

    pub fn with_replace(mut self, replace: bool) -> Self {
        self.replace = replace;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: u32) -> Self {
        self.max_iterations = max_iterations;
        self
    }
}
