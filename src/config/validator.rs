use thiserror::Error;

use crate::config::{AssistantSettings, OpenAiSettings, Settings};

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

pub struct ConfigValidator;

impl ConfigValidator {
    pub fn validate(settings: &Settings) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if let Err(e) = Self::validate_assistant(&settings.assistant) {
            errors.extend(e);
        }

        if let Err(e) = Self::validate_openai(&settings.openai) {
            errors.extend(e);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn validate_assistant(assistant: &AssistantSettings) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if assistant.model.trim().is_empty() {
            errors.push(ValidationError::MissingField("assistant.model".to_string()));
        }

        if assistant.command_name.trim().is_empty() {
            errors.push(ValidationError::MissingField("assistant.command_name".to_string()));
        } else if assistant.command_name.contains(char::is_whitespace) {
            errors.push(ValidationError::InvalidValue {
                field: "assistant.command_name".to_string(),
                reason: "Command name must not contain whitespace".to_string(),
            });
        }

        if matches!(&assistant.name, Some(name) if name.trim().is_empty()) {
            errors.push(ValidationError::InvalidValue {
                field: "assistant.name".to_string(),
                reason: "Name must not be empty when set".to_string(),
            });
        }

        if assistant.max_iterations == 0 {
            errors.push(ValidationError::InvalidValue {
                field: "assistant.max_iterations".to_string(),
                reason: "At least one status check is required".to_string(),
            });
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn validate_openai(openai: &OpenAiSettings) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if openai.base_url.trim().is_empty() {
            errors.push(ValidationError::MissingField("openai.base_url".to_string()));
        } else if !openai.base_url.starts_with("http://") && !openai.base_url.starts_with("https://") {
            errors.push(ValidationError::InvalidValue {
                field: "openai.base_url".to_string(),
                reason: "Base URL must start with http:// or https://".to_string(),
            });
        }

        if openai.api_key.is_none() && openai.api_key_env.trim().is_empty() {
            errors.push(ValidationError::MissingField("openai.api_key_env".to_string()));
        }

        if openai.timeout_secs == 0 {
            errors.push(ValidationError::InvalidValue {
                field: "openai.timeout_secs".to_string(),
                reason: "Timeout must be greater than 0".to_string(),
            });
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
