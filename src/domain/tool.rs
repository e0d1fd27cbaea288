//! Tool descriptors for locally invocable commands
//!
//! A [`ToolDescriptor`] binds a command's structural description (name,
//! description, parameters) to the callable that runs it, and renders the
//! function-tool schema the remote assistant consumes.

use std::collections::BTreeMap;
use std::fmt;
use std::io::Write;
use std::sync::Arc;

use anyhow::anyhow;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// Description used when a command or parameter has no help text
pub const NO_DESCRIPTION: &str = "No description available";

/// Callable bound to a tool.
///
/// The writer is the action's standard output: the process stdout when run
/// from the command line, a per-invocation buffer when run for the assistant.
/// `Value::Null` means the action has no return value.
pub type ToolAction = Arc<dyn Fn(&ToolArgs, &mut dyn Write) -> anyhow::Result<Value> + Send + Sync>;

/// A single named parameter of a tool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterSpec {
    pub name: String,
    pub description: String,
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    /// Allowed values, in declaration order
    #[serde(default, rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<String>>,
}

impl ParameterSpec {
    /// Create an optional parameter with no default
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            required: false,
            default: None,
            enum_values: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }

    /// Restrict the parameter to a set of values. An empty set clears the restriction.
    pub fn with_enum<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values: Vec<String> = values.into_iter().map(Into::into).collect();
        self.enum_values = if values.is_empty() { None } else { Some(values) };
        self
    }
}

/// Named string arguments passed to a tool action
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolArgs(BTreeMap<String, String>);

impl ToolArgs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the JSON argument payload sent by the remote assistant.
    ///
    /// Strings are taken as-is, other scalars by their JSON text, and `null`
    /// entries are dropped. A blank payload means no arguments.
    pub fn parse(payload: &str) -> serde_json::Result<Self> {
        if payload.trim().is_empty() {
            return Ok(Self::default());
        }

        let object: Map<String, Value> = serde_json::from_str(payload)?;
        let mut args = Self::default();
        for (name, value) in object {
            match value {
                Value::Null => {}
                Value::String(s) => args.insert(name, s),
                other => args.insert(name, other.to_string()),
            }
        }
        Ok(args)
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// Get an argument that must be present
    pub fn require(&self, name: &str) -> anyhow::Result<&str> {
        self.get(name)
            .ok_or_else(|| anyhow!("missing required argument '{}'", name))
    }

    /// Interpret an argument as a boolean flag; absent means false
    pub fn flag(&self, name: &str) -> bool {
        self.get(name)
            .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "true" | "1" | "yes"))
            .unwrap_or(false)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl fmt::Display for ToolArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (name, value)) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}={:?}", name, value)?;
        }
        Ok(())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ToolArgs {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// A locally invocable command described for the remote assistant
#[derive(Clone)]
pub struct ToolDescriptor {
    /// Dotted hierarchical name, e.g. `app.group.command`
    pub name: String,
    pub description: String,
    pub parameters: Vec<ParameterSpec>,
    action: ToolAction,
}

impl fmt::Debug for ToolDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolDescriptor")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("parameters", &self.parameters)
            .finish_non_exhaustive()
    }
}

impl ToolDescriptor {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: Vec<ParameterSpec>,
        action: ToolAction,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters,
            action,
        }
    }

    /// Create a descriptor from a plain closure
    pub fn from_fn<F>(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: Vec<ParameterSpec>,
        action: F,
    ) -> Self
    where
        F: Fn(&ToolArgs, &mut dyn Write) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        Self::new(name, description, parameters, Arc::new(action))
    }

    pub fn parameter(&self, name: &str) -> Option<&ParameterSpec> {
        self.parameters.iter().find(|p| p.name == name)
    }

    pub fn action(&self) -> &ToolAction {
        &self.action
    }

    /// Run the bound action, writing its output to `out`.
    ///
    /// Absent parameters take their declared default; a missing required
    /// parameter fails before the action runs.
    pub fn invoke(&self, args: &ToolArgs, out: &mut dyn Write) -> anyhow::Result<Value> {
        let mut effective = args.clone();
        for param in &self.parameters {
            if effective.contains(&param.name) {
                continue;
            }
            match (&param.default, param.required) {
                (Some(default), _) => effective.insert(param.name.clone(), default.clone()),
                (None, true) => {
                    return Err(anyhow!(
                        "missing required argument '{}' for {}",
                        param.name,
                        self.name
                    ))
                }
                (None, false) => {}
            }
        }

        (self.action)(&effective, out)
    }

    /// Render the function-tool schema sent to the remote assistant.
    ///
    /// Every parameter is typed as a string. `enum` is attached in a second
    /// pass and only when non-empty.
    pub fn to_schema(&self) -> Value {
        let properties: Map<String, Value> = self
            .parameters
            .iter()
            .map(|param| {
                (
                    param.name.clone(),
                    json!({
                        "type": "string",
                        "description": param.description,
                        "default": param.default.as_deref().unwrap_or("None"),
                    }),
                )
            })
            .collect();

        let required: Vec<&str> = self
            .parameters
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name.as_str())
            .collect();

        let mut schema = json!({
            "type": "function",
            "function": {
                "name": self.name,
                "description": self.description,
                "parameters": {
                    "type": "object",
                    "properties": properties,
                    "required": required,
                }
            }
        });

        for param in &self.parameters {
            if let Some(values) = param.enum_values.as_ref().filter(|v| !v.is_empty()) {
                schema["function"]["parameters"]["properties"][&param.name]["enum"] = json!(values);
            }
        }

        schema
    }
}
