//! Command introspection: describe a [`CliApp`] as tool descriptors
//!
//! Every leaf command becomes one [`ToolDescriptor`] named by its dotted
//! path, e.g. `app.group.command`. Groups are walked recursively after the
//! leaf commands of each level.

use std::collections::HashSet;

use clap::{Arg, ArgAction, Command};
use thiserror::Error;

use crate::cli::{CliApp, RegisteredCommand};
use crate::domain::{ParameterSpec, ToolDescriptor, NO_DESCRIPTION};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum IntrospectionError {
    /// A command that should be exposed has nothing bound to it
    #[error("Command {0} has no action")]
    MissingCallback(String),

    #[error("Duplicate tool name: {0}")]
    DuplicateTool(String),

    #[error("Duplicate parameter {parameter} in {tool}")]
    DuplicateParameter { tool: String, parameter: String },
}

/// Describe every exposed command of `app`, prefixed with the app name
pub fn describe_app(app: &CliApp) -> Result<Vec<ToolDescriptor>, IntrospectionError> {
    describe_commands(app, app.name())
}

/// Describe every exposed command of `app` under `prefix`
pub fn describe_commands(
    app: &CliApp,
    prefix: &str,
) -> Result<Vec<ToolDescriptor>, IntrospectionError> {
    let mut tools = Vec::new();
    collect(app, prefix, &mut tools)?;

    let mut seen = HashSet::new();
    for tool in &tools {
        if !seen.insert(tool.name.as_str()) {
            return Err(IntrospectionError::DuplicateTool(tool.name.clone()));
        }
    }

    Ok(tools)
}

fn collect(
    app: &CliApp,
    prefix: &str,
    tools: &mut Vec<ToolDescriptor>,
) -> Result<(), IntrospectionError> {
    for registered in app.commands() {
        if registered.omit_from_assistant {
            continue;
        }
        tools.push(describe_command(registered, prefix)?);
    }

    for group in app.groups() {
        let group_prefix = format!("{}.{}", prefix, normalize(group.name()));
        collect(group, &group_prefix, tools)?;
    }

    Ok(())
}

fn describe_command(
    registered: &RegisteredCommand,
    prefix: &str,
) -> Result<ToolDescriptor, IntrospectionError> {
    let name = format!("{}.{}", prefix, normalize(registered.command.get_name()));

    let action = registered
        .action
        .clone()
        .ok_or_else(|| IntrospectionError::MissingCallback(name.clone()))?;

    // clap rejects duplicate ids while building, so check them first
    let mut seen: Vec<&str> = Vec::new();
    for arg in registered.command.get_arguments() {
        let id = arg.get_id().as_str();
        if seen.contains(&id) {
            return Err(IntrospectionError::DuplicateParameter {
                tool: name,
                parameter: id.to_string(),
            });
        }
        seen.push(id);
    }

    // Action-derived defaults only exist on a built command
    let mut command = registered.command.clone();
    command.build();

    let parameters: Vec<ParameterSpec> = command
        .get_arguments()
        .filter(|arg| !is_builtin(arg))
        .map(describe_argument)
        .collect();

    Ok(ToolDescriptor::new(
        name,
        command_description(&command),
        parameters,
        action,
    ))
}

fn describe_argument(arg: &Arg) -> ParameterSpec {
    let description = arg
        .get_help()
        .or_else(|| arg.get_long_help())
        .map(|help| help.to_string())
        .unwrap_or_else(|| NO_DESCRIPTION.to_string());

    let default = arg
        .get_default_values()
        .first()
        .map(|value| value.to_string_lossy().into_owned());

    let mut parameter = ParameterSpec::new(arg.get_id().as_str(), description);
    if arg.is_required_set() && default.is_none() {
        parameter = parameter.required();
    }
    if let Some(default) = default {
        parameter = parameter.with_default(default);
    }

    let values = arg
        .get_possible_values()
        .into_iter()
        .filter(|value| !value.is_hide_set())
        .map(|value| value.get_name().to_string());
    parameter.with_enum(values)
}

fn command_description(command: &Command) -> String {
    command
        .get_about()
        .or_else(|| command.get_long_about())
        .map(|about| about.to_string())
        .unwrap_or_else(|| NO_DESCRIPTION.to_string())
}

fn is_builtin(arg: &Arg) -> bool {
    matches!(
        arg.get_action(),
        ArgAction::Help | ArgAction::HelpShort | ArgAction::HelpLong | ArgAction::Version
    )
}

/// Command names may use dashes; tool names use underscores
fn normalize(name: &str) -> String {
    name.replace('-', "_")
}
