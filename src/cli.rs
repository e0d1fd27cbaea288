//! Command-line application model
//!
//! clap commands carry no callbacks, so [`CliApp`] pairs each clap
//! [`Command`] with the action that runs it. The same actions are exposed to
//! the remote assistant through [`crate::adapters::introspector`].

use std::ffi::OsString;
use std::fmt;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use anyhow::{anyhow, bail};
use clap::{ArgAction, ArgMatches, Command};
use serde_json::Value;

use crate::domain::{ToolAction, ToolArgs};

/// Name used when none can be derived from the process arguments
const FALLBACK_PROGRAM_NAME: &str = "app";

/// Derive an application name from `argv[0]`
pub fn program_name() -> String {
    std::env::args_os()
        .next()
        .and_then(|arg0| {
            Path::new(&arg0)
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
        })
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| FALLBACK_PROGRAM_NAME.to_string())
}

/// A leaf command and the action bound to it
#[derive(Clone)]
pub struct RegisteredCommand {
    pub command: Command,
    pub action: Option<ToolAction>,
    /// Hide this command from the assistant's tool list
    pub omit_from_assistant: bool,
}

impl fmt::Debug for RegisteredCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisteredCommand")
            .field("name", &self.command.get_name())
            .field("has_action", &self.action.is_some())
            .field("omit_from_assistant", &self.omit_from_assistant)
            .finish()
    }
}

impl RegisteredCommand {
    pub fn new<F>(command: Command, action: F) -> Self
    where
        F: Fn(&ToolArgs, &mut dyn Write) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        Self {
            command,
            action: Some(Arc::new(action)),
            omit_from_assistant: false,
        }
    }

    /// A command with nothing bound to it; introspection rejects it
    pub fn without_action(command: Command) -> Self {
        Self {
            command,
            action: None,
            omit_from_assistant: false,
        }
    }

    pub fn omit_from_assistant(mut self) -> Self {
        self.omit_from_assistant = true;
        self
    }

    pub fn name(&self) -> &str {
        self.command.get_name()
    }
}

/// A named application: leaf commands plus nested command groups
#[derive(Debug, Clone)]
pub struct CliApp {
    name: String,
    about: Option<String>,
    commands: Vec<RegisteredCommand>,
    groups: Vec<CliApp>,
}

impl CliApp {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            about: None,
            commands: Vec::new(),
            groups: Vec::new(),
        }
    }

    pub fn about(mut self, about: impl Into<String>) -> Self {
        self.about = Some(about.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.about.as_deref()
    }

    pub fn commands(&self) -> &[RegisteredCommand] {
        &self.commands
    }

    pub fn groups(&self) -> &[CliApp] {
        &self.groups
    }

    /// Add a leaf command bound to `action`
    pub fn command<F>(&mut self, command: Command, action: F) -> &mut Self
    where
        F: Fn(&ToolArgs, &mut dyn Write) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        self.register(RegisteredCommand::new(command, action))
    }

    pub fn register(&mut self, command: RegisteredCommand) -> &mut Self {
        self.commands.push(command);
        self
    }

    /// Add a nested group; its name becomes the subcommand name
    pub fn group(&mut self, group: CliApp) -> &mut Self {
        self.groups.push(group);
        self
    }

    /// Build the clap command tree
    pub fn to_command(&self) -> Command {
        let mut command = Command::new(self.name.clone())
            .subcommand_required(true)
            .arg_required_else_help(true);
        if let Some(about) = &self.about {
            command = command.about(about.clone());
        }
        for registered in &self.commands {
            command = command.subcommand(registered.command.clone());
        }
        for group in &self.groups {
            command = command.subcommand(group.to_command());
        }
        command
    }

    /// Parse `argv` and run the selected command, writing its output to `out`.
    ///
    /// Returns the action's return value. Parse failures, including help and
    /// version requests, come back as a [`clap::Error`] inside the error.
    pub fn run_from<I, T>(&self, argv: I, out: &mut dyn Write) -> anyhow::Result<Value>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let matches = self.to_command().try_get_matches_from(argv)?;
        self.dispatch(&matches, out)
    }

    fn dispatch(&self, matches: &ArgMatches, out: &mut dyn Write) -> anyhow::Result<Value> {
        let (name, sub_matches) = matches
            .subcommand()
            .ok_or_else(|| anyhow!("no command given for {}", self.name))?;

        if let Some(registered) = self.commands.iter().find(|c| c.name() == name) {
            let action = registered
                .action
                .as_ref()
                .ok_or_else(|| anyhow!("command {} has no action", name))?;
            let args = arguments_from_matches(&registered.command, sub_matches);
            return action(&args, out);
        }

        if let Some(group) = self.groups.iter().find(|g| g.name == name) {
            return group.dispatch(sub_matches, out);
        }

        bail!("unknown command {}", name)
    }
}

/// Convert parsed clap arguments into tool arguments.
///
/// Flags become `"true"`/`"false"`, counters their count, and multiple
/// values are joined with commas. Help and version flags are skipped.
pub fn arguments_from_matches(command: &Command, matches: &ArgMatches) -> ToolArgs {
    let mut args = ToolArgs::new();

    for arg in command.get_arguments() {
        let id = arg.get_id().as_str();
        match arg.get_action() {
            ArgAction::Help | ArgAction::HelpShort | ArgAction::HelpLong | ArgAction::Version => {}
            ArgAction::SetTrue | ArgAction::SetFalse => {
                if let Ok(Some(value)) = matches.try_get_one::<bool>(id) {
                    args.insert(id, value.to_string());
                }
            }
            ArgAction::Count => {
                if let Ok(Some(count)) = matches.try_get_one::<u8>(id) {
                    args.insert(id, count.to_string());
                }
            }
            _ => {
                if let Ok(Some(values)) = matches.try_get_raw(id) {
                    let joined = values
                        .map(|v| v.to_string_lossy().into_owned())
                        .collect::<Vec<_>>()
                        .join(",");
                    args.insert(id, joined);
                }
            }
        }
    }

    args
}
