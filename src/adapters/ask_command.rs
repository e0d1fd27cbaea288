//! The `ask` command: query an assistant built from the application's own commands

use std::io::Write;
use std::sync::Arc;

use anyhow::bail;
use clap::{Arg, ArgAction, Command};
use serde_json::Value;
use tokio::runtime::{self, Handle, RuntimeFlavor};
use tokio::task;
use tracing::debug;

use super::confirm::TerminalConfirmer;
use super::introspector::{describe_app, IntrospectionError};
use crate::agents::config::AssistantConfig;
use crate::agents::core::{AskOptions, Assistant};
use crate::agents::error::ApiResult;
use crate::agents::llm::{create_service, AssistantService};
use crate::cli::{CliApp, RegisteredCommand};
use crate::config::Settings;
use crate::domain::{Confirmer, ToolArgs, ToolDescriptor};

/// Builds the remote service client when `ask` actually runs
pub type ServiceFactory = Arc<dyn Fn() -> ApiResult<Arc<dyn AssistantService>> + Send + Sync>;

const ASK_ABOUT: &str =
    "Ask an assistant for help, optionally using other commands from this application.";

/// Dependencies of the `ask` command
#[derive(Clone)]
pub struct AskContext {
    pub service_factory: ServiceFactory,
    pub settings: Settings,
    pub confirmer: Arc<dyn Confirmer>,
}

impl AskContext {
    /// OpenAI client from `settings.openai`, confirmation on the terminal
    pub fn new(settings: Settings) -> Self {
        let openai = settings.openai.clone();
        Self {
            service_factory: Arc::new(move || create_service(&openai)),
            settings,
            confirmer: Arc::new(TerminalConfirmer::new()),
        }
    }

    pub fn with_service_factory<F>(mut self, factory: F) -> Self
    where
        F: Fn() -> ApiResult<Arc<dyn AssistantService>> + Send + Sync + 'static,
    {
        self.service_factory = Arc::new(factory);
        self
    }

    pub fn with_confirmer(mut self, confirmer: Arc<dyn Confirmer>) -> Self {
        self.confirmer = confirmer;
        self
    }
}

/// The clap definition of the `ask` command
pub fn ask_command(name: &str) -> Command {
    Command::new(name.to_string())
        .about(ASK_ABOUT)
        .arg(
            Arg::new("query")
                .required(true)
                .help("Question for the assistant"),
        )
        .arg(
            Arg::new("use_commands")
                .long("use-commands")
                .action(ArgAction::SetTrue)
                .overrides_with("no_use_commands")
                .help("Let the assistant run this application's commands (default)"),
        )
        .arg(
            Arg::new("no_use_commands")
                .long("no-use-commands")
                .action(ArgAction::SetTrue)
                .overrides_with("use_commands")
                .help("Answer without running any commands"),
        )
        .arg(
            Arg::new("confirm_commands")
                .long("confirm-commands")
                .action(ArgAction::SetTrue)
                .overrides_with("no_confirm_commands")
                .help("Ask before running commands (default)"),
        )
        .arg(
            Arg::new("no_confirm_commands")
                .long("no-confirm-commands")
                .action(ArgAction::SetTrue)
                .overrides_with("confirm_commands")
                .help("Run requested commands without asking"),
        )
        .arg(
            Arg::new("replace_assistant")
                .long("replace-assistant")
                .action(ArgAction::SetTrue)
                .help("Delete and recreate the remote assistant first"),
        )
}

/// Ask options and the replace flag from parsed `ask` arguments
pub fn ask_options(args: &ToolArgs) -> (AskOptions, bool) {
    let options = AskOptions::default()
        .with_use_commands(!args.flag("no_use_commands"))
        .with_confirm_commands(!args.flag("no_confirm_commands"));
    (options, args.flag("replace_assistant"))
}

/// Register the `ask` command on `app`.
///
/// The tools offered to the assistant are the app's commands at the time of
/// this call, so register it after every other command.
pub fn register_assistant(app: &mut CliApp, context: AskContext) -> Result<(), IntrospectionError> {
    let tools = describe_app(app)?;
    let app_name = app.name().to_string();
    let command_name = context.settings.assistant.command_name.clone();
    debug!(app = %app_name, tools = tools.len(), "Registering {} command", command_name);

    let context = Arc::new(context);
    let registered = RegisteredCommand::new(ask_command(&command_name), move |args, out| {
        run_ask(&context, &app_name, &tools, args, out)
    })
    .omit_from_assistant();
    app.register(registered);

    Ok(())
}

fn run_ask(
    context: &AskContext,
    app_name: &str,
    tools: &[ToolDescriptor],
    args: &ToolArgs,
    out: &mut dyn Write,
) -> anyhow::Result<Value> {
    let query = args.require("query")?;
    let (options, replace) = ask_options(args);

    let config = AssistantConfig::from_settings(&context.settings.assistant, app_name)
        .with_replace(replace || context.settings.assistant.replace);
    let service = (context.service_factory)()?;

    let confirmer = context.confirmer.clone();
    let ask = async move {
        let mut assistant =
            Assistant::new(service, config, tools.to_vec()).with_confirmer(confirmer);
        assistant.ask(query, options).await
    };

    let reply = match Handle::try_current() {
        // Embedded in an async host: borrow its runtime instead of nesting one
        Ok(handle) => match handle.runtime_flavor() {
            RuntimeFlavor::MultiThread => task::block_in_place(|| handle.block_on(ask))?,
            _ => bail!("`ask` called from async code needs a multi-thread tokio runtime"),
        },
        Err(_) => runtime::Builder::new_current_thread()
            .enable_all()
            .build()?
            .block_on(ask)?,
    };

    writeln!(out, "{}", reply)?;
    Ok(Value::Null)
}
