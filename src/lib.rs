//! # cmdassist - command-line applications as assistant tools
//!
//! cmdassist exposes the commands of a command-line application as function
//! tools to a remotely hosted conversational assistant, and runs the
//! assistant's turn loop: post a query, poll the run, execute requested
//! commands locally and feed their output back until the run completes.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use cmdassist::adapters::ask_command::{register_assistant, AskContext};
//! use cmdassist::cli::CliApp;
//! use cmdassist::config::Settings;
//! use clap::{Arg, Command};
//! use serde_json::Value;
//! use std::io::Write;
//!
//! fn main() -> anyhow::Result<()> {
//!     let mut app = CliApp::new("demo");
//!     app.command(
//!         Command::new("say_hello").arg(Arg::new("name").required(true)),
//!         |args, out| {
//!             writeln!(out, "Hello, {}!", args.require("name")?)?;
//!             Ok(Value::Null)
//!         },
//!     );
//!
//!     // Register last: the assistant sees the commands present now
//!     register_assistant(&mut app, AskContext::new(Settings::new()?))?;
//!
//!     app.run_from(std::env::args_os(), &mut std::io::stdout())?;
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - **Domain**: Tool descriptors, tool calls and remote wire types
//! - **CLI**: clap commands paired with their actions
//! - **Adapters**: Introspection, confirmation and the `ask` command
//! - **Agents**: Remote service client and the run loop
//! - **Config**: Layered settings

pub mod adapters;
pub mod agents;
pub mod cli;
pub mod config;
pub mod domain;
