use std::io::{self, Write};
use std::process::ExitCode;

use clap::{Arg, Command};
use cmdassist::adapters::ask_command::{register_assistant, AskContext};
use cmdassist::cli::CliApp;
use cmdassist::config::Settings;
use serde_json::{json, Value};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    // Logs go to stderr; stdout is command output
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if let Some(clap_error) = e.downcast_ref::<clap::Error>() {
                clap_error.exit();
            }
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> anyhow::Result<()> {
    let settings = Settings::new()?;
    let mut app = build_app();

    // Registered last so the assistant sees every other command
    register_assistant(&mut app, AskContext::new(settings))?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let value = app.run_from(std::env::args_os(), &mut out)?;
    match value {
        Value::Null => {}
        Value::String(s) => writeln!(out, "{}", s)?,
        other => writeln!(out, "{}", other)?,
    }
    Ok(())
}

fn build_app() -> CliApp {
    let mut math = CliApp::new("math").about("Arithmetic helpers");
    math.command(
        Command::new("add")
            .about("Add two integers")
            .arg(Arg::new("a").required(true).help("First operand"))
            .arg(Arg::new("b").required(true).help("Second operand")),
        |args, _| {
            let a: i64 = args.require("a")?.parse()?;
            let b: i64 = args.require("b")?.parse()?;
            Ok(json!(a + b))
        },
    );

    let mut app = CliApp::new("cmdassist").about("Demonstration application for cmdassist");
    app.command(
        Command::new("say_hello")
            .about("Greet someone by name")
            .arg(Arg::new("name").required(true).help("Name of the person to greet")),
        |args, out| {
            writeln!(out, "Hello, {}!", args.require("name")?)?;
            Ok(Value::Null)
        },
    );
    app.command(
        Command::new("whoami").about("Print the name of the current user"),
        |_, out| {
            let user = std::env::var("USER")
                .or_else(|_| std::env::var("USERNAME"))
                .unwrap_or_else(|_| "unknown".to_string());
            writeln!(out, "{}", user)?;
            Ok(Value::Null)
        },
    );
    app.group(math);
    app
}
