mod app;
mod cli;
mod command;
mod console_layer;
mod helper;
mod logging;

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use rustyline::Editor;
use rustyline::error::ReadlineError;
use tokio::sync::mpsc;
use tracing::Level;

use usergate_infrastructure::paths::UsergatePaths;
use usergate_infrastructure::{Backend, ConfigService};

use crate::app::{App, Flow};
use crate::cli::Args;
use crate::command::Command;
use crate::console_layer::ConsoleEvent;
use crate::helper::CliHelper;

/// Prints warnings and errors logged since the last prompt.
fn drain_events(events: &mut mpsc::UnboundedReceiver<ConsoleEvent>) {
    while let Ok(event) = events.try_recv() {
        let line = event.to_string();
        if event.level == Level::ERROR {
            eprintln!("{}", line.red());
        } else {
            eprintln!("{}", line.yellow());
        }
    }
}

/// Lines carrying passwords stay out of the history.
fn is_secret(line: &str) -> bool {
    line.starts_with("/login") || line.starts_with("/signup")
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // ===== Configuration =====
    let config_service = match &args.config {
        Some(path) => ConfigService::with_path(path.clone()),
        None => ConfigService::new()?,
    };
    let mut config = config_service.get_config()?;
    args.apply(&mut config);

    // ===== Logging =====
    let logs_dir = UsergatePaths::logs_dir()?;
    let (_log_guard, mut events) = logging::init(&config.logging.level, &logs_dir)?;
    tracing::info!(
        config = %config_service.path().display(),
        backend = ?config.backend.kind,
        "Starting usergate"
    );

    // ===== Backend =====
    let backend = Backend::from_config(&config)?;
    let mut app = App::new(backend, &config);

    // ===== REPL Setup =====
    let mut rl = Editor::new()?;
    rl.set_helper(Some(CliHelper::new()));

    println!("{}", "=== usergate ===".bright_magenta().bold());
    println!("{}", "Type /help for commands, /quit to exit.".bright_black());
    println!();
    app.enter().await;

    // ===== Main REPL Loop =====
    loop {
        drain_events(&mut events);
        let readline = rl.readline(&app.prompt());

        match readline {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                if !is_secret(trimmed) {
                    let _ = rl.add_history_entry(trimmed);
                }

                match Command::parse(trimmed) {
                    Ok(command) => {
                        if app.handle(command).await == Flow::Quit {
                            println!("{}", "Goodbye!".bright_green());
                            break;
                        }
                    }
                    Err(e) => println!("{}", e.to_string().yellow()),
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("{}", "CTRL-C detected. Type /quit to exit.".yellow());
            }
            Err(ReadlineError::Eof) => {
                println!("{}", "CTRL-D detected. Exiting...".bright_green());
                break;
            }
            Err(err) => {
                eprintln!("{}", format!("Error: {:?}", err).red());
                break;
            }
        }
    }

    drain_events(&mut events);
    tracing::info!("usergate exiting");
    Ok(())
}
