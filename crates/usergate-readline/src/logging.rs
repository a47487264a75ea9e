use crate::console_layer::{ConsoleEvent, ConsoleEventLayer};
use anyhow::{Context, Result};
use std::path::Path;
use tokio::sync::mpsc;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Installs the global subscriber.
///
/// `RUST_LOG` wins over `level`. Events go to a daily file under `logs_dir`;
/// warnings and errors are also sent to the returned receiver. Keep the
/// guard alive until exit so buffered lines are flushed.
pub fn init(level: &str, logs_dir: &Path) -> Result<(WorkerGuard, mpsc::UnboundedReceiver<ConsoleEvent>)> {
    std::fs::create_dir_all(logs_dir)
        .with_context(|| format!("Failed to create log directory {}", logs_dir.display()))?;

    let appender = tracing_appender::rolling::daily(logs_dir, "usergate.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .with_context(|| format!("Invalid log filter '{}'", level))?;

    let (sender, receiver) = mpsc::unbounded_channel();

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .with(ConsoleEventLayer::new(sender))
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok((guard, receiver))
}
