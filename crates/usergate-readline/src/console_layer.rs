//! Tracing layer that surfaces warnings and errors in the console.
//!
//! Full logs go to the rolling file. Batch failures are logged rather than
//! returned, so this layer forwards `WARN` and `ERROR` events over a channel
//! and the REPL prints them before the next prompt.

use std::collections::BTreeMap;
use std::fmt;
use tokio::sync::mpsc;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::Context;

/// A forwarded log event.
#[derive(Debug, Clone)]
pub struct ConsoleEvent {
    pub level: Level,
    pub target: String,
    pub message: String,
    /// Structured fields other than the message, in name order.
    pub fields: BTreeMap<String, String>,
}

impl fmt::Display for ConsoleEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.level, self.message)?;
        for (name, value) in &self.fields {
            write!(f, " {}={}", name, value)?;
        }
        Ok(())
    }
}

pub struct ConsoleEventLayer {
    sender: mpsc::UnboundedSender<ConsoleEvent>,
}

impl ConsoleEventLayer {
    pub fn new(sender: mpsc::UnboundedSender<ConsoleEvent>) -> Self {
        Self { sender }
    }
}

impl<S> Layer<S> for ConsoleEventLayer
where
    S: Subscriber,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let level = *event.metadata().level();
        if level > Level::WARN {
            return;
        }

        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);

        // Receiver gone means the REPL has exited.
        let _ = self.sender.send(ConsoleEvent {
            level,
            target: event.metadata().target().to_string(),
            message: visitor.message,
            fields: visitor.fields,
        });
    }
}

#[derive(Default)]
struct FieldVisitor {
    message: String,
    fields: BTreeMap<String, String>,
}

impl Visit for FieldVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            self.fields.insert(field.name().to_string(), value.to_string());
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{:?}", value);
        } else {
            self.fields
                .insert(field.name().to_string(), format!("{:?}", value));
        }
    }
}
