use std::borrow::Cow::{self, Borrowed, Owned};

use colored::Colorize;
use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Helper};

use crate::command::COMMANDS;

/// Rustyline helper: command completion, highlighting, and hints.
#[derive(Clone)]
pub struct CliHelper {
    commands: Vec<&'static str>,
}

impl CliHelper {
    pub fn new() -> Self {
        Self {
            commands: COMMANDS.iter().map(|(name, _)| *name).collect(),
        }
    }

    fn matching<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = &'static str> + 'a {
        self.commands
            .iter()
            .copied()
            .filter(move |command| command.starts_with(prefix))
    }
}

impl Helper for CliHelper {}

impl Completer for CliHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let line = &line[..pos];

        if line.starts_with('/') && !line.contains(' ') {
            let candidates = self
                .matching(line)
                .map(|command| Pair {
                    display: command.to_string(),
                    replacement: command.to_string(),
                })
                .collect();
            Ok((0, candidates))
        } else {
            Ok((0, vec![]))
        }
    }
}

impl Highlighter for CliHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if line.starts_with('/') {
            Owned(line.bright_cyan().to_string())
        } else {
            Borrowed(line)
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Hinter for CliHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        let line = &line[..pos];

        if line.starts_with('/') && !line.contains(' ') {
            self.matching(line)
                .find(|command| command.len() > line.len())
                .map(|command| command[line.len()..].to_string())
        } else {
            None
        }
    }
}

impl Validator for CliHelper {}
