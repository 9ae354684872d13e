use std::borrow::Cow::{self, Borrowed, Owned};

use colored::Colorize;
use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Helper};

use crate::app::{Console, LineKind};
use crate::commands::SLASH_COMMANDS;

/// Console that writes colored lines to stdout.
#[derive(Debug, Default)]
pub struct StdoutConsole;

impl Console for StdoutConsole {
    fn print(&mut self, kind: LineKind, text: &str) {
        let styled = match kind {
            LineKind::User => text.green(),
            LineKind::Assistant => text.bright_blue(),
            LineKind::Info => text.bright_black(),
            LineKind::Warning => text.yellow(),
            LineKind::Error => text.red(),
        };
        println!("{styled}");
    }
}

/// Slash-command completion and hints for the input line.
#[derive(Debug, Clone, Default)]
pub struct CommandHelper;

impl Helper for CommandHelper {}

impl Completer for CommandHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let line = &line[..pos];
        if !line.starts_with('/') || line.contains(' ') {
            return Ok((0, Vec::new()));
        }

        let candidates = SLASH_COMMANDS
            .iter()
            .filter(|command| command.starts_with(line))
            .map(|command| Pair {
                display: (*command).to_string(),
                replacement: (*command).to_string(),
            })
            .collect();
        Ok((0, candidates))
    }
}

impl Highlighter for CommandHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if line.starts_with('/') {
            Owned(line.bright_cyan().to_string())
        } else {
            Borrowed(line)
        }
    }

    fn highlight_hint<'h>(&self, hint: &'h str) -> Cow<'h, str> {
        Owned(hint.bright_black().to_string())
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Hinter for CommandHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        let line = &line[..pos];
        if !line.starts_with('/') || line.contains(' ') {
            return None;
        }

        SLASH_COMMANDS
            .iter()
            .find(|command| command.starts_with(line) && command.len() > line.len())
            .map(|command| command[line.len()..].to_string())
    }
}

impl Validator for CommandHelper {}
