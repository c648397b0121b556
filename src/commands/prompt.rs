//! Line input for interactive commands.

use std::borrow::Cow;

use rustyline::completion::Completer;
use rustyline::config::Configurer;
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{ColorMode, DefaultEditor, Editor, Helper};

use crate::error::{LinklensError, Result};

fn finish(line: std::result::Result<String, ReadlineError>) -> Result<String> {
    match line {
        Ok(line) => Ok(line),
        Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
            Err(LinklensError::Validation("input cancelled".to_string()).into())
        }
        Err(e) => Err(e.into()),
    }
}

/// Read one line from the terminal.
///
/// Ctrl-C and Ctrl-D cancel the command.
pub fn read_line(prompt: &str) -> Result<String> {
    let mut rl = DefaultEditor::new()?;
    finish(rl.readline(prompt))
}

/// Blanks out everything typed on the line.
struct SecretMask;

impl Highlighter for SecretMask {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        Cow::Owned(" ".repeat(line.chars().count()))
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Completer for SecretMask {
    type Candidate = String;
}

impl Hinter for SecretMask {
    type Hint = String;
}

impl Validator for SecretMask {}

impl Helper for SecretMask {}

/// Read a password without echoing it and without recording it in history.
///
/// Scripts pass `--password` instead.
pub fn read_secret(prompt: &str) -> Result<String> {
    let mut rl: Editor<SecretMask, DefaultHistory> = Editor::new()?;
    rl.set_helper(Some(SecretMask));
    rl.set_color_mode(ColorMode::Forced);
    rl.set_auto_add_history(false);
    finish(rl.readline(prompt))
}

/// Use `given` when set, else ask for it.
pub fn value_or_prompt(given: Option<String>, prompt: &str) -> Result<String> {
    match given {
        Some(value) => Ok(value),
        None => read_line(prompt),
    }
}

/// Use `given` when set, else ask for it without echo.
pub fn secret_or_prompt(given: Option<String>, prompt: &str) -> Result<String> {
    match given {
        Some(value) => Ok(value),
        None => read_secret(prompt),
    }
}
