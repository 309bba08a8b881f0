// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Interactive browser over a single context.

use crate::print_error;
use dircontext_core::{Context, Loader, Module};
use owo_colors::OwoColorize;
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{Config, Editor, Helper};
use std::path::PathBuf;

/// REPL configuration constants
const HISTORY_FILE: &str = ".dircontext_history";
const MAX_HISTORY_SIZE: usize = 1000;

/// REPL commands that can be executed with a dot prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplCommand {
    Help,
    Exit,
    Clear,
    Keys,
    Load,
    Resolve,
}

impl ReplCommand {
    /// Parse a REPL command from input string
    pub fn parse(input: &str) -> Option<(Self, Option<&str>)> {
        let input = input.trim();
        if !input.starts_with('.') || input.starts_with("./") {
            return None;
        }

        let parts: Vec<&str> = input[1..].splitn(2, char::is_whitespace).collect();
        let cmd = parts.first()?.to_lowercase();
        let arg = parts.get(1).map(|a| a.trim()).filter(|a| !a.is_empty());

        match cmd.as_str() {
            "help" | "h" | "?" => Some((ReplCommand::Help, arg)),
            "exit" | "quit" | "q" => Some((ReplCommand::Exit, arg)),
            "clear" | "cls" => Some((ReplCommand::Clear, arg)),
            "keys" | "ls" | "k" => Some((ReplCommand::Keys, arg)),
            "load" | "l" => Some((ReplCommand::Load, arg)),
            "resolve" | "r" => Some((ReplCommand::Resolve, arg)),
            _ => None,
        }
    }

    /// Get all available commands for help/completion
    pub fn all_commands() -> &'static [(&'static str, &'static str)] {
        &[
            (".help", "Show this help message"),
            (".exit", "Exit the REPL"),
            (".clear", "Clear the screen"),
            (".keys", "List the context keys"),
            (".load <key>", "Load the module behind a key"),
            (".resolve <key>", "Show the absolute path of a key"),
        ]
    }
}

/// Completes commands and context keys
struct KeyHelper {
    keys: Vec<String>,
}

impl Completer for KeyHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &rustyline::Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let line = &line[..pos];

        // Complete keys after a command, commands otherwise
        let (start, candidates): (usize, Vec<&str>) = match argument_start(line) {
            Some(start) => (start, self.keys.iter().map(String::as_str).collect()),
            None => (
                0,
                ReplCommand::all_commands()
                    .iter()
                    .map(|(cmd, _)| cmd.split_whitespace().next().unwrap_or_default())
                    .collect(),
            ),
        };

        let word = &line[start..];
        let matches = candidates
            .into_iter()
            .filter(|c| c.starts_with(word))
            .map(|c| Pair {
                display: c.to_string(),
                replacement: c.to_string(),
            })
            .collect();

        Ok((start, matches))
    }
}

impl Hinter for KeyHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &rustyline::Context<'_>) -> Option<Self::Hint> {
        if pos < line.len() {
            return None;
        }

        let word = line[argument_start(line)?..].trim_start();
        if word.len() < 2 {
            return None;
        }

        self.keys
            .iter()
            .find(|key| key.starts_with(word) && key.len() > word.len())
            .map(|key| key[word.len()..].to_string().dimmed().to_string())
    }
}

/// Byte offset just past the first whitespace character of `line`
fn argument_start(line: &str) -> Option<usize> {
    line.char_indices()
        .find(|(_, c)| c.is_whitespace())
        .map(|(i, c)| i + c.len_utf8())
}

impl Highlighter for KeyHelper {}

impl Validator for KeyHelper {}

impl Helper for KeyHelper {}

/// The interactive REPL
pub struct Repl<L: Loader<Output = Module>> {
    context: Context<L>,
    request: String,
    editor: Editor<KeyHelper, DefaultHistory>,
    history_path: PathBuf,
}

impl<L: Loader<Output = Module>> Repl<L> {
    /// Create a REPL browsing `context`
    pub fn new(context: Context<L>, request: impl Into<String>) -> rustyline::Result<Self> {
        let config = Config::builder()
            .history_ignore_dups(true)?
            .history_ignore_space(true)
            .max_history_size(MAX_HISTORY_SIZE)?
            .auto_add_history(true)
            .build();

        let mut editor = Editor::with_config(config)?;
        editor.set_helper(Some(KeyHelper {
            keys: context.keys(),
        }));

        let history_path = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("dircontext")
            .join(HISTORY_FILE);

        if let Some(parent) = history_path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }

        let _ = editor.load_history(&history_path);

        Ok(Self {
            context,
            request: request.into(),
            editor,
            history_path,
        })
    }

    /// Run the REPL main loop
    pub async fn run(&mut self) -> rustyline::Result<()> {
        self.print_banner();

        loop {
            match self.editor.readline(&format!("{} ", "ctx>".bright_green().bold())) {
                Ok(line) => {
                    let trimmed = line.trim();

                    if trimmed.is_empty() {
                        continue;
                    }

                    match ReplCommand::parse(trimmed) {
                        Some((cmd, arg)) => match self.execute_command(cmd, arg).await {
                            CommandResult::Continue => continue,
                            CommandResult::Exit => break,
                        },
                        // A bare key loads it
                        None => self.load_key(trimmed).await,
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("{}", "^C".dimmed());
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    println!("{}", "^D".dimmed());
                    break;
                }
                Err(err) => {
                    eprintln!("{}: {:?}", "Error".red().bold(), err);
                    break;
                }
            }
        }

        let _ = self.editor.save_history(&self.history_path);
        Ok(())
    }

    fn print_banner(&self) {
        println!();
        println!(
            "  {} {}",
            "dircontext".bright_cyan().bold(),
            env!("CARGO_PKG_VERSION").yellow()
        );
        println!(
            "  {} {} {} ({} keys, mode {})",
            "context".dimmed(),
            self.request.green(),
            self.context.root().display().dimmed(),
            self.context.len(),
            self.context.mode().cyan()
        );
        println!(
            "  {} {} {}",
            "Type".dimmed(),
            ".help".cyan(),
            "for available commands".dimmed()
        );
        println!();
    }

    async fn execute_command(&mut self, cmd: ReplCommand, arg: Option<&str>) -> CommandResult {
        match cmd {
            ReplCommand::Help => self.print_help(),
            ReplCommand::Exit => return CommandResult::Exit,
            ReplCommand::Clear => print!("\x1B[2J\x1B[H"),
            ReplCommand::Keys => {
                for key in self.context.keys() {
                    println!("{}", key);
                }
            }
            ReplCommand::Load => match arg {
                Some(key) => self.load_key(key).await,
                None => missing_argument(".load"),
            },
            ReplCommand::Resolve => match arg {
                Some(key) => match self.context.resolve(key) {
                    Ok(path) => println!("{}", path.display()),
                    Err(e) => print_error(&e),
                },
                None => missing_argument(".resolve"),
            },
        }
        CommandResult::Continue
    }

    async fn load_key(&self, key: &str) {
        let loaded = match self.context.call(key) {
            Ok(loaded) => loaded,
            Err(e) => return print_error(&e),
        };

        if loaded.is_deferred() {
            println!("{}", "(deferred)".dimmed());
        }

        match loaded.settle().await {
            Ok(module) => println!("{}", module),
            Err(e) => print_error(&e),
        }
    }

    fn print_help(&self) {
        println!();
        println!("{}", "REPL Commands:".white().bold());
        println!();

        for (cmd, desc) in ReplCommand::all_commands() {
            println!("  {:16} {}", cmd.cyan(), desc.dimmed());
        }

        println!();
        println!(
            "  {}",
            "Entering a bare key is the same as .load <key>".dimmed()
        );
        println!();
    }
}

/// Result of executing a REPL command
enum CommandResult {
    Continue,
    Exit,
}

fn missing_argument(command: &str) {
    eprintln!(
        "{}: {} {}",
        "Error".red().bold(),
        command.cyan(),
        "requires a key".dimmed()
    );
}
