use std::future::Future;
use std::io::Write;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::query::{Responder, execute_query};

const FAREWELL: &str = "👋 Goodbye!";

const HELP: &[&str] = &[
    "",
    "Available commands:",
    "  help    - Show this help message",
    "  sources - Toggle showing source documents",
    "  quit    - Exit interactive mode",
];

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Blank,
    Quit,
    Help,
    ToggleSources,
    Ask(String),
}

/// Classify one input line. Control words are matched case-insensitively.
pub fn parse_command(line: &str) -> Command {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Command::Blank;
    }
    match trimmed.to_lowercase().as_str() {
        "quit" | "exit" | "q" => Command::Quit,
        "help" => Command::Help,
        "sources" => Command::ToggleSources,
        _ => Command::Ask(trimmed.to_string()),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// Quit command, end of input, or an interrupt while waiting for input.
    Finished,
    /// Interrupt while a question was being answered.
    Interrupted,
}

/// Read questions from `input` until quit, end of input, or `interrupt`.
///
/// A failed question is reported and the loop keeps going.
pub async fn run_interactive<E, R, W, S>(
    engine: &E,
    input: R,
    out: &mut W,
    mut show_sources: bool,
    interrupt: S,
) -> std::io::Result<SessionEnd>
where
    E: Responder,
    R: AsyncBufRead + Unpin,
    W: Write,
    S: Future<Output = ()>,
{
    writeln!(out, "\n🎯 Entering interactive mode. Type 'quit' or 'exit' to stop.")?;
    writeln!(out, "Type 'help' for available commands.")?;

    let mut lines = input.lines();
    tokio::pin!(interrupt);

    loop {
        write!(out, "\n❓ Your question: ")?;
        out.flush()?;

        let next = tokio::select! {
            biased;
            _ = &mut interrupt => None,
            line = lines.next_line() => Some(line?),
        };
        let line = match next {
            Some(Some(line)) => line,
            // Interrupt or end of input at the prompt
            Some(None) | None => {
                writeln!(out, "\n{FAREWELL}")?;
                return Ok(SessionEnd::Finished);
            }
        };

        match parse_command(&line) {
            Command::Blank => continue,
            Command::Quit => {
                writeln!(out, "{FAREWELL}")?;
                return Ok(SessionEnd::Finished);
            }
            Command::Help => {
                for l in HELP {
                    writeln!(out, "{l}")?;
                }
            }
            Command::ToggleSources => {
                show_sources = !show_sources;
                let state = if show_sources { "enabled" } else { "disabled" };
                writeln!(out, "Source display {state}")?;
            }
            Command::Ask(question) => {
                let answered = tokio::select! {
                    biased;
                    _ = &mut interrupt => None,
                    r = execute_query(engine, &question, show_sources, &mut *out) => Some(r),
                };
                match answered {
                    None => return Ok(SessionEnd::Interrupted),
                    Some(Err(e)) => tracing::debug!(error = ?e, "question failed; continuing"),
                    Some(Ok(_)) => {}
                }
            }
        }
    }
}
