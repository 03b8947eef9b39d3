//! Request lines understood by the agent.
//!
//! One request per line: a verb followed by the caller's free text, e.g.
//! `book demain à 14h30, Jeanne Martin`.

use std::fmt;

use rendezvous_core::SchedulingOrchestrator;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Book(String),
    Reschedule(String),
    Cancel(String),
}

/// Why a line could not be turned into a [`Command`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    Empty,
    UnknownVerb(String),
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "empty request"),
            Self::UnknownVerb(verb) => {
                write!(f, "unknown request '{verb}' (expected book, reschedule or cancel)")
            }
        }
    }
}

impl std::error::Error for CommandError {}

impl Command {
    /// Parse a request line. Verbs are case-insensitive; French verbs are
    /// accepted as aliases.
    pub fn parse(line: &str) -> Result<Self, CommandError> {
        let line = line.trim();
        if line.is_empty() {
            return Err(CommandError::Empty);
        }

        let (verb, details) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let details = details.trim().to_string();

        match verb.to_lowercase().as_str() {
            "book" | "reserver" | "réserver" => Ok(Self::Book(details)),
            "reschedule" | "deplacer" | "déplacer" => Ok(Self::Reschedule(details)),
            "cancel" | "annuler" => Ok(Self::Cancel(details)),
            other => Err(CommandError::UnknownVerb(other.to_string())),
        }
    }

    pub const fn name(&self) -> &'static str {
        match self {
            Self::Book(_) => "book",
            Self::Reschedule(_) => "reschedule",
            Self::Cancel(_) => "cancel",
        }
    }

    /// Run the matching flow and return the sentence for the caller.
    pub async fn run(&self, orchestrator: &SchedulingOrchestrator) -> String {
        match self {
            Self::Book(details) => orchestrator.book(details).await,
            Self::Reschedule(details) => orchestrator.reschedule(details).await,
            Self::Cancel(details) => orchestrator.cancel(details).await,
        }
    }
}
