//! Line commands for the interactive shell.

pub mod render;

use crate::catalog::{PartId, PartName};
use crate::error::SessionError;
use crate::inspector::Inspector;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PartRef {
    Id(PartId),
    Name(PartName),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Cars,
    Car(String),
    Part(PartRef),
    /// Update the follow-up input without sending it.
    Type(String),
    /// Ask the given text, or the typed follow-up when `None`.
    Ask(Option<String>),
    Back,
    View,
    Save,
    Help,
    Quit,
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("Unknown command '{0}', try 'help'")]
    Unknown(String),
    #[error("Usage: {0}")]
    Usage(&'static str),
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error("This vehicle has no {0} to inspect")]
    NoSuchPart(PartName),
}

pub const HELP: &str = "\
cars              list vehicles
car <id>          start inspecting a vehicle
part <id|name>    select a part (asks its default question the first time)
type <text>       draft a follow-up question
ask [text]        ask a follow-up (the drafted one if no text)
back              return to the part list
view              show the current view
save              remember the current vehicle and endpoint
help              show this help
quit              exit";

impl Command {
    /// Parse one input line. Blank lines yield `Ok(None)`.
    pub fn parse(line: &str) -> Result<Option<Command>, ParseError> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }

        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((w, r)) => (w, r.trim()),
            None => (line, ""),
        };

        let command = match word.to_ascii_lowercase().as_str() {
            "cars" => Command::Cars,
            "car" if rest.is_empty() => return Err(ParseError::Usage("car <id>")),
            "car" => Command::Car(rest.to_string()),
            "part" => Command::Part(parse_part_ref(rest)?),
            "type" => Command::Type(rest.to_string()),
            "ask" if rest.is_empty() => Command::Ask(None),
            "ask" => Command::Ask(Some(rest.to_string())),
            "back" => Command::Back,
            "view" => Command::View,
            "save" => Command::Save,
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            other => return Err(ParseError::Unknown(other.to_string())),
        };
        Ok(Some(command))
    }
}

fn parse_part_ref(s: &str) -> Result<PartRef, ParseError> {
    const USAGE: &str = "part <id|name>";
    if s.is_empty() {
        return Err(ParseError::Usage(USAGE));
    }
    if let Ok(id) = s.parse::<PartId>() {
        return Ok(PartRef::Id(id));
    }
    PartName::parse(s)
        .map(PartRef::Name)
        .ok_or(ParseError::Usage(USAGE))
}

/// Resolve a part reference against the active session.
fn part_id(inspector: &Inspector, part: &PartRef) -> Result<PartId, CommandError> {
    match part {
        PartRef::Id(id) => Ok(*id),
        PartRef::Name(name) => inspector
            .session()
            .and_then(|s| s.parts().iter().find(|p| p.name == *name))
            .map(|p| p.id)
            .ok_or(CommandError::NoSuchPart(*name)),
    }
}

/// Apply a session-changing command. Commands that only read state or touch
/// the outside world (`cars`, `view`, `save`, `help`, `quit`) are handled by
/// the shell loop and are no-ops here.
pub fn apply(inspector: &mut Inspector, command: &Command) -> Result<(), CommandError> {
    match command {
        Command::Car(id) => inspector.start_session(id)?,
        Command::Part(part) => {
            let id = part_id(inspector, part)?;
            inspector.select_part(id)?
        }
        Command::Type(text) => inspector.set_follow_up_input(text)?,
        Command::Ask(Some(text)) => inspector.ask_follow_up(text)?,
        Command::Ask(None) => inspector.submit_follow_up()?,
        Command::Back => inspector.deselect_part(),
        Command::Cars | Command::View | Command::Save | Command::Help | Command::Quit => {}
    }
    Ok(())
}
