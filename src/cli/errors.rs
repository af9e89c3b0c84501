use std::io;

use rustyline::error::ReadlineError;
use thiserror::Error;

use crate::errors::FinhabitError;

pub type CommandResult = Result<(), CommandError>;

/// Failure of a single shell command; reported and the loop continues.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("No record book loaded. Use `new <name>` or `load <name>` first.")]
    BookNotLoaded,
    #[error("{0}")]
    InvalidArguments(String),
    #[error("{0}")]
    Message(String),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Core(#[from] FinhabitError),
    #[error("exit requested")]
    ExitRequested,
}

/// Failure that ends the shell.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] FinhabitError),
    #[error("Invalid input: {0}")]
    Input(String),
    #[error("Command failed: {0}")]
    Command(String),
}

impl From<CommandError> for CliError {
    fn from(err: CommandError) -> Self {
        CliError::Command(err.to_string())
    }
}

impl From<io::Error> for CliError {
    fn from(err: io::Error) -> Self {
        CliError::Command(err.to_string())
    }
}

impl From<ReadlineError> for CliError {
    fn from(err: ReadlineError) -> Self {
        CliError::Input(err.to_string())
    }
}
