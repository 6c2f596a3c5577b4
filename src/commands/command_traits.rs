//! Command pattern interfaces
//!
//! Each CLI operation is a `Command`; the `CommandFactory` picks one from
//! the parsed arguments.

use std::fmt;
use std::io;

use crate::batch::BatchError;
use crate::series::ExtractError;

/// Errors that end a command
#[derive(Debug)]
pub enum CommandError {
    /// Invalid or conflicting arguments
    Usage(String),
    Batch(BatchError),
    Extract(ExtractError),
    Io(io::Error),
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::Usage(msg) => write!(f, "{}", msg),
            CommandError::Batch(e) => write!(f, "{}", e),
            CommandError::Extract(e) => write!(f, "{}", e),
            CommandError::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for CommandError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CommandError::Usage(_) => None,
            CommandError::Batch(e) => Some(e),
            CommandError::Extract(e) => Some(e),
            CommandError::Io(e) => Some(e),
        }
    }
}

impl From<BatchError> for CommandError {
    fn from(error: BatchError) -> Self {
        CommandError::Batch(error)
    }
}

impl From<ExtractError> for CommandError {
    fn from(error: ExtractError) -> Self {
        CommandError::Extract(error)
    }
}

impl From<io::Error> for CommandError {
    fn from(error: io::Error) -> Self {
        CommandError::Io(error)
    }
}

pub type CommandResult<T> = Result<T, CommandError>;

/// Represents an executable command in the application
pub trait Command {
    fn execute(&self) -> CommandResult<()>;
}

/// Factory for creating commands from CLI arguments
pub trait CommandFactory {
    fn create_command(&self, args: &clap::ArgMatches) -> CommandResult<Box<dyn Command>>;
}
