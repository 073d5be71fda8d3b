use mosscore::error::MossError;
use rustyline::error::ReadlineError;
use thiserror::Error;

/// Failures that end the interactive session.
#[derive(Debug, Error)]
pub enum ReplError {
    #[error("Terminal error: {0}")]
    Readline(#[from] ReadlineError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] MossError),
}

pub type ReplResult<T> = Result<T, ReplError>;
