use mossexpr::error::ExprError;
use strum::EnumIs;
use thiserror::Error;

#[derive(Debug, Error, EnumIs)]
pub enum MossError {
    #[error("Syntax error: {0}")]
    SyntaxError(String),

    #[error("Unknown command: >{0}<")]
    UnknownCommand(String),

    #[error("You must use r[epl[ace]] to replace this expression")]
    MustForceReplace,

    #[error("Cannot remove this expression")]
    CannotRemove,

    #[error("Values can only be added inside a quantifier")]
    CannotAddValue,

    #[error("The query has been changed. To show the previous results, use 'show!'")]
    StaleResults,

    #[error("No results to show yet (use 'search' first)")]
    NoResults,

    #[error("No parameter is being entered")]
    NotAwaitingInput,

    #[error(transparent)]
    Expr(#[from] ExprError),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse configuration file '{file}': {source}")]
    ConfigParse {
        source: toml::de::Error,
        file: String,
    },

    #[error("Cannot open mailbox '{path}': {reason}")]
    Mailbox { path: String, reason: String },

    #[error("Malformed message: {0}")]
    MessageParse(#[from] mailparse::MailParseError),

    #[error("Viewer failed: {0}")]
    Viewer(String),
}

impl MossError {
    /// Errors that indicate a bug rather than a bad command. The session must end.
    pub fn is_internal(&self) -> bool {
        matches!(self, MossError::Expr(err) if err.is_internal())
    }
}

pub type MossResult<T> = Result<T, MossError>;
