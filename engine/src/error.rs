use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Error categories reported to callers. Each one maps to a distinct
/// non-zero status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Syntax,
    UnknownCommand,
    Schema,
    Validation,
    Decode,
    Config,
    Io,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("syntax error: {0}")]
    Syntax(String),

    #[error("unknown command")]
    UnknownCommand,

    #[error("table '{0}' already exists")]
    TableExists(String),

    #[error("table '{0}' does not exist")]
    TableNotFound(String),

    #[error("{0}")]
    Schema(String),

    #[error("data structure mismatch: expected {expected} values, received {received} values")]
    ValueCount { expected: usize, received: usize },

    #[error("{0}")]
    Validation(String),

    #[error("key '{0}' already exists")]
    DuplicateKey(String),

    #[error("key '{0}' not found")]
    KeyNotFound(String),

    #[error("failed to decode table file: {0}")]
    Decode(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Syntax(_) => ErrorKind::Syntax,
            Error::UnknownCommand => ErrorKind::UnknownCommand,
            Error::TableExists(_) | Error::TableNotFound(_) | Error::Schema(_) => {
                ErrorKind::Schema
            }
            Error::ValueCount { .. }
            | Error::Validation(_)
            | Error::DuplicateKey(_)
            | Error::KeyNotFound(_) => ErrorKind::Validation,
            Error::Decode(_) => ErrorKind::Decode,
            Error::Config(_) => ErrorKind::Config,
            Error::Io(_) => ErrorKind::Io,
        }
    }

    pub fn status_code(&self) -> i32 {
        match self.kind() {
            ErrorKind::Syntax => 1,
            ErrorKind::UnknownCommand => 2,
            ErrorKind::Schema => 3,
            ErrorKind::Validation => 4,
            ErrorKind::Decode => 5,
            ErrorKind::Config => 6,
            ErrorKind::Io => 7,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Config(err.to_string())
    }
}
