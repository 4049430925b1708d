use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::game::Player;

/// Why a column was rejected by the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidMoveReason {
    OutOfRange,
    ColumnFull,
}

impl fmt::Display for InvalidMoveReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidMoveReason::OutOfRange => f.write_str("out of range"),
            InvalidMoveReason::ColumnFull => f.write_str("column is full"),
        }
    }
}

/// A move the board refused. The board is left untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid move in column {column}: {reason}")]
pub struct InvalidMoveError {
    pub column: usize,
    pub reason: InvalidMoveReason,
}

/// Text from a human that does not name a column.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{input}' is not a column number")]
pub struct InputParseError {
    pub input: String,
}

/// Failures talking to an external move policy.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PolicyError {
    #[error("policy did not answer within {0:?}")]
    Timeout(Duration),

    #[error("policy request failed: {0}")]
    Transport(String),

    #[error("policy answered with unusable content: {0}")]
    Malformed(String),

    #[error("policy rejected our credentials: {0}")]
    Unauthorized(String),

    #[error("no policy credentials configured: {0}")]
    MissingCredentials(String),
}

impl PolicyError {
    /// Credential problems will not go away by asking again.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            PolicyError::Unauthorized(_) | PolicyError::MissingCredentials(_)
        )
    }
}

/// Errors raised by a move-source while proposing a column.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SourceError {
    #[error(transparent)]
    InvalidInput(#[from] InputParseError),

    #[error(transparent)]
    Policy(#[from] PolicyError),

    #[error("move source disconnected: {0}")]
    Disconnected(String),
}

impl SourceError {
    /// Fatal errors end the game loop; everything else is re-solicited.
    pub fn is_fatal(&self) -> bool {
        match self {
            SourceError::InvalidInput(_) => false,
            SourceError::Policy(e) => e.is_fatal(),
            SourceError::Disconnected(_) => true,
        }
    }
}

/// Errors that stop the turn controller.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ControllerError {
    #[error("{player} cannot continue: {source}")]
    SourceFailed { player: Player, source: SourceError },

    #[error("game is already over")]
    GameOver,
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("failed to serialize TOML: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("config validation error: {0}")]
    Validation(String),
}
