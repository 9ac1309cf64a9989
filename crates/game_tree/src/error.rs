//! Error types for the game-tree engine

use chess_core::FenError;
use thiserror::Error;

use crate::path::Path;

/// Main error type for the crate.
///
/// Parse errors carry a byte offset into the input. Edit errors are returned
/// before any mutation happens, so the tree is unchanged when one is reported.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("cannot resolve move #{index} '{token}' at byte {offset}: {reason}")]
    MalformedMove {
        index: usize,
        offset: usize,
        token: String,
        reason: String,
    },

    #[error("comment opened at byte {offset} is never closed")]
    UnterminatedComment { offset: usize },

    #[error("variation opened at byte {offset} is never closed")]
    UnterminatedVariation { offset: usize },

    #[error("unexpected '{token}' at byte {offset}")]
    UnexpectedToken { offset: usize, token: String },

    #[error("input contains no game")]
    EmptyInput,

    #[error("invalid FEN '{fen}': {source}")]
    InvalidFen {
        fen: String,
        #[source]
        source: FenError,
    },

    #[error("illegal move '{san}': {reason}")]
    IllegalMove { san: String, reason: String },

    #[error("variation {index} does not exist ({available} available)")]
    NoSuchVariation { index: usize, available: usize },

    #[error("path {path} does not resolve in the current tree")]
    NoSuchPath { path: Path },

    #[error("the root position cannot be deleted or annotated")]
    RootEdit,

    #[error("{path} is not the first move of a variation")]
    NotVariationStart { path: Path },

    #[error("byte {byte:#04x} at ply {ply} is not a legal move index")]
    InvalidEncoding { ply: usize, byte: u8 },

    #[error("no corpus or remote source configured")]
    MissingReferenceData,

    #[error("no open session '{id}'")]
    SessionNotFound { id: String },

    #[error("remote fetch failed: {message}")]
    Fetch { message: String },

    #[error("failed to {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Convenience type alias for Results using the crate's Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// True for errors raised while reading notation (as opposed to editing or I/O).
    pub fn is_parse_error(&self) -> bool {
        matches!(
            self,
            Error::MalformedMove { .. }
                | Error::UnterminatedComment { .. }
                | Error::UnterminatedVariation { .. }
                | Error::UnexpectedToken { .. }
                | Error::EmptyInput
                | Error::InvalidFen { .. }
        )
    }

    /// Byte offset into the parsed text, when the error points at one.
    pub fn offset(&self) -> Option<usize> {
        match self {
            Error::MalformedMove { offset, .. }
            | Error::UnterminatedComment { offset }
            | Error::UnterminatedVariation { offset }
            | Error::UnexpectedToken { offset, .. } => Some(*offset),
            _ => None,
        }
    }
}
