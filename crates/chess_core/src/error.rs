//! Error types for FEN and SAN handling

use thiserror::Error;

/// Reasons a FEN string is rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FenError {
    #[error("expected at least 4 fields, got {0}")]
    MissingFields(usize),

    #[error("expected 8 ranks in board field, got {0}")]
    RankCount(usize),

    #[error("rank {rank} does not describe exactly 8 files")]
    RankWidth { rank: usize },

    #[error("invalid piece character '{0}'")]
    PieceChar(char),

    #[error("invalid side to move '{0}'")]
    SideToMove(String),

    #[error("invalid castling field '{0}'")]
    Castling(String),

    #[error("invalid en-passant square '{0}'")]
    EnPassant(String),

    #[error("invalid move counter '{0}'")]
    Counter(String),
}

/// Reasons a SAN token cannot be turned into a move.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SanError {
    #[error("'{0}' is not valid algebraic notation")]
    Syntax(String),

    #[error("no legal move matches '{0}'")]
    NoMatch(String),

    #[error("'{0}' matches more than one legal move")]
    Ambiguous(String),
}
