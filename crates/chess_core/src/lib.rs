//! Board model for the game-tree engine.
//!
//! Just enough chess to turn notation into positions: FEN parsing and
//! formatting, legal move generation, and SAN resolution/formatting. There is
//! no search or evaluation here.

pub mod board;
pub mod error;
pub mod movegen;
pub mod san;
pub mod types;

pub use board::*;
pub use error::{FenError, SanError};
pub use movegen::*;
pub use san::{San, parse_san, to_san};
pub use types::*;


#[cfg(test)]
#[path = "movegen_tests.rs"]
mod movegen_tests;
