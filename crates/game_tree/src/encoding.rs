//! Compact move encoding.
//!
//! A move is stored as one byte: its index in the legal move list of the
//! position it is played from. `legal_moves` has a fixed order and no
//! position has more than 218 legal moves, so a byte always suffices.

use chess_core::{legal_moves, to_san, Move, Position};

use crate::error::{Error, Result};
use crate::tree::GameTree;

pub fn encode_move(pos: &Position, mv: Move) -> Option<u8> {
    legal_moves(pos)
        .iter()
        .position(|&m| m == mv)
        .and_then(|idx| u8::try_from(idx).ok())
}

pub fn decode_move(pos: &Position, byte: u8) -> Option<Move> {
    legal_moves(pos).get(byte as usize).copied()
}

/// Encode the main line of a game.
pub fn encode_mainline(tree: &GameTree) -> Vec<u8> {
    let mut pos = tree.root_position().clone();
    let mut out = Vec::with_capacity(tree.ply_count());
    for node in tree.mainline() {
        let Some(mv) = node.mv else {
            break;
        };
        match encode_move(&pos, mv) {
            Some(byte) => out.push(byte),
            None => break,
        }
        pos = node.position.clone();
    }
    out
}

/// Replay encoded moves from `start`, yielding each move with the position
/// it was played from.
pub fn replay(start: &Position, bytes: &[u8]) -> Result<Vec<(Position, Move)>> {
    let mut pos = start.clone();
    let mut out = Vec::with_capacity(bytes.len());
    for (ply, &byte) in bytes.iter().enumerate() {
        let mv = decode_move(&pos, byte).ok_or(Error::InvalidEncoding { ply: ply + 1, byte })?;
        let next = pos.play(mv);
        out.push((pos, mv));
        pos = next;
    }
    Ok(out)
}

/// Decode a byte sequence to SAN.
pub fn decode_moves(start: &Position, bytes: &[u8]) -> Result<Vec<String>> {
    Ok(replay(start, bytes)?
        .iter()
        .map(|(pos, mv)| to_san(pos, *mv))
        .collect())
}
