//! PGN and FEN import.

mod lexer;
mod parser;

pub use parser::{parse_fen, parse_pgn};

use crate::error::Result;
use crate::tree::GameTree;

/// Split a PGN collection into one slice per game.
///
/// A game ends where a tag line follows movetext. Brace comments may span
/// lines and are skipped, so a `[` inside one never starts a game. Slices that
/// hold nothing but whitespace are dropped.
pub fn split_games(text: &str) -> Vec<&str> {
    let mut games = Vec::new();
    let mut start = 0;
    let mut seen_movetext = false;
    let mut in_comment = false;
    let mut line_start = 0;

    for line in text.split_inclusive('\n') {
        let trimmed = line.trim_start();
        if !in_comment && trimmed.starts_with('[') && seen_movetext {
            games.push(&text[start..line_start]);
            start = line_start;
            seen_movetext = false;
        }

        let tag_line = !in_comment && trimmed.starts_with('[');
        if !tag_line {
            for b in line.bytes() {
                match b {
                    b'{' if !in_comment => in_comment = true,
                    b'}' if in_comment => in_comment = false,
                    b';' if !in_comment => break,
                    _ => {}
                }
            }
        }
        let blank = trimmed.trim().is_empty() || trimmed.starts_with('%');
        if !tag_line && !blank {
            seen_movetext = true;
        }
        line_start += line.len();
    }
    games.push(&text[start..]);
    games.retain(|game| !game.trim().is_empty());
    games
}

/// Parse every game of a collection independently; a bad game does not
/// affect its neighbours.
pub fn parse_games(text: &str) -> Vec<Result<GameTree>> {
    split_games(text).into_iter().map(parse_pgn).collect()
}
