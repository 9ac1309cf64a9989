//! Standard Algebraic Notation.
//!
//! Tokens are parsed into a [`San`] description and then matched against the
//! legal moves of a position, so castling and en-passant flags come from the
//! generator rather than the text.

use std::fmt;

use crate::{
    board::Position,
    error::SanError,
    movegen::legal_moves,
    types::*,
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum San {
    Castle {
        king_side: bool,
    },
    Normal {
        kind: PieceKind,
        file: Option<i8>,
        rank: Option<i8>,
        capture: bool,
        to: u8,
        promo: Option<PieceKind>,
    },
}

impl San {
    /// Parse a single SAN token. Check/mate markers and glyph suffixes are ignored.
    pub fn parse(token: &str) -> Result<San, SanError> {
        let syntax = || SanError::Syntax(token.to_string());

        let mut body = token.trim();
        if let Some(stripped) = body.strip_suffix("e.p.") {
            body = stripped.trim_end();
        }
        let body = body.trim_end_matches(&['+', '#', '!', '?'][..]);

        match body {
            "O-O" | "0-0" => return Ok(San::Castle { king_side: true }),
            "O-O-O" | "0-0-0" => return Ok(San::Castle { king_side: false }),
            _ => {}
        }

        let mut chars: Vec<char> = body.chars().collect();
        if chars.len() < 2 {
            return Err(syntax());
        }

        let kind = match chars[0] {
            'N' | 'B' | 'R' | 'Q' | 'K' | 'P' => {
                let kind = PieceKind::from_letter(chars[0]).ok_or_else(syntax)?;
                chars.remove(0);
                kind
            }
            _ => PieceKind::Pawn,
        };

        let mut promo = None;
        if let Some(&last) = chars.last() {
            let upper = last.to_ascii_uppercase();
            let explicit = chars.len() >= 2 && chars[chars.len() - 2] == '=';
            if matches!(upper, 'Q' | 'R' | 'B' | 'N') && (last.is_ascii_uppercase() || explicit) {
                promo = PieceKind::from_letter(upper);
                chars.pop();
                if chars.last() == Some(&'=') {
                    chars.pop();
                }
            }
        }
        if promo.is_some() && kind != PieceKind::Pawn {
            return Err(syntax());
        }

        if chars.len() < 2 {
            return Err(syntax());
        }
        let dest: String = chars[chars.len() - 2..].iter().collect();
        let to = coord_to_sq(&dest).ok_or_else(syntax)?;
        chars.truncate(chars.len() - 2);

        let mut capture = false;
        if matches!(chars.last(), Some('x') | Some(':')) {
            capture = true;
            chars.pop();
        }

        let (mut file, mut rank) = (None, None);
        for ch in chars {
            match ch {
                'a'..='h' if file.is_none() && rank.is_none() => {
                    file = Some((ch as u8 - b'a') as i8)
                }
                '1'..='8' if rank.is_none() => rank = Some((ch as u8 - b'1') as i8),
                _ => return Err(syntax()),
            }
        }

        Ok(San::Normal {
            kind,
            file,
            rank,
            capture,
            to,
            promo,
        })
    }

    /// Find the single legal move in `pos` this SAN describes.
    pub fn resolve(&self, pos: &Position) -> Result<Move, SanError> {
        let mut found = legal_moves(pos).into_iter().filter(|mv| self.matches(pos, mv));
        match (found.next(), found.next()) {
            (Some(mv), None) => Ok(mv),
            (None, _) => Err(SanError::NoMatch(self.to_string())),
            (Some(_), Some(_)) => Err(SanError::Ambiguous(self.to_string())),
        }
    }

    fn matches(&self, pos: &Position, mv: &Move) -> bool {
        match *self {
            San::Castle { king_side } => mv.is_castle && mv.is_king_side_castle() == king_side,
            San::Normal {
                kind,
                file,
                rank,
                to,
                promo,
                ..
            } => {
                mv.to == to
                    && mv.promo == promo
                    && pos.piece_at(mv.from).is_some_and(|pc| pc.kind == kind)
                    && file.is_none_or(|f| file_of(mv.from) == f)
                    && rank.is_none_or(|r| rank_of(mv.from) == r)
            }
        }
    }
}

impl fmt::Display for San {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            San::Castle { king_side: true } => write!(f, "O-O"),
            San::Castle { king_side: false } => write!(f, "O-O-O"),
            San::Normal {
                kind,
                file,
                rank,
                capture,
                to,
                promo,
            } => {
                if *kind != PieceKind::Pawn {
                    write!(f, "{}", kind.letter())?;
                }
                if let Some(file) = file {
                    write!(f, "{}", file_char(*file))?;
                }
                if let Some(rank) = rank {
                    write!(f, "{}", rank_char(*rank))?;
                }
                if *capture {
                    write!(f, "x")?;
                }
                write!(f, "{}", sq_to_coord(*to))?;
                if let Some(promo) = promo {
                    write!(f, "={}", promo.letter())?;
                }
                Ok(())
            }
        }
    }
}

/// Resolve a SAN token against a position in one step.
pub fn parse_san(pos: &Position, token: &str) -> Result<Move, SanError> {
    San::parse(token)?.resolve(pos)
}

/// Render a legal move as canonical SAN, including the check or mate suffix.
pub fn to_san(pos: &Position, mv: Move) -> String {
    let mut out = String::with_capacity(8);

    if mv.is_castle {
        out.push_str(if mv.is_king_side_castle() { "O-O" } else { "O-O-O" });
    } else {
        let kind = pos
            .piece_at(mv.from)
            .map(|pc| pc.kind)
            .unwrap_or(PieceKind::Pawn);
        let capture = mv.is_en_passant || pos.piece_at(mv.to).is_some();

        if kind == PieceKind::Pawn {
            if capture {
                out.push(file_char(file_of(mv.from)));
            }
        } else {
            out.push(kind.letter());
            let rivals: Vec<u8> = legal_moves(pos)
                .into_iter()
                .filter(|other| {
                    other.to == mv.to
                        && other.from != mv.from
                        && pos.piece_at(other.from).is_some_and(|pc| pc.kind == kind)
                })
                .map(|other| other.from)
                .collect();
            if !rivals.is_empty() {
                let same_file = rivals.iter().any(|&s| file_of(s) == file_of(mv.from));
                let same_rank = rivals.iter().any(|&s| rank_of(s) == rank_of(mv.from));
                if !same_file {
                    out.push(file_char(file_of(mv.from)));
                } else if !same_rank {
                    out.push(rank_char(rank_of(mv.from)));
                } else {
                    out.push_str(&sq_to_coord(mv.from));
                }
            }
        }

        if capture {
            out.push('x');
        }
        out.push_str(&sq_to_coord(mv.to));
        if let Some(promo) = mv.promo {
            out.push('=');
            out.push(promo.letter());
        }
    }

    let next = pos.play(mv);
    if next.in_check(next.side_to_move) {
        out.push(if legal_moves(&next).is_empty() { '#' } else { '+' });
    }
    out
}

#[cfg(test)]
#[path = "san_tests.rs"]
mod san_tests;
