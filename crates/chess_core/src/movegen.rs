//! Legal move generation.
//!
//! The order of the generated list is part of the contract: squares are
//! scanned a1..h8, each piece emits targets in its direction-table order and
//! promotions come out as Q, R, B, N. The compact game encoding stores indices
//! into this list.

use crate::{
    board::{DIAGONALS, KING_DELTAS, KNIGHT_DELTAS, ORTHOGONALS, Position},
    types::*,
};

/// Generate all legal moves for the side to move.
pub fn legal_moves(pos: &Position) -> Vec<Move> {
    let mut out = Vec::with_capacity(64);
    legal_moves_into(pos, &mut out);
    out
}

/// Generate all legal moves into the provided buffer, reusing it across calls.
pub fn legal_moves_into(pos: &Position, out: &mut Vec<Move>) {
    out.clear();
    pseudo_moves(pos, out);

    let mover = pos.side_to_move;
    let mut scratch = pos.clone();
    out.retain(|&mv| {
        scratch.clone_from(pos);
        scratch.apply(mv);
        !scratch.in_check(mover)
    });
}

/// Whether the side to move has no legal reply while in check.
pub fn is_checkmate(pos: &Position) -> bool {
    pos.in_check(pos.side_to_move) && legal_moves(pos).is_empty()
}

fn pseudo_moves(pos: &Position, out: &mut Vec<Move>) {
    let us = pos.side_to_move;
    for from in 0..64u8 {
        let Some(pc) = pos.piece_at(from) else {
            continue;
        };
        if pc.color != us {
            continue;
        }
        match pc.kind {
            PieceKind::Pawn => gen_pawn(pos, from, us, out),
            PieceKind::Knight => gen_steps(pos, from, us, &KNIGHT_DELTAS, out),
            PieceKind::Bishop => gen_rays(pos, from, us, &DIAGONALS, out),
            PieceKind::Rook => gen_rays(pos, from, us, &ORTHOGONALS, out),
            PieceKind::Queen => {
                gen_rays(pos, from, us, &DIAGONALS, out);
                gen_rays(pos, from, us, &ORTHOGONALS, out);
            }
            PieceKind::King => {
                gen_steps(pos, from, us, &KING_DELTAS, out);
                gen_castles(pos, from, us, out);
            }
        }
    }
}

fn push_pawn_move(from: u8, to: u8, c: Color, out: &mut Vec<Move>) {
    let promo_rank = c.other().back_rank();
    if rank_of(to) == promo_rank {
        out.extend(
            PieceKind::PROMOTIONS
                .iter()
                .map(|&kind| Move::promotion(from, to, kind)),
        );
    } else {
        out.push(Move::new(from, to));
    }
}

fn gen_pawn(pos: &Position, from: u8, c: Color, out: &mut Vec<Move>) {
    let f = file_of(from);
    let r = rank_of(from);
    let dir = c.forward();
    let start_rank = c.back_rank() + dir;

    if let Some(to) = sq(f, r + dir)
        && pos.piece_at(to).is_none()
    {
        push_pawn_move(from, to, c, out);
        if r == start_rank
            && let Some(to2) = sq(f, r + 2 * dir)
            && pos.piece_at(to2).is_none()
        {
            out.push(Move::new(from, to2));
        }
    }

    for df in [-1, 1] {
        let Some(to) = sq(f + df, r + dir) else {
            continue;
        };
        match pos.piece_at(to) {
            Some(target) if target.color != c => push_pawn_move(from, to, c, out),
            None if pos.en_passant == Some(to) => out.push(Move {
                is_en_passant: true,
                ..Move::new(from, to)
            }),
            _ => {}
        }
    }
}

fn gen_steps(pos: &Position, from: u8, c: Color, deltas: &[(i8, i8)], out: &mut Vec<Move>) {
    let f = file_of(from);
    let r = rank_of(from);
    for (df, dr) in deltas {
        if let Some(to) = sq(f + df, r + dr) {
            match pos.piece_at(to) {
                Some(pc) if pc.color == c => {}
                _ => out.push(Move::new(from, to)),
            }
        }
    }
}

fn gen_rays(pos: &Position, from: u8, c: Color, dirs: &[(i8, i8)], out: &mut Vec<Move>) {
    let f0 = file_of(from);
    let r0 = rank_of(from);
    for (df, dr) in dirs {
        let mut f = f0 + df;
        let mut r = r0 + dr;
        while let Some(to) = sq(f, r) {
            match pos.piece_at(to) {
                None => out.push(Move::new(from, to)),
                Some(pc) if pc.color != c => {
                    out.push(Move::new(from, to));
                    break;
                }
                _ => break,
            }
            f += df;
            r += dr;
        }
    }
}

fn gen_castles(pos: &Position, from: u8, c: Color, out: &mut Vec<Move>) {
    let back = c.back_rank();
    if sq(4, back) != Some(from) || pos.in_check(c) {
        return;
    }
    let enemy = c.other();
    let rook = Some(Piece::new(c, PieceKind::Rook));

    // (right, rook file, squares that must be empty, squares the king crosses, king target)
    let sides: [(bool, i8, &[i8], [i8; 2], i8); 2] = [
        (pos.castling.king_side(c), 7, &[5, 6], [5, 6], 6),
        (pos.castling.queen_side(c), 0, &[1, 2, 3], [3, 2], 2),
    ];
    for (allowed, rook_file, empty, crossed, target) in sides {
        if !allowed || sq(rook_file, back).and_then(|s| pos.piece_at(s)) != rook {
            continue;
        }
        let clear = empty
            .iter()
            .all(|&file| sq(file, back).is_some_and(|s| pos.piece_at(s).is_none()));
        let safe = crossed
            .iter()
            .all(|&file| sq(file, back).is_some_and(|s| !pos.is_square_attacked(s, enemy)));
        if clear
            && safe
            && let Some(to) = sq(target, back)
        {
            out.push(Move {
                is_castle: true,
                ..Move::new(from, to)
            });
        }
    }
}
