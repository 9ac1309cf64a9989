use super::*;
use crate::START_FEN;

fn play_line(fen: &str, sans: &[&str]) -> Position {
    let mut pos = Position::from_fen(fen).unwrap();
    for san in sans {
        let mv = parse_san(&pos, san).unwrap_or_else(|e| panic!("{san}: {e}"));
        pos = pos.play(mv);
    }
    pos
}

#[test]
fn parses_piece_moves_and_disambiguators() {
    assert_eq!(
        San::parse("Nbd7").unwrap(),
        San::Normal {
            kind: PieceKind::Knight,
            file: Some(1),
            rank: None,
            capture: false,
            to: coord_to_sq("d7").unwrap(),
            promo: None,
        }
    );
    assert_eq!(
        San::parse("exd8=Q+").unwrap(),
        San::Normal {
            kind: PieceKind::Pawn,
            file: Some(4),
            rank: None,
            capture: true,
            to: coord_to_sq("d8").unwrap(),
            promo: Some(PieceKind::Queen),
        }
    );
    assert_eq!(San::parse("0-0-0").unwrap(), San::Castle { king_side: false });
    assert_eq!(San::parse("O-O!?").unwrap(), San::Castle { king_side: true });
}

#[test]
fn rejects_garbage() {
    assert!(matches!(San::parse("Zz9"), Err(SanError::Syntax(_))));
    assert!(matches!(San::parse("e"), Err(SanError::Syntax(_))));
    assert!(matches!(San::parse("Ne4=Q"), Err(SanError::Syntax(_))));
}

#[test]
fn resolves_opening_moves() {
    let pos = play_line(START_FEN, &["e4", "e5", "Nf3", "Nc6", "Bb5", "a6"]);
    assert_eq!(
        pos.to_fen(),
        "r1bqkbnr/1ppp1ppp/p1n5/1B2p3/4P3/5N2/PPPP1PPP/RNBQK2R w KQkq - 0 4"
    );
}

#[test]
fn detects_ambiguity_and_missing_moves() {
    // Knights on b1 and f1 can both reach d2
    let pos = Position::from_fen("4k3/8/8/8/8/8/8/1N2KN2 w - - 0 1").unwrap();
    assert!(matches!(parse_san(&pos, "Nd2"), Err(SanError::Ambiguous(_))));
    assert!(parse_san(&pos, "Nbd2").is_ok());
    assert!(matches!(parse_san(&pos, "Qd2"), Err(SanError::NoMatch(_))));
}

#[test]
fn long_algebraic_is_accepted() {
    let pos = Position::startpos();
    assert_eq!(parse_san(&pos, "e2e4").unwrap(), parse_san(&pos, "e4").unwrap());
    assert_eq!(parse_san(&pos, "Ng1f3").unwrap(), parse_san(&pos, "Nf3").unwrap());
}

#[test]
fn formats_canonical_san() {
    let pos = Position::from_fen("4k3/8/8/8/8/8/8/1N2KN2 w - - 0 1").unwrap();
    let mv = parse_san(&pos, "Nfd2").unwrap();
    assert_eq!(to_san(&pos, mv), "Nfd2");

    // Rooks on a1 and a5 share a file, so the rank disambiguates.
    let pos = Position::from_fen("4k3/8/8/R7/8/8/8/R3K3 w - - 0 1").unwrap();
    let mv = parse_san(&pos, "R1a3").unwrap();
    assert_eq!(to_san(&pos, mv), "R1a3");

    let pos = play_line(START_FEN, &["f3", "e5", "g4"]);
    let mv = parse_san(&pos, "Qh4").unwrap();
    assert_eq!(to_san(&pos, mv), "Qh4#");
}

#[test]
fn formats_en_passant_and_promotion() {
    let pos =
        Position::from_fen("rnbqkbnr/ppp1pppp/8/8/3pP3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 3").unwrap();
    let mv = parse_san(&pos, "dxe3").unwrap();
    assert!(mv.is_en_passant);
    assert_eq!(to_san(&pos, mv), "dxe3");

    let pos = Position::from_fen("8/P7/8/8/8/8/8/K6k w - - 0 1").unwrap();
    let mv = parse_san(&pos, "a8=N").unwrap();
    assert_eq!(to_san(&pos, mv), "a8=N");
}
