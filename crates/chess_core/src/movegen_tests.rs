use super::*;

#[test]
fn test_startpos_moves() {
    let pos = Position::startpos();
    let moves = legal_moves(&pos);
    // Starting position has 20 legal moves
    assert_eq!(moves.len(), 20);
}

#[test]
fn test_kiwipete_moves() {
    // Kiwipete position - complex with many move types
    let pos =
        Position::from_fen("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq -")
            .unwrap();
    let moves = legal_moves(&pos);
    assert_eq!(moves.len(), 48);
    assert_eq!(moves.iter().filter(|m| m.is_castle).count(), 2);
}

#[test]
fn test_generation_order_is_stable() {
    let pos = Position::startpos();
    let first = legal_moves(&pos);
    let second = legal_moves(&pos);
    assert_eq!(first, second);
    // a1..h8 scan: the b1 knight comes before any pawn on the second rank
    assert_eq!(sq_to_coord(first[0].from), "b1");
}

#[test]
fn test_promotions_in_fixed_order() {
    let pos = Position::from_fen("8/P7/8/8/8/8/8/K6k w - - 0 1").unwrap();
    let promos: Vec<PieceKind> = legal_moves(&pos)
        .into_iter()
        .filter_map(|m| m.promo)
        .collect();
    assert_eq!(promos, PieceKind::PROMOTIONS.to_vec());
}

#[test]
fn test_cannot_castle_through_check() {
    // Black rook on f8 covers f1
    let pos = Position::from_fen("5r1k/8/8/8/8/8/8/4K2R w K - 0 1").unwrap();
    assert!(legal_moves(&pos).iter().all(|m| !m.is_castle));
}

#[test]
fn test_checkmate_detection() {
    let mated =
        Position::from_fen("r1bqkbnr/pppp1Qpp/2n5/4p3/2B1P3/8/PPPP1PPP/RNB1K1NR b KQkq - 0 1")
            .unwrap();
    assert!(is_checkmate(&mated));

    let stalemate = Position::from_fen("k7/8/1Q6/8/8/8/8/1K6 b - - 0 1").unwrap();
    assert!(legal_moves(&stalemate).is_empty());
    assert!(!is_checkmate(&stalemate));
}
