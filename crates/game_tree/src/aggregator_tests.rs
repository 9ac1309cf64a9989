use super::*;
use crate::encoding::encode_mainline;
use crate::pgn::parse_pgn;

fn start_key() -> PositionKey {
    PositionKey::from_position(&Position::startpos())
}

fn corpus(games: &[&str]) -> Corpus {
    games.iter().map(|pgn| parse_pgn(pgn).unwrap()).collect()
}

fn run(corpus: &Corpus, target: &PositionKey, config: &AggregateConfig) -> OpeningStats {
    aggregate(corpus, target, config, &CancelToken::new())
}

fn ranking(stats: &OpeningStats) -> Vec<(&str, u32)> {
    stats.moves.iter().map(|m| (m.san.as_str(), m.total())).collect()
}

#[test]
fn test_ties_keep_first_seen_order() {
    let games = corpus(&["1. e4 1-0", "1. d4 0-1"]);
    let stats = run(&games, &start_key(), &AggregateConfig::default());
    assert_eq!(ranking(&stats), vec![("e4", 1), ("d4", 1)]);
    assert_eq!(stats.moves[0].white, 1);
    assert_eq!(stats.moves[1].black, 1);
    assert_eq!(stats.completion, Completion::Complete);
}

#[test]
fn test_ranked_by_total_occurrences() {
    let games = corpus(&["1. c4 1-0", "1. d4 0-1", "1. d4 1/2-1/2", "1. e4 1-0", "1. d4 1-0"]);
    let stats = run(&games, &start_key(), &AggregateConfig::default());
    assert_eq!(ranking(&stats), vec![("d4", 3), ("c4", 1), ("e4", 1)]);
    let d4 = &stats.moves[0];
    assert_eq!((d4.white, d4.draws, d4.black), (1, 1, 1));
}

#[test]
fn test_variations_count_every_occurrence() {
    // The start position is reached once at the root and moves from it
    // appear in both the main line and the variation.
    let games = corpus(&["1. e4 (1. d4) 1-0", "1. Nf3 Nf6 2. Ng1 Ng8 3. d4 1-0"]);
    let stats = run(&games, &start_key(), &AggregateConfig::default());
    assert_eq!(ranking(&stats), vec![("d4", 2), ("e4", 1), ("Nf3", 1)]);
    assert_eq!(stats.total(), 4);

    let main_only = AggregateConfig {
        include_variations: false,
        ..AggregateConfig::default()
    };
    let stats = run(&games, &start_key(), &main_only);
    assert_eq!(ranking(&stats), vec![("e4", 1), ("Nf3", 1), ("d4", 1)]);
}

#[test]
fn test_samples_are_distinct_and_capped() {
    let games = corpus(&[
        "[White \"A\"]\n\n1. Nf3 Nf6 2. Ng1 Ng8 3. Nf3 1-0",
        "[White \"B\"]\n\n1. Nf3 0-1",
        "[White \"C\"]\n\n1. Nf3 1-0",
    ]);
    let config = AggregateConfig {
        sample_size: 2,
        ..AggregateConfig::default()
    };
    let stats = run(&games, &start_key(), &config);
    let nf3 = &stats.moves[0];
    assert_eq!(nf3.total(), 4);
    let indices: Vec<usize> = nf3.samples.iter().map(|s| s.index).collect();
    assert_eq!(indices, vec![0, 1]);
    assert_eq!(nf3.samples[1].headers.white(), Some("B"));
}

#[test]
fn test_unfinished_and_broken_entries_are_counted() {
    let mut games = corpus(&["1. e4 *", "1. e4 1-0"]);
    games.push(CorpusEntry::Moves {
        start_fen: None,
        sans: vec!["e4".into(), "e4".into()],
        result: Outcome::Draw,
    });
    games.push(CorpusEntry::Encoded {
        start_fen: None,
        moves: vec![250],
        result: Outcome::Draw,
    });
    games.reject();
    let stats = run(&games, &start_key(), &AggregateConfig::default());
    assert_eq!(stats.games_scanned, 4);
    assert_eq!(stats.unfinished, 1);
    assert_eq!(stats.skipped, 3);
    assert_eq!(ranking(&stats), vec![("e4", 1)]);
}

#[test]
fn test_entry_kinds_agree() {
    let tree = parse_pgn("1. e4 e5 2. Nf3 Nc6 1-0").unwrap();
    let mut games = Corpus::new();
    games.push(CorpusEntry::Moves {
        start_fen: None,
        sans: tree.mainline_sans().iter().map(|s| s.to_string()).collect(),
        result: Outcome::WhiteWins,
    });
    games.push(CorpusEntry::Encoded {
        start_fen: None,
        moves: encode_mainline(&tree),
        result: Outcome::WhiteWins,
    });
    games.push(tree);

    let target = PositionKey::from_fen("rnbqkbnr/pppp1ppp/8/4p3/4P3/8/PPPP1PPP/RNBQKBNR w KQkq e6 0 2")
        .unwrap();
    let stats = run(&games, &target, &AggregateConfig::default());
    assert_eq!(ranking(&stats), vec![("Nf3", 3)]);
}

#[test]
fn test_unusable_en_passant_square_is_ignored() {
    let with_ep =
        PositionKey::from_fen("rnbqkbnr/pppp1ppp/8/4p3/4P3/8/PPPP1PPP/RNBQKBNR w KQkq e6 0 2").unwrap();
    let without =
        PositionKey::from_fen("rnbqkbnr/pppp1ppp/8/4p3/4P3/8/PPPP1PPP/RNBQKBNR w KQkq - 5 9").unwrap();
    assert_eq!(with_ep, without);
    assert!(with_ep.as_str().ends_with(" w KQkq -"));

    let capturable =
        PositionKey::from_fen("rnbqkbnr/ppp1p1pp/8/3pPp2/8/8/PPPP1PPP/RNBQKBNR w KQkq f6 0 3").unwrap();
    assert!(capturable.as_str().ends_with(" f6"));
}

#[test]
fn test_max_ply_limits_the_scan() {
    let games = corpus(&["1. Nf3 Nf6 2. Ng1 Ng8 3. d4 1-0"]);
    let config = AggregateConfig {
        max_ply: Some(2),
        ..AggregateConfig::default()
    };
    let stats = run(&games, &start_key(), &config);
    assert_eq!(ranking(&stats), vec![("Nf3", 1)]);
}

#[test]
fn test_cancelled_scan_is_marked_partial() {
    let games = corpus(&["1. e4 1-0", "1. d4 1-0", "1. c4 1-0"]);
    let cancel = CancelToken::new();
    cancel.cancel();
    let stats = aggregate(&games, &start_key(), &AggregateConfig::default(), &cancel);
    assert_eq!(stats.completion, Completion::Partial { games_scanned: 0 });
    assert!(stats.moves.is_empty());
    assert!(stats.is_partial());
}

#[test]
fn test_chunking_does_not_change_the_result() {
    let pgns: Vec<String> = ["e4", "d4", "c4", "Nf3", "e4", "d4", "g3", "e4"]
        .iter()
        .enumerate()
        .map(|(i, mv)| format!("1. {mv} {}", ["1-0", "0-1", "1/2-1/2"][i % 3]))
        .collect();
    let games: Corpus = pgns.iter().map(|p| parse_pgn(p).unwrap()).collect();
    let whole = run(&games, &start_key(), &AggregateConfig::default());
    for chunk_size in [1, 2, 3, 5] {
        let config = AggregateConfig {
            chunk_size,
            ..AggregateConfig::default()
        };
        assert_eq!(run(&games, &start_key(), &config), whole, "chunk size {chunk_size}");
    }
    assert_eq!(ranking(&whole), vec![("e4", 3), ("d4", 2), ("c4", 1), ("Nf3", 1), ("g3", 1)]);
}

#[test]
fn test_empty_corpus_has_no_moves() {
    let stats = run(&Corpus::new(), &start_key(), &AggregateConfig::default());
    assert!(stats.moves.is_empty());
    assert_eq!(stats.games_scanned, 0);
}
