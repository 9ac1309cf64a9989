use super::*;
use chess_core::Position;
use game_tree::{aggregate, parse_pgn, AggregateConfig, CancelToken, Corpus, PositionKey};

fn line_for<'a>(report: &'a str, path: &str) -> &'a str {
    report
        .lines()
        .find(|l| l.split_whitespace().next() == Some(path))
        .unwrap_or_else(|| panic!("no line for {path} in\n{report}"))
}

#[test]
fn test_tree_report_lists_every_node() {
    let tree = parse_pgn("1. e4 e5 2. Nf3 {Main} (2. Bc4!) Nc6 *").unwrap();
    let report = tree_report(&tree);

    assert!(report.starts_with("6 nodes, 4 plies on the main line\n"));
    assert!(line_for(&report, "root").ends_with("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1"));
    assert!(line_for(&report, "0.0").ends_with(" 1... e5"));
    assert!(line_for(&report, "0.0.0").ends_with(" 2. Nf3  {Main}"));
    assert!(line_for(&report, "0.0.0.0").ends_with(" 2... Nc6"));

    let bc4 = line_for(&report, "0.0.1");
    assert!(bc4.ends_with("   2. Bc4 !"), "{bc4}");
}

#[test]
fn test_explorer_report_table() {
    let corpus: Corpus = [
        "[White \"Anna\"]\n[Black \"Ben\"]\n[Result \"1-0\"]\n\n1. e4 1-0",
        "[White \"Cleo\"]\n[Black \"Dan\"]\n[Result \"1/2-1/2\"]\n\n1. e4 1/2-1/2",
        "1. d4 0-1",
    ]
    .iter()
    .map(|pgn| parse_pgn(pgn).unwrap())
    .collect();
    let target = PositionKey::from_position(&Position::startpos());
    let stats = aggregate(&corpus, &target, &AggregateConfig::default(), &CancelToken::new());
    let report = explorer_report(&stats, 1);

    assert!(report.contains("Games scanned: 3, unfinished: 0, skipped: 0"));
    assert!(report.contains(&format!(
        "{:<8} {:>7} {:>7.1} {:>7.1} {:>7.1}",
        "e4", 2, 50.0, 50.0, 0.0
    )));
    assert!(report.contains(&format!(
        "{:<8} {:>7} {:>7.1} {:>7.1} {:>7.1}",
        "d4", 1, 0.0, 0.0, 100.0
    )));
    assert!(report.contains("#1     Anna - Ben 1-0"));
    assert!(!report.contains("Cleo"));
    assert!(!report.contains("partial"));
}

#[test]
fn test_explorer_report_empty_and_partial() {
    let corpus: Corpus = std::iter::once(parse_pgn("1. e4 1-0").unwrap()).collect();
    let target = PositionKey::from_position(&Position::startpos());
    let cancel = CancelToken::new();
    cancel.cancel();
    let stats = aggregate(&corpus, &target, &AggregateConfig::default(), &cancel);
    let report = explorer_report(&stats, 3);

    assert!(report.contains("Cancelled after 0 games; counts are partial"));
    assert!(report.contains("No games reach this position."));
}
