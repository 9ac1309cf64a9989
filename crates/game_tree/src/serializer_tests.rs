use super::*;
use crate::pgn::{parse_fen, parse_pgn};
use crate::tree::Nag;

fn one_line() -> WriterOptions {
    WriterOptions {
        line_width: 0,
        ..WriterOptions::default()
    }
}

fn movetext(pgn: &str) -> String {
    let out = write_pgn(&parse_pgn(pgn).unwrap(), &one_line());
    out.rsplit("\n\n").next().unwrap_or("").trim_end().to_string()
}

#[test]
fn test_variation_is_parenthesized_after_its_move() {
    assert_eq!(
        movetext("1. e4 e5 2. Nf3 (2. Bc4 Nc6) Nc6 *"),
        "1. e4 e5 2. Nf3 (2. Bc4 Nc6) 2... Nc6 *"
    );
}

#[test]
fn test_black_variation_gets_ellipsis_number() {
    assert_eq!(
        movetext("1. e4 e5 (1... c5 2. Nf3 (2. c3)) 2. Nf3 1-0"),
        "1. e4 e5 (1... c5 2. Nf3 (2. c3)) 2. Nf3 1-0"
    );
}

#[test]
fn test_comments_glyphs_and_evals() {
    assert_eq!(
        movetext("{Intro} 1. e4! {[%eval 0.3] Best} e5 $14 ({Or} 1... c5) *"),
        "{Intro} 1. e4 $1 {[%eval 0.3]} {Best} 1... e5 $14 ({Or} 1... c5) *"
    );
}

#[test]
fn test_headers_roster_first_with_escapes() {
    let tree = parse_pgn(
        "[Annotator \"me\"]\n[White \"O\\\"Brien\"]\n[Event \"E\"]\n[Result \"1-0\"]\n\n1. e4 1-0",
    )
    .unwrap();
    let out = write_pgn(&tree, &WriterOptions::default());
    assert_eq!(
        out,
        "[Event \"E\"]\n[White \"O\\\"Brien\"]\n[Result \"1-0\"]\n[Annotator \"me\"]\n\n1. e4 1-0\n"
    );
}

#[test]
fn test_fen_rooted_tree_has_setup_headers() {
    let tree = parse_fen("8/8/8/8/8/8/8/K6k w - - 0 1").unwrap();
    let out = write_pgn(&tree, &WriterOptions::default());
    assert!(out.contains("[FEN \"8/8/8/8/8/8/8/K6k w - - 0 1\"]\n"));
    assert!(out.contains("[SetUp \"1\"]\n"));
    assert!(out.ends_with("\n\n*\n"));
}

#[test]
fn test_options_strip_extras() {
    let tree = parse_pgn("1. e4! {good} e5 (1... c5) 2. Nf3 *").unwrap();
    let out = write_pgn(&tree, &WriterOptions::bare());
    assert!(out.ends_with("\n\n1. e4 e5 2. Nf3 *\n"));
}

#[test]
fn test_wraps_at_line_width() {
    let tree = parse_pgn("1. e4 e5 2. Nf3 Nc6 3. Bb5 a6 4. Ba4 Nf6 5. O-O Be7 *").unwrap();
    let options = WriterOptions {
        line_width: 20,
        ..WriterOptions::default()
    };
    let out = write_pgn(&tree, &options);
    let movetext = out.rsplit("\n\n").next().unwrap();
    for line in movetext.lines() {
        assert!(line.len() <= 20, "{line:?}");
    }
    assert_eq!(parse_pgn(&out).unwrap(), tree);
}

#[test]
fn test_comment_with_closing_brace_survives() {
    let mut tree = parse_pgn("1. e4 e5 *").unwrap();
    tree.set_comment(&Path::mainline(1), "a } b").unwrap();
    let out = write_pgn(&tree, &one_line());
    assert!(out.contains("; a } b\n"));
    assert_eq!(parse_pgn(&out).unwrap(), tree);
}

#[test]
fn test_nonstandard_result_header_is_kept() {
    let tree = parse_pgn("[Result \"?\"]\n\n1. e4").unwrap();
    let out = write_pgn(&tree, &one_line());
    assert_eq!(parse_pgn(&out).unwrap().headers.get("Result"), Some("?"));
}

#[test]
fn test_write_subtree_from_a_node() {
    let mut tree = parse_pgn("1. e4 e5 2. Nf3 (2. Bc4 Nc6) Nc6 *").unwrap();
    tree.toggle_annotation(&Path::mainline(3), Nag::GOOD).unwrap();
    let out = write_subtree(&tree, &Path::mainline(2), &one_line()).unwrap();
    assert_eq!(out, "2. Nf3 $1 (2. Bc4 Nc6) 2... Nc6");
    assert!(write_subtree(&tree, &Path::mainline(9), &one_line()).is_err());
}

#[test]
fn test_round_trip_of_annotated_game() {
    let pgn = "[Event \"Test\"]\n[Site \"?\"]\n[Result \"0-1\"]\n\n\
        {Start} 1. d4 Nf6 2. c4 e6 3. Nc3 (3. Nf3 b6 {Queen's Indian} (3... d5 $5)) \
        3... Bb4 {[%clk 0:10:00]} 4. e3 O-O 5. Bd3 d5 6. Nf3 c5 7. O-O ({Also} 7. a3) 7... Nc6 0-1";
    let tree = parse_pgn(pgn).unwrap();
    let out = write_pgn(&tree, &WriterOptions::default());
    assert_eq!(parse_pgn(&out).unwrap(), tree);
}

#[test]
fn test_brace_and_line_break_in_a_hand_built_comment() {
    let start = chess_core::Position::startpos();
    let mv = chess_core::parse_san(&start, "e4").unwrap();
    let mut root = MoveNode::root(start.clone());
    let mut e4 = MoveNode::from_move(&start, mv);
    e4.comments.push("a }\nb".to_string());
    root.children.push(e4);
    let tree = GameTree::with_root(Default::default(), root);

    let out = write_pgn(&tree, &one_line());
    assert!(out.contains("1. e4 {a )\nb} *"), "{out}");
    let reparsed = parse_pgn(&out).unwrap();
    assert_eq!(reparsed.node(&Path::mainline(1)).unwrap().comments, vec!["a )\nb"]);
}

/// A chain of `depth` variations, each opened inside the previous one.
fn nested_variations(depth: usize) -> GameTree {
    const MAIN: [&str; 4] = ["Nc3", "Nc6", "Nc3", "Nc6"];
    const SIDE: [&str; 4] = ["Nf3", "Nf6", "Ng1", "Ng8"];
    let mut tree = GameTree::new();
    let mut path = Path::root();
    for ply in 0..depth {
        tree.insert_move(&path, MAIN[ply % 4]).unwrap();
        path = tree.insert_move(&path, SIDE[ply % 4]).unwrap();
    }
    tree
}

#[test]
fn test_deeply_nested_variations() {
    let depth = 1500;
    let tree = nested_variations(depth);
    let out = write_pgn(&tree, &WriterOptions::default());
    assert_eq!(out.matches('(').count(), depth);
    let opening = "1. Nc3 (1. Nf3 Nc6 (1... Nf6 2. Nc3 (2. Ng1 Nc6 (2... Ng8 3. Nc3";
    assert!(out.starts_with(&format!("[Result \"*\"]\n\n{opening}")), "{out}");

    let reparsed = parse_pgn(&out).unwrap();
    assert_eq!(reparsed.node_count(), tree.node_count());
    assert_eq!(write_pgn(&reparsed, &WriterOptions::default()), out);
}
