//! Plain-text reports printed by the subcommands.

use chess_core::Color;
use game_tree::{Completion, GameTree, MoveNode, OpeningStats, Outcome};

/// "12." before a white move, "12..." before a black one.
fn move_label(node: &MoveNode) -> String {
    match node.position.side_to_move {
        Color::Black => format!("{}.", node.position.fullmove_number),
        Color::White => format!("{}...", node.position.fullmove_number.saturating_sub(1)),
    }
}

/// Every node in preorder with its path, indented by variation depth.
pub fn tree_report(tree: &GameTree) -> String {
    let mut report = String::new();
    report.push_str(&format!(
        "{} nodes, {} plies on the main line\n",
        tree.node_count(),
        tree.ply_count()
    ));
    report.push_str(&"-".repeat(60));
    report.push('\n');

    for (path, node) in tree.nodes() {
        if path.is_root() {
            report.push_str(&format!("{:<16} {}\n", "root", node.fen()));
            continue;
        }
        let depth = path.indices().iter().filter(|&&i| i != 0).count();
        let mut line = format!("{}{} {}", "  ".repeat(depth), move_label(node), node.san());
        for nag in &node.nags {
            line.push_str(&format!(" {}", nag.symbol().map_or_else(|| nag.to_string(), String::from)));
        }
        if let Some(comment) = node.comments.first() {
            line.push_str(&format!("  {{{comment}}}"));
        }
        report.push_str(&format!("{:<16} {}\n", path.to_string(), line));
    }
    report
}

/// Move table for one position, in the order the aggregator ranked them.
pub fn explorer_report(stats: &OpeningStats, sample: usize) -> String {
    let mut report = String::new();
    report.push_str(&format!("=== Position: {} ===\n\n", stats.position));
    report.push_str(&format!(
        "Games scanned: {}, unfinished: {}, skipped: {}\n",
        stats.games_scanned, stats.unfinished, stats.skipped
    ));
    if let Completion::Partial { games_scanned } = stats.completion {
        report.push_str(&format!("Cancelled after {games_scanned} games; counts are partial\n"));
    }
    report.push('\n');

    if stats.moves.is_empty() {
        report.push_str("No games reach this position.\n");
        return report;
    }

    report.push_str(&format!(
        "{:<8} {:>7} {:>7} {:>7} {:>7}\n",
        "Move", "Games", "White%", "Draw%", "Black%"
    ));
    report.push_str(&"-".repeat(40));
    report.push('\n');

    for m in &stats.moves {
        let (white, draw, black) = m.percentages();
        report.push_str(&format!(
            "{:<8} {:>7} {:>7.1} {:>7.1} {:>7.1}\n",
            m.san,
            m.total(),
            white,
            draw,
            black
        ));
        for s in m.samples.iter().take(sample) {
            let white = s.headers.white().unwrap_or("?");
            let black = s.headers.black().unwrap_or("?");
            report.push_str(&format!(
                "    #{:<5} {} - {} {}\n",
                s.index + 1,
                white,
                black,
                s.headers.result().unwrap_or(Outcome::Unknown)
            ));
        }
    }
    report
}

#[cfg(test)]
#[path = "report_tests.rs"]
mod report_tests;
