//! Opening statistics keyed by position.
//!
//! Every game of a corpus is scanned for moves played from a target
//! position. Each occurrence adds the game's result to that move's tally, so
//! a game that passes through the target twice (say, once in a variation)
//! counts twice.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chess_core::{parse_san, sq_to_coord, to_san, Position};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::encoding::replay;
use crate::error::{Error, Result};
use crate::headers::{Headers, Outcome};
use crate::tree::{GameTree, MoveNode};

/// Aggregation key: the first four FEN fields. The en-passant square is kept
/// only when a pawn of the side to move could capture onto it; move counters
/// are dropped.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PositionKey(String);

impl PositionKey {
    pub fn from_position(pos: &Position) -> Self {
        let fen = pos.to_fen();
        let mut fields = fen.split_whitespace();
        let board = fields.next().unwrap_or("");
        let side = fields.next().unwrap_or("w");
        let castling = fields.next().unwrap_or("-");
        let ep = match pos.en_passant {
            Some(sq) if pos.en_passant_capturable() => sq_to_coord(sq),
            _ => "-".to_string(),
        };
        Self(format!("{board} {side} {castling} {ep}"))
    }

    pub fn from_fen(fen: &str) -> Result<Self> {
        let pos = Position::from_fen(fen).map_err(|source| Error::InvalidFen {
            fen: fen.to_string(),
            source,
        })?;
        Ok(Self::from_position(&pos))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PositionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregateConfig {
    /// Games kept per move as examples.
    pub sample_size: usize,
    /// Ignore moves deeper than this many plies from the game's root.
    pub max_ply: Option<usize>,
    /// Scan variations as well as the main line.
    pub include_variations: bool,
    /// Games handed to the thread pool per batch. Cancellation is checked
    /// between batches.
    pub chunk_size: usize,
}

impl Default for AggregateConfig {
    fn default() -> Self {
        Self {
            sample_size: 5,
            max_ply: None,
            include_variations: true,
            chunk_size: 256,
        }
    }
}

/// One game as the aggregator sees it.
#[derive(Debug, Clone)]
pub enum CorpusEntry {
    Tree(GameTree),
    /// A main line as SAN text.
    Moves {
        start_fen: Option<String>,
        sans: Vec<String>,
        result: Outcome,
    },
    /// A main line in the compact one-byte-per-move form.
    Encoded {
        start_fen: Option<String>,
        moves: Vec<u8>,
        result: Outcome,
    },
}

impl CorpusEntry {
    pub fn result(&self) -> Outcome {
        match self {
            CorpusEntry::Tree(tree) => tree.result(),
            CorpusEntry::Moves { result, .. } | CorpusEntry::Encoded { result, .. } => *result,
        }
    }

    fn headers(&self) -> Headers {
        match self {
            CorpusEntry::Tree(tree) => tree.headers.clone(),
            CorpusEntry::Moves { result, .. } | CorpusEntry::Encoded { result, .. } => {
                let mut headers = Headers::new();
                headers.set_result(*result);
                headers
            }
        }
    }
}

impl From<GameTree> for CorpusEntry {
    fn from(tree: GameTree) -> Self {
        CorpusEntry::Tree(tree)
    }
}

/// An ordered collection of games.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    entries: Vec<CorpusEntry>,
    rejected: usize,
}

impl Corpus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: impl Into<CorpusEntry>) {
        self.entries.push(entry.into());
    }

    /// Count an input that never made it into the corpus.
    pub fn reject(&mut self) {
        self.rejected += 1;
    }

    pub fn entries(&self) -> &[CorpusEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Inputs that failed to parse before aggregation.
    pub fn rejected(&self) -> usize {
        self.rejected
    }
}

impl FromIterator<GameTree> for Corpus {
    fn from_iter<I: IntoIterator<Item = GameTree>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(CorpusEntry::Tree).collect(),
            rejected: 0,
        }
    }
}

/// Shared flag for stopping a long scan early.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSample {
    /// Position of the game in the corpus.
    pub index: usize,
    pub headers: Headers,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveStats {
    pub san: String,
    pub white: u32,
    pub draws: u32,
    pub black: u32,
    pub samples: Vec<GameSample>,
}

impl MoveStats {
    fn new(san: String) -> Self {
        Self {
            san,
            white: 0,
            draws: 0,
            black: 0,
            samples: Vec::new(),
        }
    }

    pub fn total(&self) -> u32 {
        self.white + self.draws + self.black
    }

    /// Percentages of white wins, draws and black wins.
    pub fn percentages(&self) -> (f64, f64, f64) {
        let total = self.total();
        if total == 0 {
            return (0.0, 0.0, 0.0);
        }
        let pct = |n: u32| 100.0 * n as f64 / total as f64;
        (pct(self.white), pct(self.draws), pct(self.black))
    }

    fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::WhiteWins => self.white += 1,
            Outcome::Draw => self.draws += 1,
            Outcome::BlackWins => self.black += 1,
            Outcome::Unknown => {}
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Completion {
    Complete,
    /// The scan was cancelled; only the first `games_scanned` games count.
    Partial { games_scanned: usize },
}

/// Moves played from one position, most frequent first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpeningStats {
    pub position: PositionKey,
    pub moves: Vec<MoveStats>,
    pub games_scanned: usize,
    /// Corpus entries that could not be read or replayed.
    pub skipped: usize,
    /// Games without a result; they contribute nothing.
    pub unfinished: usize,
    pub completion: Completion,
}

impl OpeningStats {
    pub fn empty(position: PositionKey) -> Self {
        Self {
            position,
            moves: Vec::new(),
            games_scanned: 0,
            skipped: 0,
            unfinished: 0,
            completion: Completion::Complete,
        }
    }

    /// Sum of occurrences over all moves.
    pub fn total(&self) -> u64 {
        self.moves.iter().map(|m| m.total() as u64).sum()
    }

    pub fn is_partial(&self) -> bool {
        matches!(self.completion, Completion::Partial { .. })
    }
}

/// What one game contributes.
enum Extract {
    Hits(Vec<String>),
    Unfinished,
    Skipped(String),
}

fn within(config: &AggregateConfig, ply: usize) -> bool {
    config.max_ply.is_none_or(|max| ply <= max)
}

fn tree_hits(tree: &GameTree, target: &PositionKey, config: &AggregateConfig) -> Vec<String> {
    let mut hits = Vec::new();
    let mut stack: Vec<(&MoveNode, usize)> = vec![(tree.root(), 0)];
    while let Some((node, ply)) = stack.pop() {
        if !within(config, ply + 1) {
            continue;
        }
        let children = if config.include_variations {
            &node.children[..]
        } else {
            &node.children[..node.children.len().min(1)]
        };
        if children.is_empty() {
            continue;
        }
        if PositionKey::from_position(&node.position) == *target {
            hits.extend(children.iter().map(|c| c.san().to_string()));
        }
        for child in children.iter().rev() {
            stack.push((child, ply + 1));
        }
    }
    hits
}

fn start_position(start_fen: Option<&str>) -> std::result::Result<Position, String> {
    match start_fen {
        Some(fen) => Position::from_fen(fen).map_err(|e| format!("bad start FEN: {e}")),
        None => Ok(Position::startpos()),
    }
}

fn extract(entry: &CorpusEntry, target: &PositionKey, config: &AggregateConfig) -> Extract {
    if !entry.result().is_decided() {
        return Extract::Unfinished;
    }
    match entry {
        CorpusEntry::Tree(tree) => Extract::Hits(tree_hits(tree, target, config)),
        CorpusEntry::Moves { start_fen, sans, .. } => {
            let mut pos = match start_position(start_fen.as_deref()) {
                Ok(pos) => pos,
                Err(reason) => return Extract::Skipped(reason),
            };
            let mut hits = Vec::new();
            for (ply, san) in sans.iter().enumerate() {
                if !within(config, ply + 1) {
                    break;
                }
                let mv = match parse_san(&pos, san) {
                    Ok(mv) => mv,
                    Err(e) => return Extract::Skipped(format!("ply {}: {e}", ply + 1)),
                };
                if PositionKey::from_position(&pos) == *target {
                    hits.push(to_san(&pos, mv));
                }
                pos = pos.play(mv);
            }
            Extract::Hits(hits)
        }
        CorpusEntry::Encoded { start_fen, moves, .. } => {
            let start = match start_position(start_fen.as_deref()) {
                Ok(pos) => pos,
                Err(reason) => return Extract::Skipped(reason),
            };
            let limit = config.max_ply.map_or(moves.len(), |max| max.min(moves.len()));
            match replay(&start, &moves[..limit]) {
                Ok(plies) => Extract::Hits(
                    plies
                        .iter()
                        .filter(|(pos, _)| PositionKey::from_position(pos) == *target)
                        .map(|(pos, mv)| to_san(pos, *mv))
                        .collect(),
                ),
                Err(e) => Extract::Skipped(e.to_string()),
            }
        }
    }
}

/// Running totals, merged strictly in corpus order.
struct Tally<'a> {
    config: &'a AggregateConfig,
    moves: Vec<MoveStats>,
    by_san: HashMap<String, usize>,
    scanned: usize,
    skipped: usize,
    unfinished: usize,
}

impl<'a> Tally<'a> {
    fn new(config: &'a AggregateConfig) -> Self {
        Self {
            config,
            moves: Vec::new(),
            by_san: HashMap::new(),
            scanned: 0,
            skipped: 0,
            unfinished: 0,
        }
    }

    fn merge(&mut self, index: usize, entry: &CorpusEntry, extract: Extract) {
        self.scanned += 1;
        let hits = match extract {
            Extract::Hits(hits) => hits,
            Extract::Unfinished => {
                self.unfinished += 1;
                return;
            }
            Extract::Skipped(reason) => {
                warn!(game = index, %reason, "skipping corpus entry");
                self.skipped += 1;
                return;
            }
        };
        let outcome = entry.result();
        for san in hits {
            let slot = match self.by_san.get(&san) {
                Some(&slot) => slot,
                None => {
                    self.moves.push(MoveStats::new(san.clone()));
                    self.by_san.insert(san, self.moves.len() - 1);
                    self.moves.len() - 1
                }
            };
            let stats = &mut self.moves[slot];
            stats.record(outcome);
            let sampled = stats.samples.iter().any(|s| s.index == index);
            if !sampled && stats.samples.len() < self.config.sample_size {
                stats.samples.push(GameSample {
                    index,
                    headers: entry.headers(),
                });
            }
        }
    }
}

/// Aggregate `corpus` at `target`.
///
/// Games are extracted in parallel one chunk at a time and merged in corpus
/// order, so the ranking does not depend on thread scheduling: most
/// occurrences first, ties in the order the moves were first seen. A
/// cancelled scan returns the chunks merged so far, marked partial.
pub fn aggregate(
    corpus: &Corpus,
    target: &PositionKey,
    config: &AggregateConfig,
    cancel: &CancelToken,
) -> OpeningStats {
    let mut tally = Tally::new(config);
    let mut cancelled = false;
    let chunk_size = config.chunk_size.max(1);

    for (chunk_idx, chunk) in corpus.entries().chunks(chunk_size).enumerate() {
        if cancel.is_cancelled() {
            cancelled = true;
            break;
        }
        let base = chunk_idx * chunk_size;
        let extracts: Vec<Extract> = chunk
            .par_iter()
            .map(|entry| extract(entry, target, config))
            .collect();
        for (offset, (entry, found)) in chunk.iter().zip(extracts).enumerate() {
            tally.merge(base + offset, entry, found);
        }
        debug!(games = tally.scanned, moves = tally.moves.len(), "merged chunk");
    }

    let mut moves = tally.moves;
    moves.sort_by(|a, b| b.total().cmp(&a.total()));

    let completion = if cancelled {
        Completion::Partial {
            games_scanned: tally.scanned,
        }
    } else {
        Completion::Complete
    };
    OpeningStats {
        position: target.clone(),
        moves,
        games_scanned: tally.scanned,
        skipped: tally.skipped + corpus.rejected(),
        unfinished: tally.unfinished,
        completion,
    }
}

#[cfg(test)]
#[path = "aggregator_tests.rs"]
mod aggregator_tests;
