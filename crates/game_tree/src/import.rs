//! Getting games in and statistics out.
//!
//! Remote fetching is done by the host application. The traits here are the
//! boundary: the engine hands over a link or a FEN and gets text or
//! statistics back.

use std::fs;
use std::ops::Range;
use std::path::Path as FsPath;

use tracing::{debug, warn};

use crate::aggregator::{aggregate, AggregateConfig, CancelToken, Corpus, OpeningStats, PositionKey};
use crate::error::{Error, Result};
use crate::pgn::{parse_fen, parse_pgn, split_games};
use crate::tree::GameTree;

/// Where a game comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportSource {
    Pgn(String),
    Fen(String),
    /// A game URL or id, resolved through a [`GameFetcher`].
    Link(String),
}

/// Fetches the PGN text of a remote game.
pub trait GameFetcher {
    fn fetch_pgn(&self, link: &str) -> Result<String>;
}

/// Remote opening-explorer providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteExplorer {
    Lichess,
    Masters,
}

/// Fetches opening statistics from a remote explorer.
pub trait ExplorerClient {
    fn opening_stats(&self, explorer: RemoteExplorer, fen: &str) -> Result<OpeningStats>;
}

/// Stand-in collaborator for hosts without network access.
#[derive(Debug, Clone, Copy, Default)]
pub struct Offline;

impl GameFetcher for Offline {
    fn fetch_pgn(&self, link: &str) -> Result<String> {
        Err(Error::Fetch {
            message: format!("cannot fetch '{link}' while offline"),
        })
    }
}

impl ExplorerClient for Offline {
    fn opening_stats(&self, _explorer: RemoteExplorer, _fen: &str) -> Result<OpeningStats> {
        Err(Error::MissingReferenceData)
    }
}

fn parse_collection(text: &str) -> Result<Vec<GameTree>> {
    let games = split_games(text);
    if games.is_empty() {
        return Err(Error::EmptyInput);
    }
    games.into_iter().map(parse_pgn).collect()
}

/// Turn an import source into game trees. Any game that fails to parse
/// fails the whole import.
pub fn import_games<F: GameFetcher>(source: &ImportSource, fetcher: &F) -> Result<Vec<GameTree>> {
    match source {
        ImportSource::Pgn(text) => parse_collection(text),
        ImportSource::Fen(fen) => Ok(vec![parse_fen(fen)?]),
        ImportSource::Link(link) => {
            let text = fetcher.fetch_pgn(link)?;
            debug!(link = %link, bytes = text.len(), "fetched game");
            parse_collection(&text)
        }
    }
}

/// Bulk storage of raw games, addressed by index.
pub trait GameStore {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Raw PGN of the games in `range`, clamped to the store's size.
    fn read_games(&self, range: Range<usize>) -> Result<Vec<String>>;
}

/// A PGN collection held in memory, one entry per game.
#[derive(Debug, Clone, Default)]
pub struct PgnBundle {
    games: Vec<String>,
}

impl PgnBundle {
    pub fn from_text(text: &str) -> Self {
        Self {
            games: split_games(text).into_iter().map(str::to_string).collect(),
        }
    }

    pub fn open(path: &FsPath) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|source| Error::Io {
            operation: format!("read {}", path.display()),
            source,
        })?;
        Ok(Self::from_text(&text))
    }

    pub fn game(&self, index: usize) -> Option<&str> {
        self.games.get(index).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.games.iter().map(String::as_str)
    }
}

impl GameStore for PgnBundle {
    fn len(&self) -> usize {
        self.games.len()
    }

    fn read_games(&self, range: Range<usize>) -> Result<Vec<String>> {
        let end = range.end.min(self.games.len());
        let start = range.start.min(end);
        Ok(self.games[start..end].to_vec())
    }
}

impl Corpus {
    /// Parse a range of games from a store. Games that fail to parse are
    /// counted as rejected rather than failing the load.
    pub fn from_store<S: GameStore>(store: &S, range: Range<usize>) -> Result<Corpus> {
        let first = range.start;
        let mut corpus = Corpus::new();
        for (offset, text) in store.read_games(range)?.iter().enumerate() {
            match parse_pgn(text) {
                Ok(tree) => corpus.push(tree),
                Err(e) => {
                    warn!(game = first + offset, error = %e, "rejecting malformed game");
                    corpus.reject();
                }
            }
        }
        Ok(corpus)
    }
}

/// Where opening statistics come from.
#[derive(Debug, Clone)]
pub enum OpeningSource {
    Local(Corpus),
    Lichess,
    Masters,
}

/// Opening statistics at `fen` from whichever source is configured. Local
/// and remote sources answer in the same shape.
pub fn explore<C: ExplorerClient>(
    source: Option<&OpeningSource>,
    fen: &str,
    config: &AggregateConfig,
    client: &C,
    cancel: &CancelToken,
) -> Result<OpeningStats> {
    let source = source.ok_or(Error::MissingReferenceData)?;
    match source {
        OpeningSource::Local(corpus) => {
            let target = PositionKey::from_fen(fen)?;
            Ok(aggregate(corpus, &target, config, cancel))
        }
        OpeningSource::Lichess => client.opening_stats(RemoteExplorer::Lichess, fen),
        OpeningSource::Masters => client.opening_stats(RemoteExplorer::Masters, fen),
    }
}

#[cfg(test)]
#[path = "import_tests.rs"]
mod import_tests;
