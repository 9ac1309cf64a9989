//! Game-tree engine
//!
//! Reads PGN and FEN into a tree of positions with variations, edits it
//! through paths, writes it back out as PGN, and aggregates opening
//! statistics over collections of games.
//!
//! ```
//! use game_tree::{parse_pgn, write_pgn, Path, WriterOptions};
//!
//! let mut tree = parse_pgn("1. e4 e5 2. Nf3 (2. Bc4 Nc6) Nc6 *").unwrap();
//! let bc4 = Path::from_indices(vec![0, 0, 1]);
//! tree.promote_variation(&bc4).unwrap();
//! let pgn = write_pgn(&tree, &WriterOptions::default());
//! assert!(pgn.contains("2. Bc4 (2. Nf3 Nc6) 2... Nc6"));
//! ```

pub mod aggregator;
pub mod encoding;
pub mod error;
pub mod headers;
pub mod import;
pub mod navigator;
pub mod path;
pub mod pgn;
pub mod serializer;
pub mod session;
pub mod tree;

pub use aggregator::{
    aggregate, AggregateConfig, CancelToken, Completion, Corpus, CorpusEntry, GameSample,
    MoveStats, OpeningStats, PositionKey,
};
pub use encoding::{decode_moves, encode_mainline};
pub use error::{Error, Result};
pub use headers::{Headers, Outcome, SEVEN_TAG_ROSTER};
pub use import::{
    explore, import_games, ExplorerClient, GameFetcher, GameStore, ImportSource, Offline,
    OpeningSource, PgnBundle, RemoteExplorer,
};
pub use navigator::Navigator;
pub use path::Path;
pub use pgn::{parse_fen, parse_games, parse_pgn, split_games};
pub use serializer::{write_pgn, write_subtree, WriterOptions};
pub use session::{
    FileBackend, MemoryBackend, SessionBackend, SessionId, SessionSnapshot, SessionStore,
};
pub use tree::{GameTree, MoveNode, Nag};
