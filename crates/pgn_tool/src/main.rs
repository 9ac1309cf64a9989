//! PGN tool CLI
//!
//! Check, reformat, inspect and mine PGN files with the game-tree engine.

mod config;
mod report;

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use chess_core::Position;
use game_tree::{
    decode_moves, encode_mainline, explore, parse_pgn, write_pgn, CancelToken, Corpus, GameStore,
    GameTree, Offline, OpeningSource, PgnBundle, WriterOptions,
};

use config::ToolConfig;

#[derive(Parser)]
#[command(name = "pgn_tool")]
#[command(about = "Check, format and explore PGN files")]
#[command(version)]
struct Cli {
    /// TOML config file (defaults to ./pgn_tool.toml when present)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log parser and aggregator details to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Parse every game and report the ones that fail
    Check { file: PathBuf },
    /// Re-export a game as canonical PGN
    Format {
        file: PathBuf,
        /// 1-based game number
        #[arg(short, long, default_value_t = 1)]
        game: usize,
        /// Main line only, without comments or glyphs
        #[arg(long)]
        bare: bool,
        /// Wrap movetext at this width (0 keeps one line)
        #[arg(long)]
        width: Option<usize>,
    },
    /// Print the move tree with the path of every node
    Tree {
        file: PathBuf,
        #[arg(short, long, default_value_t = 1)]
        game: usize,
    },
    /// Opening statistics for a position across all games in the file
    Explore {
        file: PathBuf,
        /// Position to look up (defaults to the standard start)
        #[arg(long)]
        fen: Option<String>,
        /// Example games kept under each move (overrides the config file)
        #[arg(long)]
        sample: Option<usize>,
    },
    /// Compact one-byte-per-move encoding of a game's main line
    Encode {
        file: PathBuf,
        #[arg(short, long, default_value_t = 1)]
        game: usize,
    },
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn open_bundle(file: &Path) -> Result<PgnBundle> {
    let bundle = PgnBundle::open(file)?;
    info!(file = %file.display(), games = bundle.len(), "loaded PGN file");
    Ok(bundle)
}

fn load_game(file: &Path, game: usize) -> Result<GameTree> {
    let bundle = open_bundle(file)?;
    if game == 0 || game > bundle.len() {
        bail!("{} has {} games, no game {game}", file.display(), bundle.len());
    }
    let text = bundle.game(game - 1).unwrap_or_default();
    parse_pgn(text).with_context(|| format!("game {game} of {}", file.display()))
}

fn run_check(file: &Path) -> Result<()> {
    let bundle = open_bundle(file)?;
    let mut failed = 0;
    for (i, text) in bundle.iter().enumerate() {
        match parse_pgn(text) {
            Ok(tree) => debug!(game = i + 1, nodes = tree.node_count(), "ok"),
            Err(e) => {
                failed += 1;
                match e.offset() {
                    Some(offset) => println!("game {}: {e} (byte {offset})", i + 1),
                    None => println!("game {}: {e}", i + 1),
                }
            }
        }
    }
    println!("{} games, {} failed", bundle.len(), failed);
    if failed > 0 {
        bail!("{failed} of {} games did not parse", bundle.len());
    }
    Ok(())
}

fn run_format(
    config: &ToolConfig,
    file: &Path,
    game: usize,
    bare: bool,
    width: Option<usize>,
) -> Result<()> {
    let tree = load_game(file, game)?;
    let mut options = if bare {
        WriterOptions::bare()
    } else {
        config.writer.clone()
    };
    if let Some(width) = width {
        options.line_width = width;
    }
    print!("{}", write_pgn(&tree, &options));
    Ok(())
}

fn run_explore(
    config: &ToolConfig,
    file: &Path,
    fen: Option<&str>,
    sample: Option<usize>,
) -> Result<()> {
    let bundle = open_bundle(file)?;
    let corpus = Corpus::from_store(&bundle, 0..bundle.len())?;
    if corpus.rejected() > 0 {
        warn!(rejected = corpus.rejected(), "some games could not be parsed");
    }
    let fen = fen.map_or_else(|| Position::startpos().to_fen(), str::to_string);
    let source = OpeningSource::Local(corpus);
    let explorer = config.explorer_config(sample);
    debug!(sample_size = explorer.sample_size, "exploring {fen}");
    let stats = explore(Some(&source), &fen, &explorer, &Offline, &CancelToken::new())?;
    print!("{}", report::explorer_report(&stats, explorer.sample_size));
    Ok(())
}

fn run_encode(file: &Path, game: usize) -> Result<()> {
    let tree = load_game(file, game)?;
    let bytes = encode_mainline(&tree);
    let hex: Vec<String> = bytes.iter().map(|b| format!("{b:02x}")).collect();
    println!("{}", hex.join(" "));

    let sans = decode_moves(tree.root_position(), &bytes)?;
    if sans != tree.mainline_sans() {
        bail!("encoding did not reproduce the main line");
    }
    println!("{} moves, {} bytes", sans.len(), bytes.len());
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let config = ToolConfig::resolve(cli.config.as_deref())?;

    match &cli.command {
        Command::Check { file } => run_check(file),
        Command::Format {
            file,
            game,
            bare,
            width,
        } => run_format(&config, file, *game, *bare, *width),
        Command::Tree { file, game } => {
            let tree = load_game(file, *game)?;
            print!("{}", report::tree_report(&tree));
            Ok(())
        }
        Command::Explore { file, fen, sample } => {
            run_explore(&config, file, fen.as_deref(), *sample)
        }
        Command::Encode { file, game } => run_encode(file, *game),
    }
}
