//! Movetext parser.
//!
//! Parsing happens in two passes. The first builds a syntax tree of lines and
//! variations without touching the board. The second replays it from the
//! root position, resolving every SAN token. Either pass can fail, and the
//! game tree is only assembled once both have succeeded. Both passes keep
//! their own stack of open lines, so nesting depth is bounded by memory
//! rather than by the call stack.

use std::collections::BTreeMap;

use chess_core::{parse_san, Position};
use tracing::debug;

use super::lexer::{Lexer, Token, TokenKind};
use crate::error::{Error, Result};
use crate::headers::{Headers, Outcome};
use crate::tree::{GameTree, MoveNode, Nag};

/// A move as written, with everything attached to it.
#[derive(Debug, Default)]
struct PlyAst {
    san: String,
    offset: usize,
    /// 1-based position of the SAN token in the text.
    index: usize,
    starting_comments: Vec<String>,
    comments: Vec<String>,
    nags: Vec<Nag>,
    /// Alternatives to this move, as indices into [`GameAst::lines`].
    variations: Vec<usize>,
}

#[derive(Debug, Default)]
struct GameAst {
    tags: Vec<(String, String)>,
    game_comments: Vec<String>,
    /// Every line of the game. The main line is always first.
    lines: Vec<Vec<PlyAst>>,
    result: Option<Outcome>,
}

/// A line still being read.
#[derive(Debug, Default)]
struct OpenLine {
    plies: Vec<PlyAst>,
    /// Comments seen before the first move.
    leading: Vec<String>,
    /// Offset of the `(` that opened it; `None` for the main line.
    open: Option<usize>,
}

struct Parser {
    tokens: std::vec::IntoIter<Token>,
    peeked: Option<Token>,
    san_count: usize,
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens: tokens.into_iter(),
            peeked: None,
            san_count: 0,
        }
    }

    fn next(&mut self) -> Option<Token> {
        self.peeked.take().or_else(|| self.tokens.next())
    }

    fn peek(&mut self) -> Option<&Token> {
        if self.peeked.is_none() {
            self.peeked = self.tokens.next();
        }
        self.peeked.as_ref()
    }

    fn game(&mut self) -> Result<GameAst> {
        let mut game = GameAst::default();
        while matches!(
            self.peek(),
            Some(Token {
                kind: TokenKind::Tag { .. },
                ..
            })
        ) {
            if let Some(Token {
                kind: TokenKind::Tag { key, value },
                ..
            }) = self.next()
            {
                game.tags.push((key, value));
            }
        }

        self.movetext(&mut game)?;
        if let Some(token) = self.next() {
            return Err(unexpected(token.offset, &token.kind));
        }
        Ok(game)
    }

    /// Read moves up to the result token or the end of input.
    ///
    /// `current` is the innermost open line and `outer` holds the lines
    /// enclosing it. A `(` suspends the current line; the matching `)`
    /// files the finished variation under the move it follows.
    fn movetext(&mut self, game: &mut GameAst) -> Result<()> {
        // Slot 0 is filled with the main line once it is complete.
        game.lines.push(Vec::new());
        let mut current = OpenLine::default();
        let mut outer: Vec<OpenLine> = Vec::new();
        loop {
            let Some(token) = self.next() else {
                if let Some(offset) = current.open {
                    return Err(Error::UnterminatedVariation { offset });
                }
                break;
            };
            match token.kind {
                TokenKind::Result(outcome) if current.open.is_none() => {
                    game.result = Some(outcome);
                    break;
                }
                TokenKind::MoveNumber(_) => {}
                TokenKind::San(san) => {
                    self.san_count += 1;
                    let starting_comments = if current.plies.is_empty() && current.open.is_some() {
                        std::mem::take(&mut current.leading)
                    } else {
                        Vec::new()
                    };
                    current.plies.push(PlyAst {
                        san,
                        offset: token.offset,
                        index: self.san_count,
                        starting_comments,
                        ..PlyAst::default()
                    });
                }
                TokenKind::Nag(nag) => match current.plies.last_mut() {
                    Some(ply) => ply.nags.push(nag),
                    None => return Err(unexpected(token.offset, &TokenKind::Nag(nag))),
                },
                TokenKind::Comment(text) => match current.plies.last_mut() {
                    Some(ply) => ply.comments.push(text),
                    None => current.leading.push(text),
                },
                TokenKind::OpenVariation => {
                    if current.plies.is_empty() {
                        return Err(unexpected(token.offset, &TokenKind::OpenVariation));
                    }
                    let variation = OpenLine {
                        open: Some(token.offset),
                        ..OpenLine::default()
                    };
                    outer.push(std::mem::replace(&mut current, variation));
                }
                TokenKind::CloseVariation => {
                    let Some(enclosing) = outer.pop() else {
                        return Err(unexpected(token.offset, &TokenKind::CloseVariation));
                    };
                    let closed = std::mem::replace(&mut current, enclosing);
                    // A variation is only opened after a move, so the enclosing line has one.
                    if let Some(ply) = current.plies.last_mut() {
                        if closed.plies.is_empty() {
                            // An empty variation keeps its comments on the move it follows.
                            ply.comments.extend(closed.leading);
                        } else {
                            ply.variations.push(game.lines.len());
                            game.lines.push(closed.plies);
                        }
                    }
                }
                other => return Err(unexpected(token.offset, &other)),
            }
        }
        game.game_comments = current.leading;
        game.lines[0] = current.plies;
        Ok(())
    }
}

fn unexpected(offset: usize, kind: &TokenKind) -> Error {
    let token = match kind {
        TokenKind::Tag { key, .. } => format!("[{key}"),
        TokenKind::MoveNumber(n) => format!("{n}."),
        TokenKind::San(san) => san.clone(),
        TokenKind::Nag(nag) => nag.to_string(),
        TokenKind::Comment(_) => "{".to_string(),
        TokenKind::OpenVariation => "(".to_string(),
        TokenKind::CloseVariation => ")".to_string(),
        TokenKind::Result(outcome) => outcome.to_string(),
    };
    Error::UnexpectedToken { offset, token }
}

/// Pull `[%key value]` commands out of a comment.
/// Returns the remaining text, trimmed.
pub(crate) fn lift_evals(text: &str, evals: &mut BTreeMap<String, String>) -> String {
    let mut rest = String::new();
    let mut remaining = text;
    while let Some(start) = remaining.find("[%") {
        let Some(len) = remaining[start..].find(']') else {
            break;
        };
        let command = remaining[start + 2..start + len].trim();
        let (key, value) = command
            .split_once(char::is_whitespace)
            .map(|(k, v)| (k, v.trim()))
            .unwrap_or((command, ""));
        if key.is_empty() {
            break;
        }
        evals.insert(key.to_string(), value.to_string());
        rest.push_str(&remaining[..start]);
        remaining = &remaining[start + len + 1..];
    }
    rest.push_str(remaining);
    rest.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn attach_comments(
    texts: Vec<String>,
    comments: &mut Vec<String>,
    evals: &mut BTreeMap<String, String>,
) {
    for text in texts {
        let text = if text.contains("[%") {
            lift_evals(&text, evals)
        } else {
            text
        };
        if !text.is_empty() {
            comments.push(text);
        }
    }
}

fn descend<'a>(mut node: &'a mut MoveNode, path: &[usize]) -> &'a mut MoveNode {
    for &idx in path {
        node = &mut node.children[idx];
    }
    node
}

/// Replay every line below `root`, starting with the main line.
///
/// Variations of a ply are alternatives to it, so they are built from the
/// same parent and land after it, in the order they were written. A line
/// that hits a bad move stops there; the error reported is the bad move
/// that comes first in the text.
fn build_lines(root: &mut MoveNode, mut lines: Vec<Vec<PlyAst>>) -> Result<()> {
    let mut pending: Vec<(Vec<usize>, usize)> = vec![(Vec::new(), 0)];
    // SAN index of the earliest bad move seen so far, with its error.
    let mut failure: Option<(usize, Error)> = None;

    while let Some((mut path, id)) = pending.pop() {
        let line = lines.get_mut(id).map(std::mem::take).unwrap_or_default();
        let mut parent = descend(root, &path);
        let mut branches = Vec::new();
        for ply in line {
            let mv = match parse_san(&parent.position, &ply.san) {
                Ok(mv) => mv,
                Err(e) => {
                    let error = Error::MalformedMove {
                        index: ply.index,
                        offset: ply.offset,
                        token: ply.san.clone(),
                        reason: e.to_string(),
                    };
                    if failure.as_ref().map_or(true, |(first, _)| ply.index < *first) {
                        failure = Some((ply.index, error));
                    }
                    break;
                }
            };
            let mut node = MoveNode::from_move(&parent.position, mv);
            attach_comments(ply.starting_comments, &mut node.starting_comments, &mut node.evals);
            attach_comments(ply.comments, &mut node.comments, &mut node.evals);
            node.nags = ply.nags;

            parent.children.push(node);
            let idx = parent.children.len() - 1;
            branches.extend(ply.variations.into_iter().map(|v| (path.clone(), v)));
            path.push(idx);
            parent = &mut parent.children[idx];
        }
        // Reversed so the first variation is built first.
        pending.extend(branches.into_iter().rev());
    }

    match failure {
        Some((_, error)) => Err(error),
        None => Ok(()),
    }
}

fn build_tree(game: GameAst) -> Result<GameTree> {
    let mut headers: Headers = game.tags.into_iter().collect();

    let position = match headers.fen() {
        Some(fen) => Position::from_fen(fen).map_err(|source| Error::InvalidFen {
            fen: fen.to_string(),
            source,
        })?,
        None => Position::startpos(),
    };

    let mut root = MoveNode::root(position);
    attach_comments(game.game_comments, &mut root.comments, &mut root.evals);
    build_lines(&mut root, game.lines)?;

    match game.result {
        Some(outcome) => {
            if let Some(previous) = headers.result() {
                if previous != outcome {
                    debug!(header = %previous, movetext = %outcome, "result token overrides header");
                }
            }
            headers.set_result(outcome);
        }
        None if headers.get("Result").is_none() => headers.set_result(Outcome::Unknown),
        None => {}
    }

    Ok(GameTree::with_root(headers, root))
}

/// Parse a single PGN game.
///
/// Either the whole game is returned or nothing is: a bad move anywhere,
/// even deep inside a variation, fails the parse.
pub fn parse_pgn(text: &str) -> Result<GameTree> {
    let tokens = Lexer::new(text).tokenize()?;
    if tokens.is_empty() {
        return Err(Error::EmptyInput);
    }
    let game = Parser::new(tokens).game()?;
    let tree = build_tree(game)?;
    debug!(nodes = tree.node_count(), plies = tree.ply_count(), "parsed game");
    Ok(tree)
}

/// A root-only tree from a bare FEN. The tree is always marked FEN-rooted,
/// even for the standard starting position.
pub fn parse_fen(text: &str) -> Result<GameTree> {
    let fen = text.trim();
    if fen.is_empty() {
        return Err(Error::EmptyInput);
    }
    let mut tree = GameTree::from_fen(fen)?;
    let canonical = tree.root_position().to_fen();
    tree.headers.set("FEN", canonical);
    tree.headers.set("SetUp", "1");
    Ok(tree)
}

#[cfg(test)]
#[path = "parser_tests.rs"]
mod parser_tests;
