//! The move tree: positions linked by moves, with variations, comments and
//! annotations, plus the structural edits applied to it.
//!
//! Every node owns its children. There are no parent links; anything that
//! needs to go upwards does so through a [`Path`] walked from the root.

use std::collections::BTreeMap;
use std::fmt;

use chess_core::{parse_san, to_san, Move, Position};
use tracing::debug;

use crate::error::{Error, Result};
use crate::headers::{Headers, Outcome};
use crate::path::Path;

/// Numeric Annotation Glyph. `$1`..`$6` are the move-quality glyphs that
/// have a symbolic spelling.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Nag(pub u8);

impl Nag {
    pub const GOOD: Nag = Nag(1);
    pub const MISTAKE: Nag = Nag(2);
    pub const BRILLIANT: Nag = Nag(3);
    pub const BLUNDER: Nag = Nag(4);
    pub const SPECULATIVE: Nag = Nag(5);
    pub const DUBIOUS: Nag = Nag(6);

    pub fn from_symbol(symbol: &str) -> Option<Nag> {
        let nag = match symbol {
            "!" => Nag::GOOD,
            "?" => Nag::MISTAKE,
            "!!" => Nag::BRILLIANT,
            "??" => Nag::BLUNDER,
            "!?" => Nag::SPECULATIVE,
            "?!" => Nag::DUBIOUS,
            _ => return None,
        };
        Some(nag)
    }

    pub fn symbol(self) -> Option<&'static str> {
        match self.0 {
            1 => Some("!"),
            2 => Some("?"),
            3 => Some("!!"),
            4 => Some("??"),
            5 => Some("!?"),
            6 => Some("?!"),
            _ => None,
        }
    }

    pub fn is_move_quality(self) -> bool {
        (1..=6).contains(&self.0)
    }
}

impl fmt::Display for Nag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}", self.0)
    }
}

/// One ply of the tree, or the root when `mv` is `None`.
#[derive(Clone, Debug, PartialEq)]
pub struct MoveNode {
    /// Position after the move; the starting position for the root.
    pub position: Position,
    pub mv: Option<Move>,
    /// Canonical SAN of `mv`.
    pub san: Option<String>,
    /// Continuations. Index 0 is the main line.
    pub children: Vec<MoveNode>,
    pub comments: Vec<String>,
    /// Comments written before the move. Only the first move of a variation
    /// has them.
    pub starting_comments: Vec<String>,
    pub nags: Vec<Nag>,
    /// `[%key value]` commands lifted out of comments.
    pub evals: BTreeMap<String, String>,
}

impl MoveNode {
    pub fn root(position: Position) -> Self {
        Self {
            position,
            mv: None,
            san: None,
            children: Vec::new(),
            comments: Vec::new(),
            starting_comments: Vec::new(),
            nags: Vec::new(),
            evals: BTreeMap::new(),
        }
    }

    /// Child reached by playing `mv` from this node's position.
    pub fn from_move(parent: &Position, mv: Move) -> Self {
        Self {
            san: Some(to_san(parent, mv)),
            mv: Some(mv),
            ..Self::root(parent.play(mv))
        }
    }

    pub fn san(&self) -> &str {
        self.san.as_deref().unwrap_or("")
    }

    pub fn fen(&self) -> String {
        self.position.to_fen()
    }

    pub fn main_child(&self) -> Option<&MoveNode> {
        self.children.first()
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Number of nodes in this subtree, this node included.
    pub fn subtree_size(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            count += 1;
            stack.extend(&node.children);
        }
        count
    }
}

/// A game: headers plus a tree of moves below a fixed root position.
#[derive(Clone, Debug, PartialEq)]
pub struct GameTree {
    pub headers: Headers,
    root: MoveNode,
}

impl Default for GameTree {
    fn default() -> Self {
        Self::new()
    }
}

impl GameTree {
    /// An empty game from the standard starting position.
    pub fn new() -> Self {
        Self::from_position(Position::startpos())
    }

    /// An empty game from an arbitrary position. Anything other than the
    /// standard start is marked FEN-rooted in the headers.
    pub fn from_position(position: Position) -> Self {
        let mut headers = Headers::new();
        headers.set_result(Outcome::Unknown);
        if position != Position::startpos() {
            headers.set("FEN", position.to_fen());
            headers.set("SetUp", "1");
        }
        Self {
            headers,
            root: MoveNode::root(position),
        }
    }

    pub fn from_fen(fen: &str) -> Result<Self> {
        let position = Position::from_fen(fen).map_err(|source| Error::InvalidFen {
            fen: fen.to_string(),
            source,
        })?;
        Ok(Self::from_position(position))
    }

    pub(crate) fn with_root(headers: Headers, root: MoveNode) -> Self {
        Self { headers, root }
    }

    pub fn root(&self) -> &MoveNode {
        &self.root
    }

    pub fn root_position(&self) -> &Position {
        &self.root.position
    }

    pub fn result(&self) -> Outcome {
        self.headers.result().unwrap_or(Outcome::Unknown)
    }

    pub fn set_result(&mut self, outcome: Outcome) {
        self.headers.set_result(outcome);
    }

    /// Game comment written before the first move.
    pub fn game_comments(&self) -> &[String] {
        &self.root.comments
    }

    pub fn node(&self, path: &Path) -> Result<&MoveNode> {
        let mut node = &self.root;
        for &var in path.indices() {
            node = node
                .children
                .get(var)
                .ok_or_else(|| Error::NoSuchPath { path: path.clone() })?;
        }
        Ok(node)
    }

    fn node_mut(&mut self, path: &Path) -> Result<&mut MoveNode> {
        let mut node = &mut self.root;
        for &var in path.indices() {
            node = node
                .children
                .get_mut(var)
                .ok_or_else(|| Error::NoSuchPath { path: path.clone() })?;
        }
        Ok(node)
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.node(path).is_ok()
    }

    /// Main-line nodes after the root, in order.
    pub fn mainline(&self) -> impl Iterator<Item = &MoveNode> {
        std::iter::successors(self.root.main_child(), |node| node.main_child())
    }

    pub fn mainline_sans(&self) -> Vec<&str> {
        self.mainline().map(MoveNode::san).collect()
    }

    /// Number of half-moves in the main line.
    pub fn ply_count(&self) -> usize {
        self.mainline().count()
    }

    /// Path of the last main-line node (the root for an empty game).
    pub fn mainline_end(&self) -> Path {
        Path::mainline(self.ply_count())
    }

    /// Number of nodes in the tree, root included.
    pub fn node_count(&self) -> usize {
        self.root.subtree_size()
    }

    /// Every node with its path in pre-order: a node, then its main line,
    /// then each variation in order.
    pub fn nodes(&self) -> Vec<(Path, &MoveNode)> {
        let mut out = Vec::with_capacity(self.node_count());
        let mut stack = vec![(Path::root(), &self.root)];
        while let Some((path, node)) = stack.pop() {
            for (i, child) in node.children.iter().enumerate().rev() {
                stack.push((path.child(i), child));
            }
            out.push((path, node));
        }
        out
    }

    /// Resolve `san` at `path` and add the move as a continuation.
    ///
    /// If a continuation already leads to the same position its path is
    /// returned and nothing changes. Otherwise the move becomes the last
    /// variation.
    pub fn insert_move(&mut self, path: &Path, san: &str) -> Result<Path> {
        let parent = self.node(path)?;
        let mv = parse_san(&parent.position, san).map_err(|e| Error::IllegalMove {
            san: san.to_string(),
            reason: e.to_string(),
        })?;
        self.insert_resolved(path, mv)
    }

    /// Like [`insert_move`](Self::insert_move) for a move that is already
    /// known to be legal at `path`.
    pub fn insert_resolved(&mut self, path: &Path, mv: Move) -> Result<Path> {
        let parent = self.node_mut(path)?;
        let next = parent.position.play(mv);
        if let Some(idx) = parent.children.iter().position(|c| c.position == next) {
            return Ok(path.child(idx));
        }
        let child = MoveNode::from_move(&parent.position, mv);
        debug!(%path, san = child.san(), "inserted move");
        parent.children.push(child);
        Ok(path.child(parent.children.len() - 1))
    }

    /// Make the node at `path` the first continuation of its parent.
    /// Returns the node's new path. The root is already main line.
    pub fn promote_variation(&mut self, path: &Path) -> Result<Path> {
        let Some(idx) = path.last_variation() else {
            return Ok(Path::root());
        };
        let parent = self.node_mut(&path.parent())?;
        if idx >= parent.children.len() {
            return Err(Error::NoSuchPath { path: path.clone() });
        }
        if idx > 0 {
            let mut node = parent.children.remove(idx);
            // A comment before a main-line move is the previous move's comment.
            let leading = std::mem::take(&mut node.starting_comments);
            parent.comments.extend(leading);
            parent.children.insert(0, node);
        }
        Ok(path.with_last(0))
    }

    /// Promote the node and each of its ancestors, so the whole line from
    /// the root becomes the main line.
    pub fn promote_to_mainline(&mut self, path: &Path) -> Result<Path> {
        self.node(path)?;
        let mut indices = path.indices().to_vec();
        for depth in 1..=indices.len() {
            let prefix = Path::from_indices(indices[..depth].to_vec());
            self.promote_variation(&prefix)?;
            indices[depth - 1] = 0;
        }
        Ok(Path::from_indices(indices))
    }

    /// Remove the subtree rooted at `path`. Paths into the removed subtree,
    /// or through later siblings, no longer address the same nodes.
    pub fn delete_node(&mut self, path: &Path) -> Result<()> {
        let Some(idx) = path.last_variation() else {
            return Err(Error::RootEdit);
        };
        let parent = self.node_mut(&path.parent())?;
        if idx >= parent.children.len() {
            return Err(Error::NoSuchPath { path: path.clone() });
        }
        let removed = parent.children.remove(idx);
        if idx == 0 {
            // The next variation moves up to the main line.
            if let Some(main) = parent.children.first_mut() {
                let leading = std::mem::take(&mut main.starting_comments);
                parent.comments.extend(leading);
            }
        }
        debug!(%path, nodes = removed.subtree_size(), "deleted subtree");
        Ok(())
    }

    /// Replace the comment at `path`. A blank text clears it.
    pub fn set_comment(&mut self, path: &Path, text: &str) -> Result<()> {
        let node = self.node_mut(path)?;
        node.comments = comment_text(text).into_iter().collect();
        Ok(())
    }

    /// Replace the comment written before the move at `path`. Only the first
    /// move of a variation has one; elsewhere a comment before a move is the
    /// previous move's comment. A blank text clears it.
    pub fn set_starting_comment(&mut self, path: &Path, text: &str) -> Result<()> {
        match path.last_variation() {
            Some(idx) if idx > 0 => {}
            _ => return Err(Error::NotVariationStart { path: path.clone() }),
        }
        let node = self.node_mut(path)?;
        node.starting_comments = comment_text(text).into_iter().collect();
        Ok(())
    }

    /// Replace the annotations at `path`, dropping duplicates.
    pub fn set_annotation(&mut self, path: &Path, nags: &[Nag]) -> Result<()> {
        if path.is_root() {
            return Err(Error::RootEdit);
        }
        let node = self.node_mut(path)?;
        node.nags.clear();
        for &nag in nags {
            if !node.nags.contains(&nag) {
                node.nags.push(nag);
            }
        }
        Ok(())
    }

    /// Add `nag` at `path`, or remove it if present. A move-quality glyph
    /// replaces any other move-quality glyph on the node.
    pub fn toggle_annotation(&mut self, path: &Path, nag: Nag) -> Result<()> {
        if path.is_root() {
            return Err(Error::RootEdit);
        }
        let node = self.node_mut(path)?;
        if let Some(idx) = node.nags.iter().position(|&n| n == nag) {
            node.nags.remove(idx);
            return Ok(());
        }
        if nag.is_move_quality() {
            node.nags.retain(|n| !n.is_move_quality());
        }
        node.nags.push(nag);
        Ok(())
    }

    pub fn set_eval(&mut self, path: &Path, key: &str, value: &str) -> Result<()> {
        let node = self.node_mut(path)?;
        node.evals.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Trimmed comment text, or `None` when blank. A comment that needs both a
/// `}` and a line break has no PGN spelling, so its line breaks become
/// spaces.
fn comment_text(text: &str) -> Option<String> {
    let text = text.trim();
    if text.is_empty() {
        None
    } else if text.contains('}') && text.contains(['\n', '\r']) {
        Some(text.split_whitespace().collect::<Vec<_>>().join(" "))
    } else {
        Some(text.to_string())
    }
}

#[cfg(test)]
#[path = "tree_tests.rs"]
mod tree_tests;
