//! Path-addressed traversal and a cursor over an owned tree.

use chess_core::Position;

use crate::error::{Error, Result};
use crate::headers::Headers;
use crate::path::Path;
use crate::tree::{GameTree, MoveNode, Nag};

impl GameTree {
    /// Path of the `variation`-th continuation of the node at `path`.
    pub fn advance(&self, path: &Path, variation: usize) -> Result<Path> {
        let node = self.node(path)?;
        if variation >= node.children.len() {
            return Err(Error::NoSuchVariation {
                index: variation,
                available: node.children.len(),
            });
        }
        Ok(path.child(variation))
    }

    /// Path of the parent. Retreating from the root stays at the root.
    pub fn retreat(&self, path: &Path) -> Path {
        path.parent()
    }

    /// True iff `candidate` lies strictly above `path` on the way from the root.
    pub fn is_ancestor(&self, candidate: &Path, path: &Path) -> bool {
        candidate.is_ancestor_of(path)
    }
}

/// A game tree together with the node the user is looking at.
///
/// Edits go through the cursor, and the cursor is kept pointing at a live
/// node after structural changes.
#[derive(Clone, Debug, PartialEq)]
pub struct Navigator {
    tree: GameTree,
    cursor: Path,
}

impl Navigator {
    pub fn new(tree: GameTree) -> Self {
        Self {
            tree,
            cursor: Path::root(),
        }
    }

    /// Open at `cursor`, falling back to the root if it does not resolve.
    pub fn with_cursor(tree: GameTree, cursor: Path) -> Self {
        let cursor = if tree.contains(&cursor) {
            cursor
        } else {
            Path::root()
        };
        Self { tree, cursor }
    }

    pub fn tree(&self) -> &GameTree {
        &self.tree
    }

    pub fn headers_mut(&mut self) -> &mut Headers {
        &mut self.tree.headers
    }

    pub fn into_tree(self) -> GameTree {
        self.tree
    }

    pub fn cursor(&self) -> &Path {
        &self.cursor
    }

    pub fn current(&self) -> &MoveNode {
        // The cursor is re-resolved after every structural edit.
        self.tree.node(&self.cursor).unwrap_or(self.tree.root())
    }

    pub fn position(&self) -> &Position {
        &self.current().position
    }

    pub fn go_to(&mut self, path: &Path) -> Result<()> {
        self.tree.node(path)?;
        self.cursor = path.clone();
        Ok(())
    }

    /// Step into a continuation of the current node.
    pub fn next(&mut self, variation: usize) -> Result<()> {
        self.cursor = self.tree.advance(&self.cursor, variation)?;
        Ok(())
    }

    /// Step back one ply. Returns false at the root.
    pub fn previous(&mut self) -> bool {
        if self.cursor.is_root() {
            return false;
        }
        self.cursor = self.tree.retreat(&self.cursor);
        true
    }

    pub fn go_to_start(&mut self) {
        self.cursor = Path::root();
    }

    /// Follow main-line continuations from the cursor to the end of its line.
    pub fn go_to_end(&mut self) {
        let mut node = self.current();
        let mut path = self.cursor.clone();
        while let Some(child) = node.main_child() {
            path = path.child(0);
            node = child;
        }
        self.cursor = path;
    }

    /// Play `san` from the current node and move onto it.
    pub fn play(&mut self, san: &str) -> Result<()> {
        self.cursor = self.tree.insert_move(&self.cursor, san)?;
        Ok(())
    }

    pub fn promote_variation(&mut self) -> Result<()> {
        let promoted = self.tree.promote_variation(&self.cursor)?;
        self.cursor = promoted;
        Ok(())
    }

    pub fn promote_to_mainline(&mut self) -> Result<()> {
        self.cursor = self.tree.promote_to_mainline(&self.cursor)?;
        Ok(())
    }

    /// Delete the subtree at `path`.
    ///
    /// A cursor inside the removed subtree moves to its parent. A cursor
    /// that ran through a later sibling is shifted down one index so it keeps
    /// addressing the same node.
    pub fn delete(&mut self, path: &Path) -> Result<()> {
        self.tree.delete_node(path)?;
        let depth = path.ply();
        let cursor = self.cursor.indices().to_vec();
        if cursor.len() >= depth && cursor[..depth - 1] == path.indices()[..depth - 1] {
            let removed = path.indices()[depth - 1];
            let ours = cursor[depth - 1];
            if ours == removed {
                self.cursor = path.parent();
            } else if ours > removed {
                let mut shifted = cursor;
                shifted[depth - 1] -= 1;
                self.cursor = Path::from_indices(shifted);
            }
        }
        Ok(())
    }

    /// Delete the current node and step back to its parent.
    pub fn delete_current(&mut self) -> Result<()> {
        let path = self.cursor.clone();
        self.delete(&path)
    }

    pub fn set_comment(&mut self, text: &str) -> Result<()> {
        self.tree.set_comment(&self.cursor, text)
    }

    pub fn set_starting_comment(&mut self, text: &str) -> Result<()> {
        self.tree.set_starting_comment(&self.cursor, text)
    }

    pub fn set_annotation(&mut self, nags: &[Nag]) -> Result<()> {
        self.tree.set_annotation(&self.cursor, nags)
    }

    pub fn toggle_annotation(&mut self, nag: Nag) -> Result<()> {
        self.tree.toggle_annotation(&self.cursor, nag)
    }
}

#[cfg(test)]
#[path = "navigator_tests.rs"]
mod navigator_tests;
