//! Addresses of nodes inside a game tree.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A node address: one variation index per ply, starting below the root.
///
/// The ply of each step is its position in the sequence, so the
/// (ply, variation) pairs are `indices().iter().enumerate()`. The empty path
/// is the root. A path only stays meaningful while the tree keeps the shape it
/// was taken from; after a delete above or before it, re-resolve it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Path(Vec<usize>);

impl Path {
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn from_indices(indices: Vec<usize>) -> Self {
        Self(indices)
    }

    /// The main line down to `plies` half-moves.
    pub fn mainline(plies: usize) -> Self {
        Self(vec![0; plies])
    }

    pub fn indices(&self) -> &[usize] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of half-moves between the root and the addressed node.
    pub fn ply(&self) -> usize {
        self.0.len()
    }

    /// (ply, variation) pairs from the root downwards; plies count from 1.
    pub fn steps(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.0.iter().enumerate().map(|(i, &v)| (i + 1, v))
    }

    pub fn child(&self, variation: usize) -> Path {
        let mut next = self.0.clone();
        next.push(variation);
        Path(next)
    }

    /// The parent path. The root is its own parent.
    pub fn parent(&self) -> Path {
        let mut up = self.0.clone();
        up.pop();
        Path(up)
    }

    /// Variation index of the last step, `None` for the root.
    pub fn last_variation(&self) -> Option<usize> {
        self.0.last().copied()
    }

    /// True iff `self` is a strict prefix of `other`.
    pub fn is_ancestor_of(&self, other: &Path) -> bool {
        self.0.len() < other.0.len() && other.0.starts_with(&self.0)
    }

    /// True iff every step follows variation 0.
    pub fn is_mainline(&self) -> bool {
        self.0.iter().all(|&v| v == 0)
    }

    pub(crate) fn with_last(&self, variation: usize) -> Path {
        let mut next = self.0.clone();
        if let Some(last) = next.last_mut() {
            *last = variation;
        }
        Path(next)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "root");
        }
        let parts: Vec<String> = self.0.iter().map(|v| v.to_string()).collect();
        write!(f, "{}", parts.join("."))
    }
}

impl FromStr for Path {
    type Err = std::num::ParseIntError;

    /// Accepts the `Display` form: `root`, an empty string, or dot-separated indices.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s == "root" {
            return Ok(Path::root());
        }
        s.split('.')
            .map(|part| part.trim().parse::<usize>())
            .collect::<Result<Vec<_>, _>>()
            .map(Path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ancestry_is_strict_prefix() {
        let p = Path::from_indices(vec![0, 0, 1]);
        assert!(Path::root().is_ancestor_of(&p));
        assert!(p.parent().is_ancestor_of(&p));
        assert!(!p.is_ancestor_of(&p));
        assert!(!Path::from_indices(vec![0, 1]).is_ancestor_of(&p));
    }

    #[test]
    fn root_parent_is_root() {
        assert_eq!(Path::root().parent(), Path::root());
    }

    #[test]
    fn display_and_parse_agree() {
        let p = Path::from_indices(vec![0, 2, 1]);
        assert_eq!(p.to_string(), "0.2.1");
        assert_eq!("0.2.1".parse::<Path>().unwrap(), p);
        assert_eq!("root".parse::<Path>().unwrap(), Path::root());
        assert!("0.x".parse::<Path>().is_err());
    }

    #[test]
    fn steps_number_plies_from_one() {
        let p = Path::from_indices(vec![0, 1]);
        assert_eq!(p.steps().collect::<Vec<_>>(), vec![(1, 0), (2, 1)]);
    }
}
