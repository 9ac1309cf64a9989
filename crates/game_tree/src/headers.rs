//! PGN tag pairs and game outcomes

use std::fmt;

use serde::{Deserialize, Serialize};

/// The standard seven-tag roster, in export order.
pub const SEVEN_TAG_ROSTER: [&str; 7] = ["Event", "Site", "Date", "Round", "White", "Black", "Result"];

/// Final result of a game as recorded by a result token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    WhiteWins,
    Draw,
    BlackWins,
    /// `*`: unfinished, unknown or abandoned
    Unknown,
}

impl Outcome {
    pub fn from_token(token: &str) -> Option<Outcome> {
        match token {
            "1-0" => Some(Outcome::WhiteWins),
            "1/2-1/2" => Some(Outcome::Draw),
            "0-1" => Some(Outcome::BlackWins),
            "*" => Some(Outcome::Unknown),
            _ => None,
        }
    }

    pub fn as_token(self) -> &'static str {
        match self {
            Outcome::WhiteWins => "1-0",
            Outcome::Draw => "1/2-1/2",
            Outcome::BlackWins => "0-1",
            Outcome::Unknown => "*",
        }
    }

    pub fn is_decided(self) -> bool {
        self != Outcome::Unknown
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_token())
    }
}

/// Ordered tag pairs. Unknown keys are kept in insertion order.
///
/// Equality ignores order: two header sets are equal when they hold the same
/// keys with the same values.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Headers {
    entries: Vec<(String, String)>,
}

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Set a tag, replacing an existing value in place.
    ///
    /// Every stored tag can be written as a PGN tag pair: key characters
    /// other than ASCII letters, digits and `_` become `_`, and control
    /// characters in the value (line breaks included) become spaces.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = tag_key(key.into());
        let value = tag_value(value.into());
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        let idx = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(idx).1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Tags in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Tags in export order: the seven-tag roster first, then the rest as inserted.
    pub fn export_order(&self) -> Vec<(&str, &str)> {
        let roster = SEVEN_TAG_ROSTER
            .iter()
            .filter_map(|&key| self.get(key).map(|value| (key, value)));
        let rest = self
            .iter()
            .filter(|(k, _)| !SEVEN_TAG_ROSTER.contains(k));
        roster.chain(rest).collect()
    }

    pub fn result(&self) -> Option<Outcome> {
        self.get("Result").and_then(Outcome::from_token)
    }

    pub fn set_result(&mut self, outcome: Outcome) {
        self.set("Result", outcome.as_token());
    }

    pub fn white(&self) -> Option<&str> {
        self.get("White")
    }

    pub fn black(&self) -> Option<&str> {
        self.get("Black")
    }

    pub fn white_elo(&self) -> Option<u32> {
        self.get("WhiteElo").and_then(|v| v.trim().parse().ok())
    }

    pub fn black_elo(&self) -> Option<u32> {
        self.get("BlackElo").and_then(|v| v.trim().parse().ok())
    }

    pub fn date(&self) -> Option<&str> {
        self.get("Date")
    }

    /// Starting FEN for games that do not begin from the initial position.
    pub fn fen(&self) -> Option<&str> {
        self.get("FEN")
    }

    pub fn is_fen_rooted(&self) -> bool {
        self.fen().is_some()
    }
}

impl PartialEq for Headers {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|(k, v)| other.get(k) == Some(v))
    }
}

impl Eq for Headers {}

fn is_key_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn tag_key(key: String) -> String {
    if key.is_empty() {
        return "_".to_string();
    }
    if key.chars().all(is_key_char) {
        return key;
    }
    key.chars()
        .map(|c| if is_key_char(c) { c } else { '_' })
        .collect()
}

fn tag_value(value: String) -> String {
    if !value.contains(char::is_control) {
        return value;
    }
    value
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect()
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Headers {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = Headers::new();
        for (k, v) in iter {
            headers.set(k, v);
        }
        headers
    }
}
