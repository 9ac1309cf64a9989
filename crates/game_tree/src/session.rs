//! Per-tab game sessions with write-through persistence.
//!
//! A session is a [`Navigator`] keyed by a [`SessionId`]. It is created when
//! a tab opens, written to its backend after every successful edit, and
//! dropped when the tab closes. The stored blob is JSON holding the game as
//! PGN plus the cursor path, so anything PGN can express survives a restore.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::navigator::Navigator;
use crate::path::Path;
use crate::pgn::parse_pgn;
use crate::serializer::{write_pgn, WriterOptions};
use crate::tree::GameTree;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SessionId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// What gets persisted for one session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub version: u32,
    pub pgn: String,
    pub cursor: Path,
}

impl SessionSnapshot {
    pub const VERSION: u32 = 1;

    pub fn capture(nav: &Navigator) -> Self {
        let options = WriterOptions {
            line_width: 0,
            ..WriterOptions::default()
        };
        Self {
            version: Self::VERSION,
            pgn: write_pgn(nav.tree(), &options),
            cursor: nav.cursor().clone(),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Rebuild the navigator. A cursor that no longer resolves falls back to
    /// the root.
    pub fn restore(&self) -> Result<Navigator> {
        let tree = parse_pgn(&self.pgn)?;
        Ok(Navigator::with_cursor(tree, self.cursor.clone()))
    }
}

/// Storage for session blobs.
pub trait SessionBackend {
    fn load(&self, id: &SessionId) -> Result<Option<String>>;
    fn store(&self, id: &SessionId, blob: &str) -> Result<()>;
    fn remove(&self, id: &SessionId) -> Result<()>;
}

/// Blobs in a shared map. Clones share storage.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    blobs: Arc<Mutex<HashMap<SessionId, String>>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        self.lock().len()
    }

    pub fn contains(&self, id: &SessionId) -> bool {
        self.lock().contains_key(id)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<SessionId, String>> {
        // Writes are single map operations, so a poisoned map is still consistent.
        self.blobs.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl SessionBackend for MemoryBackend {
    fn load(&self, id: &SessionId) -> Result<Option<String>> {
        Ok(self.lock().get(id).cloned())
    }

    fn store(&self, id: &SessionId, blob: &str) -> Result<()> {
        self.lock().insert(id.clone(), blob.to_string());
        Ok(())
    }

    fn remove(&self, id: &SessionId) -> Result<()> {
        self.lock().remove(id);
        Ok(())
    }
}

/// One `<id>.json` file per session in a directory.
#[derive(Debug, Clone)]
pub struct FileBackend {
    dir: PathBuf,
}

impl FileBackend {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn file(&self, id: &SessionId) -> PathBuf {
        let name: String = id
            .as_str()
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.dir.join(format!("{name}.json"))
    }
}

fn io_error(operation: &str, path: &std::path::Path, source: std::io::Error) -> Error {
    Error::Io {
        operation: format!("{operation} {}", path.display()),
        source,
    }
}

impl SessionBackend for FileBackend {
    fn load(&self, id: &SessionId) -> Result<Option<String>> {
        let path = self.file(id);
        match fs::read_to_string(&path) {
            Ok(blob) => Ok(Some(blob)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_error("read", &path, e)),
        }
    }

    fn store(&self, id: &SessionId, blob: &str) -> Result<()> {
        fs::create_dir_all(&self.dir).map_err(|e| io_error("create", &self.dir, e))?;
        let path = self.file(id);
        fs::write(&path, blob).map_err(|e| io_error("write", &path, e))
    }

    fn remove(&self, id: &SessionId) -> Result<()> {
        let path = self.file(id);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_error("remove", &path, e)),
        }
    }
}

/// Open sessions plus the backend they are persisted to.
pub struct SessionStore<B: SessionBackend> {
    backend: B,
    open: HashMap<SessionId, Navigator>,
}

impl<B: SessionBackend> SessionStore<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            open: HashMap::new(),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    fn persist(&self, id: &SessionId, nav: &Navigator) -> Result<()> {
        let blob = SessionSnapshot::capture(nav).to_json()?;
        self.backend.store(id, &blob)
    }

    /// Start a session on `tree`, replacing any open session with the same id.
    pub fn open(&mut self, id: SessionId, tree: GameTree) -> Result<&Navigator> {
        let nav = Navigator::new(tree);
        self.persist(&id, &nav)?;
        debug!(session = %id, "opened session");
        self.open.insert(id.clone(), nav);
        Ok(&self.open[&id])
    }

    /// Load a session from the backend.
    pub fn restore(&mut self, id: SessionId) -> Result<&Navigator> {
        let blob = self
            .backend
            .load(&id)?
            .ok_or_else(|| Error::SessionNotFound { id: id.to_string() })?;
        let nav = SessionSnapshot::from_json(&blob)?.restore()?;
        debug!(session = %id, cursor = %nav.cursor(), "restored session");
        self.open.insert(id.clone(), nav);
        Ok(&self.open[&id])
    }

    pub fn get(&self, id: &SessionId) -> Option<&Navigator> {
        self.open.get(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &SessionId> {
        self.open.keys()
    }

    /// Apply `edit` to a session and persist the result.
    ///
    /// The edit runs on a copy. If it fails, or the write fails, the session
    /// and its stored blob are left as they were.
    pub fn edit<T, F>(&mut self, id: &SessionId, edit: F) -> Result<T>
    where
        F: FnOnce(&mut Navigator) -> Result<T>,
    {
        let current = self
            .open
            .get(id)
            .ok_or_else(|| Error::SessionNotFound { id: id.to_string() })?;
        let mut draft = current.clone();
        let out = edit(&mut draft)?;
        self.persist(id, &draft)?;
        self.open.insert(id.clone(), draft);
        Ok(out)
    }

    /// Close a session and discard its stored blob.
    pub fn close(&mut self, id: &SessionId) -> Result<()> {
        if self.open.remove(id).is_none() && self.backend.load(id)?.is_none() {
            return Err(Error::SessionNotFound { id: id.to_string() });
        }
        self.backend.remove(id)?;
        debug!(session = %id, "closed session");
        Ok(())
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod session_tests;
