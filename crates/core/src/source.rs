//! Where deck text comes from.
//!
//! The parser reads the root file and every `INCLUDE` through a
//! [`SourceProvider`], so decks can be parsed from disk or from memory.

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};

/// File access used by the parser for the root deck and its includes.
pub trait SourceProvider: Send + Sync {
    /// Read the full text of a deck file.
    fn read_source(&self, path: &Path) -> Result<String, std::io::Error>;

    /// Resolve an include path written in a deck against the directory of
    /// the including file. Absolute include paths are used as they are.
    fn resolve_include(&self, base: &Path, include: &str) -> PathBuf {
        base.join(include)
    }

    /// Canonical form of a path, used to detect include cycles.
    fn canonicalize(&self, path: &Path) -> Result<PathBuf, std::io::Error>;
}

/// Reads decks from the filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileSystemProvider;

impl SourceProvider for FileSystemProvider {
    fn read_source(&self, path: &Path) -> Result<String, std::io::Error> {
        let bytes = std::fs::read(path)?;
        // Non-UTF-8 bytes (Latin-1 comments) are replaced, not rejected.
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    fn canonicalize(&self, path: &Path) -> Result<PathBuf, std::io::Error> {
        path.canonicalize()
    }
}

/// Deck files held in memory, keyed by lexically normalized path.
///
/// Useful for tests and for embedding decks that never touch disk.
/// Canonicalization is purely lexical, so symlinks do not exist here.
#[derive(Debug, Clone, Default)]
pub struct InMemoryProvider {
    decks: HashMap<PathBuf, String>,
}

impl InMemoryProvider {
    pub fn new(decks: HashMap<PathBuf, String>) -> Self {
        decks
            .into_iter()
            .fold(Self::default(), |provider, (path, text)| provider.with_file(path, text))
    }

    pub fn with_file(mut self, path: impl AsRef<Path>, text: impl Into<String>) -> Self {
        self.decks.insert(Self::normalize_path(path.as_ref()), text.into());
        self
    }

    /// Drop `.` components and fold `..` into its parent.
    fn normalize_path(path: &Path) -> PathBuf {
        let mut out = PathBuf::new();
        for part in path.components() {
            match part {
                Component::CurDir => continue,
                Component::ParentDir => {
                    out.pop();
                }
                _ => out.push(part),
            }
        }
        out
    }

    fn lookup(&self, path: &Path) -> Result<(PathBuf, &str), std::io::Error> {
        let key = Self::normalize_path(path);
        match self.decks.get(&key) {
            Some(text) => Ok((key, text.as_str())),
            None => Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("no in-memory deck at {}", key.display()),
            )),
        }
    }
}

impl SourceProvider for InMemoryProvider {
    fn read_source(&self, path: &Path) -> Result<String, std::io::Error> {
        self.lookup(path).map(|(_, text)| text.to_owned())
    }

    fn resolve_include(&self, base: &Path, include: &str) -> PathBuf {
        Self::normalize_path(&base.join(include))
    }

    fn canonicalize(&self, path: &Path) -> Result<PathBuf, std::io::Error> {
        self.lookup(path).map(|(key, _)| key)
    }
}
