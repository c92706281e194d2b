//! File access for the resolver.
//!
//! [`FileSource`] abstracts reads and existence checks so the engine can run
//! against the real filesystem ([`FsSource`]) or an in-memory tree in tests.
//! Reads are cached per build pass; [`FileSource::clear_cache`] starts a new
//! pass.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use crate::error::ResolveError;

/// Read and stat access used during resolution.
pub trait FileSource: Send + Sync {
    /// Read a file as UTF-8 text.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::Io`] if the file cannot be read.
    fn read(&self, path: &Path) -> Result<Arc<str>, ResolveError>;

    /// Whether `path` is an existing regular file.
    fn is_file(&self, path: &Path) -> bool;

    /// Whether `path` is an existing directory.
    fn is_dir(&self, path: &Path) -> bool;

    /// List the direct entries of a directory, in no particular order.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error if the directory cannot be listed.
    fn list_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>>;

    /// Forget cached contents.
    fn clear_cache(&self) {}
}

/// Filesystem-backed [`FileSource`] with an unbounded content cache.
#[derive(Debug, Default)]
pub struct FsSource {
    cache: RwLock<HashMap<PathBuf, Arc<str>>>,
}

impl FsSource {
    /// Create a source with an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cached files.
    #[must_use]
    pub fn cached_len(&self) -> usize {
        self.cache.read().unwrap_or_else(PoisonError::into_inner).len()
    }
}

impl FileSource for FsSource {
    fn read(&self, path: &Path) -> Result<Arc<str>, ResolveError> {
        let cached = self
            .cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(path)
            .cloned();
        if let Some(content) = cached {
            tracing::trace!(path = %path.display(), "Cache hit");
            return Ok(content);
        }

        let content: Arc<str> = fs::read_to_string(path)
            .map_err(|e| ResolveError::io(path, e))?
            .into();
        self.cache
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(path.to_path_buf(), Arc::clone(&content));
        Ok(content)
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn list_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        fs::read_dir(path)?
            .map(|entry| entry.map(|e| e.path()))
            .collect()
    }

    fn clear_cache(&self) {
        self.cache
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        tracing::debug!("Cleared file cache");
    }
}
