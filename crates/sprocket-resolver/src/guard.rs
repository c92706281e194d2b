//! In-flight tracking for cycle detection.
//!
//! A [`ProcessingSet`] belongs to exactly one top-level resolution. Entering
//! a path yields an [`InFlight`] guard that removes the path again when it is
//! dropped, so every exit path (including `?` on an error) leaves the set as
//! it found it.

use std::cell::RefCell;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::error::ResolveError;

/// Paths currently being resolved within one top-level call.
#[derive(Debug, Default)]
pub struct ProcessingSet {
    paths: RefCell<HashSet<PathBuf>>,
}

impl ProcessingSet {
    /// Create an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `path` as in flight.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::CircularDependency`] if `path` is already in
    /// flight.
    pub fn enter(&self, path: &Path) -> Result<InFlight<'_>, ResolveError> {
        if !self.paths.borrow_mut().insert(path.to_path_buf()) {
            return Err(ResolveError::circular(path));
        }
        Ok(InFlight {
            set: self,
            path: path.to_path_buf(),
        })
    }

    /// Whether `path` is in flight.
    #[must_use]
    pub fn contains(&self, path: &Path) -> bool {
        self.paths.borrow().contains(path)
    }

    /// Number of paths in flight.
    #[must_use]
    pub fn len(&self) -> usize {
        self.paths.borrow().len()
    }

    /// Whether nothing is in flight.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paths.borrow().is_empty()
    }
}

/// Scope guard for one in-flight path.
#[derive(Debug)]
pub struct InFlight<'a> {
    set: &'a ProcessingSet,
    path: PathBuf,
}

impl InFlight<'_> {
    /// The guarded path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.set.paths.borrow_mut().remove(&self.path);
    }
}
