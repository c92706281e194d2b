//! In-memory [`FileSource`] for tests.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use crate::error::ResolveError;
use crate::source::FileSource;

/// In-memory file tree.
///
/// Directory listings come back in insertion order, which lets tests prove
/// that callers sort entries themselves.
///
/// # Example
///
/// ```ignore
/// use sprocket_resolver::MockSource;
///
/// let source = MockSource::new()
///     .with_file("/app/_variables.scss", "$primary-color: #ff7700;")
///     .with_dir("/app/empty");
/// ```
#[derive(Debug, Default)]
pub struct MockSource {
    files: RwLock<Vec<(PathBuf, Arc<str>)>>,
    dirs: RwLock<Vec<PathBuf>>,
    reads: AtomicUsize,
}

impl MockSource {
    /// Create an empty tree.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file; its ancestor directories are created implicitly.
    #[must_use]
    pub fn with_file(self, path: impl Into<PathBuf>, content: &str) -> Self {
        let path = path.into();
        if let Some(parent) = path.parent() {
            self.add_dir(parent);
        }
        let mut files = self.files.write().unwrap_or_else(PoisonError::into_inner);
        files.retain(|(p, _)| p != &path);
        files.push((path, Arc::from(content)));
        drop(files);
        self
    }

    /// Add an empty directory.
    #[must_use]
    pub fn with_dir(self, path: impl Into<PathBuf>) -> Self {
        self.add_dir(&path.into());
        self
    }

    /// Number of successful reads so far.
    #[must_use]
    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::Relaxed)
    }

    fn add_dir(&self, path: &Path) {
        let mut dirs = self.dirs.write().unwrap_or_else(PoisonError::into_inner);
        for ancestor in path.ancestors() {
            if ancestor.as_os_str().is_empty() {
                continue;
            }
            if !dirs.iter().any(|d| d == ancestor) {
                dirs.push(ancestor.to_path_buf());
            }
        }
    }
}

impl FileSource for MockSource {
    fn read(&self, path: &Path) -> Result<Arc<str>, ResolveError> {
        let files = self.files.read().unwrap_or_else(PoisonError::into_inner);
        let content = files
            .iter()
            .find(|(p, _)| p == path)
            .map(|(_, c)| Arc::clone(c))
            .ok_or_else(|| {
                ResolveError::io(path, io::Error::new(io::ErrorKind::NotFound, "not found"))
            })?;
        self.reads.fetch_add(1, Ordering::Relaxed);
        Ok(content)
    }

    fn is_file(&self, path: &Path) -> bool {
        self.files
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .any(|(p, _)| p == path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.dirs
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .any(|d| d == path)
    }

    fn list_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        if !self.is_dir(path) {
            return Err(io::Error::new(io::ErrorKind::NotFound, "not a directory"));
        }
        let dirs = self.dirs.read().unwrap_or_else(PoisonError::into_inner);
        let files = self.files.read().unwrap_or_else(PoisonError::into_inner);
        let entries = files
            .iter()
            .map(|(p, _)| p)
            .chain(dirs.iter())
            .filter(|p| p.parent() == Some(path))
            .cloned()
            .collect();
        Ok(entries)
    }
}
