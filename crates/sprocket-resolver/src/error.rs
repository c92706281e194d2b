//! Resolution error types.

use std::path::{Path, PathBuf};

/// Error raised while expanding directives.
///
/// Nothing inside the engine recovers from these: every error aborts the
/// current resolution branch and propagates to the caller.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// A file was re-entered while it was still being resolved.
    #[error("Circular dependency detected: {}", .path.display())]
    CircularDependency {
        /// Absolute path that closed the cycle.
        path: PathBuf,
    },
    /// No resolution strategy produced an existing file.
    #[error("File not found: {import}")]
    FileNotFound {
        /// Directive target as written in the source.
        import: String,
    },
    /// Reading a resolved file failed.
    #[error("Failed to read file: {}: {source}", .path.display())]
    Io {
        /// File that could not be read.
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ResolveError {
    pub(crate) fn circular(path: &Path) -> Self {
        Self::CircularDependency {
            path: path.to_path_buf(),
        }
    }

    pub(crate) fn not_found(import: &str) -> Self {
        Self::FileNotFound {
            import: import.to_owned(),
        }
    }

    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Stable machine-readable code for this error.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::CircularDependency { .. } => "SPROCKETS_CIRCULAR_DEPENDENCY",
            Self::FileNotFound { .. } => "SPROCKETS_FILE_NOT_FOUND",
            Self::Io { .. } => "SPROCKETS_READ_ERROR",
        }
    }
}

/// Invalid [`ResolutionConfig`](crate::ResolutionConfig).
#[derive(Debug, thiserror::Error)]
pub enum ResolutionConfigError {
    #[error("Root directory must be absolute: {}", .0.display())]
    RelativeRoot(PathBuf),

    #[error("Invalid file mapping pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Alias prefix cannot be empty")]
    EmptyAlias,
}
