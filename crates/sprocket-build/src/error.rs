//! Build error types.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use sprocket_compiler::CompileError;
use sprocket_resolver::{ResolutionConfigError, ResolveError};

/// Error for one entry, one group, or the build as a whole.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error("Invalid resolution config: {0}")]
    Config(#[from] ResolutionConfigError),

    #[error("Invalid glob pattern \"{pattern}\": {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("Failed to write file: {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to serialize manifest: {0}")]
    Manifest(#[from] serde_json::Error),
}

impl BuildError {
    pub(crate) fn write(path: &Path, source: io::Error) -> Self {
        Self::Write {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Stable machine-readable error code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Resolve(e) => e.code(),
            Self::Compile(e) => e.code(),
            Self::Config(_) | Self::Pattern { .. } => "SPROCKETS_INVALID_CONFIG",
            Self::Write { .. } | Self::Manifest(_) => "SPROCKETS_WRITE_ERROR",
        }
    }
}

/// Unit of work in a build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    /// Standalone stylesheet, relative to the styles directory.
    Single(PathBuf),
    /// Named entry group.
    Group(String),
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single(path) => write!(f, "{}", path.display()),
            Self::Group(name) => write!(f, "group {name}"),
        }
    }
}

/// An entry that failed; the rest of the build continued.
#[derive(Debug, thiserror::Error)]
#[error("Error processing {entry}: {error}")]
pub struct EntryFailure {
    pub entry: Entry,
    #[source]
    pub error: BuildError,
}
