//! CLI error types.

use sprocket_build::BuildError;
use sprocket_config::ConfigError;
use sprocket_resolver::ResolveError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Build(#[from] BuildError),

    #[error("{0}")]
    Resolve(#[from] ResolveError),

    #[error("{failed} of {total} entries failed")]
    EntriesFailed { failed: usize, total: usize },
}
