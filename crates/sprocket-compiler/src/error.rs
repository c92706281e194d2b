//! Compilation error types.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Location and message of a stylesheet compilation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub message: String,
    /// Logical path of the entry being compiled, or the imported file the
    /// error was reported in.
    pub file: PathBuf,
    /// 1-based line, 0 when unknown.
    pub line: usize,
    /// 1-based column, 0 when unknown.
    pub column: usize,
    /// Source lines around the error as printed by the compiler.
    pub excerpt: Option<String>,
}

impl Diagnostic {
    /// Multi-line rendering: location header followed by the excerpt.
    #[must_use]
    pub fn format_error(&self) -> String {
        match &self.excerpt {
            Some(excerpt) => format!("{self}\n{excerpt}"),
            None => self.to_string(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}: {}",
            self.file.display(),
            self.line,
            self.column,
            self.message
        )
    }
}

/// Error returned by [`Compiler`](crate::Compiler) backends and the
/// [`Pipeline`](crate::Pipeline).
#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    /// The stylesheet itself is invalid.
    #[error("SCSS compilation error: {0}")]
    Stylesheet(Diagnostic),

    /// No variant of a configured global mixin exists.
    #[error("Global mixin file not found: {name}")]
    MixinNotFound { name: String },

    /// The compiler executable could not be started.
    #[error("Failed to run {binary}: {source}")]
    Spawn {
        binary: String,
        #[source]
        source: io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid source map: {0}")]
    InvalidSourceMap(#[from] serde_json::Error),
}

impl CompileError {
    /// Stable machine-readable error code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Stylesheet(_) | Self::InvalidSourceMap(_) => "SPROCKETS_COMPILATION_ERROR",
            Self::MixinNotFound { .. } => "SPROCKETS_FILE_NOT_FOUND",
            Self::Spawn { .. } | Self::Io(_) => "SPROCKETS_READ_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn diagnostic(excerpt: Option<&str>) -> Diagnostic {
        Diagnostic {
            message: "Undefined variable.".to_owned(),
            file: PathBuf::from("/app/styles/app.scss"),
            line: 3,
            column: 10,
            excerpt: excerpt.map(ToOwned::to_owned),
        }
    }

    #[test]
    fn test_diagnostic_display() {
        assert_eq!(
            diagnostic(None).to_string(),
            "/app/styles/app.scss:3:10: Undefined variable."
        );
    }

    #[test]
    fn test_format_error_appends_excerpt() {
        let excerpt = "3 │   color: $nope;\n  │          ^^^^^";
        assert_eq!(
            diagnostic(Some(excerpt)).format_error(),
            format!("/app/styles/app.scss:3:10: Undefined variable.\n{excerpt}")
        );
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(
            CompileError::Stylesheet(diagnostic(None)).code(),
            "SPROCKETS_COMPILATION_ERROR"
        );
        assert_eq!(
            CompileError::MixinNotFound {
                name: "mixins".to_owned()
            }
            .code(),
            "SPROCKETS_FILE_NOT_FOUND"
        );
    }

    #[test]
    fn test_mixin_not_found_message() {
        let err = CompileError::MixinNotFound {
            name: "helpers".to_owned(),
        };
        assert_eq!(err.to_string(), "Global mixin file not found: helpers");
    }
}
