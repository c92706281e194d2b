//! Compiler backend seam.

use std::path::Path;

use crate::error::CompileError;

/// Result of compiling one stylesheet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompileOutput {
    pub css: String,
    /// Source map JSON, when the backend produced one.
    pub source_map: Option<String>,
    /// Files the compiler loaded on its own (`@import`, `@use`), as URLs.
    pub loaded_urls: Vec<String>,
}

/// Stylesheet compiler backend.
///
/// `logical_path` is the path the source is attributed to. It selects the
/// input syntax and anchors relative imports; the file itself is not read.
pub trait Compiler: Send + Sync {
    /// Compile `source` to CSS.
    fn compile(&self, source: &str, logical_path: &Path) -> Result<CompileOutput, CompileError>;
}

/// Backend that returns its input unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct Passthrough;

impl Compiler for Passthrough {
    fn compile(&self, source: &str, logical_path: &Path) -> Result<CompileOutput, CompileError> {
        tracing::debug!(path = %logical_path.display(), "Passing stylesheet through");
        Ok(CompileOutput {
            css: source.to_owned(),
            ..CompileOutput::default()
        })
    }
}

/// Input syntax of a stylesheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Syntax {
    /// SCSS, also used for plain CSS and unknown extensions.
    #[default]
    Scss,
    /// Indented syntax (`.sass`).
    Indented,
}

impl Syntax {
    /// Detect the syntax from a file extension, case-insensitively.
    #[must_use]
    pub fn detect(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("sass") => Self::Indented,
            _ => Self::Scss,
        }
    }

    /// File extension the compiler associates with this syntax.
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Scss => "scss",
            Self::Indented => "sass",
        }
    }
}
