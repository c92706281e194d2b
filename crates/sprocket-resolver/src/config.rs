//! Resolution configuration.
//!
//! [`ResolutionConfig`] is built once per run through
//! [`ResolutionConfigBuilder`], validated, and shared read-only by every
//! resolution afterwards.

use std::path::{Path, PathBuf};

use crate::error::ResolutionConfigError;
use crate::paths::normalize_path;
use crate::wildcard::WildcardPattern;

/// Prefix substitution applied to directive targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alias {
    /// Prefix matched at the start of the target (e.g. `~lib`).
    pub prefix: String,
    /// Replacement path fragment (e.g. `app/assets/stylesheets/lib`).
    pub replacement: String,
}

/// Explicit mapping from a wildcard pattern to a file path.
#[derive(Debug, Clone)]
pub struct FileMapping {
    /// Pattern matched against the (alias-substituted) target.
    pub pattern: WildcardPattern,
    /// Target path, relative to the root unless absolute.
    pub target: String,
}

/// Immutable configuration consumed by the path resolver.
#[derive(Debug, Clone)]
pub struct ResolutionConfig {
    root: PathBuf,
    include_paths: Vec<PathBuf>,
    aliases: Vec<Alias>,
    file_mapping: Vec<FileMapping>,
    fallback_dirs: Vec<PathBuf>,
    ignore_partials: bool,
}

impl ResolutionConfig {
    /// Start building a configuration rooted at `root`.
    pub fn builder(root: impl Into<PathBuf>) -> ResolutionConfigBuilder {
        ResolutionConfigBuilder {
            root: root.into(),
            include_paths: Vec::new(),
            aliases: Vec::new(),
            file_mapping: Vec::new(),
            fallback_dirs: Vec::new(),
            ignore_partials: true,
        }
    }

    /// Absolute base directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute search directories, in priority order, without duplicates.
    #[must_use]
    pub fn include_paths(&self) -> &[PathBuf] {
        &self.include_paths
    }

    /// Aliases in declaration order.
    #[must_use]
    pub fn aliases(&self) -> &[Alias] {
        &self.aliases
    }

    /// File mappings in declaration order.
    #[must_use]
    pub fn file_mapping(&self) -> &[FileMapping] {
        &self.file_mapping
    }

    /// Lowest-priority absolute search roots.
    #[must_use]
    pub fn fallback_dirs(&self) -> &[PathBuf] {
        &self.fallback_dirs
    }

    /// Whether partial files are skipped as standalone entries.
    #[must_use]
    pub fn ignore_partials(&self) -> bool {
        self.ignore_partials
    }
}

/// Builder for [`ResolutionConfig`].
///
/// Relative include paths and fallback directories are coerced to absolute
/// paths under the root when [`build`](Self::build) runs.
#[derive(Debug)]
pub struct ResolutionConfigBuilder {
    root: PathBuf,
    include_paths: Vec<PathBuf>,
    aliases: Vec<(String, String)>,
    file_mapping: Vec<(String, String)>,
    fallback_dirs: Vec<PathBuf>,
    ignore_partials: bool,
}

impl ResolutionConfigBuilder {
    /// Append a search directory.
    #[must_use]
    pub fn include_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.include_paths.push(path.into());
        self
    }

    /// Append several search directories.
    #[must_use]
    pub fn include_paths<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.include_paths.extend(paths.into_iter().map(Into::into));
        self
    }

    /// Append an alias. Earlier aliases win.
    #[must_use]
    pub fn alias(mut self, prefix: impl Into<String>, replacement: impl Into<String>) -> Self {
        self.aliases.push((prefix.into(), replacement.into()));
        self
    }

    /// Append a file mapping. Earlier mappings win.
    #[must_use]
    pub fn map_file(mut self, pattern: impl Into<String>, target: impl Into<String>) -> Self {
        self.file_mapping.push((pattern.into(), target.into()));
        self
    }

    /// Append a fallback search root.
    #[must_use]
    pub fn fallback_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.fallback_dirs.push(path.into());
        self
    }

    /// Set whether partials are skipped as standalone entries (default `true`).
    #[must_use]
    pub fn ignore_partials(mut self, ignore: bool) -> Self {
        self.ignore_partials = ignore;
        self
    }

    /// Validate and freeze the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ResolutionConfigError`] if the root is relative, an alias
    /// prefix is empty, or a mapping pattern cannot be compiled.
    pub fn build(self) -> Result<ResolutionConfig, ResolutionConfigError> {
        if !self.root.is_absolute() {
            return Err(ResolutionConfigError::RelativeRoot(self.root));
        }
        let root = normalize_path(&self.root);

        let mut include_paths: Vec<PathBuf> = Vec::with_capacity(self.include_paths.len());
        for path in self.include_paths {
            let path = absolutize(&root, &path);
            if !include_paths.contains(&path) {
                include_paths.push(path);
            }
        }

        let fallback_dirs = self
            .fallback_dirs
            .iter()
            .map(|dir| absolutize(&root, dir))
            .collect();

        let aliases = self
            .aliases
            .into_iter()
            .map(|(prefix, replacement)| {
                if prefix.is_empty() {
                    Err(ResolutionConfigError::EmptyAlias)
                } else {
                    Ok(Alias {
                        prefix,
                        replacement,
                    })
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        let file_mapping = self
            .file_mapping
            .into_iter()
            .map(|(pattern, target)| {
                let compiled = WildcardPattern::new(&pattern)
                    .map_err(|source| ResolutionConfigError::InvalidPattern { pattern, source })?;
                Ok(FileMapping {
                    pattern: compiled,
                    target,
                })
            })
            .collect::<Result<Vec<_>, ResolutionConfigError>>()?;

        Ok(ResolutionConfig {
            root,
            include_paths,
            aliases,
            file_mapping,
            fallback_dirs,
            ignore_partials: self.ignore_partials,
        })
    }
}

fn absolutize(root: &Path, path: &Path) -> PathBuf {
    normalize_path(&root.join(path))
}
