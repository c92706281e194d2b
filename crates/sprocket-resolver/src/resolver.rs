//! Directive target resolution.
//!
//! Steps, each tried only when the previous one found nothing:
//! 1. Alias substitution (first matching prefix, applied once)
//! 2. Explicit file mapping (wildcard patterns, checked before any search)
//! 3. Layered search: current directory, include paths, fallback directories,
//!    trying each supported extension and the `_partial` variant
//!
//! The resolver never mutates the filesystem; it only asks the
//! [`FileSource`] whether candidates exist.

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use crate::SUPPORTED_EXTENSIONS;
use crate::config::ResolutionConfig;
use crate::error::ResolveError;
use crate::paths::{has_extension, normalize_path, partial_candidate, plain_candidate};
use crate::source::FileSource;

/// Resolves directive targets to absolute paths.
#[derive(Clone, Copy)]
pub struct PathResolver<'a> {
    config: &'a ResolutionConfig,
    source: &'a dyn FileSource,
}

impl<'a> PathResolver<'a> {
    /// Create a resolver over `config`, checking existence through `source`.
    #[must_use]
    pub fn new(config: &'a ResolutionConfig, source: &'a dyn FileSource) -> Self {
        Self { config, source }
    }

    /// Resolve `import` as written in a file located in `current_dir`.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::FileNotFound`] naming the original `import`
    /// when no strategy yields an existing file.
    pub fn resolve_import_path(
        &self,
        import: &str,
        current_dir: &Path,
    ) -> Result<PathBuf, ResolveError> {
        tracing::debug!(import, current_dir = %current_dir.display(), "Resolving import");

        let aliased = self.apply_alias(import);
        self.find_file(&aliased, current_dir)
            .ok_or_else(|| ResolveError::not_found(import))
    }

    /// Replace the first matching alias prefix, if any.
    #[must_use]
    pub fn apply_alias<'i>(&self, import: &'i str) -> Cow<'i, str> {
        for alias in self.config.aliases() {
            if let Some(rest) = import.strip_prefix(alias.prefix.as_str()) {
                let resolved = format!("{}{rest}", alias.replacement);
                tracing::debug!(import, resolved = %resolved, "Alias applied");
                return Cow::Owned(resolved);
            }
        }
        Cow::Borrowed(import)
    }

    /// Find an existing file for an already alias-substituted target.
    #[must_use]
    pub fn find_file(&self, import: &str, current_dir: &Path) -> Option<PathBuf> {
        self.resolve_mapped(import)
            .or_else(|| self.search(import, current_dir))
    }

    /// Try the explicit file mappings whose pattern matches `import`.
    ///
    /// For each match: the mapped path under the root, then the same path
    /// with a `.scss` extension, then that `.scss` path under each include
    /// path.
    #[must_use]
    pub fn resolve_mapped(&self, import: &str) -> Option<PathBuf> {
        let root = self.config.root();

        for mapping in self.config.file_mapping() {
            if !mapping.pattern.matches(import) {
                continue;
            }
            tracing::debug!(import, pattern = mapping.pattern.as_str(), "File mapping matched");

            let target = Path::new(&mapping.target);
            let exact = normalize_path(&root.join(target));
            if self.source.is_file(&exact) {
                return Some(exact);
            }

            let scss = target.with_extension("scss");
            let scss_under_root = normalize_path(&root.join(&scss));
            if self.source.is_file(&scss_under_root) {
                return Some(scss_under_root);
            }

            for include in self.config.include_paths() {
                let candidate = normalize_path(&include.join(&scss));
                if self.source.is_file(&candidate) {
                    tracing::debug!(import, path = %candidate.display(), "Mapped path found in include path");
                    return Some(candidate);
                }
            }
        }
        None
    }

    /// Layered search over the current directory, include paths and
    /// fallback directories.
    #[must_use]
    pub fn search(&self, import: &str, current_dir: &Path) -> Option<PathBuf> {
        let extensions: &[&str] = if has_extension(import) {
            &[""]
        } else {
            &SUPPORTED_EXTENSIONS
        };

        let roots = std::iter::once(current_dir)
            .chain(self.config.include_paths().iter().map(PathBuf::as_path))
            .chain(self.config.fallback_dirs().iter().map(PathBuf::as_path));

        for root in roots {
            for ext in extensions {
                let plain = plain_candidate(root, import, ext);
                if self.source.is_file(&plain) {
                    tracing::debug!(path = %plain.display(), "Found file");
                    return Some(plain);
                }

                let partial = partial_candidate(root, import, ext);
                if self.source.is_file(&partial) {
                    tracing::debug!(path = %partial.display(), "Found partial file");
                    return Some(partial);
                }
            }
        }

        tracing::debug!(import, "File not found");
        None
    }
}
