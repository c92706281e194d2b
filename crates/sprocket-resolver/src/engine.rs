//! Directive engine.
//!
//! [`DirectiveEngine`] is shared (`Send + Sync`) and holds the configuration
//! and file source. Every top-level resolution runs in its own [`Session`],
//! which owns the [`ProcessingSet`] used for cycle detection, so concurrent
//! top-level calls never see each other's in-flight paths.
//!
//! Within one text, all `require` directives are resolved first, in source
//! order, then all `require_tree` directives, in source order. Output is
//! assembled by splicing each directive's byte span in the original text
//! with its resolved content.

use std::collections::HashSet;
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::boundary::BoundaryMarker;
use crate::config::ResolutionConfig;
use crate::directive::{DirectiveKind, parse_directives};
use crate::error::ResolveError;
use crate::guard::ProcessingSet;
use crate::paths::normalize_path;
use crate::resolver::PathResolver;
use crate::source::FileSource;

/// Expanded text plus the files it was assembled from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedContent {
    /// Text with every directive replaced.
    pub content: String,
    /// Absolute paths of inlined files, deduplicated, first-seen order.
    pub dependencies: Vec<PathBuf>,
}

/// Shared directive expansion engine.
pub struct DirectiveEngine {
    config: ResolutionConfig,
    source: Arc<dyn FileSource>,
}

impl DirectiveEngine {
    /// Create an engine reading files through `source`.
    #[must_use]
    pub fn new(config: ResolutionConfig, source: Arc<dyn FileSource>) -> Self {
        Self { config, source }
    }

    /// Resolution configuration.
    #[must_use]
    pub fn config(&self) -> &ResolutionConfig {
        &self.config
    }

    /// File source used for reads and existence checks.
    #[must_use]
    pub fn source(&self) -> &dyn FileSource {
        self.source.as_ref()
    }

    /// Path resolver over this engine's configuration.
    #[must_use]
    pub fn resolver(&self) -> PathResolver<'_> {
        PathResolver::new(&self.config, self.source.as_ref())
    }

    /// Open a session for one top-level resolution.
    #[must_use]
    pub fn session(&self) -> Session<'_> {
        Session {
            engine: self,
            in_flight: ProcessingSet::new(),
        }
    }

    /// Resolve `text` as the content of `file_path` in a fresh session.
    ///
    /// # Errors
    ///
    /// See [`Session::resolve`].
    pub fn resolve(&self, text: &str, file_path: &Path) -> Result<ResolvedContent, ResolveError> {
        self.session().resolve(text, file_path)
    }

    /// Read and resolve `file_path` in a fresh session.
    ///
    /// # Errors
    ///
    /// See [`Session::resolve_file`].
    pub fn resolve_file(&self, file_path: &Path) -> Result<ResolvedContent, ResolveError> {
        self.session().resolve_file(file_path)
    }

    /// Read, resolve and boundary-wrap `file_path` in a fresh session.
    ///
    /// # Errors
    ///
    /// See [`Session::process_file`].
    pub fn process_file(&self, file_path: &Path) -> Result<ResolvedContent, ResolveError> {
        self.session().process_file(file_path)
    }

    /// Expand a `require_tree` reference in a fresh session.
    ///
    /// # Errors
    ///
    /// See [`Session::expand_tree`].
    pub fn expand_tree(
        &self,
        tree_ref: &str,
        current_dir: &Path,
    ) -> Result<ResolvedContent, ResolveError> {
        self.session().expand_tree(tree_ref, current_dir)
    }

    /// Targets of the configured file mappings, in declaration order.
    #[must_use]
    pub fn mapped_files(&self) -> Vec<&str> {
        self.config
            .file_mapping()
            .iter()
            .map(|m| m.target.as_str())
            .collect()
    }

    /// Drop cached file contents before a new build pass.
    pub fn clear_cache(&self) {
        self.source.clear_cache();
    }
}

/// One top-level resolution and its in-flight set.
pub struct Session<'e> {
    pub(crate) engine: &'e DirectiveEngine,
    pub(crate) in_flight: ProcessingSet,
}

impl Session<'_> {
    /// Number of paths currently being resolved.
    ///
    /// Zero whenever no call on this session is running.
    #[must_use]
    pub fn in_flight_len(&self) -> usize {
        self.in_flight.len()
    }

    /// Expand every directive in `text`, the content of `file_path`.
    ///
    /// Targets are resolved relative to the directory of `file_path`.
    ///
    /// # Errors
    ///
    /// - [`ResolveError::CircularDependency`] if `file_path` is already being
    ///   resolved in this session
    /// - [`ResolveError::FileNotFound`] if a `require` target does not exist
    /// - [`ResolveError::Io`] if a resolved file cannot be read
    pub fn resolve(&self, text: &str, file_path: &Path) -> Result<ResolvedContent, ResolveError> {
        let file_path = normalize_path(file_path);
        tracing::debug!(path = %file_path.display(), "Resolving requires");

        let _guard = self.in_flight.enter(&file_path)?;
        let current_dir = file_path.parent().unwrap_or(Path::new(""));
        let resolver = self.engine.resolver();
        let directives = parse_directives(text);

        let mut replacements: Vec<(Range<usize>, String)> = Vec::with_capacity(directives.len());
        let mut dependencies = Vec::new();

        for directive in directives
            .iter()
            .filter(|d| d.kind == DirectiveKind::Require)
        {
            let resolved_path = resolver.resolve_import_path(&directive.target, current_dir)?;
            let content = self.engine.source.read(&resolved_path)?;
            let nested = self.resolve(&content, &resolved_path)?;

            dependencies.push(resolved_path);
            dependencies.extend(nested.dependencies);
            replacements.push((directive.span.clone(), nested.content));
        }

        for directive in directives
            .iter()
            .filter(|d| d.kind == DirectiveKind::RequireTree)
        {
            let tree = self.expand_tree(&directive.target, current_dir)?;
            dependencies.extend(tree.dependencies);
            replacements.push((directive.span.clone(), tree.content));
        }

        replacements.sort_by_key(|(span, _)| span.start);

        Ok(ResolvedContent {
            content: splice(text, &replacements),
            dependencies: dedup_paths(dependencies),
        })
    }

    /// Read `file_path` through the file source and resolve it.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::Io`] if the file cannot be read, otherwise the
    /// errors of [`resolve`](Self::resolve).
    pub fn resolve_file(&self, file_path: &Path) -> Result<ResolvedContent, ResolveError> {
        let content = self.engine.source.read(file_path)?;
        self.resolve(&content, file_path)
    }

    /// Resolve `file_path` and wrap the result in a [`BoundaryMarker`].
    ///
    /// The file itself is listed first in the dependencies.
    ///
    /// # Errors
    ///
    /// See [`resolve_file`](Self::resolve_file).
    pub fn process_file(&self, file_path: &Path) -> Result<ResolvedContent, ResolveError> {
        let file_path = normalize_path(file_path);
        let resolved = self.resolve_file(&file_path)?;
        let marker = BoundaryMarker::new(&file_path);

        let mut dependencies = Vec::with_capacity(resolved.dependencies.len() + 1);
        dependencies.push(file_path);
        dependencies.extend(resolved.dependencies);

        Ok(ResolvedContent {
            content: marker.wrap(&resolved.content),
            dependencies: dedup_paths(dependencies),
        })
    }
}

/// Replace each span of `text` with its content. Spans are sorted and
/// disjoint.
fn splice(text: &str, replacements: &[(Range<usize>, String)]) -> String {
    let extra: usize = replacements.iter().map(|(_, s)| s.len()).sum();
    let mut out = String::with_capacity(text.len() + extra);
    let mut cursor = 0;
    for (span, content) in replacements {
        out.push_str(&text[cursor..span.start]);
        out.push_str(content);
        cursor = span.end;
    }
    out.push_str(&text[cursor..]);
    out
}

/// Remove repeated paths, keeping the first occurrence.
fn dedup_paths(paths: Vec<PathBuf>) -> Vec<PathBuf> {
    let mut seen = HashSet::with_capacity(paths.len());
    paths
        .into_iter()
        .filter(|p| seen.insert(p.clone()))
        .collect()
}
