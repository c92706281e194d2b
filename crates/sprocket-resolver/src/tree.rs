//! `require_tree` expansion.

use std::path::{Path, PathBuf};

use crate::PRIMARY_EXTENSION;
use crate::boundary::BoundaryMarker;
use crate::engine::{ResolvedContent, Session};
use crate::error::ResolveError;
use crate::paths::normalize_path;

impl Session<'_> {
    /// Inline every `.scss` file directly inside a directory.
    ///
    /// `tree_ref` is relative to `current_dir`; a leading `./` is ignored.
    /// Members are sorted by file name, resolved through this session and
    /// wrapped in [`BoundaryMarker`]s. Subdirectories are not descended into.
    ///
    /// A target that is missing, is not a directory, or cannot be listed
    /// yields empty content and no dependencies.
    ///
    /// # Errors
    ///
    /// Propagates the first error from resolving a member, including
    /// [`ResolveError::CircularDependency`].
    pub fn expand_tree(
        &self,
        tree_ref: &str,
        current_dir: &Path,
    ) -> Result<ResolvedContent, ResolveError> {
        let relative = tree_ref.strip_prefix("./").unwrap_or(tree_ref);
        let tree_dir = normalize_path(&current_dir.join(relative));
        let source = self.engine.source();

        if !source.is_dir(&tree_dir) {
            tracing::debug!(path = %tree_dir.display(), "Tree directory not found");
            return Ok(ResolvedContent::default());
        }

        let mut members: Vec<PathBuf> = match source.list_dir(&tree_dir) {
            Ok(entries) => entries
                .into_iter()
                .filter(|p| is_tree_member(p) && source.is_file(p))
                .collect(),
            Err(e) => {
                tracing::warn!(path = %tree_dir.display(), error = %e, "Failed to list tree directory");
                return Ok(ResolvedContent::default());
            }
        };
        members.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

        tracing::debug!(
            path = %tree_dir.display(),
            count = members.len(),
            "Expanding tree"
        );

        let mut blocks = Vec::with_capacity(members.len());
        let mut dependencies = Vec::new();
        for member in members {
            let resolved = self.resolve_file(&member)?;
            blocks.push(BoundaryMarker::new(&member).wrap(&resolved.content));
            dependencies.push(member);
            dependencies.extend(resolved.dependencies);
        }

        Ok(ResolvedContent {
            content: blocks.join("\n"),
            dependencies,
        })
    }
}

fn is_tree_member(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.ends_with(PRIMARY_EXTENSION))
}
