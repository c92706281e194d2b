//! Path helpers shared by the resolver and the tree expander.

use std::path::{Component, Path, PathBuf};

/// Lexically normalize a path, folding `.` and `..` components.
///
/// Does not touch the filesystem, so symlinks are left as written.
#[must_use]
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match normalized.components().next_back() {
                Some(Component::Normal(_)) => {
                    normalized.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => normalized.push(component),
            },
            other => normalized.push(other),
        }
    }
    normalized
}

/// Check whether a file follows the partial naming convention (`_name.scss`).
#[must_use]
pub fn is_partial(path: &Path) -> bool {
    path.file_name()
        .is_some_and(|name| name.to_string_lossy().starts_with('_'))
}

/// Whether a directive target is taken as already carrying an extension.
///
/// Any dot counts, including those in `./` and `../` segments, so such
/// targets must spell out the full file name.
pub(crate) fn has_extension(import: &str) -> bool {
    import.contains('.')
}

/// Plain candidate: `root/import{ext}`.
pub(crate) fn plain_candidate(root: &Path, import: &str, ext: &str) -> PathBuf {
    normalize_path(&root.join(format!("{import}{ext}")))
}

/// Partial candidate: `root/dir/_name{ext}` for an import `dir/name`.
pub(crate) fn partial_candidate(root: &Path, import: &str, ext: &str) -> PathBuf {
    let (dir, name) = match import.rsplit_once('/') {
        Some((dir, name)) => (Some(dir), name),
        None => (None, import),
    };
    let mut path = root.to_path_buf();
    if let Some(dir) = dir {
        path.push(dir);
    }
    path.push(format!("_{name}{ext}"));
    normalize_path(&path)
}

/// Render a path with forward slashes for markers and logs.
pub(crate) fn display_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}
