//! Output directory layout and writers.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::BuildError;

const SINGLE_DIR: &str = "single";
const GROUP_DIR: &str = "group";
const INTERMEDIATE_DIR: &str = "intermediate";
const MANIFEST_FILENAME: &str = "manifest.json";

/// Paths inside the build output directory.
///
/// ```text
/// <output>/
///   single/<relative entry path>.css
///   group/<group name>.css
///   intermediate/...        (optional)
///   manifest.json
/// ```
#[derive(Debug, Clone)]
pub struct OutputLayout {
    root: PathBuf,
}

impl OutputLayout {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Output directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Remove the output directory and recreate it with its subdirectories.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::Write`] if removal or creation fails.
    pub fn prepare(&self) -> Result<(), BuildError> {
        match fs::remove_dir_all(&self.root) {
            Ok(()) => tracing::debug!(path = %self.root.display(), "Cleaned up output directory"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(BuildError::write(&self.root, e)),
        }
        for dir in [SINGLE_DIR, GROUP_DIR] {
            let path = self.root.join(dir);
            fs::create_dir_all(&path).map_err(|e| BuildError::write(&path, e))?;
        }
        Ok(())
    }

    /// CSS path of a standalone entry relative to the styles directory.
    #[must_use]
    pub fn single_path(&self, relative: &Path) -> PathBuf {
        self.root.join(SINGLE_DIR).join(relative).with_extension("css")
    }

    /// CSS path of an entry group.
    #[must_use]
    pub fn group_path(&self, name: &str) -> PathBuf {
        self.root.join(GROUP_DIR).join(format!("{name}.css"))
    }

    /// Path the compiler input is preserved at.
    #[must_use]
    pub fn intermediate_path(&self, relative: &Path) -> PathBuf {
        self.root.join(INTERMEDIATE_DIR).join(relative)
    }

    #[must_use]
    pub fn manifest_path(&self) -> PathBuf {
        self.root.join(MANIFEST_FILENAME)
    }

    /// Write CSS and, when present, its source map next to it.
    ///
    /// With a map, a `sourceMappingURL` comment pointing at `<name>.css.map`
    /// is appended to the CSS. Returns the map path.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::Write`] if a file cannot be written.
    pub fn write_stylesheet(
        &self,
        css_path: &Path,
        css: &str,
        source_map: Option<&str>,
    ) -> Result<Option<PathBuf>, BuildError> {
        let Some(map) = source_map else {
            write_file(css_path, css)?;
            return Ok(None);
        };

        let map_path = PathBuf::from(format!("{}.map", css_path.display()));
        let map_name = map_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let css = format!("{}\n/*# sourceMappingURL={map_name} */\n", css.trim_end());

        write_file(css_path, &css)?;
        write_file(&map_path, map)?;
        Ok(Some(map_path))
    }

    /// Write the manifest of every output.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::Manifest`] if serialization fails or
    /// [`BuildError::Write`] if the file cannot be written.
    pub fn write_manifest(&self, manifest: &Manifest) -> Result<(), BuildError> {
        let json = serde_json::to_string_pretty(manifest)?;
        write_file(&self.manifest_path(), &json)
    }

    /// Output-relative path with forward slashes, used as manifest key.
    #[must_use]
    pub fn key(&self, path: &Path) -> String {
        path.strip_prefix(&self.root)
            .unwrap_or(path)
            .to_string_lossy()
            .replace('\\', "/")
    }
}

/// Create parent directories and write `content` to `path`.
///
/// # Errors
///
/// Returns [`BuildError::Write`] on failure.
pub fn write_file(path: &Path, content: &str) -> Result<(), BuildError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| BuildError::write(parent, e))?;
    }
    fs::write(path, content).map_err(|e| BuildError::write(path, e))?;
    tracing::debug!(path = %path.display(), "Written file");
    Ok(())
}

/// `manifest.json`: output path to source and dependencies.
#[derive(Debug, Default, Serialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct Manifest {
    entries: BTreeMap<String, ManifestEntry>,
}

/// One manifest record.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ManifestEntry {
    /// Entry file or group name.
    pub source: String,
    /// Inlined files then compiler-loaded URLs, first occurrence kept.
    pub dependencies: Vec<String>,
}

impl Manifest {
    pub fn insert(&mut self, key: String, entry: ManifestEntry) {
        self.entries.insert(key, entry);
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ManifestEntry> {
        self.entries.get(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_layout_paths() {
        let layout = OutputLayout::new("/out");
        assert_eq!(
            layout.single_path(Path::new("admin/dashboard.sass")),
            PathBuf::from("/out/single/admin/dashboard.css")
        );
        assert_eq!(
            layout.group_path("application"),
            PathBuf::from("/out/group/application.css")
        );
        assert_eq!(
            layout.intermediate_path(Path::new("admin/dashboard.sass")),
            PathBuf::from("/out/intermediate/admin/dashboard.sass")
        );
        assert_eq!(layout.manifest_path(), PathBuf::from("/out/manifest.json"));
        assert_eq!(
            layout.key(Path::new("/out/single/admin/dashboard.css")),
            "single/admin/dashboard.css"
        );
    }

    #[test]
    fn test_prepare_recreates_directory() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path().join("out");
        fs::create_dir_all(root.join("single")).unwrap();
        fs::write(root.join("single/stale.css"), "old").unwrap();

        let layout = OutputLayout::new(&root);
        layout.prepare().unwrap();

        assert!(!root.join("single/stale.css").exists());
        assert!(root.join("single").is_dir());
        assert!(root.join("group").is_dir());
    }

    #[test]
    fn test_prepare_missing_directory() {
        let temp_dir = tempfile::tempdir().unwrap();
        let layout = OutputLayout::new(temp_dir.path().join("a/b"));
        layout.prepare().unwrap();
        assert!(temp_dir.path().join("a/b/group").is_dir());
    }

    #[test]
    fn test_write_stylesheet_with_map() {
        let temp_dir = tempfile::tempdir().unwrap();
        let layout = OutputLayout::new(temp_dir.path());
        let css_path = layout.single_path(Path::new("app.scss"));

        let map_path = layout
            .write_stylesheet(&css_path, ".a{}\n", Some("{\"version\":3}"))
            .unwrap();

        assert_eq!(map_path, Some(temp_dir.path().join("single/app.css.map")));
        assert_eq!(
            fs::read_to_string(&css_path).unwrap(),
            ".a{}\n/*# sourceMappingURL=app.css.map */\n"
        );
        assert_eq!(
            fs::read_to_string(temp_dir.path().join("single/app.css.map")).unwrap(),
            "{\"version\":3}"
        );
    }

    #[test]
    fn test_write_stylesheet_without_map() {
        let temp_dir = tempfile::tempdir().unwrap();
        let layout = OutputLayout::new(temp_dir.path());
        let css_path = layout.group_path("application");

        let map_path = layout.write_stylesheet(&css_path, ".a{}", None).unwrap();

        assert!(map_path.is_none());
        assert_eq!(fs::read_to_string(&css_path).unwrap(), ".a{}");
    }

    #[test]
    fn test_manifest_json_shape() {
        let mut manifest = Manifest::default();
        manifest.insert(
            "single/app.css".to_owned(),
            ManifestEntry {
                source: "app.scss".to_owned(),
                dependencies: vec!["/styles/_variables.scss".to_owned()],
            },
        );

        let value = serde_json::to_value(&manifest).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "single/app.css": {
                    "source": "app.scss",
                    "dependencies": ["/styles/_variables.scss"]
                }
            })
        );
    }
}
