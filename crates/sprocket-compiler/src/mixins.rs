//! Global mixin files prepended to every compilation.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::CompileError;

/// Loads configured global mixin files from the styles directory.
///
/// A name is looked up under the styles directory as, in order: `name`,
/// `_name`, `name.scss`, `_name.scss`, then the same four under `lib/`.
/// Absolute names are used as given.
#[derive(Debug, Clone)]
pub struct MixinLoader {
    root: PathBuf,
    styles_dir: PathBuf,
    names: Vec<String>,
}

impl MixinLoader {
    /// Create a loader with no mixins. Headers show paths relative to `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, styles_dir: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            styles_dir: styles_dir.into(),
            names: Vec::new(),
        }
    }

    /// Set the mixin names to load, in output order.
    #[must_use]
    pub fn names(mut self, names: &[String]) -> Self {
        self.names = names.to_vec();
        self
    }

    /// Load every configured mixin as a commented block.
    ///
    /// Each block is `// Global mixin from: {path}\n{content}\n`.
    ///
    /// # Errors
    ///
    /// Returns [`CompileError::MixinNotFound`] for the first name with no
    /// readable variant.
    pub fn load(&self) -> Result<Vec<String>, CompileError> {
        self.names
            .iter()
            .map(|name| {
                let (path, content) = self.find(name)?;
                let shown = path.strip_prefix(&self.root).unwrap_or(&path);
                tracing::debug!(path = %path.display(), "Loaded global mixin");
                Ok(format!(
                    "// Global mixin from: {}\n{content}\n",
                    shown.display()
                ))
            })
            .collect()
    }

    fn find(&self, name: &str) -> Result<(PathBuf, String), CompileError> {
        for variant in variants(name) {
            let path = self.styles_dir.join(&variant);
            match fs::read_to_string(&path) {
                Ok(content) => return Ok((path, content)),
                Err(e) => {
                    tracing::trace!(path = %path.display(), error = %e, "Mixin variant not readable");
                }
            }
        }
        tracing::error!(name, "Failed to load global mixin");
        Err(CompileError::MixinNotFound {
            name: name.to_owned(),
        })
    }
}

fn variants(name: &str) -> Vec<String> {
    if Path::new(name).is_absolute() {
        return vec![name.to_owned()];
    }
    let (dir, file) = match name.rsplit_once('/') {
        Some((dir, file)) => (format!("{dir}/"), file),
        None => (String::new(), name),
    };
    let local = [
        format!("{dir}{file}"),
        format!("{dir}_{file}"),
        format!("{dir}{file}.scss"),
        format!("{dir}_{file}.scss"),
    ];
    let lib = local.iter().map(|v| format!("lib/{v}")).collect::<Vec<_>>();
    local.into_iter().chain(lib).collect()
}
