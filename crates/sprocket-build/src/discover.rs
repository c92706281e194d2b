//! Entry discovery under the styles directory.

use std::ffi::OsStr;
use std::path::{Component, Path, PathBuf};

use glob::{MatchOptions, Pattern};
use sprocket_resolver::is_partial;

use crate::error::BuildError;

/// Extensions of standalone entries.
const ENTRY_EXTENSIONS: [&str; 2] = ["scss", "sass"];

/// Directory never searched for entries.
const PACKAGE_DIR: &str = "node_modules";

/// `*` stays within one path segment and hidden files need an explicit dot.
const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: true,
};

/// Compiled glob patterns of one entry group.
#[derive(Debug, Clone)]
pub struct GroupPatterns {
    patterns: Vec<Pattern>,
}

impl GroupPatterns {
    /// Compile patterns relative to the styles directory.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::Pattern`] for the first invalid pattern.
    pub fn new(patterns: &[String]) -> Result<Self, BuildError> {
        let patterns = patterns
            .iter()
            .map(|p| {
                Pattern::new(p).map_err(|source| BuildError::Pattern {
                    pattern: p.clone(),
                    source,
                })
            })
            .collect::<Result<_, _>>()?;
        Ok(Self { patterns })
    }

    /// Whether a styles-relative path matches any pattern.
    #[must_use]
    pub fn matches(&self, relative: &Path) -> bool {
        let relative = to_slash(relative);
        self.patterns
            .iter()
            .any(|p| p.matches_with(&relative, MATCH_OPTIONS))
    }
}

/// Discovers standalone entries and group members.
#[derive(Debug)]
pub struct Discovery<'a> {
    styles_dir: &'a Path,
    ignore_partials: bool,
}

impl<'a> Discovery<'a> {
    #[must_use]
    pub fn new(styles_dir: &'a Path, ignore_partials: bool) -> Self {
        Self {
            styles_dir,
            ignore_partials,
        }
    }

    /// Every `.scss`/`.sass` file not claimed by a group, sorted.
    ///
    /// Files under `node_modules` are skipped, and so are partials when
    /// partials are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::Pattern`] if the styles directory cannot be
    /// turned into a glob pattern.
    pub fn entries(&self, groups: &[GroupPatterns]) -> Result<Vec<PathBuf>, BuildError> {
        let mut entries = Vec::new();
        for ext in ENTRY_EXTENSIONS {
            entries.extend(self.glob(&format!("**/*.{ext}"))?);
        }
        entries.retain(|path| {
            let relative = self.relative(path);
            self.is_candidate(path) && !groups.iter().any(|g| g.matches(relative))
        });
        entries.sort();
        entries.dedup();
        Ok(entries)
    }

    /// Members of one group: files matching any of `patterns`, sorted.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::Pattern`] for an invalid pattern.
    pub fn group_members(&self, patterns: &[String]) -> Result<Vec<PathBuf>, BuildError> {
        let mut members = Vec::new();
        for pattern in patterns {
            members.extend(self.glob(pattern)?);
        }
        members.retain(|path| self.is_candidate(path));
        members.sort();
        members.dedup();
        Ok(members)
    }

    /// Path relative to the styles directory.
    #[must_use]
    pub fn relative<'p>(&self, path: &'p Path) -> &'p Path {
        path.strip_prefix(self.styles_dir).unwrap_or(path)
    }

    fn is_candidate(&self, path: &Path) -> bool {
        let in_packages = self
            .relative(path)
            .components()
            .any(|c| c == Component::Normal(OsStr::new(PACKAGE_DIR)));
        !in_packages && !(self.ignore_partials && is_partial(path)) && path.is_file()
    }

    fn glob(&self, pattern: &str) -> Result<Vec<PathBuf>, BuildError> {
        let base = Pattern::escape(&to_slash(self.styles_dir));
        let full = format!("{base}/{pattern}");
        let paths = glob::glob_with(&full, MATCH_OPTIONS).map_err(|source| BuildError::Pattern {
            pattern: pattern.to_owned(),
            source,
        })?;

        Ok(paths
            .filter_map(|entry| match entry {
                Ok(path) => Some(path),
                Err(e) => {
                    tracing::warn!(error = %e, "Skipping unreadable path");
                    None
                }
            })
            .collect())
    }
}

fn to_slash(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}
