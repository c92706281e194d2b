//! `sprocket expand` command implementation.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Args;
use sprocket_build::resolution_config;
use sprocket_config::Config;
use sprocket_resolver::{DirectiveEngine, FsSource, ResolvedContent};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the expand command.
#[derive(Args)]
pub(crate) struct ExpandArgs {
    /// Stylesheet to expand.
    file: PathBuf,

    /// Path to configuration file (default: auto-discover sprocket.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Also print the files that were inlined.
    #[arg(long)]
    deps: bool,

    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,
}

impl ExpandArgs {
    /// Execute the expand command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails or the file cannot be
    /// expanded.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let config = Config::load(self.config.as_deref(), None)?;
        let file = absolute(&self.file)?;

        let resolved = expand(&config, &file)?;
        output.print(&render(&resolved, self.deps))?;
        Ok(())
    }
}

fn absolute(path: &Path) -> Result<PathBuf, CliError> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    Ok(std::env::current_dir()?.join(path))
}

fn expand(config: &Config, file: &Path) -> Result<ResolvedContent, CliError> {
    let engine = DirectiveEngine::new(resolution_config(config)?, Arc::new(FsSource::new()));
    Ok(engine.resolve_file(file)?)
}

/// Expanded text, then a blank line and one dependency per line.
fn render(resolved: &ResolvedContent, deps: bool) -> String {
    let mut text = resolved.content.clone();
    if !text.ends_with('\n') {
        text.push('\n');
    }
    if deps {
        text.push('\n');
        for dep in &resolved.dependencies {
            text.push_str(&dep.display().to_string());
            text.push('\n');
        }
    }
    text
}

#[cfg(test)]
mod tests {
    use std::fs;

    use pretty_assertions::assert_eq;
    use sprocket_config::CONFIG_FILENAME;

    use super::*;

    #[test]
    fn test_expand_with_deps() {
        let temp_dir = tempfile::tempdir().unwrap();
        let styles = temp_dir.path().join("app/assets/stylesheets");
        fs::create_dir_all(&styles).unwrap();
        fs::write(styles.join("_colors.scss"), "$red: #f00;").unwrap();
        fs::write(styles.join("main.scss"), "// = require 'colors'\n.a {}").unwrap();
        let config_path = temp_dir.path().join(CONFIG_FILENAME);
        fs::write(&config_path, "").unwrap();

        let config = Config::load(Some(&config_path), None).unwrap();
        let resolved = expand(&config, &styles.join("main.scss")).unwrap();

        assert_eq!(
            render(&resolved, true),
            format!(
                "$red: #f00;\n.a {{}}\n\n{}\n",
                styles.join("_colors.scss").display()
            )
        );
        assert_eq!(render(&resolved, false), "$red: #f00;\n.a {}\n");
    }

    #[test]
    fn test_expand_missing_require() {
        let temp_dir = tempfile::tempdir().unwrap();
        let file = temp_dir.path().join("main.scss");
        fs::write(&file, "// = require 'nope'").unwrap();
        let config_path = temp_dir.path().join(CONFIG_FILENAME);
        fs::write(&config_path, "").unwrap();

        let config = Config::load(Some(&config_path), None).unwrap();
        let err = expand(&config, &file).unwrap_err();
        assert!(matches!(err, CliError::Resolve(_)));
    }
}
