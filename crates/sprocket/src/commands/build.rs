//! `sprocket build` command implementation.

use std::path::PathBuf;

use clap::Args;
use sprocket_build::{BuildReport, Builder};
use sprocket_config::{Backend, CliSettings, Config};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the build command.
#[derive(Args)]
pub(crate) struct BuildArgs {
    /// Path to configuration file (default: auto-discover sprocket.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Project root (overrides config).
    #[arg(long)]
    root: Option<PathBuf>,

    /// Output directory, relative to the root (overrides config).
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Dart Sass executable (overrides config).
    #[arg(long, env = "SPROCKET_SASS")]
    sass: Option<String>,

    /// Write expanded stylesheets without compiling them.
    #[arg(long)]
    passthrough: bool,

    /// Disable source maps.
    #[arg(long)]
    no_source_map: bool,

    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,
}

impl BuildArgs {
    fn cli_settings(&self) -> CliSettings {
        CliSettings {
            root: self.root.clone(),
            output_dir: self.output.clone(),
            sass_binary: self.sass.clone(),
            source_map: self.no_source_map.then_some(false),
            backend: self.passthrough.then_some(Backend::Passthrough),
        }
    }

    /// Execute the build command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails, the build cannot run, or
    /// any entry failed.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let config = Config::load(self.config.as_deref(), Some(&self.cli_settings()))?;
        if let Some(path) = &config.config_path {
            output.info(&format!("Config: {}", path.display()));
        }
        output.info(&format!(
            "Styles: {}",
            config.project_resolved.styles_dir.display()
        ));
        output.info(&format!(
            "Output: {}",
            config.project_resolved.output_dir.display()
        ));

        let report = Builder::from_config(&config)?.build()?;
        summarize(&output, &report)
    }
}

fn summarize(output: &Output, report: &BuildReport) -> Result<(), CliError> {
    for failure in &report.failures {
        output.warning(&format!("[{}] {failure}", failure.error.code()));
    }

    let total = report.outputs.len() + report.failures.len();
    if report.is_success() {
        output.success(&format!("Built {total} stylesheets"));
        return Ok(());
    }

    output.highlight(&format!(
        "Built {} of {total} stylesheets",
        report.outputs.len()
    ));
    Err(CliError::EntriesFailed {
        failed: report.failures.len(),
        total,
    })
}
