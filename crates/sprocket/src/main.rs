//! Sprocket CLI - Sprockets stylesheet preprocessor.
//!
//! Provides commands for:
//! - `build`: Expand, compile and write every entry stylesheet
//! - `expand`: Print the directive-expanded text of one file

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{BuildArgs, ExpandArgs};
use output::Output;

/// Log filter for `--verbose`.
const VERBOSE_FILTER: &str =
    "warn,sprocket=debug,sprocket_build=debug,sprocket_compiler=debug,sprocket_config=debug,sprocket_resolver=debug";

/// Sprocket - Sprockets directive preprocessor for stylesheets.
#[derive(Parser)]
#[command(name = "sprocket", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build every entry stylesheet into the output directory.
    Build(BuildArgs),
    /// Print the expanded text of one stylesheet.
    Expand(ExpandArgs),
}

impl Commands {
    fn verbose(&self) -> bool {
        match self {
            Self::Build(args) => args.verbose,
            Self::Expand(args) => args.verbose,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables DEBUG for our crates, otherwise use RUST_LOG
    let filter = if cli.command.verbose() {
        EnvFilter::new(VERBOSE_FILTER)
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Build(args) => args.execute(),
        Commands::Expand(args) => args.execute(),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}
