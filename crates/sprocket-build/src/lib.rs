//! Stylesheet build orchestration.
//!
//! Discovers entry stylesheets under the styles directory, expands their
//! Sprockets directives, compiles the result and writes it to the output
//! directory:
//!
//! ```text
//! <output_dir>/
//!   single/<relative path>.css   standalone entries
//!   group/<name>.css             entry groups
//!   intermediate/                compiler input (optional)
//!   manifest.json                output -> source and dependencies
//! ```
//!
//! The output directory is recreated on every build. A failing entry is
//! reported in the [`BuildReport`] and does not stop the others.

mod builder;
mod discover;
mod error;
mod output;

pub use builder::{BuildReport, Builder, BuiltOutput, compile_pipeline, resolution_config};
pub use discover::{Discovery, GroupPatterns};
pub use error::{BuildError, Entry, EntryFailure};
pub use output::{Manifest, ManifestEntry, OutputLayout, write_file};
