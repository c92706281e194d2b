//! Sprockets directive expansion for stylesheets.
//!
//! Expands `// = require "x"` and `// = require_tree "dir"` comments into a
//! single, dependency-ordered document that a stylesheet compiler can consume
//! without knowing anything about the legacy directive syntax.
//!
//! # Architecture
//!
//! - [`PathResolver`]: turns a directive target into an absolute path using
//!   aliases, wildcard file mappings and layered search roots
//! - [`ProcessingSet`]: in-flight paths of one top-level resolution, used to
//!   detect cycles
//! - [`DirectiveEngine`] / [`Session`]: scans text for directives, resolves
//!   them recursively and splices the results back in; `require_tree` targets
//!   are expanded member by member in lexicographic order
//! - [`FileSource`]: read and stat access with a per-build content cache
//!   ([`FsSource`] for the filesystem, `MockSource` behind the `mock` feature)
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use std::sync::Arc;
//! use sprocket_resolver::{DirectiveEngine, FsSource, ResolutionConfig};
//!
//! let config = ResolutionConfig::builder("/app")
//!     .include_path("/app/vendor/assets/stylesheets")
//!     .alias("~lib", "app/assets/stylesheets/lib")
//!     .build()?;
//! let engine = DirectiveEngine::new(config, Arc::new(FsSource::new()));
//!
//! let resolved = engine.resolve_file(Path::new("/app/app/assets/stylesheets/application.scss"))?;
//! println!("{}", resolved.content);
//! ```

mod boundary;
mod config;
mod directive;
mod engine;
mod error;
mod guard;
#[cfg(any(test, feature = "mock"))]
mod mock;
mod paths;
mod resolver;
mod source;
mod tree;
mod wildcard;

pub use boundary::BoundaryMarker;
pub use config::{Alias, FileMapping, ResolutionConfig, ResolutionConfigBuilder};
pub use directive::{Directive, DirectiveKind, parse_directives};
pub use engine::{DirectiveEngine, ResolvedContent, Session};
pub use error::{ResolutionConfigError, ResolveError};
pub use guard::{InFlight, ProcessingSet};
#[cfg(any(test, feature = "mock"))]
pub use mock::MockSource;
pub use paths::{is_partial, normalize_path};
pub use resolver::PathResolver;
pub use source::{FileSource, FsSource};
pub use wildcard::WildcardPattern;

/// Extensions tried, in order, for a directive target written without one.
pub const SUPPORTED_EXTENSIONS: [&str; 3] = [".scss", ".sass", ".css"];

/// Extension of files picked up by `require_tree`.
pub const PRIMARY_EXTENSION: &str = ".scss";
