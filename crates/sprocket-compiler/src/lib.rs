//! Stylesheet compilation for expanded Sprockets output.
//!
//! The directive engine produces one self-contained SCSS document per entry.
//! This crate turns that document into CSS:
//!
//! - [`Compiler`]: the backend seam, with [`SassCli`] (Dart Sass executable)
//!   and [`Passthrough`] (no compilation)
//! - [`MixinLoader`]: global mixin files prepended to every compilation
//! - [`Pipeline`]: mixins, `~package` import rewriting, then the backend
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use std::sync::Arc;
//! use sprocket_compiler::{MixinLoader, OutputStyle, Pipeline, SassCli};
//!
//! let sass = SassCli::new()
//!     .load_paths(&["/app/vendor/assets/stylesheets".into()])
//!     .style(OutputStyle::Compressed);
//! let pipeline = Pipeline::new(Arc::new(sass))
//!     .mixins(MixinLoader::new("/app", "/app/app/assets/stylesheets").names(&["mixins".into()]));
//!
//! let compiled = pipeline.compile(".a { color: red; }", Path::new("/app/app/assets/stylesheets/a.scss"))?;
//! println!("{}", compiled.output.css);
//! ```

mod compiler;
mod error;
mod mixins;
mod pipeline;
mod sass;

pub use compiler::{CompileOutput, Compiler, Passthrough, Syntax};
pub use error::{CompileError, Diagnostic};
pub use mixins::MixinLoader;
pub use pipeline::{Compiled, Pipeline};
pub use sass::{OutputStyle, SassCli};
