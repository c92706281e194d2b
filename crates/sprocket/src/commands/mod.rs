//! CLI command implementations.

pub(crate) mod build;
pub(crate) mod expand;

pub(crate) use build::BuildArgs;
pub(crate) use expand::ExpandArgs;
