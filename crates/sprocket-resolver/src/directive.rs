//! Directive parsing.
//!
//! Recognized forms, with optional whitespace around `=`:
//!
//! ```text
//! // = require 'path'
//! //= require "path"
//! /* = require_tree "./dir" */
//! #= require 'path'
//! ```
//!
//! The target must be enclosed in matching quotes. For the `/*` opener a
//! trailing `*/` on the same line belongs to the directive.

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

static DIRECTIVE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?P<open>//|/\*|#)[ \t]*=[ \t]*(?P<kind>require_tree|require)[ \t]+(?:'(?P<single>[^'\n]+)'|"(?P<double>[^"\n]+)")(?P<close>[ \t]*\*/)?"#,
    )
    .unwrap()
});

/// Directive keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectiveKind {
    /// `require`: inline one file.
    Require,
    /// `require_tree`: inline every stylesheet of a directory.
    RequireTree,
}

/// One directive occurrence in a source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    pub kind: DirectiveKind,
    /// Exact matched text, replaced by the resolved content.
    pub raw: String,
    /// Quoted target, without quotes.
    pub target: String,
    /// Byte range of `raw` in the source text.
    pub span: Range<usize>,
}

/// Find every directive in `text`, in source order.
#[must_use]
pub fn parse_directives(text: &str) -> Vec<Directive> {
    DIRECTIVE_PATTERN
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let kind = match caps.name("kind")?.as_str() {
                "require_tree" => DirectiveKind::RequireTree,
                _ => DirectiveKind::Require,
            };
            let target = caps.name("single").or_else(|| caps.name("double"))?;

            // `*/` is only part of the directive when it closes a block comment
            let end = match caps.name("close") {
                Some(close) if caps.name("open")?.as_str() != "/*" => close.start(),
                _ => whole.end(),
            };
            let span = whole.start()..end;

            Some(Directive {
                kind,
                raw: text[span.clone()].to_owned(),
                target: target.as_str().to_owned(),
                span,
            })
        })
        .collect()
}
