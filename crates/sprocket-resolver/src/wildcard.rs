//! Shell-style wildcard patterns for file mappings.
//!
//! Patterns are compiled once into an anchored [`Regex`]:
//! - `**` matches any run of characters, separators included
//! - `*` matches any run of characters except `/`
//! - `?` matches exactly one character except `/`
//!
//! Everything else is literal. Backslashes are treated as `/` on both sides.

use std::borrow::Cow;

use regex::Regex;

/// Compiled wildcard pattern.
#[derive(Debug, Clone)]
pub struct WildcardPattern {
    source: String,
    regex: Regex,
}

impl WildcardPattern {
    /// Compile a wildcard pattern.
    ///
    /// # Errors
    ///
    /// Returns the regex error if the translated pattern is rejected (for
    /// example when it exceeds the regex size limit).
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        let normalized = to_forward_slashes(pattern);
        let mut expr = String::with_capacity(normalized.len() * 2 + 2);
        let mut literal = String::new();
        let mut chars = normalized.chars().peekable();

        expr.push('^');
        while let Some(c) = chars.next() {
            match c {
                '*' => {
                    flush_literal(&mut expr, &mut literal);
                    if chars.peek() == Some(&'*') {
                        chars.next();
                        expr.push_str(".*");
                    } else {
                        expr.push_str("[^/]*");
                    }
                }
                '?' => {
                    flush_literal(&mut expr, &mut literal);
                    expr.push_str("[^/]");
                }
                _ => literal.push(c),
            }
        }
        flush_literal(&mut expr, &mut literal);
        expr.push('$');

        Ok(Self {
            source: pattern.to_owned(),
            regex: Regex::new(&expr)?,
        })
    }

    /// Check whether `text` matches the whole pattern.
    #[must_use]
    pub fn matches(&self, text: &str) -> bool {
        self.regex.is_match(&to_forward_slashes(text))
    }

    /// The pattern as written.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.source
    }
}

fn flush_literal(expr: &mut String, literal: &mut String) {
    if !literal.is_empty() {
        expr.push_str(&regex::escape(literal));
        literal.clear();
    }
}

fn to_forward_slashes(s: &str) -> Cow<'_, str> {
    if s.contains('\\') {
        Cow::Owned(s.replace('\\', "/"))
    } else {
        Cow::Borrowed(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matches(pattern: &str, text: &str) -> bool {
        WildcardPattern::new(pattern).unwrap().matches(text)
    }

    #[test]
    fn test_literal_pattern() {
        assert!(matches("select2", "select2"));
        assert!(!matches("select2", "select2/theme"));
        assert!(!matches("select2", "my-select2"));
    }

    #[test]
    fn test_star_stays_within_segment() {
        assert!(matches("jquery-ui/*", "jquery-ui/theme"));
        assert!(!matches("jquery-ui/*", "jquery-ui/themes/base"));
    }

    #[test]
    fn test_globstar_crosses_separators() {
        assert!(matches("bootstrap/**", "bootstrap/mixins/buttons"));
        assert!(matches("**/reset", "vendor/css/reset"));
    }

    #[test]
    fn test_question_mark_matches_one_char() {
        assert!(matches("v?", "v1"));
        assert!(!matches("v?", "v10"));
        assert!(!matches("a?b", "a/b"));
    }

    #[test]
    fn test_regex_metacharacters_are_literal() {
        assert!(matches("lib.min+(x)", "lib.min+(x)"));
        assert!(!matches("lib.min", "libxmin"));
    }

    #[test]
    fn test_backslashes_normalized() {
        assert!(matches(r"vendor\*", "vendor/select"));
        assert!(matches("vendor/*", r"vendor\select"));
    }

    #[test]
    fn test_as_str_returns_original() {
        let pattern = WildcardPattern::new("bootstrap/**").unwrap();
        assert_eq!(pattern.as_str(), "bootstrap/**");
    }
}
