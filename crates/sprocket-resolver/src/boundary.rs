//! Sentinel comments attributing flattened output to its source file.

use std::path::Path;

use crate::paths::display_path;

/// Start/end comment pair wrapped around one file's resolved content.
///
/// ```text
/// /* FILE_BOUNDARY: /app/styles/components/_header.scss - START */
/// ...
/// /* FILE_BOUNDARY: /app/styles/components/_header.scss - END */
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundaryMarker {
    /// Opening comment, surrounded by newlines.
    pub start: String,
    /// Closing comment, surrounded by newlines.
    pub end: String,
    /// Path embedded in both comments, with forward slashes.
    pub path: String,
}

impl BoundaryMarker {
    /// Create the marker pair for `path`.
    #[must_use]
    pub fn new(path: &Path) -> Self {
        let path = display_path(path);
        Self {
            start: format!("\n/* FILE_BOUNDARY: {path} - START */\n"),
            end: format!("\n/* FILE_BOUNDARY: {path} - END */\n"),
            path,
        }
    }

    /// Surround `content` with the marker pair.
    #[must_use]
    pub fn wrap(&self, content: &str) -> String {
        let mut out = String::with_capacity(self.start.len() + content.len() + self.end.len());
        out.push_str(&self.start);
        out.push_str(content);
        out.push_str(&self.end);
        out
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_marker_text() {
        let marker = BoundaryMarker::new(Path::new("/app/_header.scss"));
        assert_eq!(marker.start, "\n/* FILE_BOUNDARY: /app/_header.scss - START */\n");
        assert_eq!(marker.end, "\n/* FILE_BOUNDARY: /app/_header.scss - END */\n");
        assert_eq!(marker.path, "/app/_header.scss");
    }

    #[test]
    fn test_wrap() {
        let marker = BoundaryMarker::new(Path::new("/a.scss"));
        assert_eq!(
            marker.wrap(".a {}"),
            "\n/* FILE_BOUNDARY: /a.scss - START */\n.a {}\n/* FILE_BOUNDARY: /a.scss - END */\n"
        );
    }
}
