//! Dart Sass command-line backend.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::compiler::{CompileOutput, Compiler, Syntax};
use crate::error::{CompileError, Diagnostic};

/// Default executable name, looked up on `PATH`.
const DEFAULT_BINARY: &str = "sass";

/// Stem of the temporary input and output files.
const INPUT_STEM: &str = "input";

/// First stack-trace line after the excerpt: `  file 3:10  root stylesheet`.
static TRACE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^\s+(?P<file>\S+) (?P<line>\d+):(?P<column>\d+)\s{2,}\S").unwrap()
});

static SOURCE_MAPPING_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n?/\*# sourceMappingURL=[^*]*\*/\s*$").unwrap());

/// CSS output style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputStyle {
    /// One declaration per line.
    #[default]
    Expanded,
    /// Minimal whitespace.
    Compressed,
}

impl OutputStyle {
    /// Parse a style name.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "expanded" => Some(Self::Expanded),
            "compressed" => Some(Self::Compressed),
            _ => None,
        }
    }

    /// Return the style as passed to `--style`.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Expanded => "expanded",
            Self::Compressed => "compressed",
        }
    }
}

/// Compiles stylesheets by running the Dart Sass executable.
///
/// Each compilation writes the source to a temporary directory, runs
/// `sass` on it and reads back the CSS and, when enabled, the source map.
/// The directory of the logical path is the first load path, so relative
/// `@import`s behave as if the source were compiled in place.
///
/// # Example
///
/// ```ignore
/// let sass = SassCli::new()
///     .binary("/usr/local/bin/sass")
///     .load_paths(&[PathBuf::from("/app/vendor/assets/stylesheets")])
///     .source_map(false);
/// ```
#[derive(Debug, Clone)]
pub struct SassCli {
    binary: PathBuf,
    load_paths: Vec<PathBuf>,
    style: OutputStyle,
    source_map: bool,
}

impl Default for SassCli {
    fn default() -> Self {
        Self::new()
    }
}

impl SassCli {
    /// Create a backend running `sass` from `PATH` with source maps enabled.
    #[must_use]
    pub fn new() -> Self {
        Self {
            binary: PathBuf::from(DEFAULT_BINARY),
            load_paths: Vec::new(),
            style: OutputStyle::default(),
            source_map: true,
        }
    }

    /// Set the executable to run.
    #[must_use]
    pub fn binary(mut self, binary: impl Into<PathBuf>) -> Self {
        self.binary = binary.into();
        self
    }

    /// Set directories searched for `@import` and `@use`.
    #[must_use]
    pub fn load_paths(mut self, paths: &[PathBuf]) -> Self {
        self.load_paths = paths.to_vec();
        self
    }

    #[must_use]
    pub fn style(mut self, style: OutputStyle) -> Self {
        self.style = style;
        self
    }

    /// Enable or disable source map generation.
    #[must_use]
    pub fn source_map(mut self, enabled: bool) -> Self {
        self.source_map = enabled;
        self
    }

    fn command(&self, input: &Path, output: &Path, logical_path: &Path) -> Command {
        let mut command = Command::new(&self.binary);
        command.arg("--no-color");

        let anchor = logical_path.parent().filter(|p| !p.as_os_str().is_empty());
        for dir in anchor.into_iter().chain(self.load_paths.iter().map(PathBuf::as_path)) {
            command.arg(format!("--load-path={}", dir.display()));
        }

        command.arg(format!("--style={}", self.style.as_str()));
        if self.source_map {
            command.args(["--source-map", "--embed-sources", "--source-map-urls=absolute"]);
        } else {
            command.arg("--no-source-map");
        }
        command.arg(input).arg(output);
        if let Some(dir) = input.parent() {
            command.current_dir(dir);
        }
        command
    }
}

impl Compiler for SassCli {
    fn compile(&self, source: &str, logical_path: &Path) -> Result<CompileOutput, CompileError> {
        tracing::debug!(path = %logical_path.display(), binary = %self.binary.display(), "Compiling");

        let syntax = Syntax::detect(logical_path);
        let temp_dir = tempfile::tempdir()?;
        let input = temp_dir
            .path()
            .join(format!("{INPUT_STEM}.{}", syntax.extension()));
        let output = temp_dir.path().join(format!("{INPUT_STEM}.css"));
        fs::write(&input, source)?;

        let result = self
            .command(&input, &output, logical_path)
            .output()
            .map_err(|e| CompileError::Spawn {
                binary: self.binary.display().to_string(),
                source: e,
            })?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            let diagnostic = parse_diagnostic(&stderr, &input, logical_path);
            tracing::debug!(error = %diagnostic, "Compilation failed");
            return Err(CompileError::Stylesheet(diagnostic));
        }

        let css = fs::read_to_string(&output)?;
        let css = SOURCE_MAPPING_URL.replace(&css, "\n").into_owned();

        if !self.source_map {
            return Ok(CompileOutput {
                css,
                ..CompileOutput::default()
            });
        }

        let map = fs::read_to_string(output.with_extension("css.map"))?;
        let (source_map, loaded_urls) = rewrite_source_map(&map, &input, logical_path)?;

        Ok(CompileOutput {
            css,
            source_map: Some(source_map),
            loaded_urls,
        })
    }
}

/// Point the temporary input's entry in `sources` at `logical_path` and
/// collect the remaining sources as loaded URLs.
fn rewrite_source_map(
    map: &str,
    input: &Path,
    logical_path: &Path,
) -> Result<(String, Vec<String>), CompileError> {
    let mut map: Value = serde_json::from_str(map)?;
    let input_url = file_url(input);
    let logical_url = file_url(logical_path);

    let mut loaded_urls = Vec::new();
    if let Some(sources) = map.get_mut("sources").and_then(Value::as_array_mut) {
        for source in sources.iter_mut() {
            let Some(url) = source.as_str() else {
                continue;
            };
            if url == input_url {
                *source = Value::String(logical_url.clone());
            } else {
                loaded_urls.push(url.to_owned());
            }
        }
    }
    if let Some(file) = map.get_mut("file") {
        *file = Value::String(
            logical_path
                .with_extension("css")
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
        );
    }

    Ok((serde_json::to_string(&map)?, loaded_urls))
}

/// `file://` URL of an absolute path, with forward slashes.
fn file_url(path: &Path) -> String {
    let path = path.to_string_lossy().replace('\\', "/");
    if path.starts_with('/') {
        format!("file://{path}")
    } else {
        format!("file:///{path}")
    }
}

/// Extract message, location and excerpt from Dart Sass error output.
///
/// ```text
/// Error: Undefined variable.
///   ╷
/// 3 │   color: $nope;
///   │          ^^^^^
///   ╵
///   input.scss 3:10  root stylesheet
/// ```
fn parse_diagnostic(stderr: &str, input: &Path, logical_path: &Path) -> Diagnostic {
    let message = stderr
        .lines()
        .find_map(|line| line.strip_prefix("Error: "))
        .unwrap_or_else(|| stderr.trim())
        .to_owned();

    let mut lines = stderr.lines();
    let excerpt: Vec<&str> = lines
        .by_ref()
        .skip_while(|line| !line.trim_start().starts_with('╷'))
        .skip(1)
        .take_while(|line| !line.trim_start().starts_with('╵'))
        .collect();
    let excerpt = (!excerpt.is_empty()).then(|| excerpt.join("\n"));

    // The trace follows the closing ruler, or starts right away without one
    let trace: Vec<&str> = lines.collect();
    let trace = if excerpt.is_some() {
        trace.join("\n")
    } else {
        stderr.to_owned()
    };

    let input_name = input.file_name().map(|n| n.to_string_lossy().into_owned());
    let location = TRACE_PATTERN.captures(&trace).map(|caps| {
        let file = &caps["file"];
        let file = if Some(file) == input_name.as_deref() || Path::new(file) == input {
            logical_path.to_path_buf()
        } else {
            PathBuf::from(file)
        };
        let line = caps["line"].parse::<usize>().unwrap_or(0);
        let column = caps["column"].parse::<usize>().unwrap_or(0);
        (file, line, column)
    });
    let (file, line, column) = location.unwrap_or_else(|| (logical_path.to_path_buf(), 0, 0));

    Diagnostic {
        message,
        file,
        line,
        column,
        excerpt,
    }
}
