//! Compile pipeline: global mixins, package imports, then the backend.

use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock};

use regex::{Captures, Regex};

use crate::compiler::{CompileOutput, Compiler};
use crate::error::CompileError;
use crate::mixins::MixinLoader;

/// `@import "~pkg/..."`, `@use` and `@forward` with a `~` package prefix.
static PACKAGE_IMPORT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?P<head>@(?:import|use|forward)\s+["'])~(?P<path>[^/"'][^"']*)"#).unwrap()
});

/// Compiler input together with the backend's output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Compiled {
    /// Text handed to the backend, mixins included.
    pub input: String,
    pub output: CompileOutput,
}

/// Prepares expanded text and hands it to a [`Compiler`].
///
/// Preparation prepends the global mixin blocks (joined with newlines, the
/// expanded text last) and, when a package directory is set, rewrites
/// `~package` imports to absolute paths inside it.
#[derive(Clone)]
pub struct Pipeline {
    compiler: Arc<dyn Compiler>,
    mixins: Option<MixinLoader>,
    package_dir: Option<PathBuf>,
}

impl Pipeline {
    /// Create a pipeline with no mixins and no package rewriting.
    #[must_use]
    pub fn new(compiler: Arc<dyn Compiler>) -> Self {
        Self {
            compiler,
            mixins: None,
            package_dir: None,
        }
    }

    #[must_use]
    pub fn mixins(mut self, loader: MixinLoader) -> Self {
        self.mixins = Some(loader);
        self
    }

    /// Resolve `~package` imports against `dir` (usually `node_modules`).
    #[must_use]
    pub fn package_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.package_dir = Some(dir.into());
        self
    }

    /// Build the compiler input for `expanded`.
    ///
    /// # Errors
    ///
    /// Returns [`CompileError::MixinNotFound`] if a global mixin is missing.
    pub fn prepare(&self, expanded: &str) -> Result<String, CompileError> {
        let mut parts = match &self.mixins {
            Some(loader) => loader.load()?,
            None => Vec::new(),
        };
        parts.push(self.rewrite_package_imports(expanded));
        Ok(parts.join("\n"))
    }

    /// Prepare `expanded` and compile it as `logical_path`.
    ///
    /// # Errors
    ///
    /// Returns mixin errors from [`prepare`](Self::prepare) and any backend
    /// error.
    pub fn compile(&self, expanded: &str, logical_path: &Path) -> Result<Compiled, CompileError> {
        let input = self.prepare(expanded)?;
        let output = self.compiler.compile(&input, logical_path)?;
        Ok(Compiled { input, output })
    }

    fn rewrite_package_imports(&self, text: &str) -> String {
        let Some(dir) = &self.package_dir else {
            return text.to_owned();
        };
        let dir = dir.to_string_lossy().replace('\\', "/");
        PACKAGE_IMPORT
            .replace_all(text, |caps: &Captures<'_>| {
                format!("{}{dir}/{}", &caps["head"], &caps["path"])
            })
            .into_owned()
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::sync::Mutex;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::compiler::Passthrough;

    static_assertions::assert_impl_all!(Pipeline: Send, Sync);

    /// Records the logical paths it was called with.
    #[derive(Default)]
    struct Recording {
        calls: Mutex<Vec<PathBuf>>,
    }

    impl Compiler for Recording {
        fn compile(
            &self,
            source: &str,
            logical_path: &Path,
        ) -> Result<CompileOutput, CompileError> {
            self.calls.lock().unwrap().push(logical_path.to_path_buf());
            Ok(CompileOutput {
                css: source.to_uppercase(),
                ..CompileOutput::default()
            })
        }
    }

    #[test]
    fn test_prepare_without_mixins() {
        let pipeline = Pipeline::new(Arc::new(Passthrough));
        assert_eq!(pipeline.prepare(".a {}").unwrap(), ".a {}");
    }

    #[test]
    fn test_prepare_prepends_mixins() {
        let temp_dir = tempfile::tempdir().unwrap();
        let styles = temp_dir.path().join("styles");
        fs::create_dir_all(&styles).unwrap();
        fs::write(styles.join("_mixins.scss"), "@mixin m {}").unwrap();
        fs::write(styles.join("_colors.scss"), "$c: red;").unwrap();

        let loader = MixinLoader::new(temp_dir.path(), &styles)
            .names(&["mixins".to_owned(), "colors".to_owned()]);
        let pipeline = Pipeline::new(Arc::new(Passthrough)).mixins(loader);

        let mixins = Path::new("styles/_mixins.scss").display();
        let colors = Path::new("styles/_colors.scss").display();
        assert_eq!(
            pipeline.prepare(".a {}").unwrap(),
            format!(
                "// Global mixin from: {mixins}\n@mixin m {{}}\n\n// Global mixin from: {colors}\n$c: red;\n\n.a {{}}"
            )
        );
    }

    #[test]
    fn test_missing_mixin_fails_compile() {
        let loader = MixinLoader::new("/nonexistent", "/nonexistent/styles")
            .names(&["mixins".to_owned()]);
        let recording = Arc::new(Recording::default());
        let pipeline = Pipeline::new(Arc::clone(&recording) as Arc<dyn Compiler>).mixins(loader);

        let err = pipeline.compile(".a {}", Path::new("a.scss")).unwrap_err();
        assert!(matches!(err, CompileError::MixinNotFound { .. }));
        assert!(recording.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_compile_keeps_input_and_logical_path() {
        let recording = Arc::new(Recording::default());
        let pipeline = Pipeline::new(Arc::clone(&recording) as Arc<dyn Compiler>);

        let compiled = pipeline
            .compile(".a {}", Path::new("/app/group.scss"))
            .unwrap();

        assert_eq!(compiled.input, ".a {}");
        assert_eq!(compiled.output.css, ".A {}");
        assert_eq!(
            *recording.calls.lock().unwrap(),
            vec![PathBuf::from("/app/group.scss")]
        );
    }

    #[test]
    fn test_package_imports_rewritten() {
        let pipeline = Pipeline::new(Arc::new(Passthrough)).package_dir("/app/node_modules");
        let text = "@import \"~bootstrap/scss/bootstrap\";\n@use '~select2/dist/css/select2';\n@import 'local';";

        assert_eq!(
            pipeline.prepare(text).unwrap(),
            "@import \"/app/node_modules/bootstrap/scss/bootstrap\";\n@use '/app/node_modules/select2/dist/css/select2';\n@import 'local';"
        );
    }

    #[test]
    fn test_package_imports_untouched_without_dir() {
        let pipeline = Pipeline::new(Arc::new(Passthrough));
        let text = "@import \"~bootstrap\";";
        assert_eq!(pipeline.prepare(text).unwrap(), text);
    }
}
