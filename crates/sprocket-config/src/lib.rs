//! Configuration management for sprocket.
//!
//! Parses `sprocket.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied after load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! Path-valued strings support environment variable and home directory
//! expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//! - `~/dir` - expands to the user's home directory
//!
//! Expanded fields:
//! - `project.root`, `project.styles_dir`, `project.output_dir`
//! - `resolve.include_paths`, `resolve.fallback_dirs`
//! - `compiler.sass_binary`
//!
//! ## Ordering
//!
//! `[aliases]`, `[file_mapping]` and `[entry_groups]` keep the order in which
//! keys appear in the file. Alias prefixes and mapping patterns are tried in
//! that order, and groups are built in that order.

mod expand;

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override project root; root-relative paths are resolved again.
    pub root: Option<PathBuf>,
    /// Override output directory.
    pub output_dir: Option<PathBuf>,
    /// Override the Dart Sass executable.
    pub sass_binary: Option<String>,
    /// Override source map generation.
    pub source_map: Option<bool>,
    /// Override compiler backend.
    pub backend: Option<Backend>,
}

/// Configuration filename to search for.
pub const CONFIG_FILENAME: &str = "sprocket.toml";

const DEFAULT_STYLES_DIR: &str = "app/assets/stylesheets";
const DEFAULT_OUTPUT_DIR: &str = "public/assets/vt/sprockets";
const DEFAULT_SASS_BINARY: &str = "sass";
const DEFAULT_STYLE: &str = "expanded";

/// Output styles accepted by `compiler.style`.
const OUTPUT_STYLES: [&str; 2] = ["expanded", "compressed"];

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Project paths (relative strings from TOML).
    project: ProjectConfigRaw,
    /// Resolution settings (relative strings from TOML).
    resolve: ResolveConfigRaw,
    /// Alias prefix to replacement, in file order.
    aliases: toml::Table,
    /// Wildcard pattern to root-relative target, in file order.
    file_mapping: toml::Table,
    /// Group name to glob patterns, in file order.
    entry_groups: toml::Table,
    /// Compiler settings as written.
    compiler: CompilerConfigRaw,

    /// Resolved project paths (set after loading).
    #[serde(skip)]
    pub project_resolved: ProjectConfig,
    /// Resolved resolution settings (set after loading).
    #[serde(skip)]
    pub resolve_resolved: ResolveConfig,
    /// Resolved entry groups (set after loading).
    #[serde(skip)]
    pub entry_groups_resolved: Vec<EntryGroup>,
    /// Resolved compiler settings (set after loading).
    #[serde(skip)]
    pub compiler_resolved: CompilerConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Raw project configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ProjectConfigRaw {
    root: Option<String>,
    styles_dir: Option<String>,
    output_dir: Option<String>,
}

/// Resolved project paths, all absolute.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectConfig {
    /// Base directory for aliases, mappings and relative paths.
    pub root: PathBuf,
    /// Directory scanned for entries and global mixins.
    pub styles_dir: PathBuf,
    /// Directory the build writes into; recreated on every build.
    pub output_dir: PathBuf,
}

/// Raw resolution configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ResolveConfigRaw {
    include_paths: Option<Vec<String>>,
    fallback_dirs: Option<Vec<String>>,
    ignore_partials: Option<bool>,
}

/// Resolved resolution settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveConfig {
    /// Absolute, de-duplicated search directories.
    pub include_paths: Vec<PathBuf>,
    /// Absolute search directories tried after the include paths.
    pub fallback_dirs: Vec<PathBuf>,
    /// Skip `_`-prefixed files when discovering entries.
    pub ignore_partials: bool,
    /// Alias prefix and replacement, in file order.
    pub aliases: Vec<(String, String)>,
    /// Mapping pattern and target, in file order.
    pub file_mapping: Vec<(String, String)>,
}

impl Default for ResolveConfig {
    fn default() -> Self {
        Self {
            include_paths: Vec::new(),
            fallback_dirs: Vec::new(),
            ignore_partials: true,
            aliases: Vec::new(),
            file_mapping: Vec::new(),
        }
    }
}

/// Named set of entry files compiled into one stylesheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryGroup {
    pub name: String,
    /// Glob patterns relative to the styles directory.
    pub patterns: Vec<String>,
}

/// Raw compiler configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct CompilerConfigRaw {
    backend: Option<String>,
    sass_binary: Option<String>,
    style: Option<String>,
    source_map: Option<bool>,
    global_mixins: Option<Vec<String>>,
    preserve_intermediate: Option<bool>,
}

/// Stylesheet compiler backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Backend {
    /// Dart Sass executable.
    #[default]
    Sass,
    /// No compilation; output is the expanded text.
    Passthrough,
}

impl Backend {
    /// Parse backend from its config name.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "sass" => Some(Self::Sass),
            "passthrough" => Some(Self::Passthrough),
            _ => None,
        }
    }

    /// Return backend as its config name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sass => "sass",
            Self::Passthrough => "passthrough",
        }
    }
}

/// Resolved compiler settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilerConfig {
    pub backend: Backend,
    /// Executable name or path of Dart Sass.
    pub sass_binary: String,
    /// `expanded` or `compressed`.
    pub style: String,
    pub source_map: bool,
    /// Mixin names prepended to every compilation, in order.
    pub global_mixins: Vec<String>,
    /// Also write the compiler input under `intermediate/`.
    pub preserve_intermediate: bool,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            backend: Backend::default(),
            sass_binary: DEFAULT_SASS_BINARY.to_owned(),
            style: DEFAULT_STYLE.to_owned(),
            source_map: true,
            global_mixins: Vec::new(),
            preserve_intermediate: false,
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Invalid configuration: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`project.output_dir`").
        field: String,
        /// Error message (e.g., "${`OUT_DIR`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Join `raw` onto `base`, dropping `.` components.
fn resolve_dir(base: &Path, raw: &str) -> PathBuf {
    base.join(raw)
        .components()
        .filter(|c| !matches!(c, std::path::Component::CurDir))
        .collect()
}

/// Read a table whose values must all be strings.
fn string_pairs(table: &toml::Table, section: &str) -> Result<Vec<(String, String)>, ConfigError> {
    table
        .iter()
        .map(|(key, value)| match value.as_str() {
            Some(s) => Ok((key.clone(), s.to_owned())),
            None => Err(ConfigError::Validation(format!(
                "{section}.{key} must be a string"
            ))),
        })
        .collect()
}

/// Read `[entry_groups]`: every value must be an array of strings.
fn entry_groups(table: &toml::Table) -> Result<Vec<EntryGroup>, ConfigError> {
    table
        .iter()
        .map(|(name, value)| {
            let invalid = || {
                ConfigError::Validation(format!(
                    "entry_groups.{name} must be an array of strings"
                ))
            };
            let patterns = value
                .as_array()
                .ok_or_else(invalid)?
                .iter()
                .map(|p| p.as_str().map(ToOwned::to_owned).ok_or_else(invalid))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(EntryGroup {
                name: name.clone(),
                patterns,
            })
        })
        .collect()
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `sprocket.toml` in current directory and parents,
    /// falling back to defaults rooted at the current directory.
    ///
    /// CLI settings are applied after loading and path resolution, allowing CLI
    /// arguments to take precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails,
    /// an environment variable is unset or validation fails.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
            config.validate()?;
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(root) = &settings.root {
            self.resolve_project_paths(root);
        }
        if let Some(output_dir) = &settings.output_dir {
            self.project_resolved.output_dir = self.project_resolved.root.join(output_dir);
        }
        if let Some(sass_binary) = &settings.sass_binary {
            self.compiler_resolved.sass_binary.clone_from(sass_binary);
        }
        if let Some(source_map) = settings.source_map {
            self.compiler_resolved.source_map = source_map;
        }
        if let Some(backend) = settings.backend {
            self.compiler_resolved.backend = backend;
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Create default config with paths relative to current working directory.
    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config with paths relative to given base directory.
    fn default_with_base(base: &Path) -> Self {
        let mut config = Self {
            project: ProjectConfigRaw::default(),
            resolve: ResolveConfigRaw::default(),
            aliases: toml::Table::new(),
            file_mapping: toml::Table::new(),
            entry_groups: toml::Table::new(),
            compiler: CompilerConfigRaw::default(),
            project_resolved: ProjectConfig::default(),
            resolve_resolved: ResolveConfig::default(),
            entry_groups_resolved: Vec::new(),
            compiler_resolved: CompilerConfig::default(),
            config_path: None,
        };
        config.resolve_project_paths(base);
        config
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        // Expand environment variables before path resolution
        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir)?;
        config.config_path = Some(path.to_path_buf());

        // Validate configuration after loading and resolution
        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Called automatically after loading from file and after CLI overrides.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_project()?;
        self.validate_resolve()?;
        self.validate_compiler()?;
        Ok(())
    }

    fn validate_project(&self) -> Result<(), ConfigError> {
        if let Some(styles_dir) = &self.project.styles_dir {
            require_non_empty(styles_dir, "project.styles_dir")?;
        }
        if let Some(output_dir) = &self.project.output_dir {
            require_non_empty(output_dir, "project.output_dir")?;
        }
        if self.project_resolved.output_dir == self.project_resolved.root {
            return Err(ConfigError::Validation(
                "project.output_dir cannot be the project root".to_owned(),
            ));
        }
        Ok(())
    }

    fn validate_resolve(&self) -> Result<(), ConfigError> {
        for (prefix, _) in &self.resolve_resolved.aliases {
            require_non_empty(prefix, "aliases key")?;
        }
        for (pattern, target) in &self.resolve_resolved.file_mapping {
            require_non_empty(pattern, "file_mapping key")?;
            require_non_empty(target, &format!("file_mapping.{pattern}"))?;
        }
        Ok(())
    }

    fn validate_compiler(&self) -> Result<(), ConfigError> {
        let compiler = &self.compiler_resolved;
        require_non_empty(&compiler.sass_binary, "compiler.sass_binary")?;
        if !OUTPUT_STYLES.contains(&compiler.style.as_str()) {
            return Err(ConfigError::Validation(format!(
                "compiler.style must be one of {}, got \"{}\"",
                OUTPUT_STYLES.join(", "),
                compiler.style
            )));
        }
        Ok(())
    }

    /// Expand environment variable references in path-valued strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        let project = &mut self.project;
        if let Some(root) = &project.root {
            project.root = Some(expand::expand_env(root, "project.root")?);
        }
        if let Some(styles_dir) = &project.styles_dir {
            project.styles_dir = Some(expand::expand_env(styles_dir, "project.styles_dir")?);
        }
        if let Some(output_dir) = &project.output_dir {
            project.output_dir = Some(expand::expand_env(output_dir, "project.output_dir")?);
        }

        let resolve = &mut self.resolve;
        if let Some(paths) = &resolve.include_paths {
            resolve.include_paths = Some(expand::expand_env_list(paths, "resolve.include_paths")?);
        }
        if let Some(dirs) = &resolve.fallback_dirs {
            resolve.fallback_dirs = Some(expand::expand_env_list(dirs, "resolve.fallback_dirs")?);
        }

        if let Some(binary) = &self.compiler.sass_binary {
            self.compiler.sass_binary = Some(expand::expand_env(binary, "compiler.sass_binary")?);
        }

        Ok(())
    }

    /// Resolve relative paths and read the ordered tables.
    ///
    /// `project.root` is relative to the config directory; every other path
    /// is relative to the project root.
    fn resolve_paths(&mut self, config_dir: &Path) -> Result<(), ConfigError> {
        let root = resolve_dir(config_dir, self.project.root.as_deref().unwrap_or("."));
        self.resolve_project_paths(&root);

        self.resolve_resolved.aliases = string_pairs(&self.aliases, "aliases")?;
        self.resolve_resolved.file_mapping = string_pairs(&self.file_mapping, "file_mapping")?;
        self.entry_groups_resolved = entry_groups(&self.entry_groups)?;

        let backend = match self.compiler.backend.as_deref() {
            Some(name) => Backend::parse(name).ok_or_else(|| {
                ConfigError::Validation(format!(
                    "compiler.backend must be \"sass\" or \"passthrough\", got \"{name}\""
                ))
            })?,
            None => Backend::default(),
        };
        let defaults = CompilerConfig::default();
        self.compiler_resolved = CompilerConfig {
            backend,
            sass_binary: self.compiler.sass_binary.clone().unwrap_or(defaults.sass_binary),
            style: self.compiler.style.clone().unwrap_or(defaults.style),
            source_map: self.compiler.source_map.unwrap_or(defaults.source_map),
            global_mixins: self.compiler.global_mixins.clone().unwrap_or_default(),
            preserve_intermediate: self
                .compiler
                .preserve_intermediate
                .unwrap_or(defaults.preserve_intermediate),
        };

        Ok(())
    }

    /// Resolve every root-relative path against `root`.
    fn resolve_project_paths(&mut self, root: &Path) {
        let project = &self.project;
        self.project_resolved = ProjectConfig {
            root: root.to_path_buf(),
            styles_dir: resolve_dir(root, project.styles_dir.as_deref().unwrap_or(DEFAULT_STYLES_DIR)),
            output_dir: resolve_dir(root, project.output_dir.as_deref().unwrap_or(DEFAULT_OUTPUT_DIR)),
        };

        let mut include_paths: Vec<PathBuf> = Vec::new();
        for path in self.resolve.include_paths.iter().flatten() {
            let path = resolve_dir(root, path);
            if !include_paths.contains(&path) {
                include_paths.push(path);
            }
        }
        self.resolve_resolved.include_paths = include_paths;
        self.resolve_resolved.fallback_dirs = self
            .resolve
            .fallback_dirs
            .iter()
            .flatten()
            .map(|d| resolve_dir(root, d))
            .collect();
        self.resolve_resolved.ignore_partials = self.resolve.ignore_partials.unwrap_or(true);
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn parse(toml: &str) -> Config {
        let mut config: Config = toml::from_str(toml).unwrap();
        config.resolve_paths(Path::new("/project")).unwrap();
        config
    }

    #[test]
    fn test_default_config() {
        let config = Config::default_with_base(Path::new("/test"));
        assert_eq!(config.project_resolved.root, PathBuf::from("/test"));
        assert_eq!(
            config.project_resolved.styles_dir,
            PathBuf::from("/test/app/assets/stylesheets")
        );
        assert_eq!(
            config.project_resolved.output_dir,
            PathBuf::from("/test/public/assets/vt/sprockets")
        );
        assert!(config.resolve_resolved.ignore_partials);
        assert!(config.resolve_resolved.include_paths.is_empty());
        assert!(config.entry_groups_resolved.is_empty());
        assert_eq!(config.compiler_resolved, CompilerConfig::default());
    }

    #[test]
    fn test_parse_minimal_config() {
        let config = parse("");
        assert_eq!(config.project_resolved.root, PathBuf::from("/project"));
        assert_eq!(config.compiler_resolved.backend, Backend::Sass);
        assert_eq!(config.compiler_resolved.style, "expanded");
        assert!(config.compiler_resolved.source_map);
    }

    #[test]
    fn test_resolve_paths() {
        let config = parse(
            r#"
[project]
root = "site"
styles_dir = "styles"
output_dir = "./build/css"

[resolve]
include_paths = ["vendor/assets/stylesheets", "/opt/shared", "vendor/assets/stylesheets"]
fallback_dirs = ["node_modules"]
ignore_partials = false
"#,
        );

        assert_eq!(
            config.project_resolved,
            ProjectConfig {
                root: PathBuf::from("/project/site"),
                styles_dir: PathBuf::from("/project/site/styles"),
                output_dir: PathBuf::from("/project/site/build/css"),
            }
        );
        assert_eq!(
            config.resolve_resolved.include_paths,
            vec![
                PathBuf::from("/project/site/vendor/assets/stylesheets"),
                PathBuf::from("/opt/shared"),
            ]
        );
        assert_eq!(
            config.resolve_resolved.fallback_dirs,
            vec![PathBuf::from("/project/site/node_modules")]
        );
        assert!(!config.resolve_resolved.ignore_partials);
    }

    #[test]
    fn test_tables_keep_file_order() {
        let config = parse(
            r#"
[aliases]
"~lib" = "app/assets/stylesheets/lib"
"@vendor" = "vendor/assets/stylesheets"
"~components" = "app/components"

[file_mapping]
select2 = "lib/select2.css"
"bootstrap/**" = "node_modules/bootstrap/scss/bootstrap.scss"

[entry_groups]
zeta = ["zeta/*.scss"]
application = ["base/*.scss", "layout.scss"]
"#,
        );

        let prefixes: Vec<_> = config
            .resolve_resolved
            .aliases
            .iter()
            .map(|(k, _)| k.as_str())
            .collect();
        assert_eq!(prefixes, vec!["~lib", "@vendor", "~components"]);

        assert_eq!(
            config.resolve_resolved.file_mapping,
            vec![
                ("select2".to_owned(), "lib/select2.css".to_owned()),
                (
                    "bootstrap/**".to_owned(),
                    "node_modules/bootstrap/scss/bootstrap.scss".to_owned()
                ),
            ]
        );

        assert_eq!(
            config.entry_groups_resolved,
            vec![
                EntryGroup {
                    name: "zeta".to_owned(),
                    patterns: vec!["zeta/*.scss".to_owned()],
                },
                EntryGroup {
                    name: "application".to_owned(),
                    patterns: vec!["base/*.scss".to_owned(), "layout.scss".to_owned()],
                },
            ]
        );
    }

    #[test]
    fn test_parse_compiler_config() {
        let config = parse(
            r#"
[compiler]
backend = "passthrough"
sass_binary = "/usr/local/bin/sass"
style = "compressed"
source_map = false
global_mixins = ["mixins", "lib/breakpoints"]
preserve_intermediate = true
"#,
        );

        assert_eq!(
            config.compiler_resolved,
            CompilerConfig {
                backend: Backend::Passthrough,
                sass_binary: "/usr/local/bin/sass".to_owned(),
                style: "compressed".to_owned(),
                source_map: false,
                global_mixins: vec!["mixins".to_owned(), "lib/breakpoints".to_owned()],
                preserve_intermediate: true,
            }
        );
    }

    #[test]
    fn test_alias_value_must_be_string() {
        let mut config: Config = toml::from_str("[aliases]\n\"~lib\" = 42\n").unwrap();
        let err = config.resolve_paths(Path::new("/project")).unwrap_err();

        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("aliases.~lib must be a string"));
    }

    #[test]
    fn test_entry_group_must_be_array_of_strings() {
        let mut config: Config =
            toml::from_str("[entry_groups]\napplication = \"base/*.scss\"\n").unwrap();
        let err = config.resolve_paths(Path::new("/project")).unwrap_err();
        assert!(err.to_string().contains("entry_groups.application"));

        let mut config: Config =
            toml::from_str("[entry_groups]\napplication = [\"a.scss\", 1]\n").unwrap();
        assert!(config.resolve_paths(Path::new("/project")).is_err());
    }

    #[test]
    fn test_unknown_backend() {
        let mut config: Config = toml::from_str("[compiler]\nbackend = \"libsass\"\n").unwrap();
        let err = config.resolve_paths(Path::new("/project")).unwrap_err();
        assert!(err.to_string().contains("libsass"));
    }

    #[test]
    fn test_apply_cli_settings_root_re_resolves_paths() {
        let mut config = parse(
            r#"
[project]
styles_dir = "styles"

[resolve]
include_paths = ["vendor"]
"#,
        );

        config.apply_cli_settings(&CliSettings {
            root: Some(PathBuf::from("/other")),
            ..Default::default()
        });

        assert_eq!(config.project_resolved.root, PathBuf::from("/other"));
        assert_eq!(config.project_resolved.styles_dir, PathBuf::from("/other/styles"));
        assert_eq!(
            config.resolve_resolved.include_paths,
            vec![PathBuf::from("/other/vendor")]
        );
    }

    #[test]
    fn test_apply_cli_settings_compiler() {
        let mut config = parse("");

        config.apply_cli_settings(&CliSettings {
            output_dir: Some(PathBuf::from("dist")),
            sass_binary: Some("/opt/sass".to_owned()),
            source_map: Some(false),
            backend: Some(Backend::Passthrough),
            ..Default::default()
        });

        assert_eq!(config.project_resolved.output_dir, PathBuf::from("/project/dist"));
        assert_eq!(config.compiler_resolved.sass_binary, "/opt/sass");
        assert!(!config.compiler_resolved.source_map);
        assert_eq!(config.compiler_resolved.backend, Backend::Passthrough);
    }

    #[test]
    fn test_apply_cli_settings_empty() {
        let config_before = parse("");
        let mut config = parse("");

        config.apply_cli_settings(&CliSettings::default());

        assert_eq!(config.project_resolved, config_before.project_resolved);
        assert_eq!(config.compiler_resolved, config_before.compiler_resolved);
    }

    #[test]
    fn test_expand_env_vars_paths() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("SPROCKET_TEST_OUT", "dist/css");
            std::env::remove_var("SPROCKET_TEST_VENDOR");
        }

        let mut config: Config = toml::from_str(
            r#"
[project]
output_dir = "${SPROCKET_TEST_OUT}"

[resolve]
include_paths = ["${SPROCKET_TEST_VENDOR:-vendor}"]
"#,
        )
        .unwrap();
        config.expand_env_vars().unwrap();
        config.resolve_paths(Path::new("/project")).unwrap();

        assert_eq!(
            config.project_resolved.output_dir,
            PathBuf::from("/project/dist/css")
        );
        assert_eq!(
            config.resolve_resolved.include_paths,
            vec![PathBuf::from("/project/vendor")]
        );

        unsafe {
            std::env::remove_var("SPROCKET_TEST_OUT");
        }
    }

    #[test]
    fn test_expand_env_vars_missing_required_var() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("MISSING_VAR_SPROCKET_TEST");
        }

        let mut config: Config =
            toml::from_str("[compiler]\nsass_binary = \"${MISSING_VAR_SPROCKET_TEST}\"\n").unwrap();
        let err = config.expand_env_vars().unwrap_err();

        assert!(matches!(err, ConfigError::EnvVar { .. }));
        assert!(err.to_string().contains("MISSING_VAR_SPROCKET_TEST"));
        assert!(err.to_string().contains("compiler.sass_binary"));
    }

    // Validation tests

    /// Assert that validation fails with expected substrings in the error message.
    fn assert_validation_error(config: &Config, expected_substrings: &[&str]) {
        let result = config.validate();
        assert!(result.is_err(), "Expected validation to fail");
        let err = result.unwrap_err();
        assert!(
            matches!(err, ConfigError::Validation(_)),
            "Expected ConfigError::Validation, got {err:?}"
        );
        let msg = err.to_string();
        for s in expected_substrings {
            assert!(
                msg.contains(s),
                "Expected error to contain '{s}', got: {msg}"
            );
        }
    }

    #[test]
    fn test_validate_default_config_passes() {
        assert!(Config::default_with_base(Path::new("/test")).validate().is_ok());
    }

    #[test]
    fn test_validate_empty_styles_dir() {
        let config = parse("[project]\nstyles_dir = \"\"\n");
        assert_validation_error(&config, &["project.styles_dir", "cannot be empty"]);
    }

    #[test]
    fn test_validate_output_dir_is_root() {
        let config = parse("[project]\noutput_dir = \".\"\n");
        assert_validation_error(&config, &["project.output_dir", "project root"]);
    }

    #[test]
    fn test_validate_unknown_style() {
        let config = parse("[compiler]\nstyle = \"nested\"\n");
        assert_validation_error(&config, &["compiler.style", "nested"]);
    }

    #[test]
    fn test_validate_empty_alias_prefix() {
        let config = parse("[aliases]\n\"\" = \"lib\"\n");
        assert_validation_error(&config, &["aliases key"]);
    }

    #[test]
    fn test_validate_empty_sass_binary() {
        let config = parse("[compiler]\nsass_binary = \"\"\n");
        assert_validation_error(&config, &["compiler.sass_binary"]);
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join(CONFIG_FILENAME);
        std::fs::write(
            &path,
            "[project]\nstyles_dir = \"styles\"\n\n[file_mapping]\nselect2 = \"lib/select2.css\"\n",
        )
        .unwrap();

        let config = Config::load(Some(&path), None).unwrap();

        assert_eq!(config.config_path, Some(path));
        assert_eq!(config.project_resolved.root, temp_dir.path());
        assert_eq!(
            config.project_resolved.styles_dir,
            temp_dir.path().join("styles")
        );
        assert_eq!(config.resolve_resolved.file_mapping.len(), 1);
    }

    #[test]
    fn test_load_missing_explicit_path() {
        let err = Config::load(Some(Path::new("/nonexistent/sprocket.toml")), None).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_load_invalid_toml() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join(CONFIG_FILENAME);
        std::fs::write(&path, "[project\nroot = ").unwrap();

        let err = Config::load(Some(&path), None).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_applies_cli_settings() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join(CONFIG_FILENAME);
        std::fs::write(&path, "[compiler]\nsource_map = true\n").unwrap();

        let settings = CliSettings {
            source_map: Some(false),
            ..Default::default()
        };
        let config = Config::load(Some(&path), Some(&settings)).unwrap();
        assert!(!config.compiler_resolved.source_map);
    }
}
