//! Build orchestration.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use rayon::prelude::*;
use sprocket_compiler::{Compiler, MixinLoader, OutputStyle, Passthrough, Pipeline, SassCli};
use sprocket_config::{Backend, Config, EntryGroup};
use sprocket_resolver::{DirectiveEngine, FileSource, FsSource, ResolutionConfig, ResolvedContent};

use crate::discover::{Discovery, GroupPatterns};
use crate::error::{BuildError, Entry, EntryFailure};
use crate::output::{Manifest, ManifestEntry, OutputLayout, write_file};

/// Directory `~package` imports are resolved in, relative to the root.
const PACKAGE_DIR: &str = "node_modules";

/// Build the directive engine's configuration from the loaded config.
///
/// # Errors
///
/// Returns [`BuildError::Config`] if the root is relative, an alias prefix is
/// empty or a mapping pattern is invalid.
pub fn resolution_config(config: &Config) -> Result<ResolutionConfig, BuildError> {
    let resolve = &config.resolve_resolved;
    let mut builder = ResolutionConfig::builder(&config.project_resolved.root)
        .include_paths(resolve.include_paths.iter().cloned())
        .ignore_partials(resolve.ignore_partials);
    for dir in &resolve.fallback_dirs {
        builder = builder.fallback_dir(dir);
    }
    for (prefix, replacement) in &resolve.aliases {
        builder = builder.alias(prefix, replacement);
    }
    for (pattern, target) in &resolve.file_mapping {
        builder = builder.map_file(pattern, target);
    }
    Ok(builder.build()?)
}

/// Compile pipeline for the configured backend, mixins and load paths.
#[must_use]
pub fn compile_pipeline(config: &Config) -> Pipeline {
    let project = &config.project_resolved;
    let settings = &config.compiler_resolved;

    let compiler: Arc<dyn Compiler> = match settings.backend {
        Backend::Sass => {
            let mut load_paths = config.resolve_resolved.include_paths.clone();
            load_paths.push(project.styles_dir.clone());
            Arc::new(
                SassCli::new()
                    .binary(&settings.sass_binary)
                    .load_paths(&load_paths)
                    .style(OutputStyle::parse(&settings.style).unwrap_or_default())
                    .source_map(settings.source_map),
            )
        }
        Backend::Passthrough => Arc::new(Passthrough),
    };

    Pipeline::new(compiler)
        .mixins(MixinLoader::new(&project.root, &project.styles_dir).names(&settings.global_mixins))
        .package_dir(project.root.join(PACKAGE_DIR))
}

/// One written stylesheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltOutput {
    pub entry: Entry,
    pub css_path: PathBuf,
    pub map_path: Option<PathBuf>,
    /// Inlined files then compiler-loaded URLs.
    pub dependencies: Vec<String>,
}

/// Outcome of a build: what was written and what failed.
#[derive(Debug, Default)]
pub struct BuildReport {
    pub outputs: Vec<BuiltOutput>,
    pub failures: Vec<EntryFailure>,
}

impl BuildReport {
    /// Whether every entry and group was written.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Expands, compiles and writes every entry of a project.
///
/// Standalone entries are processed in parallel, each in its own resolution
/// session. Entry groups follow, one at a time in declared order. A failing
/// entry or group is logged and recorded in the [`BuildReport`]; the others
/// still run.
///
/// # Example
///
/// ```ignore
/// use sprocket_build::Builder;
/// use sprocket_config::Config;
///
/// let config = Config::load(None, None)?;
/// let report = Builder::from_config(&config)?.build()?;
/// for failure in &report.failures {
///     eprintln!("{failure}");
/// }
/// ```
pub struct Builder {
    engine: DirectiveEngine,
    pipeline: Pipeline,
    styles_dir: PathBuf,
    layout: OutputLayout,
    groups: Vec<EntryGroup>,
    preserve_intermediate: bool,
}

impl Builder {
    /// Create a builder reading from the filesystem.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::Config`] if the resolution config is invalid.
    pub fn from_config(config: &Config) -> Result<Self, BuildError> {
        Self::with_source(config, Arc::new(FsSource::new()))
    }

    /// Create a builder reading stylesheets through `source`.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::Config`] if the resolution config is invalid.
    pub fn with_source(config: &Config, source: Arc<dyn FileSource>) -> Result<Self, BuildError> {
        let engine = DirectiveEngine::new(resolution_config(config)?, source);
        Ok(Self {
            engine,
            pipeline: compile_pipeline(config),
            styles_dir: config.project_resolved.styles_dir.clone(),
            layout: OutputLayout::new(&config.project_resolved.output_dir),
            groups: config.entry_groups_resolved.clone(),
            preserve_intermediate: config.compiler_resolved.preserve_intermediate,
        })
    }

    /// Replace the compile pipeline.
    #[must_use]
    pub fn pipeline(mut self, pipeline: Pipeline) -> Self {
        self.pipeline = pipeline;
        self
    }

    /// Directive engine used for expansion.
    #[must_use]
    pub fn engine(&self) -> &DirectiveEngine {
        &self.engine
    }

    /// Run a full build.
    ///
    /// # Errors
    ///
    /// Returns an error only when the build as a whole cannot proceed: the
    /// output directory cannot be recreated, a group pattern is invalid, or
    /// the manifest cannot be written. Per-entry errors go to the report.
    pub fn build(&self) -> Result<BuildReport, BuildError> {
        tracing::info!(
            styles_dir = %self.styles_dir.display(),
            output_dir = %self.layout.root().display(),
            "Starting Sprockets SCSS processing"
        );

        self.engine.clear_cache();
        self.layout.prepare()?;

        let group_patterns = self
            .groups
            .iter()
            .map(|g| GroupPatterns::new(&g.patterns))
            .collect::<Result<Vec<_>, _>>()?;
        let ignore_partials = self.engine.config().ignore_partials();
        let discovery = Discovery::new(&self.styles_dir, ignore_partials);

        let mut report = BuildReport::default();

        let entries = discovery.entries(&group_patterns)?;
        tracing::debug!(count = entries.len(), "Processing individual files");
        let results: Vec<Result<BuiltOutput, EntryFailure>> = entries
            .par_iter()
            .map(|path| {
                let relative = discovery.relative(path);
                self.build_single(path, relative)
                    .map_err(|error| EntryFailure {
                        entry: Entry::Single(relative.to_path_buf()),
                        error,
                    })
            })
            .collect();
        for result in results {
            record(&mut report, result);
        }

        tracing::debug!(count = self.groups.len(), "Processing entry groups");
        for group in &self.groups {
            let result = self.build_group(&discovery, group).map_err(|error| EntryFailure {
                entry: Entry::Group(group.name.clone()),
                error,
            });
            record(&mut report, result);
        }

        self.layout.write_manifest(&self.manifest(&report))?;

        tracing::info!(
            written = report.outputs.len(),
            failed = report.failures.len(),
            "Finished Sprockets SCSS processing"
        );
        Ok(report)
    }

    fn build_single(&self, path: &Path, relative: &Path) -> Result<BuiltOutput, BuildError> {
        tracing::debug!(path = %relative.display(), "Processing file");
        let resolved = self.engine.resolve_file(path)?;
        let css_path = self.layout.single_path(relative);
        self.compile_and_write(
            Entry::Single(relative.to_path_buf()),
            &resolved,
            path,
            relative,
            css_path,
        )
    }

    fn build_group(
        &self,
        discovery: &Discovery<'_>,
        group: &EntryGroup,
    ) -> Result<BuiltOutput, BuildError> {
        let members = discovery.group_members(&group.patterns)?;
        if members.is_empty() {
            tracing::warn!(group = %group.name, "Entry group matched no files");
        }
        tracing::debug!(group = %group.name, members = members.len(), "Processing group");

        let mut combined = ResolvedContent::default();
        for member in &members {
            let resolved = self.engine.process_file(member)?;
            combined.content.push_str(&resolved.content);
            combined.dependencies.extend(resolved.dependencies);
        }

        let file_name = format!("{}.scss", group.name);
        let logical_path = self.styles_dir.join(&file_name);
        let css_path = self.layout.group_path(&group.name);
        self.compile_and_write(
            Entry::Group(group.name.clone()),
            &combined,
            &logical_path,
            Path::new(&file_name),
            css_path,
        )
    }

    fn compile_and_write(
        &self,
        entry: Entry,
        resolved: &ResolvedContent,
        logical_path: &Path,
        intermediate: &Path,
        css_path: PathBuf,
    ) -> Result<BuiltOutput, BuildError> {
        let compiled = self.pipeline.compile(&resolved.content, logical_path)?;

        if self.preserve_intermediate {
            write_file(&self.layout.intermediate_path(intermediate), &compiled.input)?;
        }

        let map_path = self.layout.write_stylesheet(
            &css_path,
            &compiled.output.css,
            compiled.output.source_map.as_deref(),
        )?;

        let dependencies = resolved
            .dependencies
            .iter()
            .map(|p| p.display().to_string())
            .chain(compiled.output.loaded_urls)
            .collect();

        Ok(BuiltOutput {
            entry,
            css_path,
            map_path,
            dependencies: dedup(dependencies),
        })
    }

    fn manifest(&self, report: &BuildReport) -> Manifest {
        let mut manifest = Manifest::default();
        for output in &report.outputs {
            let source = match &output.entry {
                Entry::Single(relative) => relative.to_string_lossy().replace('\\', "/"),
                Entry::Group(name) => format!("{name}.scss"),
            };
            manifest.insert(
                self.layout.key(&output.css_path),
                ManifestEntry {
                    source,
                    dependencies: output.dependencies.clone(),
                },
            );
        }
        manifest
    }
}

fn record(report: &mut BuildReport, result: Result<BuiltOutput, EntryFailure>) {
    match result {
        Ok(output) => report.outputs.push(output),
        Err(failure) => {
            tracing::error!(
                entry = %failure.entry,
                code = failure.error.code(),
                error = %failure.error,
                "Failed to build entry"
            );
            report.failures.push(failure);
        }
    }
}

fn dedup(items: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::with_capacity(items.len());
    items.into_iter().filter(|i| seen.insert(i.clone())).collect()
}
