//! The top-level concurrent generation pipeline: expand
//! globs, process modules in parallel on a bounded worker pool, merge
//! design tokens and demos, propagate inheritance, normalize, and
//! serialize.

use std::sync::atomic::{AtomicBool, Ordering};

use cem_analyzer::{demo_discoverer, design_tokens::DesignTokenIndex, inheritance, ModuleProcessor, ParserPool, QueryRegistry};
use cem_model::Package;
use cem_workspace::Workspace;
use globset::{Glob, GlobSetBuilder};

use crate::error::{FileFailure, GenerateError, Result};

/// Default excludes applied unless `no_default_excludes` is set.
pub const DEFAULT_EXCLUDES: &[&str] = &["**/*.d.ts", "**/node_modules/**"];

#[derive(Debug, Clone, Default)]
pub struct DesignTokensSpec {
    /// A workspace-relative path, or `npm:@scope/pkg[/subpath]` resolved
    /// against the workspace's `node_modules` layout.
    pub spec: String,
    pub prefix: String,
}

#[derive(Debug, Clone, Default)]
pub struct DemoDiscoveryOptions {
    pub file_glob: String,
    pub url_pattern: String,
    pub url_template: String,
}

#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    pub files: Vec<String>,
    pub exclude: Vec<String>,
    pub no_default_excludes: bool,
    pub design_tokens: Option<DesignTokensSpec>,
    pub demo_discovery: Option<DemoDiscoveryOptions>,
}

/// Owns the shared, reusable analysis state (parser pool, compiled query
/// registry) so repeated `generate` calls — as the dev server's
/// regeneration debouncer issues — don't pay query-compile cost twice.
pub struct Coordinator {
    pool: ParserPool,
    registry: QueryRegistry,
}

impl Coordinator {
    pub fn new() -> Result<Self> {
        Ok(Self {
            pool: ParserPool::new(),
            registry: QueryRegistry::new()?,
        })
    }

    /// Runs the full pipeline and returns the normalized `Package`. See
    /// [`Self::generate_json`] for the serialized form the top-level
    /// entry point returns.
    ///
    /// `cancel`, when set before or during the run, halts the worker fan-out
    /// at the next file boundary.
    pub fn generate_package(
        &self,
        workspace: &dyn Workspace,
        options: &GenerateOptions,
        cancel: &AtomicBool,
    ) -> Result<Package> {
        let files = self.expand_files(workspace, options)?;

        let num_threads = std::cmp::min(num_cpus(), files.len().max(1));
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .build()
            .expect("building a rayon thread pool with a positive thread count never fails");

        let results: Vec<_> = pool.install(|| {
            use rayon::prelude::*;
            files
                .par_iter()
                .map(|path| -> Option<std::result::Result<cem_model::Module, FileFailure>> {
                    if cancel.load(Ordering::SeqCst) {
                        return None;
                    }
                    let bytes = match workspace.read_file(path) {
                        Ok(bytes) => bytes,
                        Err(e) => {
                            return Some(Err(FileFailure {
                                path: path.clone(),
                                source: cem_analyzer::AnalyzeError::Workspace(e),
                            }))
                        }
                    };
                    let source = String::from_utf8_lossy(&bytes).into_owned();
                    let processor = ModuleProcessor::new(&self.pool, &self.registry);
                    Some(processor.process(path, &source).map_err(|source| FileFailure {
                        path: path.clone(),
                        source,
                    }))
                })
                .collect()
        });

        if cancel.load(Ordering::SeqCst) {
            return Err(GenerateError::Cancelled);
        }

        let mut modules = Vec::with_capacity(results.len());
        let mut failures = Vec::new();
        for result in results.into_iter().flatten() {
            match result {
                Ok(module) => modules.push(module),
                Err(failure) => failures.push(failure),
            }
        }
        // Deterministic order by path.
        modules.sort_by(|a, b| a.path.cmp(&b.path));

        let mut package = Package::new();
        package.modules = modules;

        if let Some(tokens) = &options.design_tokens {
            self.merge_design_tokens(workspace, tokens, &mut package)?;
        }
        if let Some(demos) = &options.demo_discovery {
            self.discover_demos(workspace, demos, &mut package.modules)?;
        }
        inheritance::propagate(&mut package);
        package.validate()?;

        if !failures.is_empty() {
            return Err(GenerateError::composite(failures));
        }
        Ok(package)
    }

    /// Serializes the result of [`Self::generate_package`] to the CEM
    /// JSON wire format.
    pub fn generate_json(
        &self,
        workspace: &dyn Workspace,
        options: &GenerateOptions,
        cancel: &AtomicBool,
    ) -> Result<String> {
        let package = self.generate_package(workspace, options, cancel)?;
        Ok(package.to_json_string()?)
    }

    fn expand_files(&self, workspace: &dyn Workspace, options: &GenerateOptions) -> Result<Vec<String>> {
        let mut included = std::collections::BTreeSet::new();
        for pattern in &options.files {
            for path in workspace.glob(pattern)? {
                included.insert(path);
            }
        }

        let mut exclude_patterns: Vec<&str> = options.exclude.iter().map(String::as_str).collect();
        if !options.no_default_excludes {
            exclude_patterns.extend(DEFAULT_EXCLUDES.iter().copied());
        }
        let excludes = build_globset(&exclude_patterns)?;

        Ok(included.into_iter().filter(|p| !excludes.is_match(p)).collect())
    }

    fn merge_design_tokens(
        &self,
        workspace: &dyn Workspace,
        tokens: &DesignTokensSpec,
        package: &mut Package,
    ) -> Result<()> {
        let path = resolve_design_tokens_path(&tokens.spec);
        let bytes = workspace.read_file(&path)?;
        let document = String::from_utf8_lossy(&bytes).into_owned();
        let index = DesignTokenIndex::load(&document, &tokens.prefix)?;
        for module in &mut package.modules {
            index.merge_into(&mut module.declarations);
        }
        Ok(())
    }

    fn discover_demos(
        &self,
        workspace: &dyn Workspace,
        demos: &DemoDiscoveryOptions,
        modules: &mut [cem_model::Module],
    ) -> Result<()> {
        let config = demo_discoverer::DemoDiscoveryConfig {
            file_glob: &demos.file_glob,
            url_pattern: &demos.url_pattern,
            url_template: &demos.url_template,
        };
        demo_discoverer::discover(workspace, &self.pool, &self.registry, &config, modules)?;
        Ok(())
    }
}

impl Default for Coordinator {
    fn default() -> Self {
        Self::new().expect("bundled query sources always compile")
    }
}

/// `npm:@scope/pkg[/subpath]` resolves against the on-disk `node_modules`
/// layout the Workspace already reads through; a
/// plain path is already workspace-relative.
fn resolve_design_tokens_path(spec: &str) -> String {
    match spec.strip_prefix("npm:") {
        Some(rest) => format!("node_modules/{rest}"),
        None => spec.to_string(),
    }
}

fn build_globset(patterns: &[&str]) -> Result<globset::GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|source| {
            cem_workspace::WorkspaceError::InvalidGlob {
                pattern: pattern.to_string(),
                source,
            }
        })?;
        builder.add(glob);
    }
    Ok(builder.build().map_err(|source| cem_workspace::WorkspaceError::InvalidGlob {
        pattern: patterns.join(","),
        source,
    })?)
}

fn num_cpus() -> usize {
    std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1)
}
