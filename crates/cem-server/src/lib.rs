//! The dev server: serves the project root,
//! transforms TypeScript/CSS on the fly, injects an import map into
//! HTML, and live-reloads connected browsers on source changes.
//!
//! Everything here is driven by [`serve`], the boundary entry point the
//! CLI's `serve` command calls; core logic otherwise only talks to
//! [`cem_workspace::Workspace`] and [`cem_generate::Coordinator`].

mod error;
mod import_map;
mod lifecycle;
mod logger;
mod options;
mod regenerate;
mod reload;
mod router;
mod state;
mod status_line;
mod transform;
mod watcher;

pub use error::{Result, ServerError};
pub use import_map::ImportMap;
pub use lifecycle::{new_server_with_config, Phase, Server};
pub use options::ServeOptions;

/// Installs the leveled, quiet-aware logger; exposed so
/// the `generate` CLI command can opt in to the same logging the dev
/// server installs for itself in [`serve`].
pub fn init_logger(quiet: bool) {
    logger::init(quiet);
}

use std::path::Path;
use std::sync::atomic::AtomicBool;

use cem_generate::{Coordinator, DemoDiscoveryOptions, DesignTokensSpec, GenerateOptions};
use cem_model::config::Config;
use cem_workspace::{LocalFs, Workspace, DEFAULT_MANIFEST_PATH};

/// Resolves `config.generate` into the [`GenerateOptions`] the
/// regeneration debouncer reuses on every source change, matching the
/// same config the standalone `generate` command builds from.
pub fn generate_options_from_config(config: &Config) -> GenerateOptions {
    GenerateOptions {
        files: config.generate.files.clone(),
        exclude: config.generate.exclude.clone(),
        no_default_excludes: config.generate.no_default_excludes,
        design_tokens: config.generate.design_tokens.as_ref().and_then(|tokens| {
            Some(DesignTokensSpec {
                spec: tokens.spec.clone()?,
                prefix: tokens.prefix.clone().unwrap_or_default(),
            })
        }),
        demo_discovery: config.generate.demo_discovery.as_ref().and_then(|demo| {
            Some(DemoDiscoveryOptions {
                file_glob: demo.file_glob.clone()?,
                url_pattern: demo.url_pattern.clone()?,
                url_template: demo.url_template.clone()?,
            })
        }),
    }
}

/// Builds and runs the dev server to completion.
pub async fn serve(root: &Path, config: Config, quiet: bool) -> Result<()> {
    logger::init(quiet);

    let serve_options = ServeOptions::from_config(root.to_path_buf(), &config.serve, quiet)?;
    let generate_options = generate_options_from_config(&config);

    let workspace = LocalFs::new(root);
    let coordinator = Coordinator::new().map_err(ServerError::Generate)?;
    let cancel = AtomicBool::new(false);
    let manifest = coordinator.generate_package(&workspace, &generate_options, &cancel).map_err(ServerError::Generate)?;
    let manifest_path = workspace
        .custom_elements_manifest_path(config.generate.output.as_deref())?
        .unwrap_or_else(|| DEFAULT_MANIFEST_PATH.to_string());

    let server = new_server_with_config(serve_options, coordinator, generate_options, manifest, manifest_path);
    server.start().await
}
