//! Shared, cross-request server state:
//! the manifest is held behind an atomic pointer swap so readers never
//! block on a writer publishing a freshly regenerated package.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use arc_swap::ArcSwap;
use cem_generate::{Coordinator, GenerateOptions};
use cem_model::Package;
use cem_workspace::LocalFs;

use crate::import_map::ImportMap;
use crate::options::ServeOptions;
use crate::reload::Broadcaster;
use crate::transform::TransformCache;

pub struct ServerState {
    pub options: ServeOptions,
    pub workspace: LocalFs,
    pub coordinator: Coordinator,
    pub generate_options: GenerateOptions,
    pub manifest: ArcSwap<Package>,
    pub demo_index: ArcSwap<BTreeMap<String, String>>,
    pub import_map: ArcSwap<ImportMap>,
    pub transform_cache: TransformCache,
    pub broadcaster: Broadcaster,
    pub manifest_path: String,
}

impl ServerState {
    pub fn new(
        options: ServeOptions,
        coordinator: Coordinator,
        generate_options: GenerateOptions,
        manifest: Package,
        manifest_path: String,
    ) -> Self {
        let workspace = LocalFs::new(&options.root);
        let demo_index = demo_index_from(&manifest);
        let import_map = crate::import_map::build(&options.root, &options.import_map).unwrap_or_default();
        Self {
            options,
            workspace,
            coordinator,
            generate_options,
            manifest: ArcSwap::from_pointee(manifest),
            demo_index: ArcSwap::from_pointee(demo_index),
            import_map: ArcSwap::from_pointee(import_map),
            transform_cache: TransformCache::new(),
            broadcaster: Broadcaster::new(),
            manifest_path,
        }
    }

    pub fn root(&self) -> PathBuf {
        self.options.root.clone()
    }

    /// Publishes a freshly generated manifest
    /// and refreshes the derived demo-path index used by the workspace
    /// route overlay.
    pub fn publish(&self, manifest: Package) {
        let demo_index = demo_index_from(&manifest);
        self.manifest.store(Arc::new(manifest));
        self.demo_index.store(Arc::new(demo_index));
    }
}

fn demo_index_from(package: &Package) -> BTreeMap<String, String> {
    let mut index = BTreeMap::new();
    for module in &package.modules {
        for decl in &module.declarations {
            if let cem_model::Declaration::CustomElement(ce) = decl {
                for demo in &ce.demos {
                    if let Some(source) = &demo.source {
                        if let Ok(url) = url::Url::parse(&demo.url) {
                            index.insert(url.path().to_string(), source.clone());
                        }
                    }
                }
            }
        }
    }
    index
}
