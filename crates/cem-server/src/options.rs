//! Flag-merged options the dev server is built from, distinct from the long-lived [`cem_model::config::Config`]
//! document so `NewServerWithConfig` can validate a fully-resolved value
//! once at construction time.

use std::net::SocketAddr;
use std::path::PathBuf;

use cem_model::config::{is_valid_target, CssTransformConfig, ImportMapConfig, ServeConfig};

use crate::error::{Result, ServerError};

#[derive(Debug, Clone)]
pub struct ServeOptions {
    pub root: PathBuf,
    pub addr: SocketAddr,
    pub reload: bool,
    pub target: String,
    pub watch_ignore: Vec<String>,
    pub typescript_enabled: bool,
    pub css: CssTransformConfig,
    pub import_map: ImportMapConfig,
    pub quiet: bool,
}

impl ServeOptions {
    /// Builds options from the loaded config plus the workspace root,
    /// validating the target the way `NewServerWithConfig` does before
    /// the Idle→Initializing transition.
    pub fn from_config(root: PathBuf, config: &ServeConfig, quiet: bool) -> Result<Self> {
        if !is_valid_target(&config.target) {
            return Err(ServerError::InvalidTarget(config.target.clone()));
        }
        if !is_valid_target(&config.transforms.typescript.target) {
            return Err(ServerError::InvalidTarget(config.transforms.typescript.target.clone()));
        }
        let addr: SocketAddr = format!("0.0.0.0:{}", config.port)
            .parse()
            .expect("a u16 port always parses into a socket address");
        Ok(Self {
            root,
            addr,
            reload: !config.no_reload,
            target: config.transforms.typescript.target.clone(),
            watch_ignore: config.watch_ignore.clone(),
            typescript_enabled: config.transforms.typescript.enabled,
            css: config.transforms.css.clone(),
            import_map: config.import_map.clone(),
            quiet,
        })
    }
}
