//! Uniform access to a package's sources, whether they live on local disk
//! or inside an installed npm dependency. Core logic (the
//! analyzer, generator, and server) only ever talks to the [`Workspace`]
//! trait; it never touches `std::fs` directly, so swapping in a `Remote`
//! workspace costs nothing upstream.

pub mod error;
mod local;
mod remote;

pub use error::{Result, WorkspaceError};
pub use local::LocalFs;
pub use remote::Remote;

use std::io::Write;
use std::path::Path;

use cem_model::package_json::PackageJson;

/// Recognized config file names, checked in order.
pub const CONFIG_FILE_NAMES: &[&str] = &["cem.yaml", "cem.yml", ".cemrc.yaml", ".cemrc.yml"];

/// The default manifest output path when nothing in `package.json` or the
/// loaded config overrides it.
pub const DEFAULT_MANIFEST_PATH: &str = "custom-elements.json";

/// Abstracts the filesystem so core logic does not care whether sources
/// live on local disk or inside an installed npm package.
///
/// Paths passed to and returned from every method other than [`root`] are
/// project-root-relative, forward-slash normalized; only [`root`] hands
/// back an absolute path.
///
/// [`root`]: Workspace::root
pub trait Workspace {
    /// The workspace's absolute root directory.
    fn root(&self) -> &Path;

    /// The first matching config file under the root, if any.
    fn config_file(&self) -> Option<String>;

    /// The root's parsed `package.json`, if present.
    fn package_json(&self) -> Result<Option<PackageJson>>;

    /// Project-root-relative paths matching `pattern` (supports `**`).
    fn glob(&self, pattern: &str) -> Result<Vec<String>>;

    /// Reads a project-root-relative file's full contents.
    fn read_file(&self, path: &str) -> Result<Vec<u8>>;

    /// Opens a write stream for a project-root-relative path, failing with
    /// [`WorkspaceError::ReadOnlyWorkspace`] on a read-only workspace.
    fn output_writer(&self, path: &str) -> Result<Box<dyn Write>>;

    /// Resolves the manifest output path: `package.json`'s `customElements`
    /// field first, then `config_override`, else `None`.
    fn custom_elements_manifest_path(&self, config_override: Option<&str>) -> Result<Option<String>> {
        if let Some(pkg) = self.package_json()? {
            if let Some(path) = pkg.custom_elements {
                return Ok(Some(path));
            }
        }
        Ok(config_override.map(str::to_string))
    }
}

pub(crate) fn normalize_relative(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}
