use std::io::Write;
use std::path::{Path, PathBuf};

use cem_model::package_json::PackageJson;

use crate::error::{Result, WorkspaceError};
use crate::local::LocalFs;
use crate::Workspace;

/// A read-only workspace over an already-installed npm dependency,
/// addressed by an `npm:@scope/pkg[/subpath]` specifier.
///
/// `subpath`, when present, scopes `Glob`/`ReadFile` to that directory
/// within the resolved package rather than the package's own root — the
/// same convention a bare specifier like `npm:@foo/bar/demos` uses to
/// reach into a package's `demos/` directory without walking the whole
/// install.
pub struct Remote {
    specifier: String,
    inner: LocalFs,
}

impl Remote {
    /// Resolves `npm:@scope/pkg[/subpath]` (or `npm:pkg[/subpath]`) against
    /// `base_root/node_modules`.
    pub fn resolve(base_root: &Path, specifier: &str) -> Result<Self> {
        let body = specifier
            .strip_prefix("npm:")
            .ok_or_else(|| WorkspaceError::UnresolvedNpmSpecifier(specifier.to_string()))?;
        let (package_name, subpath) = split_package_and_subpath(body);

        let package_root = base_root.join("node_modules").join(&package_name);
        if !package_root.join("package.json").is_file() {
            return Err(WorkspaceError::UnresolvedNpmSpecifier(specifier.to_string()));
        }

        let scoped_root = match subpath {
            Some(sub) => package_root.join(sub),
            None => package_root,
        };

        Ok(Self {
            specifier: specifier.to_string(),
            inner: LocalFs::new(scoped_root),
        })
    }

    pub fn specifier(&self) -> &str {
        &self.specifier
    }
}

/// Splits `@scope/name/sub/path` into (`@scope/name`, `Some("sub/path")`)
/// or `name/sub/path` into (`name`, `Some("sub/path")`), respecting the
/// scoped-package two-segment name.
fn split_package_and_subpath(body: &str) -> (String, Option<String>) {
    let mut parts = body.splitn(if body.starts_with('@') { 3 } else { 2 }, '/');
    let name = if body.starts_with('@') {
        let scope = parts.next().unwrap_or_default();
        let pkg = parts.next().unwrap_or_default();
        format!("{scope}/{pkg}")
    } else {
        parts.next().unwrap_or_default().to_string()
    };
    let subpath = parts.next().filter(|s| !s.is_empty()).map(str::to_string);
    (name, subpath)
}

impl Workspace for Remote {
    fn root(&self) -> &Path {
        self.inner.root()
    }

    fn config_file(&self) -> Option<String> {
        self.inner.config_file()
    }

    fn package_json(&self) -> Result<Option<PackageJson>> {
        self.inner.package_json()
    }

    fn glob(&self, pattern: &str) -> Result<Vec<String>> {
        self.inner.glob(pattern)
    }

    fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        self.inner.read_file(path)
    }

    fn output_writer(&self, _path: &str) -> Result<Box<dyn Write>> {
        Err(WorkspaceError::ReadOnlyWorkspace(self.specifier.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_installed_package(base: &Path, name: &str) -> PathBuf {
        let pkg_dir = base.join("node_modules").join(name);
        std::fs::create_dir_all(&pkg_dir).unwrap();
        std::fs::write(
            pkg_dir.join("package.json"),
            format!(r#"{{"name":"{name}"}}"#),
        )
        .unwrap();
        pkg_dir
    }

    #[test]
    fn splits_scoped_package_and_subpath() {
        assert_eq!(
            split_package_and_subpath("@foo/bar/demos/x"),
            ("@foo/bar".to_string(), Some("demos/x".to_string()))
        );
        assert_eq!(
            split_package_and_subpath("lit"),
            ("lit".to_string(), None)
        );
        assert_eq!(
            split_package_and_subpath("lit/decorators.js"),
            ("lit".to_string(), Some("decorators.js".to_string()))
        );
    }

    #[test]
    fn resolves_scoped_package_from_node_modules() {
        let dir = tempfile::tempdir().unwrap();
        write_installed_package(dir.path(), "@foo/bar");
        let remote = Remote::resolve(dir.path(), "npm:@foo/bar").unwrap();
        assert!(remote.package_json().unwrap().is_some());
    }

    #[test]
    fn unresolvable_specifier_errors() {
        let dir = tempfile::tempdir().unwrap();
        let err = Remote::resolve(dir.path(), "npm:@nope/missing");
        assert!(matches!(err, Err(WorkspaceError::UnresolvedNpmSpecifier(_))));
    }

    #[test]
    fn output_writer_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        write_installed_package(dir.path(), "lit");
        let remote = Remote::resolve(dir.path(), "npm:lit").unwrap();
        assert!(matches!(
            remote.output_writer("x.json"),
            Err(WorkspaceError::ReadOnlyWorkspace(_))
        ));
    }
}
