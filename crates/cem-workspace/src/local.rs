use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use cem_model::package_json::PackageJson;
use globset::{Glob, GlobSetBuilder};
use walkdir::WalkDir;

use crate::error::{Result, WorkspaceError};
use crate::{normalize_relative, Workspace, CONFIG_FILE_NAMES};

/// A workspace rooted at a directory on local disk.
pub struct LocalFs {
    root: PathBuf,
}

impl LocalFs {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, relative: &str) -> Result<PathBuf> {
        let joined = self.root.join(relative);
        Ok(joined)
    }
}

impl Workspace for LocalFs {
    fn root(&self) -> &Path {
        &self.root
    }

    fn config_file(&self) -> Option<String> {
        CONFIG_FILE_NAMES
            .iter()
            .find(|name| self.root.join(name).is_file())
            .map(|name| name.to_string())
    }

    fn package_json(&self) -> Result<Option<PackageJson>> {
        let path = self.root.join("package.json");
        if !path.is_file() {
            return Ok(None);
        }
        let text = std::fs::read_to_string(&path).map_err(|source| WorkspaceError::Io {
            path: path.clone(),
            source,
        })?;
        Ok(Some(PackageJson::from_str(&text)?))
    }

    fn glob(&self, pattern: &str) -> Result<Vec<String>> {
        let glob = Glob::new(pattern).map_err(|source| WorkspaceError::InvalidGlob {
            pattern: pattern.to_string(),
            source,
        })?;
        let mut builder = GlobSetBuilder::new();
        builder.add(glob);
        let set = builder.build().map_err(|source| WorkspaceError::InvalidGlob {
            pattern: pattern.to_string(),
            source,
        })?;

        let mut matches = Vec::new();
        for entry in WalkDir::new(&self.root)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
        {
            let relative = match entry.path().strip_prefix(&self.root) {
                Ok(r) => r,
                Err(_) => continue,
            };
            let normalized = normalize_relative(relative);
            if set.is_match(&normalized) {
                matches.push(normalized);
            }
        }
        matches.sort();
        Ok(matches)
    }

    fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        let full = self.resolve(path)?;
        std::fs::read(&full).map_err(|source| WorkspaceError::Io { path: full, source })
    }

    fn output_writer(&self, path: &str) -> Result<Box<dyn Write>> {
        let full = self.resolve(path)?;
        if let Some(parent) = full.parent() {
            std::fs::create_dir_all(parent).map_err(|source| WorkspaceError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let file = File::create(&full).map_err(|source| WorkspaceError::Io {
            path: full,
            source,
        })?;
        Ok(Box::new(file))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn globs_match_relative_forward_slash_paths() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("src/sub")).unwrap();
        std::fs::write(dir.path().join("src/a.ts"), "").unwrap();
        std::fs::write(dir.path().join("src/sub/b.ts"), "").unwrap();
        std::fs::write(dir.path().join("README.md"), "").unwrap();

        let ws = LocalFs::new(dir.path());
        let mut matches = ws.glob("**/*.ts").unwrap();
        matches.sort();
        assert_eq!(matches, vec!["src/a.ts", "src/sub/b.ts"]);
    }

    #[test]
    fn reads_and_writes_relative_to_root() {
        let dir = tempfile::tempdir().unwrap();
        let ws = LocalFs::new(dir.path());
        let mut writer = ws.output_writer("out/custom-elements.json").unwrap();
        writer.write_all(b"{}").unwrap();
        drop(writer);
        let contents = ws.read_file("out/custom-elements.json").unwrap();
        assert_eq!(contents, b"{}");
    }

    #[test]
    fn missing_package_json_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let ws = LocalFs::new(dir.path());
        assert!(ws.package_json().unwrap().is_none());
    }

    #[test]
    fn manifest_path_prefers_package_json_field() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("package.json"),
            r#"{"name":"x","customElements":"dist/ce.json"}"#,
        )
        .unwrap();
        let ws = LocalFs::new(dir.path());
        assert_eq!(
            ws.custom_elements_manifest_path(Some("custom-elements.json"))
                .unwrap()
                .as_deref(),
            Some("dist/ce.json")
        );
    }

    #[test]
    fn manifest_path_falls_back_to_config_override() {
        let dir = tempfile::tempdir().unwrap();
        let ws = LocalFs::new(dir.path());
        assert_eq!(
            ws.custom_elements_manifest_path(Some("custom-elements.json"))
                .unwrap()
                .as_deref(),
            Some("custom-elements.json")
        );
    }
}
