//! The recognized configuration keys, loaded from the
//! workspace's YAML config file and mergeable with CLI-flag overrides
//! (flags > config > defaults). Styled as a typed, all-fields-optional
//! config document.

use serde::{Deserialize, Serialize};

use crate::error::Result;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub package_name: Option<String>,
    pub source_control_root_url: Option<String>,
    #[serde(default)]
    pub generate: GenerateConfig,
    #[serde(default)]
    pub serve: ServeConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GenerateConfig {
    pub files: Vec<String>,
    pub exclude: Vec<String>,
    pub no_default_excludes: bool,
    pub output: Option<String>,
    pub design_tokens: Option<DesignTokensConfig>,
    pub demo_discovery: Option<DemoDiscoveryConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DesignTokensConfig {
    pub spec: Option<String>,
    pub prefix: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DemoDiscoveryConfig {
    pub file_glob: Option<String>,
    pub url_pattern: Option<String>,
    pub url_template: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServeConfig {
    pub port: u16,
    pub no_reload: bool,
    pub target: String,
    pub watch_ignore: Vec<String>,
    pub transforms: TransformsConfig,
    pub import_map: ImportMapConfig,
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            port: 8000,
            no_reload: false,
            target: "es2022".to_string(),
            watch_ignore: default_watch_ignore(),
            transforms: TransformsConfig::default(),
            import_map: ImportMapConfig::default(),
        }
    }
}

fn default_watch_ignore() -> Vec<String> {
    vec![
        "node_modules/**".to_string(),
        ".git/**".to_string(),
        "_site/**".to_string(),
    ]
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TransformsConfig {
    pub typescript: TypeScriptTransformConfig,
    pub css: CssTransformConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TypeScriptTransformConfig {
    pub enabled: bool,
    pub target: String,
}

impl Default for TypeScriptTransformConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            target: "es2022".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CssTransformConfig {
    pub enabled: bool,
    pub include: Vec<String>,
    pub exclude: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ImportMapConfig {
    pub generate: bool,
    pub override_file: Option<String>,
    #[serde(default)]
    pub r#override: std::collections::BTreeMap<String, String>,
}

impl Config {
    pub fn from_yaml_str(s: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(s)?)
    }
}

/// Valid `serve.target` values.
pub const VALID_TARGETS: &[&str] = &[
    "es2015", "es2016", "es2017", "es2018", "es2019", "es2020", "es2021", "es2022", "es2023",
    "esnext",
];

pub fn is_valid_target(target: &str) -> bool {
    VALID_TARGETS.contains(&target)
}

/// CLI-flag overrides, merged onto a loaded `Config`: flags win over
/// config, which wins over built-in defaults.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub files: Option<Vec<String>>,
    pub exclude: Option<Vec<String>>,
    pub output: Option<String>,
    pub port: Option<u16>,
    pub no_reload: Option<bool>,
    pub target: Option<String>,
}

impl ConfigOverrides {
    pub fn apply(&self, mut config: Config) -> Config {
        if let Some(files) = &self.files {
            config.generate.files = files.clone();
        }
        if let Some(exclude) = &self.exclude {
            config.generate.exclude = exclude.clone();
        }
        if let Some(output) = &self.output {
            config.generate.output = Some(output.clone());
        }
        if let Some(port) = self.port {
            config.serve.port = port;
        }
        if let Some(no_reload) = self.no_reload {
            config.serve.no_reload = no_reload;
        }
        if let Some(target) = &self.target {
            config.serve.target = target.clone();
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_targets_are_accepted_and_others_rejected() {
        for t in VALID_TARGETS {
            assert!(is_valid_target(t));
        }
        assert!(!is_valid_target("es5"));
        assert!(!is_valid_target(""));
    }

    #[test]
    fn empty_yaml_yields_defaults() {
        let config = Config::from_yaml_str("{}").unwrap();
        assert_eq!(config.serve.port, 8000);
        assert!(config.serve.transforms.typescript.enabled);
    }

    #[test]
    fn overrides_win_over_config() {
        let config = Config::from_yaml_str("serve:\n  port: 9000\n").unwrap();
        let overrides = ConfigOverrides {
            port: Some(9999),
            ..Default::default()
        };
        let merged = overrides.apply(config);
        assert_eq!(merged.serve.port, 9999);
    }
}
