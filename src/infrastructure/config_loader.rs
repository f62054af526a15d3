use crate::domain::path::{default_strip_rules, NormalizerConfig, StripRule};
use crate::domain::trace::DEFAULT_ROOT_NAME;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_MAX_LEVEL: usize = 10_000;

/// Optional TOML configuration file. Every key may be omitted.
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub base: Option<String>,
    pub max_level: Option<usize>,
    pub root_name: Option<String>,
    pub collapse: Option<Vec<String>>,
    pub include: Option<Vec<PathBuf>>,
    pub strip: Option<Vec<StripRule>>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }
}

/// Values given on the command line; `None`/empty means "not given".
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub base: Option<String>,
    pub max_level: Option<usize>,
    pub root_name: Option<String>,
    pub collapse: Vec<String>,
    pub include: Vec<PathBuf>,
}

/// Effective settings after layering CLI values over the config file over defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub base: String,
    pub max_level: usize,
    pub root_name: String,
    pub collapse: Vec<String>,
    pub include: Vec<PathBuf>,
    pub strip: Vec<StripRule>,
}

impl Settings {
    pub fn resolve(file: FileConfig, cli: Overrides) -> Self {
        Self {
            base: cli.base.or(file.base).unwrap_or_else(|| ".".to_string()),
            max_level: cli.max_level.or(file.max_level).unwrap_or(DEFAULT_MAX_LEVEL),
            root_name: cli
                .root_name
                .or(file.root_name)
                .unwrap_or_else(|| DEFAULT_ROOT_NAME.to_string()),
            collapse: non_empty(cli.collapse).or(file.collapse).unwrap_or_default(),
            include: non_empty(cli.include).or(file.include).unwrap_or_default(),
            strip: file.strip.unwrap_or_else(default_strip_rules),
        }
    }

    pub fn normalizer_config(&self) -> NormalizerConfig {
        NormalizerConfig {
            base: self.base.clone(),
            strip_rules: self.strip.clone(),
            collapse: self.collapse.clone(),
        }
    }
}

fn non_empty<T>(v: Vec<T>) -> Option<Vec<T>> {
    if v.is_empty() {
        None
    } else {
        Some(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let settings = Settings::resolve(FileConfig::default(), Overrides::default());
        assert_eq!(settings.base, ".");
        assert_eq!(settings.max_level, DEFAULT_MAX_LEVEL);
        assert_eq!(settings.root_name, DEFAULT_ROOT_NAME);
        assert!(settings.collapse.is_empty());
        assert_eq!(settings.strip, default_strip_rules());
    }

    #[test]
    fn test_cli_overrides_file() {
        let file = FileConfig {
            base: Some("/from/file".to_string()),
            max_level: Some(3),
            collapse: Some(vec!["boost".to_string()]),
            include: Some(vec![PathBuf::from("/usr/include")]),
            ..FileConfig::default()
        };
        let cli = Overrides {
            base: Some("/from/cli".to_string()),
            collapse: vec!["fmt".to_string()],
            ..Overrides::default()
        };

        let settings = Settings::resolve(file, cli);
        assert_eq!(settings.base, "/from/cli");
        assert_eq!(settings.max_level, 3);
        assert_eq!(settings.collapse, vec!["fmt".to_string()]);
        assert_eq!(settings.include, vec![PathBuf::from("/usr/include")]);
    }

    #[test]
    fn test_load_toml_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("include_trace.toml");
        fs::write(
            &path,
            r#"
base = "/work/scylla"
max_level = 4
collapse = ["seastar", "/usr/include/boost"]

[[strip]]
kind = "build_output"
prefix = "out/"
generated = ["gen/"]
"#,
        )
        .unwrap();

        let file = FileConfig::load(&path).unwrap();
        assert_eq!(file.base.as_deref(), Some("/work/scylla"));
        assert_eq!(file.max_level, Some(4));
        assert_eq!(
            file.strip,
            Some(vec![StripRule::BuildOutput {
                prefix: "out/".to_string(),
                generated: vec!["gen/".to_string()],
            }])
        );

        let settings = Settings::resolve(file, Overrides::default());
        assert_eq!(settings.strip.len(), 1);
        assert_eq!(settings.normalizer_config().collapse.len(), 2);
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        fs::write(&path, "max_depth = 3\n").unwrap();
        assert!(FileConfig::load(&path).is_err());
    }
}
