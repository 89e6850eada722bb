//! Settings for the tool itself.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File read by [`Settings::load_or_default`] from the working directory.
pub const SETTINGS_FILE: &str = "config-tree.yaml";

/// Tool settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub discovery: DiscoverySettings,
}

/// How the configuration directory is found and walked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscoverySettings {
    /// Directory merged by the bootstrap extension.
    #[serde(default = "default_config_dir")]
    pub config_dir: PathBuf,

    /// Follow symbolic links while walking.
    #[serde(default)]
    pub follow_links: bool,

    /// Include files and directories whose name starts with a dot.
    #[serde(default)]
    pub include_hidden: bool,

    /// Maximum walk depth below the directory; unlimited when absent.
    #[serde(default)]
    pub max_depth: Option<usize>,
}

impl Default for DiscoverySettings {
    fn default() -> Self {
        Self {
            config_dir: default_config_dir(),
            follow_links: false,
            include_hidden: false,
            max_depth: None,
        }
    }
}

fn default_config_dir() -> PathBuf {
    PathBuf::from("config")
}

impl Settings {
    /// Load settings from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read settings file {}", path.display()))?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let settings: Settings = serde_yaml::from_str(&content)
            .with_context(|| format!("invalid settings file {}", path.display()))?;
        Ok(settings)
    }

    /// Load `config-tree.yaml` when present, else defaults, then apply
    /// environment overrides.
    pub fn load_or_default() -> Self {
        let mut settings = Self::load(SETTINGS_FILE).unwrap_or_default();
        settings.apply_overrides(|name| std::env::var(name).ok());
        settings
    }

    /// Apply `CONFIG_TREE_*` overrides read through `lookup`.
    ///
    /// Values that do not parse are ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(dir) = lookup("CONFIG_TREE_DIR") {
            self.discovery.config_dir = PathBuf::from(dir);
        }

        if let Some(follow) = lookup("CONFIG_TREE_FOLLOW_LINKS")
            && let Some(follow) = parse_flag(&follow)
        {
            self.discovery.follow_links = follow;
        }

        if let Some(depth) = lookup("CONFIG_TREE_MAX_DEPTH")
            && let Ok(depth) = depth.parse()
        {
            self.discovery.max_depth = Some(depth);
        }
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.discovery.config_dir, PathBuf::from("config"));
        assert!(!settings.discovery.follow_links);
        assert_eq!(settings.discovery.max_depth, None);
    }

    #[test]
    fn test_load_partial_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config-tree.yaml");
        std::fs::write(&path, "discovery:\n  config_dir: etc/app\n  max_depth: 2\n").unwrap();

        let settings = Settings::load(&path).unwrap();
        assert_eq!(settings.discovery.config_dir, PathBuf::from("etc/app"));
        assert_eq!(settings.discovery.max_depth, Some(2));
        assert!(!settings.discovery.include_hidden);
    }

    #[test]
    fn test_load_empty_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config-tree.yaml");
        std::fs::write(&path, "").unwrap();
        assert_eq!(Settings::load(&path).unwrap(), Settings::default());
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("CONFIG_TREE_DIR", "/srv/config"),
            ("CONFIG_TREE_FOLLOW_LINKS", "yes"),
            ("CONFIG_TREE_MAX_DEPTH", "not-a-number"),
        ]);

        let mut settings = Settings::default();
        settings.apply_overrides(|name| env.get(name).map(|v| v.to_string()));
        assert_eq!(settings.discovery.config_dir, PathBuf::from("/srv/config"));
        assert!(settings.discovery.follow_links);
        assert_eq!(settings.discovery.max_depth, None);
    }
}
