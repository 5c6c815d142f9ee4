//! Configuration management

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Environment variable overriding the cases directory
pub const CASES_DIR_ENV: &str = "EVIDEX_CASES_DIR";

/// Directories skipped when scanning evidence folders
const EXCLUDE_DIRS: &[&str] = &[".git", ".cache", "__MACOSX", "$RECYCLE.BIN"];

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding one sub-directory per case
    #[serde(default = "default_cases_dir")]
    pub cases_dir: PathBuf,

    /// Parser registration settings
    #[serde(default)]
    pub parsers: ParsersConfig,

    /// Source scanning settings
    #[serde(default)]
    pub scan: ScanConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cases_dir: default_cases_dir(),
            parsers: ParsersConfig::default(),
            scan: ScanConfig::default(),
        }
    }
}

/// Which parsers get registered, and under which extensions
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParsersConfig {
    /// Parser names that are not registered
    #[serde(default)]
    pub disabled: Vec<String>,

    /// Additional extensions keyed by parser name
    #[serde(default)]
    pub extra_extensions: HashMap<String, Vec<String>>,
}

impl ParsersConfig {
    /// Whether the named parser should be registered
    pub fn is_enabled(&self, name: &str) -> bool {
        !self.disabled.iter().any(|d| d.eq_ignore_ascii_case(name))
    }
}

/// Directory scanning options
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    #[serde(default = "default_true")]
    pub exclude_hidden: bool,

    #[serde(default = "default_true")]
    pub follow_symlinks: bool,

    #[serde(default = "default_exclude_dirs")]
    pub exclude_dirs: Vec<String>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            exclude_hidden: true,
            follow_symlinks: true,
            exclude_dirs: default_exclude_dirs(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_exclude_dirs() -> Vec<String> {
    EXCLUDE_DIRS.iter().map(|s| s.to_string()).collect()
}

fn default_cases_dir() -> PathBuf {
    if let Ok(dir) = std::env::var(CASES_DIR_ENV) {
        return PathBuf::from(dir);
    }
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(crate::DATA_DIR_NAME)
        .join("cases")
}

impl Config {
    /// Load config from default path
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::default_path())
    }

    /// Load config from `path`, falling back to defaults when it does not exist
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)?;
            serde_yaml::from_str(&content)?
        } else {
            Config::default()
        };

        // The environment wins over the file
        if let Ok(dir) = std::env::var(CASES_DIR_ENV) {
            config.cases_dir = PathBuf::from(dir);
        }
        Ok(config)
    }

    /// Save config to default path
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::default_path())
    }

    /// Save config to `path`
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get default config path
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(crate::CONFIG_DIR_NAME)
            .join("config.yml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parsers_config_disabled_is_case_insensitive() {
        let config = ParsersConfig {
            disabled: vec!["MBOX".to_string()],
            ..Default::default()
        };
        assert!(!config.is_enabled("mbox"));
        assert!(config.is_enabled("eml"));
    }

    #[test]
    fn test_yaml_defaults_fill_missing_fields() {
        let yaml = "parsers:\n  disabled: [text]\n";
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.parsers.disabled, vec!["text".to_string()]);
        assert!(config.scan.exclude_hidden);
        assert!(config.scan.exclude_dirs.contains(&".git".to_string()));
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.yml");

        let mut config = Config::default();
        config
            .parsers
            .extra_extensions
            .insert("text".to_string(), vec!["nfo".to_string()]);
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(
            loaded.parsers.extra_extensions.get("text"),
            Some(&vec!["nfo".to_string()])
        );
    }
}
