use crate::catalog::ToolCatalog;
use crate::data_structures::Tier;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

pub const DATA_DIR_ENV: &str = "TOOLKIT_USAGE_DIR";
pub const DEFAULT_DATA_DIR: &str = "~/.toolkit-usage";
pub const CONFIG_FILE: &str = "config.json";

/// Contents of `<data_dir>/config.json`. Every key is optional.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(default)]
pub struct LedgerConfig {
    /// Tier given to profiles created on first sign-in.
    pub default_tier: Tier,
    /// Free daily limit overrides keyed by tool identifier.
    pub limits: HashMap<String, u32>,
}

impl LedgerConfig {
    /// Picks the data directory: explicit value, then `TOOLKIT_USAGE_DIR`,
    /// then `~/.toolkit-usage`.
    pub fn resolve_data_dir(explicit: Option<&str>) -> PathBuf {
        let raw = match explicit {
            Some(dir) => dir.to_string(),
            None => std::env::var(DATA_DIR_ENV).unwrap_or_else(|_| DEFAULT_DATA_DIR.to_string()),
        };
        PathBuf::from(shellexpand::tilde(&raw).as_ref())
    }

    pub fn config_path(data_dir: &Path) -> PathBuf {
        data_dir.join(CONFIG_FILE)
    }

    pub fn load(data_dir: &Path) -> Result<Self> {
        let config_path = Self::config_path(data_dir);

        if config_path.exists() {
            let content = fs::read_to_string(&config_path)
                .with_context(|| format!("Failed to read config: {}", config_path.display()))?;
            let config: LedgerConfig = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config: {}", config_path.display()))?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self, data_dir: &Path) -> Result<()> {
        fs::create_dir_all(data_dir)
            .with_context(|| format!("Failed to create directory: {}", data_dir.display()))?;
        let content = serde_json::to_string_pretty(self)?;
        fs::write(Self::config_path(data_dir), content)?;
        Ok(())
    }

    /// Built-in catalog with the configured limits applied.
    pub fn catalog(&self) -> ToolCatalog {
        let mut catalog = ToolCatalog::new();
        catalog.apply_limit_overrides(&self.limits);
        catalog
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{HASH_GENERATOR, JSON_FORMATTER};
    use tempfile::TempDir;

    #[test]
    fn test_missing_config_is_default() {
        let dir = TempDir::new().unwrap();
        let config = LedgerConfig::load(dir.path()).unwrap();
        assert_eq!(config, LedgerConfig::default());
        assert_eq!(config.default_tier, Tier::Free);
    }

    #[test]
    fn test_partial_config() {
        let dir = TempDir::new().unwrap();
        fs::write(
            LedgerConfig::config_path(dir.path()),
            r#"{"limits": {"hash-generator": 5}}"#,
        )
        .unwrap();

        let config = LedgerConfig::load(dir.path()).unwrap();
        let catalog = config.catalog();
        assert_eq!(catalog.daily_limit(HASH_GENERATOR), Some(5));
        assert_eq!(catalog.daily_limit(JSON_FORMATTER), Some(20));
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let mut config = LedgerConfig {
            default_tier: Tier::Pro,
            ..Default::default()
        };
        config.limits.insert(JSON_FORMATTER.to_string(), 2);

        config.save(dir.path()).unwrap();
        assert_eq!(LedgerConfig::load(dir.path()).unwrap(), config);
    }

    #[test]
    fn test_malformed_config_is_error() {
        let dir = TempDir::new().unwrap();
        fs::write(LedgerConfig::config_path(dir.path()), "{ nope").unwrap();
        let err = LedgerConfig::load(dir.path()).unwrap_err();
        assert!(format!("{:#}", err).contains("config.json"));
    }

    #[test]
    fn test_explicit_data_dir_wins() {
        assert_eq!(
            LedgerConfig::resolve_data_dir(Some("/var/lib/toolkit")),
            PathBuf::from("/var/lib/toolkit")
        );
    }
}
