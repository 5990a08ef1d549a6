use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::cards::DashboardVariant;
use crate::error::{BipsError, Result};
use crate::mock::transactions::{DEFAULT_TRANSACTION_COUNT, MAX_TRANSACTION_COUNT};
use crate::mock::DEFAULT_SEED;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub dashboard_variant: DashboardVariant,
    #[serde(default = "default_transaction_count")]
    pub transaction_count: usize,
    #[serde(default = "default_seed")]
    pub seed: u64,
}

fn default_transaction_count() -> usize {
    DEFAULT_TRANSACTION_COUNT
}

fn default_seed() -> u64 {
    DEFAULT_SEED
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            dashboard_variant: DashboardVariant::default(),
            transaction_count: default_transaction_count(),
            seed: default_seed(),
        }
    }
}

pub fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("bips")
}

fn settings_path() -> PathBuf {
    config_dir().join("settings.json")
}

pub fn load_settings() -> Settings {
    load_settings_from(&settings_path())
}

/// Missing file means defaults. A file that fails to parse also yields
/// defaults, with a warning in the log. An out-of-range transaction count
/// falls back to the default count.
pub fn load_settings_from(path: &Path) -> Settings {
    if !path.exists() {
        return Settings::default();
    }
    let content = std::fs::read_to_string(path).unwrap_or_default();
    match serde_json::from_str::<Settings>(&content) {
        Ok(mut settings) => {
            if settings.transaction_count > MAX_TRANSACTION_COUNT {
                warn!(
                    count = settings.transaction_count,
                    max = MAX_TRANSACTION_COUNT,
                    "transaction count out of range, using default"
                );
                settings.transaction_count = DEFAULT_TRANSACTION_COUNT;
            }
            settings
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "settings unreadable, using defaults");
            Settings::default()
        }
    }
}

pub fn save_settings(settings: &Settings) -> Result<()> {
    save_settings_to(settings, &settings_path())
}

pub fn save_settings_to(settings: &Settings, path: &Path) -> Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let json = serde_json::to_string_pretty(settings)
        .map_err(|e| BipsError::Settings(e.to_string()))?;
    std::fs::write(path, format!("{json}\n"))?;
    info!(path = %path.display(), variant = %settings.dashboard_variant, "settings saved");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let settings = Settings {
            dashboard_variant: DashboardVariant::Ledger,
            transaction_count: 120,
            seed: 99,
        };
        save_settings_to(&settings, &path).unwrap();
        let loaded = load_settings_from(&path);
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_load_returns_defaults_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let s = load_settings_from(&dir.path().join("nope.json"));
        assert_eq!(s, Settings::default());
        assert_eq!(s.transaction_count, 75);
        assert_eq!(s.dashboard_variant, DashboardVariant::Overview);
    }

    #[test]
    fn test_load_merges_with_defaults() {
        let json = r#"{"dashboard_variant": "trends"}"#;
        let s: Settings = serde_json::from_str(json).unwrap();
        assert_eq!(s.dashboard_variant, DashboardVariant::Trends);
        assert_eq!(s.seed, DEFAULT_SEED);
        assert_eq!(s.transaction_count, DEFAULT_TRANSACTION_COUNT);
    }

    #[test]
    fn test_corrupt_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert_eq!(load_settings_from(&path), Settings::default());
    }

    #[test]
    fn test_oversized_count_falls_back_to_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"transaction_count": 100000000000000000, "seed": 5}"#).unwrap();
        let loaded = load_settings_from(&path);
        assert_eq!(loaded.transaction_count, DEFAULT_TRANSACTION_COUNT);
        assert_eq!(loaded.seed, 5);
    }

    #[test]
    fn test_save_creates_config_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deep").join("nested").join("settings.json");
        save_settings_to(&Settings::default(), &path).unwrap();
        assert!(path.exists());
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.ends_with('\n'));
    }
}
