use reeltrack_models::DatabaseLayout;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::paths::PathManager;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub layout: DatabaseLayout,
    #[serde(default)]
    pub migration: MigrationConfig,
    #[serde(default)]
    pub cache: CacheConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreConfig {
    /// JSON database file. Falls back to the data directory when unset.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationConfig {
    /// Recompute flags from the legacy status even for already migrated items
    #[serde(default = "default_true")]
    pub force: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Profile cache lifetime. Entries never expire when unset.
    #[serde(default)]
    pub profile_ttl_seconds: Option<u64>,
}

fn default_true() -> bool {
    true
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            force: default_true(),
        }
    }
}

impl CacheConfig {
    pub fn profile_ttl(&self) -> Option<Duration> {
        self.profile_ttl_seconds.map(Duration::from_secs)
    }
}

// Realtime-database keys may not contain these
const FORBIDDEN_KEY_CHARS: &[char] = &['/', '.', '#', '$', '[', ']'];

impl Config {
    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load the config file if it exists, defaults otherwise.
    pub fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            Self::load_from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save_to_file(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        let keys = [
            ("users_root", &self.layout.users_root),
            ("items_key", &self.layout.items_key),
            ("activity_key", &self.layout.activity_key),
            ("profile_key", &self.layout.profile_key),
        ];

        for (name, value) in keys {
            if value.trim().is_empty() {
                return Err(anyhow::anyhow!("layout.{} cannot be empty", name));
            }
            if value.contains(FORBIDDEN_KEY_CHARS) {
                return Err(anyhow::anyhow!(
                    "layout.{} contains a forbidden character: {}",
                    name,
                    value
                ));
            }
        }

        if self.layout.items_key == self.layout.activity_key
            || self.layout.items_key == self.layout.profile_key
            || self.layout.activity_key == self.layout.profile_key
        {
            return Err(anyhow::anyhow!("layout keys for items, activity and profile must be distinct"));
        }

        if self.cache.profile_ttl_seconds == Some(0) {
            return Err(anyhow::anyhow!("cache.profile_ttl_seconds must be positive"));
        }

        Ok(())
    }

    /// Database file to open, honoring the configured path.
    pub fn database_path(&self, paths: &PathManager) -> PathBuf {
        self.store
            .path
            .clone()
            .unwrap_or_else(|| paths.database_file())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_config_load_and_save() {
        let file = NamedTempFile::new().unwrap();
        let config = Config {
            store: StoreConfig {
                path: Some(PathBuf::from("/tmp/db.json")),
            },
            layout: DatabaseLayout {
                items_key: "items".to_string(),
                ..DatabaseLayout::default()
            },
            migration: MigrationConfig { force: false },
            cache: CacheConfig {
                profile_ttl_seconds: Some(300),
            },
        };

        let path = file.path().to_path_buf();
        config.save_to_file(&path).unwrap();

        let loaded = Config::load_from_file(&path).unwrap();
        assert_eq!(loaded.store.path, Some(PathBuf::from("/tmp/db.json")));
        assert_eq!(loaded.layout.items_key, "items");
        assert_eq!(loaded.layout.users_root, "users");
        assert!(!loaded.migration.force);
        assert_eq!(loaded.cache.profile_ttl(), Some(Duration::from_secs(300)));
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert!(config.migration.force);
        assert_eq!(config.layout, DatabaseLayout::default());
        assert_eq!(config.cache.profile_ttl(), None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_sections() {
        let config: Config = toml::from_str(
            r#"
            [layout]
            items_key = "watchlist"

            [migration]
            "#,
        )
        .unwrap();
        assert_eq!(config.layout.items_key, "watchlist");
        assert_eq!(config.layout.activity_key, "activity");
        assert!(config.migration.force);
    }

    #[test]
    fn test_config_validate() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());

        config.layout.items_key = "movies/list".to_string();
        assert!(config.validate().is_err());

        config.layout.items_key = " ".to_string();
        assert!(config.validate().is_err());

        config.layout.items_key = "activity".to_string();
        assert!(config.validate().is_err());

        config.layout.items_key = "movies".to_string();
        config.cache.profile_ttl_seconds = Some(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_default(&dir.path().join("absent.toml")).unwrap();
        assert!(config.store.path.is_none());
    }

    #[test]
    fn test_database_path_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let paths = PathManager::with_base(dir.path().to_path_buf());
        let config = Config::default();
        assert_eq!(config.database_path(&paths), paths.database_file());
    }
}
