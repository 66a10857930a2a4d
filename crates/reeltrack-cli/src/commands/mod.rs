pub mod config;
pub mod items;
pub mod migrate;
pub mod profile;

use color_eyre::eyre::{eyre, Result};
use reeltrack_config::{Config, PathManager};
use reeltrack_core::JsonFileStore;
use reeltrack_models::DatabaseLayout;
use std::path::{Path, PathBuf};
use tracing::debug;

/// What every data command needs: the validated config and an open store.
pub struct Context {
    pub config: Config,
    pub store: JsonFileStore,
}

impl Context {
    pub fn load(config_path: Option<PathBuf>, db_path: Option<PathBuf>) -> Result<Self> {
        let paths = PathManager::default();
        let config_path = config_path.unwrap_or_else(|| paths.config_file());
        let config = load_config(&config_path)?;

        let db_path = match db_path.or_else(|| config.store.path.clone()) {
            Some(path) => path,
            None => {
                paths
                    .ensure_directories()
                    .map_err(|e| eyre!("Failed to create data directories: {}", e))?;
                paths.database_file()
            }
        };
        debug!("Using database {}", db_path.display());

        Ok(Self {
            config,
            store: JsonFileStore::new(db_path),
        })
    }

    pub fn layout(&self) -> &DatabaseLayout {
        &self.config.layout
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let config = Config::load_or_default(path)
        .map_err(|e| eyre!("Failed to load config {}: {}", path.display(), e))?;
    config
        .validate()
        .map_err(|e| eyre!("Invalid config {}: {}", path.display(), e))?;
    Ok(config)
}

/// Compact `w/p/d` rendering of a flag triple for tables.
pub fn flag_marks(flags: &reeltrack_models::StatusFlags) -> String {
    let mark = |set: bool, c: char| if set { c } else { '-' };
    format!(
        "{}{}{}",
        mark(flags.in_watchlist, 'w'),
        mark(flags.in_progress, 'p'),
        mark(flags.watched, 'd')
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use reeltrack_models::StatusFlags;

    #[test]
    fn test_flag_marks() {
        assert_eq!(flag_marks(&StatusFlags::new(true, false, true)), "w-d");
        assert_eq!(flag_marks(&StatusFlags::default()), "---");
    }
}
