use crate::commands::load_config;
use crate::output::Output;
use crate::ConfigCommands;
use color_eyre::eyre::{eyre, Result};
use reeltrack_config::{Config, PathManager};
use serde_json::json;
use std::path::PathBuf;

pub async fn run_config(
    cmd: ConfigCommands,
    config_path: Option<PathBuf>,
    db_path: Option<PathBuf>,
    output: &Output,
) -> Result<()> {
    let paths = PathManager::default();
    let config_path = config_path.unwrap_or_else(|| paths.config_file());

    match cmd {
        ConfigCommands::Show => {
            let config = load_config(&config_path)?;
            let database = db_path.unwrap_or_else(|| config.database_path(&paths));

            if output.is_human() {
                let exists = if config_path.exists() { "" } else { " (not found, using defaults)" };
                output.println(format!("Config file: {}{}", config_path.display(), exists));
                output.println(format!("Database:    {}", database.display()));
                output.println("");
                output.println(toml::to_string_pretty(&config)?);
            } else {
                output.json(&json!({
                    "configFile": config_path,
                    "database": database,
                    "config": serde_json::to_value(&config)?,
                }));
            }
        }
        ConfigCommands::Init { force } => {
            if config_path.exists() && !force {
                return Err(eyre!(
                    "Config file {} already exists, pass --force to overwrite it",
                    config_path.display()
                ));
            }
            paths
                .ensure_directories()
                .map_err(|e| eyre!("Failed to create configuration directories: {}", e))?;
            Config::default()
                .save_to_file(&config_path)
                .map_err(|e| eyre!("Failed to write config: {}", e))?;
            output.success(format!("Wrote default config to {}", config_path.display()));
        }
    }

    Ok(())
}
