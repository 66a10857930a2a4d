pub mod config;
pub mod paths;

pub use config::{CacheConfig, Config, MigrationConfig, StoreConfig};
pub use paths::{PathManager, container_base_path};
