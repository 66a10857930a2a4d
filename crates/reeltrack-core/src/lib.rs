pub mod activity;
pub mod error;
pub mod items;
pub mod migration;
pub mod profile_cache;
pub mod reconcile;
pub mod store;

pub use activity::{classify_activity, ItemChange};
pub use error::{CoreError, StoreError};
pub use items::{
    add_item, apply_transition, load_collection, load_item, remove_item, NewItem, TransitionOutcome,
};
pub use migration::{
    batch_migrate, batch_migrate_at, load_plan, plan_migration, MigrationPlan, MigrationResult,
    PlannedItem,
};
pub use profile_cache::{CachePolicy, ProfileCache};
pub use reconcile::{
    display_status, is_in_progress, is_in_watchlist, is_watched, legacy_status_for,
    next_watch_count, reconcile, reconcile_value, to_in_progress, to_watched, to_watchlist,
    StatusPatch, Transition, DEFAULT_TIMES_WATCHED,
};
pub use store::{JsonFileStore, MemoryStore, Persistence, UpdateBatch};
