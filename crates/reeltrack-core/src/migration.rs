use chrono::{DateTime, Utc};
use reeltrack_models::{keys, DatabaseLayout, LegacyStatus, RawWatchItem, RecordShape, StatusFlags};
use serde::Serialize;
use serde_json::{json, Map, Value};
use tracing::{debug, error, info, instrument, warn};

use crate::error::StoreError;
use crate::reconcile::{legacy_status_for, reconcile};
use crate::store::{keyed_children, Persistence, UpdateBatch};

/// Outcome of a collection migration, shown to the user as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationResult {
    pub success: bool,
    pub migrated_count: usize,
    pub message: String,
}

impl MigrationResult {
    fn migrated(count: usize) -> Self {
        let message = if count == 0 {
            "No items to migrate".to_string()
        } else {
            format!("Successfully migrated {} items", count)
        };
        Self {
            success: true,
            migrated_count: count,
            message,
        }
    }

    fn failed(reason: impl std::fmt::Display) -> Self {
        Self {
            success: false,
            migrated_count: 0,
            message: format!("Migration failed: {}", reason),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannedItem {
    pub item_id: String,
    pub shape: RecordShape,
    /// Flags as stored before the migration, missing ones read as false
    pub before: StatusFlags,
    pub after: StatusFlags,
    pub status: LegacyStatus,
}

impl PlannedItem {
    pub fn changes_flags(&self) -> bool {
        self.shape != RecordShape::Flagged || self.before != self.after
    }
}

/// Every write a migration would make, computed without touching storage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationPlan {
    pub items: Vec<PlannedItem>,
    /// Entries that are not objects and are left alone
    pub skipped: Vec<String>,
}

impl MigrationPlan {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn changed_count(&self) -> usize {
        self.items.iter().filter(|item| item.changes_flags()).count()
    }

    fn shape_count(&self, shape: RecordShape) -> usize {
        self.items.iter().filter(|item| item.shape == shape).count()
    }

    /// One batch covering every planned item.
    pub fn to_batch(
        &self,
        layout: &DatabaseLayout,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> UpdateBatch {
        let updated_at = json!(now.to_rfc3339());
        let mut batch = UpdateBatch::new();

        for item in &self.items {
            let path = |field: &str| layout.item_field_path(user_id, &item.item_id, field);
            batch.insert(path(keys::IN_WATCHLIST), json!(item.after.in_watchlist));
            batch.insert(path(keys::IN_PROGRESS), json!(item.after.in_progress));
            batch.insert(path(keys::WATCHED), json!(item.after.watched));
            batch.insert(path(keys::STATUS), json!(item.status.as_str()));
            batch.insert(path(keys::UPDATED_AT), updated_at.clone());
        }

        batch
    }
}

/// Plan the migration of one user's item collection.
pub fn plan_migration(collection: &Map<String, Value>, force: bool) -> MigrationPlan {
    let mut plan = MigrationPlan::default();

    for (item_id, value) in collection {
        let Value::Object(record) = value else {
            warn!("Skipping item {}: stored value is not an object", item_id);
            plan.skipped.push(item_id.clone());
            continue;
        };

        let raw = RawWatchItem::from_map(record);
        let after = reconcile(&raw, force);
        plan.items.push(PlannedItem {
            item_id: item_id.clone(),
            shape: raw.shape(),
            before: raw.stored_flags(),
            after,
            status: legacy_status_for(&after),
        });
    }

    plan
}

/// Read a user's collection and plan its migration.
pub async fn load_plan<P>(
    store: &P,
    layout: &DatabaseLayout,
    user_id: &str,
    force: bool,
) -> Result<MigrationPlan, StoreError>
where
    P: Persistence + ?Sized,
{
    let Some(stored) = store.read(&layout.items_path(user_id)).await? else {
        return Ok(MigrationPlan::default());
    };

    match keyed_children(stored) {
        Some(collection) => Ok(plan_migration(&collection, force)),
        None => {
            warn!("Item collection for user {} is not a collection, nothing to migrate", user_id);
            Ok(MigrationPlan::default())
        }
    }
}

/// Rewrite every item of a user's collection to the flag representation.
///
/// All items go out in a single atomic update, so either every item is
/// migrated or none is. Storage failures are reported in the result, never
/// returned as errors. Re-running with `force` converges to the same state.
pub async fn batch_migrate<P>(
    store: &P,
    layout: &DatabaseLayout,
    user_id: &str,
    force: bool,
) -> MigrationResult
where
    P: Persistence + ?Sized,
{
    batch_migrate_at(store, layout, user_id, force, Utc::now()).await
}

#[instrument(skip(store, layout, now))]
pub async fn batch_migrate_at<P>(
    store: &P,
    layout: &DatabaseLayout,
    user_id: &str,
    force: bool,
    now: DateTime<Utc>,
) -> MigrationResult
where
    P: Persistence + ?Sized,
{
    match migrate_collection(store, layout, user_id, force, now).await {
        Ok(count) => {
            info!("Migrated {} items for user {}", count, user_id);
            MigrationResult::migrated(count)
        }
        Err(e) => {
            error!("Migration failed for user {}: {}", user_id, e);
            MigrationResult::failed(e)
        }
    }
}

async fn migrate_collection<P>(
    store: &P,
    layout: &DatabaseLayout,
    user_id: &str,
    force: bool,
    now: DateTime<Utc>,
) -> Result<usize, StoreError>
where
    P: Persistence + ?Sized,
{
    let plan = load_plan(store, layout, user_id, force).await?;
    if plan.is_empty() {
        debug!("No items to migrate for user {}", user_id);
        return Ok(0);
    }

    info!(
        "Migrating {} items ({} legacy, {} flagged, {} mixed, {} with changed flags, {} skipped)",
        plan.items.len(),
        plan.shape_count(RecordShape::Legacy),
        plan.shape_count(RecordShape::Flagged),
        plan.shape_count(RecordShape::Mixed),
        plan.changed_count(),
        plan.skipped.len()
    );

    store.update(plan.to_batch(layout, user_id, now)).await?;
    Ok(plan.items.len())
}
