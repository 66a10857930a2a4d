//! Item lifecycle: add, change status, remove.
//!
//! Each operation issues one atomic update. Status changes that match an
//! activity rule append the activity entry in the same update.

use chrono::{DateTime, Utc};
use reeltrack_models::{
    keys, ActivityEntry, ActivityKind, DatabaseLayout, LegacyStatus, MediaKind, RawWatchItem, StatusFlags,
};
use serde::Serialize;
use serde_json::{json, Map, Value};
use tracing::{debug, info, instrument, warn};

use crate::activity::{classify_activity, ItemChange};
use crate::error::CoreError;
use crate::reconcile::{reconcile, StatusPatch, Transition};
use crate::store::{keyed_children, Persistence, UpdateBatch};

/// Data for a newly added item.
#[derive(Debug, Clone, PartialEq)]
pub struct NewItem {
    pub title: String,
    pub media_kind: MediaKind,
    pub total_episodes: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionOutcome {
    pub item_id: String,
    pub patch: StatusPatch,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activity: Option<ActivityEntry>,
}

/// All items of a user that pass the title check, sorted by item id.
pub async fn load_collection<P>(
    store: &P,
    layout: &DatabaseLayout,
    user_id: &str,
) -> Result<Vec<(String, RawWatchItem)>, CoreError>
where
    P: Persistence + ?Sized,
{
    let Some(collection) = store
        .read(&layout.items_path(user_id))
        .await?
        .and_then(keyed_children)
    else {
        return Ok(Vec::new());
    };

    let mut items = Vec::with_capacity(collection.len());
    for (item_id, value) in &collection {
        let raw = RawWatchItem::from_value(value);
        if raw.valid_title().is_none() {
            warn!("Ignoring item {} of user {}: missing title", item_id, user_id);
            continue;
        }
        items.push((item_id.clone(), raw));
    }

    items.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(items)
}

pub async fn load_item<P>(
    store: &P,
    layout: &DatabaseLayout,
    user_id: &str,
    item_id: &str,
) -> Result<Option<RawWatchItem>, CoreError>
where
    P: Persistence + ?Sized,
{
    match store.read(&layout.item_path(user_id, item_id)).await? {
        Some(value @ Value::Object(_)) => Ok(Some(RawWatchItem::from_value(&value))),
        Some(_) => {
            warn!("Item {} of user {} is not an object", item_id, user_id);
            Ok(None)
        }
        None => Ok(None),
    }
}

#[instrument(skip(store, layout, item, now), fields(title = %item.title))]
pub async fn add_item<P>(
    store: &P,
    layout: &DatabaseLayout,
    user_id: &str,
    item_id: &str,
    item: NewItem,
    now: DateTime<Utc>,
) -> Result<ActivityEntry, CoreError>
where
    P: Persistence + ?Sized,
{
    let title = item.title.trim();
    if title.is_empty() {
        return Err(CoreError::InvalidItem("title cannot be empty".to_string()));
    }
    if store.read(&layout.item_path(user_id, item_id)).await?.is_some() {
        return Err(CoreError::AlreadyExists {
            user_id: user_id.to_string(),
            item_id: item_id.to_string(),
        });
    }

    let flags = StatusFlags::initial();
    let mut record = Map::new();
    record.insert(keys::TITLE.to_string(), json!(title));
    record.insert(keys::MEDIA_TYPE.to_string(), json!(item.media_kind.as_str()));
    record.insert(keys::IN_WATCHLIST.to_string(), json!(flags.in_watchlist));
    record.insert(keys::IN_PROGRESS.to_string(), json!(flags.in_progress));
    record.insert(keys::WATCHED.to_string(), json!(flags.watched));
    record.insert(keys::STATUS.to_string(), json!(LegacyStatus::Watchlist.as_str()));
    record.insert(keys::TIMES_WATCHED.to_string(), json!(0));
    record.insert(keys::UPDATED_AT.to_string(), json!(now.to_rfc3339()));
    if let (MediaKind::Tv, Some(total)) = (item.media_kind, item.total_episodes) {
        record.insert(keys::TOTAL_EPISODES.to_string(), json!(total));
    }

    let entry = ActivityEntry {
        kind: ActivityKind::AddedToWatchlist,
        item_id: item_id.to_string(),
        title: Some(title.to_string()),
        timestamp: now,
    };

    let mut batch = UpdateBatch::new();
    batch.insert(layout.item_path(user_id, item_id), Value::Object(record));
    batch.insert(layout.activity_entry_path(user_id, &entry.entry_id()), serde_json::to_value(&entry)?);
    store.update(batch).await?;

    info!("Added {} for user {}", item_id, user_id);
    Ok(entry)
}

/// Apply a status change to a stored item.
#[instrument(skip(store, layout, now))]
pub async fn apply_transition<P>(
    store: &P,
    layout: &DatabaseLayout,
    user_id: &str,
    item_id: &str,
    transition: Transition,
    now: DateTime<Utc>,
) -> Result<TransitionOutcome, CoreError>
where
    P: Persistence + ?Sized,
{
    let item = load_item(store, layout, user_id, item_id)
        .await?
        .ok_or_else(|| CoreError::NotFound {
            user_id: user_id.to_string(),
            item_id: item_id.to_string(),
        })?;

    let patch = transition.apply(&item);
    let times_before = item.watch_count();
    let change = ItemChange {
        before: reconcile(&item, false),
        after: patch.flags,
        times_watched_before: times_before,
        times_watched_after: patch.times_watched.unwrap_or(times_before),
    };

    let mut batch = UpdateBatch::new();
    for (field, value) in patch.fields() {
        batch.insert(layout.item_field_path(user_id, item_id, field), value);
    }
    batch.insert(
        layout.item_field_path(user_id, item_id, keys::UPDATED_AT),
        json!(now.to_rfc3339()),
    );

    let activity = classify_activity(&change).map(|kind| ActivityEntry {
        kind,
        item_id: item_id.to_string(),
        title: item.valid_title().map(str::to_string),
        timestamp: now,
    });
    if let Some(entry) = &activity {
        debug!("Logging {} activity for {}", entry.kind.as_str(), item_id);
        batch.insert(layout.activity_entry_path(user_id, &entry.entry_id()), serde_json::to_value(entry)?);
    }

    store.update(batch).await?;
    Ok(TransitionOutcome {
        item_id: item_id.to_string(),
        patch,
        activity,
    })
}

/// Delete an item. Activity entries that mention it are kept.
#[instrument(skip(store, layout))]
pub async fn remove_item<P>(store: &P, layout: &DatabaseLayout, user_id: &str, item_id: &str) -> Result<(), CoreError>
where
    P: Persistence + ?Sized,
{
    let path = layout.item_path(user_id, item_id);
    if store.read(&path).await?.is_none() {
        return Err(CoreError::NotFound {
            user_id: user_id.to_string(),
            item_id: item_id.to_string(),
        });
    }

    let mut batch = UpdateBatch::new();
    batch.insert(path, Value::Null);
    store.update(batch).await?;

    info!("Removed {} for user {}", item_id, user_id);
    Ok(())
}
