//! Watch-status reconciliation.
//!
//! Stored items carry their state either as a legacy status string, as three
//! boolean flags, or as some mix of both. Everything here is pure and total:
//! any record, however malformed, maps to a usable [`StatusFlags`] triple in
//! which `in_progress` and `in_watchlist` are never both set.

mod transition;

#[cfg(test)]
mod tests;

pub use transition::{
    next_watch_count, to_in_progress, to_watched, to_watchlist, StatusPatch, Transition,
    DEFAULT_TIMES_WATCHED,
};

use reeltrack_models::{DisplayStatus, LegacyStatus, MediaKind, RawWatchItem, StatusFlags};
use serde_json::Value;

/// Canonical flags for a stored item.
///
/// When `force_from_legacy` is false and the record already carries all three
/// flags they are taken as stored. Otherwise the flags are recomputed from
/// the legacy status and watch count, which is how previously wrong
/// migrations get corrected.
pub fn reconcile(item: &RawWatchItem, force_from_legacy: bool) -> StatusFlags {
    if !force_from_legacy && item.has_all_flags() {
        return item.stored_flags().exclusive();
    }
    flags_from_legacy(item)
}

/// [`reconcile`] straight from a stored JSON value.
pub fn reconcile_value(value: &Value, force_from_legacy: bool) -> StatusFlags {
    reconcile(&RawWatchItem::from_value(value), force_from_legacy)
}

fn flags_from_legacy(item: &RawWatchItem) -> StatusFlags {
    match item.legacy_status().unwrap_or(LegacyStatus::Watchlist) {
        LegacyStatus::Completed | LegacyStatus::Watched => StatusFlags::new(false, false, true),
        LegacyStatus::Watching => StatusFlags::new(false, true, item.times_watched_or_zero() > 0.0),
        LegacyStatus::Watchlist | LegacyStatus::PlanToWatch => {
            StatusFlags::new(true, false, watched_from_history(item))
        }
    }
}

/// A queued item still counts as watched if it was completed before, or for a
/// series, if every episode is marked watched.
fn watched_from_history(item: &RawWatchItem) -> bool {
    if item.times_watched_or_zero() > 0.0 {
        return true;
    }

    match (item.media_kind, item.total_episodes) {
        (Some(MediaKind::Tv), Some(total)) if total > 0.0 => {
            item.watched_episodes.len() as f64 >= total
        }
        _ => false,
    }
}

/// Label for a set of flags. First match wins: in progress, watchlist,
/// watched, and watchlist again when nothing is set.
pub fn display_status(flags: &StatusFlags) -> DisplayStatus {
    if flags.in_progress {
        DisplayStatus::Watching
    } else if flags.in_watchlist {
        DisplayStatus::Watchlist
    } else if flags.watched {
        DisplayStatus::Completed
    } else {
        DisplayStatus::Watchlist
    }
}

/// Legacy string written next to the flags for older readers.
pub fn legacy_status_for(flags: &StatusFlags) -> LegacyStatus {
    display_status(flags).into()
}

pub fn is_in_watchlist(item: &RawWatchItem) -> bool {
    item.in_watchlist.unwrap_or_else(|| flags_from_legacy(item).in_watchlist)
}

pub fn is_in_progress(item: &RawWatchItem) -> bool {
    item.in_progress.unwrap_or_else(|| flags_from_legacy(item).in_progress)
}

pub fn is_watched(item: &RawWatchItem) -> bool {
    item.watched.unwrap_or_else(|| flags_from_legacy(item).watched)
}
