use reeltrack_models::{keys, LegacyStatus, RawWatchItem, StatusFlags};
use serde::Serialize;
use serde_json::{json, Value};

/// Watch count written by a plain "mark as watched".
pub const DEFAULT_TIMES_WATCHED: u64 = 1;

/// A complete status update for one item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusPatch {
    #[serde(flatten)]
    pub flags: StatusFlags,
    pub status: LegacyStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub times_watched: Option<u64>,
}

impl StatusPatch {
    /// Stored field name and value for every field this patch writes.
    pub fn fields(&self) -> Vec<(&'static str, Value)> {
        let mut fields = vec![
            (keys::IN_WATCHLIST, json!(self.flags.in_watchlist)),
            (keys::IN_PROGRESS, json!(self.flags.in_progress)),
            (keys::WATCHED, json!(self.flags.watched)),
            (keys::STATUS, json!(self.status.as_str())),
        ];
        if let Some(times) = self.times_watched {
            fields.push((keys::TIMES_WATCHED, json!(times)));
        }
        fields
    }
}

/// User-requested status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Watchlist,
    InProgress,
    /// Without a count an already watched item gets one more viewing and a
    /// first completion gets [`DEFAULT_TIMES_WATCHED`].
    Watched { times_watched: Option<u64> },
}

impl Transition {
    pub fn apply(&self, item: &RawWatchItem) -> StatusPatch {
        match self {
            Transition::Watchlist => to_watchlist(item),
            Transition::InProgress => to_in_progress(item),
            Transition::Watched { times_watched } => {
                to_watched(item, times_watched.unwrap_or_else(|| next_watch_count(item)))
            }
        }
    }
}

/// Watch count to record when an item is marked watched without one.
pub fn next_watch_count(item: &RawWatchItem) -> u64 {
    let count = item.watch_count();
    if super::is_watched(item) {
        count + 1
    } else {
        count.max(DEFAULT_TIMES_WATCHED)
    }
}

// Watchlist and in-progress exclude each other, so each fixes the other flag.
// Both keep `watched` as stored.

pub fn to_watchlist(item: &RawWatchItem) -> StatusPatch {
    StatusPatch {
        flags: StatusFlags::new(true, false, item.watched.unwrap_or(false)),
        status: LegacyStatus::Watchlist,
        times_watched: None,
    }
}

pub fn to_in_progress(item: &RawWatchItem) -> StatusPatch {
    StatusPatch {
        flags: StatusFlags::new(false, true, item.watched.unwrap_or(false)),
        status: LegacyStatus::Watching,
        times_watched: None,
    }
}

/// Completion is orthogonal to the queue: `in_watchlist` is preserved.
pub fn to_watched(item: &RawWatchItem, times_watched: u64) -> StatusPatch {
    StatusPatch {
        flags: StatusFlags::new(item.in_watchlist.unwrap_or(false), false, true),
        status: LegacyStatus::Completed,
        times_watched: Some(times_watched),
    }
}
