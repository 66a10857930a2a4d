use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    AddedToWatchlist,
    StartedWatching,
    Completed,
    Rewatched,
}

impl ActivityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityKind::AddedToWatchlist => "added_to_watchlist",
            ActivityKind::StartedWatching => "started_watching",
            ActivityKind::Completed => "completed",
            ActivityKind::Rewatched => "rewatched",
        }
    }
}

/// One entry of a user's activity feed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ActivityEntry {
    pub kind: ActivityKind,
    pub item_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl ActivityEntry {
    /// Key under the activity node. Millisecond prefix keeps entries in
    /// chronological order when sorted.
    pub fn entry_id(&self) -> String {
        format!("{:013}-{}", self.timestamp.timestamp_millis(), self.item_id)
    }
}
