use serde::{Deserialize, Serialize};
use std::fmt;

/// The historical single-string status. Still written alongside the flags so
/// readers that have not migrated keep working.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum LegacyStatus {
    Watchlist,
    #[serde(rename = "Plan to Watch")]
    PlanToWatch,
    Watching,
    Watched,
    Completed,
}

impl LegacyStatus {
    /// Exact match against the stored labels. Unknown labels yield `None`.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Watchlist" => Some(LegacyStatus::Watchlist),
            "Plan to Watch" => Some(LegacyStatus::PlanToWatch),
            "Watching" => Some(LegacyStatus::Watching),
            "Watched" => Some(LegacyStatus::Watched),
            "Completed" => Some(LegacyStatus::Completed),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LegacyStatus::Watchlist => "Watchlist",
            LegacyStatus::PlanToWatch => "Plan to Watch",
            LegacyStatus::Watching => "Watching",
            LegacyStatus::Watched => "Watched",
            LegacyStatus::Completed => "Completed",
        }
    }
}

impl fmt::Display for LegacyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Label shown for an item, derived only from its flags.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum DisplayStatus {
    Watching,
    Watchlist,
    Completed,
}

impl DisplayStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DisplayStatus::Watching => "Watching",
            DisplayStatus::Watchlist => "Watchlist",
            DisplayStatus::Completed => "Completed",
        }
    }
}

impl fmt::Display for DisplayStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<DisplayStatus> for LegacyStatus {
    fn from(status: DisplayStatus) -> Self {
        match status {
            DisplayStatus::Watching => LegacyStatus::Watching,
            DisplayStatus::Watchlist => LegacyStatus::Watchlist,
            DisplayStatus::Completed => LegacyStatus::Completed,
        }
    }
}

/// Canonical watch state of an item.
///
/// `Default` is the all-false triple, which is what an empty flag set decodes
/// to. A newly added item starts from [`StatusFlags::initial`] instead.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct StatusFlags {
    pub in_watchlist: bool,
    pub in_progress: bool,
    pub watched: bool,
}

impl StatusFlags {
    pub fn new(in_watchlist: bool, in_progress: bool, watched: bool) -> Self {
        Self {
            in_watchlist,
            in_progress,
            watched,
        }
    }

    /// State of an item that was just added to a collection.
    pub fn initial() -> Self {
        Self::new(true, false, false)
    }

    /// Enforce mutual exclusion: in progress wins over watchlist.
    pub fn exclusive(mut self) -> Self {
        if self.in_progress && self.in_watchlist {
            self.in_watchlist = false;
        }
        self
    }
}
