use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeSet;

use crate::media::MediaKind;
use crate::status::{LegacyStatus, StatusFlags};

/// Keys used by stored watch-item records.
pub mod keys {
    pub const TITLE: &str = "title";
    pub const STATUS: &str = "status";
    pub const IN_WATCHLIST: &str = "inWatchlist";
    pub const IN_PROGRESS: &str = "inProgress";
    pub const WATCHED: &str = "watched";
    pub const TIMES_WATCHED: &str = "timesWatched";
    pub const MEDIA_TYPE: &str = "mediaType";
    pub const TOTAL_EPISODES: &str = "totalEpisodes";
    pub const WATCHED_EPISODES: &str = "watchedEpisodes";
    pub const UPDATED_AT: &str = "updatedAt";

    // Older records and some exports use these names instead
    pub const STATUS_ALIAS: &str = "legacyStatus";
    pub const MEDIA_TYPE_ALIAS: &str = "mediaKind";
    pub const TOTAL_EPISODES_ALIAS: &str = "totalEpisodeCount";
    pub const WATCHED_EPISODES_ALIAS: &str = "watchedEpisodeKeys";
}

/// Which schema era a stored record belongs to.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum RecordShape {
    /// No flag present, only (possibly) the legacy status string
    Legacy,
    /// All three flags present
    Flagged,
    /// Some flags present, some missing
    Mixed,
}

/// A watch-item as read from storage, before reconciliation.
///
/// Every field is optional because records from different schema eras carry
/// different subsets. Decoding never fails: a value of the wrong type is
/// treated as absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawWatchItem {
    pub title: Option<String>,
    pub status: Option<String>,
    /// A flag key that is present counts, even when its value is `null`
    pub in_watchlist: Option<bool>,
    pub in_progress: Option<bool>,
    pub watched: Option<bool>,
    /// Raw numeric value; fractions are kept so `> 0` sees `0.5`
    pub times_watched: Option<f64>,
    pub media_kind: Option<MediaKind>,
    pub total_episodes: Option<f64>,
    /// Episode keys whose stored marker is truthy
    pub watched_episodes: BTreeSet<String>,
}

impl RawWatchItem {
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Object(map) => Self::from_map(map),
            _ => Self::default(),
        }
    }

    pub fn from_map(map: &Map<String, Value>) -> Self {
        Self {
            title: field(map, keys::TITLE, None)
                .and_then(Value::as_str)
                .map(str::to_string),
            status: field(map, keys::STATUS, Some(keys::STATUS_ALIAS))
                .and_then(Value::as_str)
                .map(str::to_string),
            in_watchlist: flag(map, keys::IN_WATCHLIST),
            in_progress: flag(map, keys::IN_PROGRESS),
            watched: flag(map, keys::WATCHED),
            times_watched: field(map, keys::TIMES_WATCHED, None).and_then(count),
            media_kind: field(map, keys::MEDIA_TYPE, Some(keys::MEDIA_TYPE_ALIAS))
                .and_then(Value::as_str)
                .and_then(MediaKind::parse),
            total_episodes: field(map, keys::TOTAL_EPISODES, Some(keys::TOTAL_EPISODES_ALIAS))
                .and_then(count),
            watched_episodes: field(map, keys::WATCHED_EPISODES, Some(keys::WATCHED_EPISODES_ALIAS))
                .map(episode_keys)
                .unwrap_or_default(),
        }
    }

    pub fn shape(&self) -> RecordShape {
        let present = [self.in_watchlist, self.in_progress, self.watched]
            .iter()
            .filter(|flag| flag.is_some())
            .count();
        match present {
            0 => RecordShape::Legacy,
            3 => RecordShape::Flagged,
            _ => RecordShape::Mixed,
        }
    }

    pub fn has_all_flags(&self) -> bool {
        self.shape() == RecordShape::Flagged
    }

    /// Parsed legacy status, `None` when absent or unrecognized.
    pub fn legacy_status(&self) -> Option<LegacyStatus> {
        self.status.as_deref().and_then(LegacyStatus::parse)
    }

    pub fn times_watched_or_zero(&self) -> f64 {
        self.times_watched.unwrap_or(0.0)
    }

    /// Whole completed viewings, for display and watch-count comparisons.
    pub fn watch_count(&self) -> u64 {
        self.times_watched
            .filter(|times| times.is_finite() && *times > 0.0)
            .map(|times| times as u64)
            .unwrap_or(0)
    }

    /// Title if present and not blank. Records without one are corrupt.
    pub fn valid_title(&self) -> Option<&str> {
        self.title
            .as_deref()
            .map(str::trim)
            .filter(|title| !title.is_empty())
    }

    /// Stored flags as-is, missing ones read as false.
    pub fn stored_flags(&self) -> StatusFlags {
        StatusFlags::new(
            self.in_watchlist.unwrap_or(false),
            self.in_progress.unwrap_or(false),
            self.watched.unwrap_or(false),
        )
    }
}

/// Look up a key, falling back to its alias. `null` counts as absent.
fn field<'a>(map: &'a Map<String, Value>, key: &str, alias: Option<&str>) -> Option<&'a Value> {
    map.get(key)
        .filter(|value| !value.is_null())
        .or_else(|| {
            alias
                .and_then(|alias| map.get(alias))
                .filter(|value| !value.is_null())
        })
}

/// A flag is present whenever its key is, and a `null` value reads as false.
fn flag(map: &Map<String, Value>, key: &str) -> Option<bool> {
    map.get(key).map(truthy)
}

/// Truthiness of a stored value.
pub fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(false),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Numeric value of a stored count, coerced the way a loose numeric
/// comparison does: booleans are 0 or 1 and numeric strings are parsed.
fn count(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

fn episode_keys(value: &Value) -> BTreeSet<String> {
    match value {
        Value::Object(map) => map
            .iter()
            .filter(|(_, marker)| truthy(marker))
            .map(|(key, _)| key.clone())
            .collect(),
        Value::Array(entries) => entries
            .iter()
            .enumerate()
            .filter(|(_, marker)| truthy(marker))
            .map(|(index, _)| index.to_string())
            .collect(),
        _ => BTreeSet::new(),
    }
}
