//! Activity feed rules.
//!
//! A status change produces at most one activity entry. The rules are checked
//! in table order and the first one that matches decides the kind.

use reeltrack_models::{ActivityKind, StatusFlags};

/// Before/after view of one item's status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemChange {
    pub before: StatusFlags,
    pub after: StatusFlags,
    pub times_watched_before: u64,
    pub times_watched_after: u64,
}

struct ActivityRule {
    kind: ActivityKind,
    matches: fn(&ItemChange) -> bool,
}

const ACTIVITY_RULES: &[ActivityRule] = &[
    ActivityRule {
        kind: ActivityKind::Rewatched,
        matches: |c| c.before.watched && c.after.watched && c.times_watched_after > c.times_watched_before,
    },
    ActivityRule {
        kind: ActivityKind::Completed,
        matches: |c| !c.before.watched && c.after.watched,
    },
    ActivityRule {
        kind: ActivityKind::StartedWatching,
        matches: |c| !c.before.in_progress && c.after.in_progress,
    },
    ActivityRule {
        kind: ActivityKind::AddedToWatchlist,
        matches: |c| !c.before.in_watchlist && c.after.in_watchlist,
    },
];

pub fn classify_activity(change: &ItemChange) -> Option<ActivityKind> {
    ACTIVITY_RULES
        .iter()
        .find(|rule| (rule.matches)(change))
        .map(|rule| rule.kind)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn change(before: StatusFlags, after: StatusFlags) -> ItemChange {
        ItemChange {
            before,
            after,
            times_watched_before: 0,
            times_watched_after: 0,
        }
    }

    #[test]
    fn test_new_item_is_added_to_watchlist() {
        let c = change(StatusFlags::default(), StatusFlags::initial());
        assert_eq!(classify_activity(&c), Some(ActivityKind::AddedToWatchlist));
    }

    #[test]
    fn test_start_watching() {
        let c = change(StatusFlags::initial(), StatusFlags::new(false, true, false));
        assert_eq!(classify_activity(&c), Some(ActivityKind::StartedWatching));
    }

    #[test]
    fn test_completion_beats_other_changes() {
        // Watched and re-queued in the same change
        let c = change(StatusFlags::new(false, true, false), StatusFlags::new(true, false, true));
        assert_eq!(classify_activity(&c), Some(ActivityKind::Completed));
    }

    #[test]
    fn test_rewatch_needs_higher_count() {
        let mut c = change(StatusFlags::new(false, false, true), StatusFlags::new(false, false, true));
        c.times_watched_before = 1;
        c.times_watched_after = 2;
        assert_eq!(classify_activity(&c), Some(ActivityKind::Rewatched));

        c.times_watched_after = 1;
        assert_eq!(classify_activity(&c), None);
    }

    #[test]
    fn test_no_activity_for_unchanged_or_cleared_flags() {
        let same = change(StatusFlags::initial(), StatusFlags::initial());
        assert_eq!(classify_activity(&same), None);

        let dequeued = change(StatusFlags::new(false, true, true), StatusFlags::new(false, false, true));
        assert_eq!(classify_activity(&dequeued), None);
    }
}
