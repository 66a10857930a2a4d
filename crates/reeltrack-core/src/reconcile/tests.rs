use super::*;
use reeltrack_models::RawWatchItem;
use serde_json::{json, Map, Value};

fn item(value: Value) -> RawWatchItem {
    RawWatchItem::from_value(&value)
}

fn flags(in_watchlist: bool, in_progress: bool, watched: bool) -> StatusFlags {
    StatusFlags::new(in_watchlist, in_progress, watched)
}

fn episodes(watched: usize, total: usize) -> Value {
    let map: Map<String, Value> = (1..=total)
        .map(|n| (format!("season 1, episode {}", n), json!(n <= watched)))
        .collect();
    Value::Object(map)
}

/// Write the reconciled flags and legacy string back, as the migrator does.
fn resync(value: &Value) -> Value {
    let reconciled = reconcile_value(value, true);
    let mut synced = value.clone();
    if let Value::Object(map) = &mut synced {
        map.insert("inWatchlist".to_string(), json!(reconciled.in_watchlist));
        map.insert("inProgress".to_string(), json!(reconciled.in_progress));
        map.insert("watched".to_string(), json!(reconciled.watched));
        map.insert("status".to_string(), json!(legacy_status_for(&reconciled).as_str()));
    }
    synced
}

#[test]
fn test_empty_record_defaults_to_watchlist() {
    assert_eq!(reconcile(&RawWatchItem::default(), false), StatusFlags::initial());
    assert_eq!(reconcile_value(&json!({}), false), flags(true, false, false));
    assert_eq!(reconcile_value(&json!({}), true), flags(true, false, false));
}

#[test]
fn test_legacy_mapping() {
    assert_eq!(reconcile_value(&json!({"status": "Completed"}), false), flags(false, false, true));
    assert_eq!(reconcile_value(&json!({"status": "Watched"}), false), flags(false, false, true));
    assert_eq!(
        reconcile_value(&json!({"status": "Watching", "timesWatched": 0}), false),
        flags(false, true, false)
    );
    assert_eq!(
        reconcile_value(&json!({"status": "Watching", "timesWatched": 2}), false),
        flags(false, true, true)
    );
    assert_eq!(reconcile_value(&json!({"status": "Watchlist"}), false), flags(true, false, false));
    assert_eq!(reconcile_value(&json!({"status": "Plan to Watch"}), false), flags(true, false, false));
}

#[test]
fn test_unrecognized_status_is_watchlist() {
    assert_eq!(reconcile_value(&json!({"status": "Dropped"}), false), flags(true, false, false));
    assert_eq!(
        reconcile_value(&json!({"status": "Dropped", "timesWatched": 1}), false),
        flags(true, false, true)
    );
    assert_eq!(reconcile_value(&json!({"status": 7}), false), flags(true, false, false));
}

#[test]
fn test_watchlist_with_previous_watches_is_watched() {
    let value = json!({"status": "Watchlist", "timesWatched": 3});
    assert_eq!(reconcile_value(&value, false), flags(true, false, true));
}

#[test]
fn test_tv_episode_completion_inference() {
    let complete = json!({
        "status": "Watchlist",
        "mediaType": "tv",
        "totalEpisodes": 10,
        "watchedEpisodes": episodes(10, 10)
    });
    assert!(reconcile_value(&complete, false).watched);

    let partial = json!({
        "status": "Watchlist",
        "mediaType": "tv",
        "totalEpisodes": 10,
        "watchedEpisodes": episodes(9, 10)
    });
    assert!(!reconcile_value(&partial, false).watched);
}

#[test]
fn test_episode_inference_requires_tv_and_total() {
    let movie = json!({
        "status": "Watchlist",
        "mediaType": "movie",
        "totalEpisodes": 2,
        "watchedEpisodes": episodes(2, 2)
    });
    assert!(!reconcile_value(&movie, false).watched);

    let no_total = json!({
        "status": "Watchlist",
        "mediaType": "tv",
        "totalEpisodes": 0,
        "watchedEpisodes": {}
    });
    assert!(!reconcile_value(&no_total, false).watched);
}

#[test]
fn test_episode_inference_needs_exact_tv_kind() {
    for kind in ["TV", " tv ", "Tv"] {
        let value = json!({
            "status": "Watchlist",
            "mediaType": kind,
            "totalEpisodes": 1,
            "watchedEpisodes": {"e1": true}
        });
        assert_eq!(reconcile_value(&value, true), flags(true, false, false), "kind {:?}", kind);
    }
}

#[test]
fn test_fractional_counts_compare_unrounded() {
    let watching = json!({"status": "Watching", "timesWatched": 0.5});
    assert_eq!(reconcile_value(&watching, true), flags(false, true, true));

    // Two watched episodes do not cover 2.5
    let series = json!({
        "status": "Watchlist",
        "mediaType": "tv",
        "totalEpisodes": 2.5,
        "watchedEpisodes": episodes(2, 3)
    });
    assert!(!reconcile_value(&series, true).watched);

    let covered = json!({
        "status": "Watchlist",
        "mediaType": "tv",
        "totalEpisodes": 2.5,
        "watchedEpisodes": episodes(3, 3)
    });
    assert!(reconcile_value(&covered, true).watched);
}

#[test]
fn test_boolean_and_string_counts() {
    let counted = json!({"status": "Watching", "timesWatched": true});
    assert!(reconcile_value(&counted, true).watched);

    let not_counted = json!({"status": "Watching", "timesWatched": false});
    assert!(!reconcile_value(&not_counted, true).watched);

    let text = json!({"status": "Watchlist", "timesWatched": "2"});
    assert!(reconcile_value(&text, true).watched);
}

#[test]
fn test_episode_inference_only_for_watchlist_branch() {
    // Watching only looks at the watch count
    let value = json!({
        "status": "Watching",
        "mediaType": "tv",
        "totalEpisodes": 1,
        "watchedEpisodes": {"e1": true}
    });
    assert_eq!(reconcile_value(&value, false), flags(false, true, false));
}

#[test]
fn test_existing_flags_are_kept() {
    let value = json!({
        "status": "Completed",
        "inWatchlist": true,
        "inProgress": false,
        "watched": false
    });
    assert_eq!(reconcile_value(&value, false), flags(true, false, false));
}

#[test]
fn test_existing_flags_enforce_mutual_exclusion() {
    let value = json!({"inWatchlist": true, "inProgress": true, "watched": true});
    assert_eq!(reconcile_value(&value, false), flags(false, true, true));
}

#[test]
fn test_null_flag_counts_as_present() {
    let value = json!({
        "status": "Completed",
        "inWatchlist": null,
        "inProgress": true,
        "watched": false
    });
    assert_eq!(reconcile_value(&value, false), flags(false, true, false));
    assert_eq!(reconcile_value(&value, true), flags(false, false, true));

    // The explicit null wins over the legacy status
    let queued = item(json!({"status": "Watchlist", "inWatchlist": null}));
    assert!(!is_in_watchlist(&queued));
}

#[test]
fn test_partial_flags_fall_back_to_legacy() {
    let value = json!({"status": "Watching", "inWatchlist": true, "watched": false});
    assert_eq!(reconcile_value(&value, false), flags(false, true, false));
}

#[test]
fn test_force_ignores_existing_flags() {
    let value = json!({
        "status": "Completed",
        "inWatchlist": true,
        "inProgress": true,
        "watched": false
    });
    assert_eq!(reconcile_value(&value, true), flags(false, false, true));
}

#[test]
fn test_forced_migration_is_idempotent() {
    let records = vec![
        json!({}),
        json!({"status": "Completed"}),
        json!({"status": "Watched", "timesWatched": 4}),
        json!({"status": "Watching"}),
        json!({"status": "Watching", "timesWatched": 2}),
        json!({"status": "Plan to Watch", "timesWatched": 1}),
        json!({"status": "Dropped"}),
        json!({"status": "Watchlist", "inProgress": true, "inWatchlist": true, "watched": true}),
        json!({
            "status": "Watchlist",
            "mediaType": "tv",
            "totalEpisodes": 3,
            "watchedEpisodes": episodes(3, 3)
        }),
    ];

    for record in records {
        let once = resync(&record);
        let twice = resync(&once);
        assert_eq!(once, twice, "migration not idempotent for {}", record);
        assert_eq!(reconcile_value(&once, true), reconcile_value(&record, true));
    }
}

#[test]
fn test_never_both_in_progress_and_watchlist() {
    let statuses = [
        None,
        Some("Watchlist"),
        Some("Plan to Watch"),
        Some("Watching"),
        Some("Watched"),
        Some("Completed"),
        Some("???"),
    ];
    let flag_values = [None, Some(false), Some(true)];

    for status in statuses {
        for in_watchlist in flag_values {
            for in_progress in flag_values {
                for watched in flag_values {
                    let raw = RawWatchItem {
                        status: status.map(str::to_string),
                        in_watchlist,
                        in_progress,
                        watched,
                        times_watched: Some(1.0),
                        ..RawWatchItem::default()
                    };
                    for force in [false, true] {
                        let result = reconcile(&raw, force);
                        assert!(
                            !(result.in_progress && result.in_watchlist),
                            "both set for {:?} (force={})",
                            raw,
                            force
                        );
                    }
                }
            }
        }
    }
}

#[test]
fn test_display_priority() {
    assert_eq!(display_status(&flags(true, true, true)), DisplayStatus::Watching);
    assert_eq!(display_status(&flags(true, false, true)), DisplayStatus::Watchlist);
    assert_eq!(display_status(&flags(false, false, true)), DisplayStatus::Completed);
    assert_eq!(display_status(&StatusFlags::default()), DisplayStatus::Watchlist);
}

#[test]
fn test_legacy_status_for_flags() {
    assert_eq!(legacy_status_for(&flags(false, true, true)), LegacyStatus::Watching);
    assert_eq!(legacy_status_for(&flags(true, false, true)), LegacyStatus::Watchlist);
    assert_eq!(legacy_status_for(&flags(false, false, true)), LegacyStatus::Completed);
    assert_eq!(legacy_status_for(&flags(false, false, false)), LegacyStatus::Watchlist);
}

#[test]
fn test_predicates_prefer_explicit_flags() {
    let raw = item(json!({"status": "Completed", "inWatchlist": true}));
    assert!(is_in_watchlist(&raw));
    // Missing flags come from the legacy status
    assert!(!is_in_progress(&raw));
    assert!(is_watched(&raw));
}

#[test]
fn test_predicates_on_legacy_records() {
    let watching = item(json!({"status": "Watching", "timesWatched": 1}));
    assert!(is_in_progress(&watching));
    assert!(!is_in_watchlist(&watching));
    assert!(is_watched(&watching));

    let empty = RawWatchItem::default();
    assert!(is_in_watchlist(&empty));
    assert!(!is_in_progress(&empty));
    assert!(!is_watched(&empty));
}

#[test]
fn test_to_watchlist_and_in_progress_keep_watched() {
    for watched in [None, Some(false), Some(true)] {
        for in_progress in [None, Some(false), Some(true)] {
            let raw = RawWatchItem {
                watched,
                in_progress,
                in_watchlist: Some(true),
                ..RawWatchItem::default()
            };
            let expected = watched.unwrap_or(false);

            let queued = to_watchlist(&raw);
            assert_eq!(queued.flags, flags(true, false, expected));
            assert_eq!(queued.status, LegacyStatus::Watchlist);
            assert_eq!(queued.times_watched, None);

            let started = to_in_progress(&raw);
            assert_eq!(started.flags, flags(false, true, expected));
            assert_eq!(started.status, LegacyStatus::Watching);
        }
    }
}

#[test]
fn test_to_watched_preserves_watchlist() {
    let queued = item(json!({"inWatchlist": true, "inProgress": false, "watched": false}));
    let patch = to_watched(&queued, 1);
    assert_eq!(patch.flags, flags(true, false, true));
    assert_eq!(patch.status, LegacyStatus::Completed);
    assert_eq!(patch.times_watched, Some(1));

    let watching = item(json!({"inWatchlist": false, "inProgress": true, "watched": false}));
    assert_eq!(to_watched(&watching, 3).flags, flags(false, false, true));
    assert_eq!(to_watched(&RawWatchItem::default(), 2).times_watched, Some(2));
}

#[test]
fn test_transition_apply_and_patch_fields() {
    let raw = item(json!({"watched": true}));
    let patch = Transition::Watched { times_watched: Some(2) }.apply(&raw);
    let fields: Map<String, Value> = patch
        .fields()
        .into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect();

    assert_eq!(fields["inWatchlist"], false);
    assert_eq!(fields["inProgress"], false);
    assert_eq!(fields["watched"], true);
    assert_eq!(fields["status"], "Completed");
    assert_eq!(fields["timesWatched"], 2);

    let queued = Transition::Watchlist.apply(&raw);
    assert!(queued.fields().iter().all(|(key, _)| *key != "timesWatched"));
    assert_eq!(Transition::InProgress.apply(&raw), to_in_progress(&raw));
}

#[test]
fn test_unspecified_watch_count_continues_history() {
    let fresh = item(json!({
        "status": "Watching",
        "inWatchlist": false,
        "inProgress": true,
        "watched": false
    }));
    assert_eq!(next_watch_count(&fresh), DEFAULT_TIMES_WATCHED);

    let seen = item(json!({"status": "Completed", "timesWatched": 3}));
    assert_eq!(next_watch_count(&seen), 4);
    let patch = Transition::Watched { times_watched: None }.apply(&seen);
    assert_eq!(patch.times_watched, Some(4));

    // Explicit counts are taken as given
    let patch = Transition::Watched { times_watched: Some(1) }.apply(&seen);
    assert_eq!(patch.times_watched, Some(1));
}
