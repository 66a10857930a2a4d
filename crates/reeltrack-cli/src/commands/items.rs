use crate::commands::{flag_marks, Context};
use crate::output::Output;
use crate::{KindArg, TargetStatus};
use chrono::Utc;
use color_eyre::eyre::{eyre, Result};
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Table};
use owo_colors::OwoColorize;
use reeltrack_core::{
    add_item, apply_transition, display_status, load_collection, load_item, reconcile, remove_item,
    NewItem, Transition,
};
use reeltrack_models::{MediaKind, RawWatchItem};
use serde_json::json;

fn transition_for(to: TargetStatus, times: Option<u64>) -> Transition {
    match to {
        TargetStatus::Watchlist => Transition::Watchlist,
        TargetStatus::Watching => Transition::InProgress,
        TargetStatus::Watched => Transition::Watched { times_watched: times },
    }
}

fn media_kind(kind: KindArg) -> MediaKind {
    match kind {
        KindArg::Movie => MediaKind::Movie,
        KindArg::Tv => MediaKind::Tv,
    }
}

fn item_json(item_id: &str, item: &RawWatchItem) -> serde_json::Value {
    let flags = reconcile(item, false);
    json!({
        "id": item_id,
        "title": item.valid_title(),
        "mediaType": item.media_kind,
        "shape": item.shape(),
        "flags": flags,
        "status": display_status(&flags),
        "timesWatched": item.watch_count(),
    })
}

pub async fn run_list(ctx: &Context, user_id: &str, output: &Output) -> Result<()> {
    let items = load_collection(&ctx.store, ctx.layout(), user_id).await?;

    if !output.is_human() {
        let items: Vec<_> = items.iter().map(|(id, item)| item_json(id, item)).collect();
        output.json(&json!({ "user": user_id, "items": items }));
        return Ok(());
    }

    if items.is_empty() {
        output.println(format!("No items for user {}", user_id));
        return Ok(());
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec!["Id", "Title", "Kind", "Status", "Flags", "Watched"]);

    for (item_id, item) in &items {
        let flags = reconcile(item, false);
        table.add_row(vec![
            item_id.clone(),
            item.valid_title().unwrap_or_default().to_string(),
            item.media_kind.map(|kind| kind.to_string()).unwrap_or_else(|| "-".to_string()),
            display_status(&flags).to_string(),
            flag_marks(&flags),
            item.watch_count().to_string(),
        ]);
    }

    output.println(table.to_string());
    output.println(format!("{} items", items.len()));
    Ok(())
}

pub async fn run_show(ctx: &Context, user_id: &str, item_id: &str, output: &Output) -> Result<()> {
    let item = load_item(&ctx.store, ctx.layout(), user_id, item_id)
        .await?
        .ok_or_else(|| eyre!("Item '{}' not found for user '{}'", item_id, user_id))?;

    if !output.is_human() {
        output.json(&item_json(item_id, &item));
        return Ok(());
    }

    let flags = reconcile(&item, false);
    output.println(format!("{} {}", item_id.bold(), item.valid_title().unwrap_or("(untitled)")));
    output.println(format!("  Status:         {}", display_status(&flags)));
    output.println(format!("  Flags:          {}", flag_marks(&flags)));
    output.println(format!("  Record shape:   {:?}", item.shape()));
    output.println(format!("  Legacy status:  {}", item.status.as_deref().unwrap_or("-")));
    output.println(format!("  Times watched:  {}", item.watch_count()));
    if let Some(total) = item.total_episodes {
        output.println(format!("  Episodes:       {}/{}", item.watched_episodes.len(), total));
    }
    Ok(())
}

pub async fn run_set(
    ctx: &Context,
    user_id: &str,
    item_id: &str,
    to: TargetStatus,
    times: Option<u64>,
    output: &Output,
) -> Result<()> {
    if times.is_some() && to != TargetStatus::Watched {
        output.warn("--times only applies when marking as watched, ignoring it");
    }

    let outcome = apply_transition(
        &ctx.store,
        ctx.layout(),
        user_id,
        item_id,
        transition_for(to, times),
        Utc::now(),
    )
    .await?;

    if !output.is_human() {
        output.json(&serde_json::to_value(&outcome)?);
        return Ok(());
    }

    output.success(format!("{} is now {}", item_id, display_status(&outcome.patch.flags)));
    if let Some(entry) = &outcome.activity {
        output.println(format!("  Logged activity: {}", entry.kind.as_str()));
    }
    Ok(())
}

pub async fn run_add(
    ctx: &Context,
    user_id: &str,
    item_id: &str,
    title: String,
    kind: KindArg,
    episodes: Option<u64>,
    output: &Output,
) -> Result<()> {
    let kind = media_kind(kind);
    if episodes.is_some() && kind != MediaKind::Tv {
        output.warn("--episodes only applies to tv items, ignoring it");
    }

    let item = NewItem {
        title,
        media_kind: kind,
        total_episodes: episodes,
    };
    let entry = add_item(&ctx.store, ctx.layout(), user_id, item_id, item, Utc::now()).await?;

    if output.is_human() {
        output.success(format!("Added {} to the watchlist of {}", item_id, user_id));
    } else {
        output.json(&serde_json::to_value(&entry)?);
    }
    Ok(())
}

pub async fn run_remove(ctx: &Context, user_id: &str, item_id: &str, output: &Output) -> Result<()> {
    remove_item(&ctx.store, ctx.layout(), user_id, item_id).await?;
    output.success(format!("Removed {} from the collection of {}", item_id, user_id));
    Ok(())
}
