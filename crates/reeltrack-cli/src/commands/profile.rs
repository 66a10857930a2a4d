use crate::commands::Context;
use crate::output::Output;
use color_eyre::eyre::Result;
use owo_colors::OwoColorize;
use reeltrack_core::{CachePolicy, ProfileCache};
use serde_json::json;

/// Show a profile and the labels of the user's friends. Friend profiles are
/// loaded through one cache so each is read at most once.
pub async fn run_profile(ctx: &Context, user_id: &str, output: &Output) -> Result<()> {
    let mut cache = ProfileCache::new(CachePolicy::from_ttl(ctx.config.cache.profile_ttl()));

    let profile = cache.get_or_load(&ctx.store, ctx.layout(), user_id).await?;
    cache.preload(&ctx.store, ctx.layout(), &profile.friends).await?;

    let mut friends = Vec::with_capacity(profile.friends.len());
    for friend_id in &profile.friends {
        let friend = cache.get_or_load(&ctx.store, ctx.layout(), friend_id).await?;
        friends.push((friend_id.clone(), friend.label(friend_id).to_string()));
    }

    if !output.is_human() {
        let friends: Vec<_> = friends
            .iter()
            .map(|(id, label)| json!({ "id": id, "label": label }))
            .collect();
        output.json(&json!({
            "user": user_id,
            "profile": &*profile,
            "friends": friends,
        }));
        return Ok(());
    }

    output.println(profile.label(user_id).bold().to_string());
    if let Some(username) = &profile.username {
        output.println(format!("  @{}", username));
    }
    if let Some(bio) = &profile.bio {
        output.println(format!("  {}", bio));
    }
    if friends.is_empty() {
        output.println("  No friends yet");
    } else {
        output.println(format!("  Friends ({}):", friends.len()));
        for (id, label) in &friends {
            output.println(format!("    {} ({})", label, id.dimmed()));
        }
    }
    Ok(())
}
