use futures::future::join_all;
use reeltrack_models::{DatabaseLayout, UserProfile};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

use crate::error::CoreError;
use crate::store::Persistence;

/// When cached profiles go stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CachePolicy {
    /// Entries live as long as the cache
    Never,
    Ttl(Duration),
}

impl CachePolicy {
    pub fn from_ttl(ttl: Option<Duration>) -> Self {
        ttl.map(CachePolicy::Ttl).unwrap_or(CachePolicy::Never)
    }
}

struct CachedProfile {
    profile: Arc<UserProfile>,
    loaded_at: Instant,
}

/// Profiles keyed by user id.
///
/// The owner decides how long the cache lives; pass it by reference to
/// whatever needs profile lookups.
pub struct ProfileCache {
    policy: CachePolicy,
    entries: HashMap<String, CachedProfile>,
}

impl ProfileCache {
    pub fn new(policy: CachePolicy) -> Self {
        Self {
            policy,
            entries: HashMap::new(),
        }
    }

    pub fn policy(&self) -> CachePolicy {
        self.policy
    }

    fn is_fresh(&self, entry: &CachedProfile) -> bool {
        match self.policy {
            CachePolicy::Never => true,
            CachePolicy::Ttl(ttl) => entry.loaded_at.elapsed() < ttl,
        }
    }

    /// Cached profile, if present and not expired.
    pub fn get(&self, user_id: &str) -> Option<Arc<UserProfile>> {
        self.entries
            .get(user_id)
            .filter(|entry| self.is_fresh(entry))
            .map(|entry| entry.profile.clone())
    }

    pub fn insert(&mut self, user_id: &str, profile: UserProfile) -> Arc<UserProfile> {
        let profile = Arc::new(profile);
        self.entries.insert(
            user_id.to_string(),
            CachedProfile {
                profile: profile.clone(),
                loaded_at: Instant::now(),
            },
        );
        profile
    }

    /// Cached profile or a fresh read. A user without a stored profile gets
    /// the default one, which is cached as well.
    pub async fn get_or_load<P>(
        &mut self,
        store: &P,
        layout: &DatabaseLayout,
        user_id: &str,
    ) -> Result<Arc<UserProfile>, CoreError>
    where
        P: Persistence + ?Sized,
    {
        if let Some(profile) = self.get(user_id) {
            debug!("Profile cache hit: {}", user_id);
            return Ok(profile);
        }

        debug!("Profile cache miss: {}", user_id);
        let profile = load_profile(store, layout, user_id).await?;
        Ok(self.insert(user_id, profile))
    }

    /// Load every listed profile that is not already cached, concurrently.
    /// Returns how many were read from the store.
    pub async fn preload<P>(&mut self, store: &P, layout: &DatabaseLayout, user_ids: &[String]) -> Result<usize, CoreError>
    where
        P: Persistence + ?Sized,
    {
        let missing: Vec<&String> = user_ids
            .iter()
            .filter(|user_id| self.get(user_id).is_none())
            .collect();

        let loads = missing.iter().map(|user_id| load_profile(store, layout, user_id));
        let results = join_all(loads).await;

        let mut loaded = 0;
        for (user_id, result) in missing.into_iter().zip(results) {
            self.insert(user_id, result?);
            loaded += 1;
        }
        Ok(loaded)
    }

    pub fn invalidate(&mut self, user_id: &str) -> bool {
        self.entries.remove(user_id).is_some()
    }

    /// Drop expired entries, returning how many were removed.
    pub fn evict_expired(&mut self) -> usize {
        let before = self.entries.len();
        let policy = self.policy;
        self.entries.retain(|_, entry| match policy {
            CachePolicy::Never => true,
            CachePolicy::Ttl(ttl) => entry.loaded_at.elapsed() < ttl,
        });
        before - self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

async fn load_profile<P>(store: &P, layout: &DatabaseLayout, user_id: &str) -> Result<UserProfile, CoreError>
where
    P: Persistence + ?Sized,
{
    match store.read(&layout.profile_path(user_id)).await? {
        Some(value) => Ok(serde_json::from_value(value)?),
        None => Ok(UserProfile::default()),
    }
}
