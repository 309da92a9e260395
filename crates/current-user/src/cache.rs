use std::sync::Arc;

use moka::sync::Cache;

use crate::types::UserProfile;

/// Username → profile map shared by every coordinator it is handed to.
///
/// Cloning is cheap and clones share storage. The default cache never evicts;
/// use [`IdentityCache::bounded`] for long-lived processes.
#[derive(Clone)]
pub struct IdentityCache {
    profiles: Cache<String, Arc<UserProfile>>,
}

impl IdentityCache {
    /// Unbounded cache with no expiry
    pub fn new() -> Self {
        Self {
            profiles: Cache::builder().build(),
        }
    }

    /// Cache holding at most `capacity` profiles, least recently used evicted first
    pub fn bounded(capacity: u64) -> Self {
        Self {
            profiles: Cache::builder().max_capacity(capacity).build(),
        }
    }

    pub fn get(&self, username: &str) -> Option<Arc<UserProfile>> {
        self.profiles.get(username)
    }

    /// Store a profile, replacing any earlier one for the same username
    pub fn put(&self, username: &str, profile: Arc<UserProfile>) {
        self.profiles.insert(username.to_string(), profile);
    }

    pub fn contains(&self, username: &str) -> bool {
        self.profiles.contains_key(username)
    }
}

impl Default for IdentityCache {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for IdentityCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityCache")
            .field("entries", &self.profiles.entry_count())
            .finish()
    }
}
