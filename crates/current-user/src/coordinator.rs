//! Debounced, cache-aware profile resolution
//!
//! [`CurrentUser`] tracks the current username and keeps a resolved profile
//! for it. A cached profile is served as soon as the username changes; a
//! lookup is sent only after changes have been quiet for the configured
//! period, so a burst of changes costs one request for the last username.
//!
//! Each change bumps a generation counter. A lookup that completes after a
//! newer change still fills the cache under its own username but no longer
//! updates the resolved profile.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::cache::IdentityCache;
use crate::config::CoordinatorConfig;
use crate::cookies::{resolve_username, CookieEvidence};
use crate::debounce::DebounceTimer;
use crate::lookup::ProfileLookup;
use crate::query::{LookupQuery, QueryBuilder};
use crate::types::{FetchState, UserProfile, Username};

/// Resolved profile as seen by subscribers; `None` means no current user
pub type ResolvedProfile = Option<Arc<UserProfile>>;

/// Resolves and publishes the profile of the current user.
///
/// Clones share state. Methods that schedule lookups must be called from
/// within a tokio runtime.
#[derive(Clone)]
pub struct CurrentUser {
    inner: Arc<Inner>,
}

struct Inner {
    url: String,
    builder: QueryBuilder,
    cache: IdentityCache,
    lookup: Arc<dyn ProfileLookup>,
    schedule: Mutex<Schedule>,
    profile_tx: watch::Sender<ResolvedProfile>,
    state_tx: watch::Sender<FetchState>,
}

struct Schedule {
    username: Username,
    generation: u64,
    timer: DebounceTimer,
    armed: bool,
    in_flight: usize,
    /// Failure of the latest lookup for the current username
    last_error: Option<String>,
}

impl Schedule {
    fn state(&self) -> FetchState {
        if self.armed {
            FetchState::PendingFetch
        } else if self.in_flight > 0 {
            FetchState::FetchInFlight
        } else {
            FetchState::Idle
        }
    }
}

impl CurrentUser {
    pub fn new(
        config: CoordinatorConfig,
        cache: IdentityCache,
        lookup: Arc<dyn ProfileLookup>,
    ) -> Self {
        let (profile_tx, _) = watch::channel(None);
        let (state_tx, _) = watch::channel(FetchState::Idle);

        let inner = Inner {
            url: config.url,
            builder: QueryBuilder::new(&config.domain),
            cache,
            lookup,
            schedule: Mutex::new(Schedule {
                username: String::new(),
                generation: 0,
                timer: DebounceTimer::new(config.quiet_period),
                armed: false,
                in_flight: 0,
                last_error: None,
            }),
            profile_tx,
            state_tx,
        };

        Self {
            inner: Arc::new(inner),
        }
    }

    /// Create a coordinator whose username comes from session cookies
    pub fn from_cookies(
        config: CoordinatorConfig,
        cache: IdentityCache,
        lookup: Arc<dyn ProfileLookup>,
        evidence: &CookieEvidence,
    ) -> Self {
        let current = Self::new(config, cache, lookup);
        current.set_username(&resolve_username(evidence));
        current
    }

    pub fn username(&self) -> Username {
        self.inner.lock_schedule().username.clone()
    }

    pub fn url(&self) -> &str {
        &self.inner.url
    }

    /// Current resolved profile
    pub fn user(&self) -> ResolvedProfile {
        self.inner.profile_tx.borrow().clone()
    }

    /// Receive the resolved profile whenever it changes
    pub fn subscribe(&self) -> watch::Receiver<ResolvedProfile> {
        self.inner.profile_tx.subscribe()
    }

    pub fn fetch_state(&self) -> FetchState {
        *self.inner.state_tx.borrow()
    }

    /// Why the latest lookup for the current username failed, if it did.
    ///
    /// Lets callers tell "lookup failed" apart from "no such user", which
    /// both leave [`user`](Self::user) unchanged or empty.
    pub fn last_error(&self) -> Option<String> {
        self.inner.lock_schedule().last_error.clone()
    }

    /// Set the username, reacting only if it differs from the current one
    pub fn set_username(&self, username: &str) {
        if self.inner.lock_schedule().username != username {
            self.on_username_changed(username);
        }
    }

    /// Recompute the username from fresh cookie evidence.
    ///
    /// Cookies are not watched, so callers invoke this when they know the
    /// session may have changed.
    pub fn reresolve(&self, evidence: &CookieEvidence) -> Username {
        let username = resolve_username(evidence);
        self.set_username(&username);
        username
    }

    /// React to a new username.
    ///
    /// A cached profile is published before this returns. The quiet-period
    /// timer is re-armed on every call, cache hit or not, so the entry gets
    /// refreshed. An empty username is handled like any other.
    pub fn on_username_changed(&self, username: &str) {
        let inner = &self.inner;
        let mut schedule = inner.lock_schedule();
        schedule.username = username.to_string();
        schedule.generation += 1;
        schedule.last_error = None;
        let generation = schedule.generation;

        if let Some(cached) = inner.cache.get(username) {
            debug!(username, "Serving cached profile");
            inner.publish(Some(cached));
        }

        let weak = Arc::downgrade(inner);
        let scheduled = username.to_string();
        schedule.timer.arm(move || Inner::fire(weak, scheduled, generation));
        schedule.armed = true;
        inner.publish_state(&schedule);
    }

    /// Wait until no lookup is pending or in flight
    pub async fn settled(&self) {
        let mut state_rx = self.inner.state_tx.subscribe();
        let _ = state_rx
            .wait_for(|state| *state == FetchState::Idle)
            .await;
    }
}

impl Inner {
    fn lock_schedule(&self) -> MutexGuard<'_, Schedule> {
        self.schedule.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, profile: ResolvedProfile) {
        self.profile_tx.send_if_modified(|current| {
            if *current == profile {
                false
            } else {
                *current = profile;
                true
            }
        });
    }

    fn publish_state(&self, schedule: &Schedule) {
        let state = schedule.state();
        self.state_tx.send_if_modified(|current| {
            if *current == state {
                false
            } else {
                *current = state;
                true
            }
        });
    }

    /// Quiet period elapsed: send the lookup for `username`
    fn fire(weak: Weak<Inner>, username: Username, generation: u64) {
        let Some(inner) = weak.upgrade() else {
            return;
        };

        {
            let mut schedule = inner.lock_schedule();
            // Re-armed between the timer waking and taking the lock
            if schedule.generation != generation {
                return;
            }
            schedule.armed = false;
            schedule.in_flight += 1;
            inner.publish_state(&schedule);
        }

        let query = inner.builder.build_query(&username);
        info!(username = %username, login = %query.login, "Looking up user profile");
        tokio::spawn(async move { inner.fetch(username, query, generation).await });
    }

    async fn fetch(&self, username: Username, query: LookupQuery, generation: u64) {
        let result = self.lookup.lookup(&self.url, &query).await;

        let mut schedule = self.lock_schedule();
        schedule.in_flight -= 1;
        let current = schedule.generation == generation;

        match result {
            Ok(profiles) => match profiles.into_iter().next() {
                Some(profile) => {
                    if let Some(returned) = profile.username() {
                        if returned != username {
                            debug!(
                                username = %username,
                                returned,
                                "Lookup returned a different username"
                            );
                        }
                    }
                    let profile = Arc::new(profile);
                    self.cache.put(&username, profile.clone());
                    if current {
                        schedule.last_error = None;
                        self.publish(Some(profile));
                    } else {
                        debug!(username = %username, "Lookup superseded, cached only");
                    }
                }
                None => {
                    warn!(login = %query.login, "No profile found");
                    if current {
                        schedule.last_error = None;
                        self.publish(None);
                    }
                }
            },
            Err(e) => {
                warn!(login = %query.login, error = %e, "Profile lookup failed");
                if current {
                    schedule.last_error = Some(e.to_string());
                }
            }
        }

        self.publish_state(&schedule);
    }
}
