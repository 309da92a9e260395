//! Current User Resolver
//!
//! Works out who the signed-in user is from session cookies, looks up their
//! profile from the user directory service, and publishes it to subscribers.
//! Lookups are debounced and served from a shared cache when possible.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use current_user::{CookieEvidence, CoordinatorConfig, CurrentUser, HttpProfileLookup, IdentityCache};
//!
//! # async fn example() -> Result<(), current_user::LookupError> {
//! let cache = IdentityCache::new();
//! let lookup = Arc::new(HttpProfileLookup::new()?);
//! let evidence = CookieEvidence::from_cookie_header("glguserinfo=eyJ1c2VybmFtZSI6Impkb2UifQ==");
//!
//! let current = CurrentUser::from_cookies(CoordinatorConfig::default(), cache, lookup, &evidence);
//! current.settled().await;
//! if let Some(user) = current.user() {
//!     println!("Hello {:?}", user.get("firstName"));
//! }
//! # Ok(())
//! # }
//! ```

mod cache;
mod config;
mod cookies;
mod coordinator;
mod debounce;
mod error;
mod lookup;
mod query;
mod types;

pub use cache::IdentityCache;
pub use config::{CoordinatorConfig, DEFAULT_LOOKUP_URL, DEFAULT_QUIET_PERIOD};
pub use cookies::{
    resolve_username, CookieEvidence, ROOT_COOKIE, SAM_COOKIE, STARPHLEET_COOKIE,
    USER_INFO_COOKIE,
};
pub use coordinator::{CurrentUser, ResolvedProfile};
pub use debounce::DebounceTimer;
pub use error::{CookieDecodeError, LookupError, Result};
pub use lookup::{HttpProfileLookup, ProfileLookup};
pub use query::{DomainQualifiedLogin, LookupQuery, QueryBuilder, DEFAULT_DOMAIN};
pub use types::{FetchState, UserProfile, Username};
