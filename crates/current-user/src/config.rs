use std::time::Duration;

use crate::query::DEFAULT_DOMAIN;

pub const DEFAULT_LOOKUP_URL: &str =
    "https://services.glgresearch.com/epistream-ldap/epiquery1/glglive/glgCurrentUser/getUserByLogin.mustache";
pub const DEFAULT_QUIET_PERIOD: Duration = Duration::from_millis(200);

/// Settings for a [`CurrentUser`](crate::CurrentUser) coordinator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoordinatorConfig {
    /// Profile lookup endpoint
    pub url: String,
    /// Domain token prepended to logins
    pub domain: String,
    /// How long username changes must settle before a lookup is sent
    pub quiet_period: Duration,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_LOOKUP_URL.to_string(),
            domain: DEFAULT_DOMAIN.to_string(),
            quiet_period: DEFAULT_QUIET_PERIOD,
        }
    }
}
