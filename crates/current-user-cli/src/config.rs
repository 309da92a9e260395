use std::env;
use std::time::Duration;

use current_user::{CoordinatorConfig, DEFAULT_DOMAIN, DEFAULT_LOOKUP_URL, DEFAULT_QUIET_PERIOD};

use crate::error::{CliError, Result};

/// CLI configuration parsed from environment variables
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub lookup_url: String,
    pub domain: String,
    pub quiet_period: Duration,
    /// Bound on cached profiles; unbounded when unset
    pub cache_capacity: Option<u64>,
    /// Raw `Cookie` header to resolve the user from
    pub cookies: Option<String>,
    pub log_json: bool,
}

impl Config {
    /// Parse configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|key| env::var(key).ok())
    }

    fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let lookup_url =
            var("CURRENT_USER_LOOKUP_URL").unwrap_or_else(|| DEFAULT_LOOKUP_URL.to_string());

        let domain = var("CURRENT_USER_DOMAIN").unwrap_or_else(|| DEFAULT_DOMAIN.to_string());

        let quiet_period = match var("CURRENT_USER_QUIET_PERIOD_MS") {
            Some(ms) => ms.parse::<u64>().map(Duration::from_millis).map_err(|_| {
                CliError::Config(format!("CURRENT_USER_QUIET_PERIOD_MS is not a number: {ms}"))
            })?,
            None => DEFAULT_QUIET_PERIOD,
        };

        let cache_capacity = var("CURRENT_USER_CACHE_CAPACITY")
            .map(|c| {
                c.parse::<u64>().map_err(|_| {
                    CliError::Config(format!("CURRENT_USER_CACHE_CAPACITY is not a number: {c}"))
                })
            })
            .transpose()?;

        let cookies = var("CURRENT_USER_COOKIES");

        let log_json = var("LOG_FORMAT").is_some_and(|v| v == "json");

        Ok(Self {
            lookup_url,
            domain,
            quiet_period,
            cache_capacity,
            cookies,
            log_json,
        })
    }

    pub fn coordinator(&self) -> CoordinatorConfig {
        CoordinatorConfig {
            url: self.lookup_url.clone(),
            domain: self.domain.clone(),
            quiet_period: self.quiet_period,
        }
    }
}
