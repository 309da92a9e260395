//! Profile lookup transport
//!
//! The coordinator only needs "send a login, get profiles back", expressed by
//! [`ProfileLookup`]. [`HttpProfileLookup`] is the reqwest-backed
//! implementation used against the real service.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::error::{LookupError, Result};
use crate::query::LookupQuery;
use crate::types::UserProfile;

const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Issues a lookup against a profile service
#[async_trait]
pub trait ProfileLookup: Send + Sync {
    /// Fetch the profiles matching `query` from the service at `url`.
    ///
    /// The service answers with an array; callers use its first element.
    async fn lookup(&self, url: &str, query: &LookupQuery) -> Result<Vec<UserProfile>>;
}

/// Lookup over HTTP GET with the query encoded in the URL
pub struct HttpProfileLookup {
    client: Client,
}

impl HttpProfileLookup {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(Self { client })
    }

    /// Use an existing client (shares its connection pool and settings)
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ProfileLookup for HttpProfileLookup {
    async fn lookup(&self, url: &str, query: &LookupQuery) -> Result<Vec<UserProfile>> {
        let request_url = build_request_url(url, query);
        debug!(url = %request_url, "Fetching user profile");

        let response = self
            .client
            .get(&request_url)
            .header("Accept", "application/json")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(LookupError::Status(response.status().as_u16()));
        }

        let body = response.bytes().await?;
        let profiles: Vec<UserProfile> = serde_json::from_slice(&body)?;
        Ok(profiles)
    }
}

fn build_request_url(url: &str, query: &LookupQuery) -> String {
    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{}{}{}", url, separator, query.to_query_string())
}
