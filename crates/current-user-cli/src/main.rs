//! current-user - resolve the signed-in user's profile from session cookies
//!
//! Reads a raw `Cookie` header (flag or `CURRENT_USER_COOKIES`), resolves the
//! username, looks up the profile and prints it as JSON. Prints `null` when
//! no user can be resolved or the service has no profile for them; exits
//! with an error when the lookup itself fails.

mod config;
mod error;

use std::sync::Arc;

use clap::Parser;
use current_user::{CookieEvidence, CurrentUser, HttpProfileLookup, IdentityCache};
use tracing::{info, warn};
use tracing_subscriber::filter::Directive;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::error::{CliError, Result};

#[derive(Parser)]
#[command(name = "current-user")]
#[command(about = "Resolve the signed-in user's profile from session cookies", long_about = None)]
#[command(version)]
struct Cli {
    /// Raw Cookie header (overrides CURRENT_USER_COOKIES)
    #[arg(long)]
    cookies: Option<String>,

    /// Look up this username instead of reading cookies
    #[arg(long, conflicts_with = "cookies")]
    username: Option<String>,

    /// Lookup endpoint (overrides CURRENT_USER_LOOKUP_URL)
    #[arg(long)]
    url: Option<String>,

    /// Login domain (overrides CURRENT_USER_DOMAIN)
    #[arg(long)]
    domain: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::from_env()?;
    if let Some(url) = cli.url {
        config.lookup_url = url;
    }
    if let Some(domain) = cli.domain {
        config.domain = domain;
    }
    if cli.cookies.is_some() {
        config.cookies = cli.cookies;
    }

    init_logging(&config, cli.verbose)?;

    let cache = match config.cache_capacity {
        Some(capacity) => IdentityCache::bounded(capacity),
        None => IdentityCache::new(),
    };
    let lookup = Arc::new(HttpProfileLookup::new()?);

    let current = match cli.username {
        Some(username) => {
            let current = CurrentUser::new(config.coordinator(), cache, lookup);
            current.set_username(&username);
            current
        }
        None => {
            let evidence =
                CookieEvidence::from_cookie_header(config.cookies.as_deref().unwrap_or_default());
            CurrentUser::from_cookies(config.coordinator(), cache, lookup, &evidence)
        }
    };

    if current.username().is_empty() {
        warn!("No current user in session cookies");
        println!("null");
        return Ok(());
    }

    info!(username = %current.username(), url = current.url(), "Resolving current user");
    current.settled().await;

    if let Some(reason) = current.last_error() {
        return Err(CliError::LookupFailed(reason));
    }

    let user = current.user();
    if user.is_none() {
        warn!(username = %current.username(), "No profile found");
    }
    println!("{}", serde_json::to_string_pretty(&user.as_deref())?);
    Ok(())
}

fn init_logging(config: &Config, verbose: bool) -> Result<()> {
    let default_level = if verbose { "debug" } else { "info" };
    let env_filter = EnvFilter::from_default_env()
        .add_directive(format!("current_user={default_level}").parse::<Directive>()?)
        .add_directive(format!("current_user_cli={default_level}").parse::<Directive>()?);

    // stdout carries the profile JSON, so logs go to stderr
    if config.log_json {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .init();
    }

    Ok(())
}
