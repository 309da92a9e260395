//! Error types for the current-user CLI

use std::fmt;

use current_user::LookupError;

#[derive(Debug)]
pub enum CliError {
    Config(String),
    Lookup(LookupError),
    /// The profile lookup ran but failed; carries the logged reason
    LookupFailed(String),
    Json(serde_json::Error),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::Lookup(err) => write!(f, "Lookup error: {}", err),
            CliError::LookupFailed(msg) => write!(f, "Lookup failed: {}", msg),
            CliError::Json(err) => write!(f, "JSON error: {}", err),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Lookup(err) => Some(err),
            CliError::Json(err) => Some(err),
            CliError::Config(_) | CliError::LookupFailed(_) => None,
        }
    }
}

impl From<LookupError> for CliError {
    fn from(err: LookupError) -> Self {
        CliError::Lookup(err)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        CliError::Json(err)
    }
}

impl From<tracing_subscriber::filter::ParseError> for CliError {
    fn from(err: tracing_subscriber::filter::ParseError) -> Self {
        CliError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CliError>;
