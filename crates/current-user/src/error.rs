//! Error types for cookie decoding and profile lookups

use std::fmt;

/// Failure to read the opaque user-info cookie.
///
/// Never escapes username resolution; it is logged and the username falls
/// back to empty.
#[derive(Debug)]
pub enum CookieDecodeError {
    Base64(base64::DecodeError),
    Json(serde_json::Error),
}

impl fmt::Display for CookieDecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Base64(e) => write!(f, "invalid base64: {}", e),
            Self::Json(e) => write!(f, "invalid JSON: {}", e),
        }
    }
}

impl std::error::Error for CookieDecodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Base64(e) => Some(e),
            Self::Json(e) => Some(e),
        }
    }
}

impl From<base64::DecodeError> for CookieDecodeError {
    fn from(e: base64::DecodeError) -> Self {
        Self::Base64(e)
    }
}

impl From<serde_json::Error> for CookieDecodeError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

/// Errors from the profile lookup service
#[derive(Debug)]
pub enum LookupError {
    /// HTTP request failed
    Http(Box<reqwest::Error>),
    /// Service answered with a non-success status
    Status(u16),
    /// Response body was not a JSON array of profiles
    Json(serde_json::Error),
}

impl fmt::Display for LookupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http(e) => write!(f, "Lookup HTTP error: {}", e),
            Self::Status(code) => write!(f, "Lookup service returned status {}", code),
            Self::Json(e) => write!(f, "Lookup JSON parse error: {}", e),
        }
    }
}

impl std::error::Error for LookupError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Http(e) => Some(e.as_ref()),
            Self::Json(e) => Some(e),
            Self::Status(_) => None,
        }
    }
}

impl From<reqwest::Error> for LookupError {
    fn from(e: reqwest::Error) -> Self {
        Self::Http(Box::new(e))
    }
}

impl From<serde_json::Error> for LookupError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

/// Result type for profile lookups
pub type Result<T> = std::result::Result<T, LookupError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_status_error_display() {
        let err = LookupError::Status(503);
        assert_eq!(format!("{}", err), "Lookup service returned status 503");
        assert!(err.source().is_none());
    }

    #[test]
    fn test_json_error_has_source() {
        let json_err = serde_json::from_str::<Vec<u8>>("{").unwrap_err();
        let err = LookupError::from(json_err);
        assert!(format!("{}", err).starts_with("Lookup JSON parse error:"));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_cookie_decode_error_display() {
        let json_err = serde_json::from_str::<serde_json::Value>("nope").unwrap_err();
        let err = CookieDecodeError::from(json_err);
        assert!(format!("{}", err).starts_with("invalid JSON:"));

        let err = CookieDecodeError::from(base64::DecodeError::InvalidLength(3));
        assert!(format!("{}", err).starts_with("invalid base64:"));
    }

    #[test]
    fn test_error_is_debug() {
        let err = LookupError::Status(404);
        assert!(format!("{:?}", err).contains("Status"));
    }
}
