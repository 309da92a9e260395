//! Username resolution from session cookies
//!
//! Several services set their own session cookie. Three of them carry a JSON
//! object with a `username` field; the fourth carries the same information
//! as base64-encoded JSON. The first cookie that yields a username wins, in
//! the order they are declared on [`CookieEvidence`].

use base64::alphabet;
use base64::engine::general_purpose::GeneralPurposeConfig;
use base64::engine::{DecodePaddingMode, GeneralPurpose};
use base64::Engine;
use serde_json::Value;
use tracing::{debug, error};

use crate::error::CookieDecodeError;
use crate::types::Username;

pub const ROOT_COOKIE: &str = "glgroot";
pub const STARPHLEET_COOKIE: &str = "starphleet_user";
pub const SAM_COOKIE: &str = "glgSAM";
pub const USER_INFO_COOKIE: &str = "glguserinfo";

/// Standard alphabet, decoded as leniently as browsers' `atob`: padding is
/// optional and non-zero trailing bits are ignored
const USER_INFO_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

/// Session cookies relevant to identity, in precedence order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CookieEvidence {
    /// `glgroot`, parsed as JSON
    pub root: Option<Value>,
    /// `starphleet_user`, parsed as JSON
    pub starphleet: Option<Value>,
    /// `glgSAM`, parsed as JSON
    pub sam: Option<Value>,
    /// `glguserinfo`, still base64-encoded
    pub user_info: Option<String>,
}

impl CookieEvidence {
    /// Build evidence from a raw `Cookie` header (`name=value; name=value`).
    ///
    /// Values are percent-decoded. Structured cookies whose value is not
    /// valid JSON are treated as absent. When a name repeats, the first
    /// occurrence is kept.
    pub fn from_cookie_header(header: &str) -> Self {
        let pairs = header.split(';').filter_map(|pair| {
            let (name, value) = pair.split_once('=')?;
            let value = value.trim();
            let value = value
                .strip_prefix('"')
                .and_then(|v| v.strip_suffix('"'))
                .unwrap_or(value);
            let decoded = urlencoding::decode(value)
                .map(|v| v.into_owned())
                .unwrap_or_else(|_| value.to_string());
            Some((name.trim().to_string(), decoded))
        });
        Self::from_pairs(pairs)
    }

    /// Build evidence from already-decoded cookie name/value pairs
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut evidence = Self::default();
        for (name, value) in pairs {
            evidence.insert(name.as_ref(), value.as_ref());
        }
        evidence
    }

    fn insert(&mut self, name: &str, value: &str) {
        let slot = match name {
            ROOT_COOKIE => &mut self.root,
            STARPHLEET_COOKIE => &mut self.starphleet,
            SAM_COOKIE => &mut self.sam,
            USER_INFO_COOKIE => {
                if self.user_info.is_none() {
                    self.user_info = Some(value.to_string());
                }
                return;
            }
            _ => return,
        };

        if slot.is_none() {
            *slot = serde_json::from_str(value).ok();
        }
    }

    /// True when none of the identity cookies are set
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
            && self.starphleet.is_none()
            && self.sam.is_none()
            && self.user_info.as_deref().map_or(true, str::is_empty)
    }
}

/// Resolve the current username from cookie evidence.
///
/// Returns an empty string when no cookie identifies the user, including when
/// the user-info cookie is malformed.
pub fn resolve_username(evidence: &CookieEvidence) -> Username {
    let structured = [
        (ROOT_COOKIE, evidence.root.as_ref()),
        (STARPHLEET_COOKIE, evidence.starphleet.as_ref()),
        (SAM_COOKIE, evidence.sam.as_ref()),
    ];
    for (name, cookie) in structured {
        if let Some(username) = structured_username(cookie) {
            debug!(cookie = name, username = %username, "Resolved username from cookie");
            return username;
        }
    }

    match evidence.user_info.as_deref() {
        Some(raw) if !raw.is_empty() => match decode_user_info(raw) {
            Ok(Some(username)) => {
                debug!(
                    cookie = USER_INFO_COOKIE,
                    username = %username,
                    "Resolved username from cookie"
                );
                username
            }
            Ok(None) => {
                debug!(cookie = USER_INFO_COOKIE, "Cookie has no username");
                String::new()
            }
            Err(e) => {
                error!("Failed to extract username from {USER_INFO_COOKIE} cookie: {e}");
                String::new()
            }
        },
        _ => String::new(),
    }
}

/// `username` of a structured cookie, if it is an object with that key.
///
/// Any value stops the search, even one that is not a string.
fn structured_username(cookie: Option<&Value>) -> Option<Username> {
    cookie?.as_object()?.get("username").map(username_text)
}

/// Text of a `username` value: strings as-is, null as empty, anything else
/// as its JSON rendering
fn username_text(value: &Value) -> Username {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn decode_user_info(raw: &str) -> Result<Option<String>, CookieDecodeError> {
    let bytes = USER_INFO_ENGINE.decode(raw.trim())?;
    let info: Value = serde_json::from_slice(&bytes)?;
    Ok(info.get("username").map(username_text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::{STANDARD, STANDARD_NO_PAD};
    use serde_json::json;

    fn user_info(username: &str) -> String {
        STANDARD.encode(json!({ "username": username }).to_string())
    }

    fn evidence(root: bool, starphleet: bool, sam: bool, info: bool) -> CookieEvidence {
        CookieEvidence {
            root: root.then(|| json!({"username": "root-user"})),
            starphleet: starphleet.then(|| json!({"username": "starphleet-user"})),
            sam: sam.then(|| json!({"username": "sam-user"})),
            user_info: info.then(|| user_info("info-user")),
        }
    }

    #[test]
    fn test_precedence_across_all_combinations() {
        for mask in 0u8..16 {
            let (a, b, c, d) = (mask & 8 != 0, mask & 4 != 0, mask & 2 != 0, mask & 1 != 0);
            let expected = if a {
                "root-user"
            } else if b {
                "starphleet-user"
            } else if c {
                "sam-user"
            } else if d {
                "info-user"
            } else {
                ""
            };
            assert_eq!(
                resolve_username(&evidence(a, b, c, d)),
                expected,
                "mask {mask:04b}"
            );
        }
    }

    #[test]
    fn test_structured_cookie_without_username_falls_through() {
        let evidence = CookieEvidence {
            root: Some(json!({"session": "abc"})),
            starphleet: Some(json!("just a string")),
            sam: Some(json!({"username": "sam-user"})),
            user_info: None,
        };
        assert_eq!(resolve_username(&evidence), "sam-user");
    }

    #[test]
    fn test_null_username_stops_precedence() {
        let evidence = CookieEvidence {
            root: Some(json!({"username": null})),
            starphleet: Some(json!({"username": "bob"})),
            sam: None,
            user_info: Some(user_info("info-user")),
        };
        assert_eq!(resolve_username(&evidence), "");
    }

    #[test]
    fn test_non_string_username_is_rendered_as_text() {
        let evidence = CookieEvidence {
            starphleet: Some(json!({"username": 12})),
            sam: Some(json!({"username": "sam-user"})),
            ..Default::default()
        };
        assert_eq!(resolve_username(&evidence), "12");

        let evidence = CookieEvidence {
            sam: Some(json!({"username": true})),
            ..Default::default()
        };
        assert_eq!(resolve_username(&evidence), "true");
    }

    #[test]
    fn test_user_info_non_string_username() {
        let evidence = CookieEvidence {
            user_info: Some(STANDARD.encode(r#"{"username":404}"#)),
            ..Default::default()
        };
        assert_eq!(resolve_username(&evidence), "404");

        let evidence = CookieEvidence {
            user_info: Some(STANDARD.encode(r#"{"username":null}"#)),
            ..Default::default()
        };
        assert_eq!(resolve_username(&evidence), "");
    }

    #[test]
    fn test_user_info_ignores_trailing_bits() {
        // Canonical encoding ends in "fQ=="; "fR==" only differs in unused bits
        assert_eq!(user_info("jdoe"), "eyJ1c2VybmFtZSI6Impkb2UifQ==");
        let evidence = CookieEvidence {
            user_info: Some("eyJ1c2VybmFtZSI6Impkb2UifR==".to_string()),
            ..Default::default()
        };
        assert_eq!(resolve_username(&evidence), "jdoe");
    }

    #[test]
    fn test_malformed_user_info_resolves_empty() {
        let evidence = CookieEvidence {
            user_info: Some("not-base64!!".to_string()),
            ..Default::default()
        };
        assert_eq!(resolve_username(&evidence), "");
    }

    #[test]
    fn test_user_info_with_invalid_json_resolves_empty() {
        let evidence = CookieEvidence {
            user_info: Some(STANDARD.encode("{username: jdoe")),
            ..Default::default()
        };
        assert_eq!(resolve_username(&evidence), "");
    }

    #[test]
    fn test_user_info_without_username_resolves_empty() {
        let evidence = CookieEvidence {
            user_info: Some(STANDARD.encode(r#"{"email":"jdoe@example.com"}"#)),
            ..Default::default()
        };
        assert_eq!(resolve_username(&evidence), "");
    }

    #[test]
    fn test_user_info_accepts_unpadded_base64() {
        let encoded = STANDARD_NO_PAD.encode(r#"{"username":"jdoe"}"#);
        assert!(!encoded.ends_with('='));
        let evidence = CookieEvidence {
            user_info: Some(encoded),
            ..Default::default()
        };
        assert_eq!(resolve_username(&evidence), "jdoe");
    }

    #[test]
    fn test_empty_user_info_resolves_empty() {
        let evidence = CookieEvidence {
            user_info: Some(String::new()),
            ..Default::default()
        };
        assert!(evidence.is_empty());
        assert_eq!(resolve_username(&evidence), "");
    }

    #[test]
    fn test_from_cookie_header_decodes_values() {
        let header = format!(
            "theme=dark; glgSAM=%7B%22username%22%3A%22sam-user%22%7D; glguserinfo={}",
            user_info("info-user")
        );
        let evidence = CookieEvidence::from_cookie_header(&header);
        assert_eq!(evidence.sam, Some(json!({"username": "sam-user"})));
        assert!(evidence.root.is_none());
        assert_eq!(resolve_username(&evidence), "sam-user");
    }

    #[test]
    fn test_from_cookie_header_ignores_invalid_json() {
        let evidence = CookieEvidence::from_cookie_header("glgroot=jdoe; starphleet_user={oops");
        assert!(evidence.root.is_none());
        assert!(evidence.starphleet.is_none());
        assert!(evidence.is_empty());
        assert_eq!(resolve_username(&evidence), "");
    }

    #[test]
    fn test_from_cookie_header_keeps_first_duplicate() {
        let header = r#"glgroot={"username":"first"}; glgroot={"username":"second"}"#;
        let evidence = CookieEvidence::from_cookie_header(header);
        assert_eq!(resolve_username(&evidence), "first");
    }

    #[test]
    fn test_from_pairs() {
        let evidence = CookieEvidence::from_pairs([
            (USER_INFO_COOKIE, user_info("jdoe").as_str()),
            ("unrelated", "value"),
        ]);
        assert_eq!(resolve_username(&evidence), "jdoe");
    }
}
