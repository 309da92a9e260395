use std::fmt;

use serde::Serialize;

pub const DEFAULT_DOMAIN: &str = "glgroup";

/// Login as the lookup service expects it: `<domain>\<username>`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct DomainQualifiedLogin(String);

impl DomainQualifiedLogin {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for DomainQualifiedLogin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Parameters sent with a profile lookup
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LookupQuery {
    pub login: DomainQualifiedLogin,
}

impl LookupQuery {
    /// Encode as a URL query string (`login=...`)
    pub fn to_query_string(&self) -> String {
        format!("login={}", urlencoding::encode(self.login.as_str()))
    }
}

/// Turns usernames into lookup parameters for a fixed domain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryBuilder {
    domain: String,
}

impl QueryBuilder {
    pub fn new(domain: &str) -> Self {
        Self {
            domain: domain.to_string(),
        }
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Prefix `username` with `<domain>\` unless it already mentions the domain.
    ///
    /// The check is a case-insensitive substring match, so applying this to
    /// its own output returns the output unchanged.
    pub fn build_login(&self, username: &str) -> DomainQualifiedLogin {
        if username
            .to_lowercase()
            .contains(&self.domain.to_lowercase())
        {
            DomainQualifiedLogin(username.to_string())
        } else {
            DomainQualifiedLogin(format!("{}\\{}", self.domain, username))
        }
    }

    pub fn build_query(&self, username: &str) -> LookupQuery {
        LookupQuery {
            login: self.build_login(username),
        }
    }
}

impl Default for QueryBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_DOMAIN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_login_prefixes_domain() {
        let builder = QueryBuilder::default();
        assert_eq!(builder.build_login("jdoe").as_str(), "glgroup\\jdoe");
    }

    #[test]
    fn test_build_login_keeps_qualified_login() {
        let builder = QueryBuilder::default();
        assert_eq!(builder.build_login("glgroup\\jdoe").as_str(), "glgroup\\jdoe");
        assert_eq!(builder.build_login("GLGROUP\\jdoe").as_str(), "GLGROUP\\jdoe");
        assert_eq!(builder.build_login("GlGroup\\jdoe").as_str(), "GlGroup\\jdoe");
    }

    #[test]
    fn test_build_login_is_idempotent() {
        let builder = QueryBuilder::default();
        for name in ["jdoe", "", "GLGROUP\\x", "glgroupie", "a\\b", "Jane Doe", "ümlaut"] {
            let once = builder.build_login(name);
            let twice = builder.build_login(once.as_str());
            assert_eq!(once, twice, "input {name:?}");
        }
    }

    #[test]
    fn test_build_login_empty_username() {
        let builder = QueryBuilder::default();
        assert_eq!(builder.build_login("").as_str(), "glgroup\\");
    }

    #[test]
    fn test_custom_domain() {
        let builder = QueryBuilder::new("Corp");
        assert_eq!(builder.domain(), "Corp");
        assert_eq!(builder.build_login("jdoe").as_str(), "Corp\\jdoe");
        assert_eq!(builder.build_login("corp\\jdoe").as_str(), "corp\\jdoe");
    }

    #[test]
    fn test_query_string_is_encoded() {
        let query = QueryBuilder::default().build_query("jdoe");
        assert_eq!(query.to_query_string(), "login=glgroup%5Cjdoe");
    }

    #[test]
    fn test_query_serializes_login_field() {
        let query = QueryBuilder::default().build_query("jdoe");
        let json = serde_json::to_value(&query).unwrap();
        assert_eq!(json, serde_json::json!({"login": "glgroup\\jdoe"}));
    }
}
