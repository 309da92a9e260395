use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Unqualified identity string read from session cookies.
///
/// An empty username means no identity could be resolved.
pub type Username = String;

/// Profile record returned by the lookup service.
///
/// The service owns the shape of this record, so fields are kept as raw JSON.
/// Only `username` has meaning to this crate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserProfile {
    fields: Map<String, Value>,
}

impl UserProfile {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    /// The `username` field, when it is a string
    pub fn username(&self) -> Option<&str> {
        self.fields.get("username").and_then(Value::as_str)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn into_fields(self) -> Map<String, Value> {
        self.fields
    }
}

impl From<Map<String, Value>> for UserProfile {
    fn from(fields: Map<String, Value>) -> Self {
        Self::new(fields)
    }
}

/// Progress of the coordinator's scheduled lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchState {
    #[default]
    Idle,
    /// Quiet-period timer armed, nothing sent yet
    PendingFetch,
    /// Request sent, response not yet received
    FetchInFlight,
}
