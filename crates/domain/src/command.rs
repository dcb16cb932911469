use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{Map, Value};

/// One named command as issued by a caller. Immutable once created;
/// discarded after its outcome is delivered.
#[derive(Debug, Clone, Deserialize)]
pub struct CommandCall {
    #[serde(rename = "command")]
    pub name: String,
    #[serde(default)]
    pub arguments: Map<String, Value>,
    #[serde(skip, default = "Utc::now")]
    pub requested_at: DateTime<Utc>,
}

impl CommandCall {
    pub fn new(name: impl Into<String>, arguments: Map<String, Value>) -> Self {
        Self {
            name: name.into(),
            arguments,
            requested_at: Utc::now(),
        }
    }

    /// A command with no arguments
    pub fn bare(name: impl Into<String>) -> Self {
        Self::new(name, Map::new())
    }

    pub fn argument(&self, key: &str) -> Option<&Value> {
        self.arguments.get(key)
    }
}
