use serde_json::{Map, Value, json};

use crate::error::GatewayError;

/// The result of one command, produced exactly once. `NotImplemented`
/// is a distinct no-op signal for unrecognized command names, not a
/// failure.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Success(Map<String, Value>),
    Failure { code: String, message: String },
    NotImplemented,
}

impl Outcome {
    /// Success payload carrying at least `success: true` and a
    /// human-readable `message`.
    pub fn success(message: impl Into<String>) -> Self {
        let mut map = Map::new();
        map.insert("success".to_string(), Value::Bool(true));
        map.insert("message".to_string(), Value::String(message.into()));
        Self::Success(map)
    }

    /// Attach an extra field to a success payload. No-op on failures.
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        if let Self::Success(map) = &mut self {
            map.insert(key.to_string(), value.into());
        }
        self
    }

    pub fn failure(error: &GatewayError) -> Self {
        Self::Failure {
            code: error.code().to_string(),
            message: error.to_string(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn failure_code(&self) -> Option<&str> {
        match self {
            Self::Failure { code, .. } => Some(code),
            _ => None,
        }
    }

    /// Field access on a success payload, for callers and tests
    pub fn field(&self, key: &str) -> Option<&Value> {
        match self {
            Self::Success(map) => map.get(key),
            _ => None,
        }
    }

    /// JSON shape delivered on the wire to the caller
    pub fn to_json(&self) -> Value {
        match self {
            Self::Success(map) => Value::Object(map.clone()),
            Self::Failure { code, message } => json!({
                "error": { "code": code, "message": message }
            }),
            Self::NotImplemented => json!({ "notImplemented": true }),
        }
    }
}

impl From<GatewayError> for Outcome {
    fn from(error: GatewayError) -> Self {
        Self::failure(&error)
    }
}
