use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

fn generated_request_id() -> String {
    Uuid::new_v4().to_string()
}

// Transports may send `"request_id": ""`; that counts as absent.
fn request_id_or_generated<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let id = String::deserialize(deserializer)?;
    if id.is_empty() {
        Ok(generated_request_id())
    } else {
        Ok(id)
    }
}

fn empty_input() -> Value {
    Value::Object(Map::new())
}

/// The immutable envelope for one inbound request.
/// Deserializable straight from the transport's inbound shape:
/// `{request_id?, capability, input_data?}`. A missing request id is
/// generated, missing input defaults to an empty mapping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionContext {
    #[serde(
        default = "generated_request_id",
        deserialize_with = "request_id_or_generated"
    )]
    pub request_id: String,
    pub capability: String,
    #[serde(default = "empty_input")]
    pub input_data: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

impl ExecutionContext {
    pub fn new(capability: impl Into<String>, input_data: Value) -> Self {
        Self {
            request_id: generated_request_id(),
            capability: capability.into(),
            input_data,
            user_id: None,
            session_id: None,
            metadata: None,
        }
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        let id = request_id.into();
        // An empty id is treated the same as an absent one.
        if !id.is_empty() {
            self.request_id = id;
        }
        self
    }

    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    pub fn with_metadata(mut self, metadata: Value) -> Self {
        self.metadata = Some(metadata);
        self
    }
}
