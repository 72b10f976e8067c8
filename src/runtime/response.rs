use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The immutable outcome envelope for one execution attempt.
/// Exactly one of `data`/`error` is populated depending on `success`;
/// unset optional fields are omitted from the serialized form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_time_ms: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<f64>,
}

impl NodeResponse {
    pub fn success(data: Value) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            metadata: None,
            execution_time_ms: None,
            cost: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            metadata: None,
            execution_time_ms: None,
            cost: None,
        }
    }

    pub fn with_metadata(mut self, metadata: Value) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn with_execution_time(mut self, elapsed_ms: f64) -> Self {
        self.execution_time_ms = Some(elapsed_ms);
        self
    }

    pub fn with_cost(mut self, cost: Option<f64>) -> Self {
        self.cost = cost;
        self
    }
}
