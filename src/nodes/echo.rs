use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Value, json};

use crate::error::NodeError;
use crate::runtime::capability::{CapabilityDescriptor, CapabilityHandler};
use crate::runtime::context::ExecutionContext;
use crate::runtime::node::ModelNode;
use crate::runtime::registry::CapabilityRegistry;

/// Echoes the request's input back under an `echo` key.
#[derive(Debug)]
struct SimulateHandler;

#[async_trait]
impl CapabilityHandler for SimulateHandler {
    async fn handle(&self, ctx: &ExecutionContext) -> Result<Value, NodeError> {
        Ok(json!({ "echo": ctx.input_data }))
    }
}

/// Minimal concrete node with a single `simulate` capability.
/// Serves as the template for real nodes and as the fixture the CLI
/// harness runs.
pub struct EchoNode {
    metadata: Value,
    registry: CapabilityRegistry,
}

impl EchoNode {
    pub fn new() -> Result<Self, NodeError> {
        Self::with_metadata(default_metadata())
    }

    /// Build the node with a metadata document loaded from a JSON file.
    pub fn from_metadata_file(path: &Path) -> Result<Self, NodeError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            NodeError::configuration(format!("Failed to read metadata {}: {}", path.display(), e))
        })?;
        let metadata = serde_json::from_str(&content).map_err(|e| {
            NodeError::configuration(format!("Invalid metadata JSON {}: {}", path.display(), e))
        })?;
        Self::with_metadata(metadata)
    }

    pub fn with_metadata(metadata: Value) -> Result<Self, NodeError> {
        let mut registry = CapabilityRegistry::new();
        registry.register(
            CapabilityDescriptor::new("simulate")
                .with_description("Echo the input data back to the caller"),
            Arc::new(SimulateHandler),
        )?;

        Ok(Self { metadata, registry })
    }
}

fn default_metadata() -> Value {
    json!({
        "model_id": "echo-node",
        "name": "Echo Node",
        "version": "0.1.0",
        "capabilities": ["simulate"],
        "endpoints": { "execute": "/execute", "health": "/health" },
        "cost_per_call": 1.0
    })
}

#[async_trait]
impl ModelNode for EchoNode {
    fn metadata(&self) -> &Value {
        &self.metadata
    }

    fn registry(&self) -> &CapabilityRegistry {
        &self.registry
    }
}
