use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::NodeError;
use crate::runtime::context::ExecutionContext;

fn empty_schema() -> Value {
    Value::Object(Map::new())
}

/// Declares one capability: its name, schemas, cost and description.
/// Built with the chained setters and handed to the registry at node
/// construction; immutable afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapabilityDescriptor {
    pub name: String,
    /// Empty object means "no validation".
    #[serde(default = "empty_schema")]
    pub input_schema: Value,
    #[serde(default = "empty_schema")]
    pub output_schema: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost_estimate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl CapabilityDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            input_schema: empty_schema(),
            output_schema: empty_schema(),
            cost_estimate: None,
            description: None,
        }
    }

    pub fn with_input_schema(mut self, schema: Value) -> Self {
        self.input_schema = schema;
        self
    }

    pub fn with_output_schema(mut self, schema: Value) -> Self {
        self.output_schema = schema;
        self
    }

    pub fn with_cost_estimate(mut self, cost: f64) -> Self {
        self.cost_estimate = Some(cost);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// A schema that is an empty object declares no constraints.
    pub fn has_input_schema(&self) -> bool {
        !schema_is_empty(&self.input_schema)
    }

    pub fn has_output_schema(&self) -> bool {
        !schema_is_empty(&self.output_schema)
    }
}

fn schema_is_empty(schema: &Value) -> bool {
    match schema {
        Value::Object(map) => map.is_empty(),
        Value::Null => true,
        _ => false,
    }
}

/// The handler behind a capability. Handlers borrow the context and
/// must be safe to invoke concurrently for distinct requests.
#[async_trait]
pub trait CapabilityHandler: Send + Sync + Debug {
    async fn handle(&self, ctx: &ExecutionContext) -> Result<Value, NodeError>;
}

/// Adapter for inherently synchronous handlers. Runs the closure on the
/// blocking pool so a slow capability cannot stall unrelated requests.
pub struct BlockingHandler<F> {
    func: Arc<F>,
}

impl<F> Debug for BlockingHandler<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("BlockingHandler")
    }
}

impl<F> BlockingHandler<F>
where
    F: Fn(&ExecutionContext) -> Result<Value, NodeError> + Send + Sync + 'static,
{
    pub fn new(func: F) -> Self {
        Self { func: Arc::new(func) }
    }
}

#[async_trait]
impl<F> CapabilityHandler for BlockingHandler<F>
where
    F: Fn(&ExecutionContext) -> Result<Value, NodeError> + Send + Sync + 'static,
{
    async fn handle(&self, ctx: &ExecutionContext) -> Result<Value, NodeError> {
        let func = self.func.clone();
        let ctx = ctx.clone();
        // A panic in the closure surfaces as a join error, not a crash.
        tokio::task::spawn_blocking(move || func(&ctx))
            .await
            .map_err(|e| NodeError::internal(format!("Blocking handler failed: {}", e)))?
    }
}
