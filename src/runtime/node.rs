use std::time::Instant;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Map, Value, json};
use tracing::{error, info};

use crate::error::NodeError;
use crate::runtime::capability::CapabilityDescriptor;
use crate::runtime::context::ExecutionContext;
use crate::runtime::registry::CapabilityRegistry;
use crate::runtime::response::NodeResponse;
use crate::validation;

/// What a successful dispatch hands back to `execute`.
pub struct CapabilityOutcome {
    pub data: Value,
    pub cost: Option<f64>,
}

/// Base contract for a model node.
///
/// Concrete nodes supply metadata and a registry built in their
/// constructor; `execute` and `health_check` come for free and form the
/// hard boundary past which no error escapes uncaught. The dispatch
/// path takes `&self`, stores no per-request state on the node and is
/// safe to invoke concurrently for distinct requests.
#[async_trait]
pub trait ModelNode: Send + Sync {
    /// The metadata document describing this node. Must be stable for
    /// the life of the node; callers may cache it.
    fn metadata(&self) -> &Value;

    /// The capability registry built at construction time.
    fn registry(&self) -> &CapabilityRegistry;

    /// Node-specific setup. Called once before serving.
    async fn initialize(&self) -> Result<(), NodeError> {
        Ok(())
    }

    /// Release resources. Called once at shutdown.
    async fn cleanup(&self) -> Result<(), NodeError> {
        Ok(())
    }

    /// Extension point for node-specific health checks. Boolean-valued
    /// entries participate in the overall AND; anything else is
    /// informational.
    async fn custom_health_checks(&self) -> Result<Map<String, Value>, NodeError> {
        Ok(Map::new())
    }

    /// Validate this node's metadata against the fixed metadata schema.
    fn validate_metadata(&self) -> Result<(), NodeError> {
        validation::validate_metadata(self.metadata())
    }

    fn node_id(&self) -> Value {
        self.metadata().get("model_id").cloned().unwrap_or(Value::Null)
    }

    /// Descriptor lookup without invoking anything.
    fn get_capability_info(&self, name: &str) -> Option<&CapabilityDescriptor> {
        self.registry().get(name).map(|entry| &entry.descriptor)
    }

    /// Registered capability names, in declaration order.
    fn list_capabilities(&self) -> Vec<String> {
        self.registry().names()
    }

    /// Raw dispatch: lookup, input validation, handler invocation.
    /// Returns typed errors; `execute` maps them to envelopes.
    async fn dispatch(&self, ctx: &ExecutionContext) -> Result<CapabilityOutcome, NodeError> {
        let registry = self.registry();
        let entry = registry.get(&ctx.capability).ok_or_else(|| {
            NodeError::execution(format!(
                "Unknown capability: {}. Available: [{}]",
                ctx.capability,
                registry.names().join(", ")
            ))
        })?;

        entry.check_input(&ctx.input_data)?;

        info!(
            capability = %ctx.capability,
            request_id = %ctx.request_id,
            "Executing capability"
        );

        let data = entry.handler.handle(ctx).await?;
        Ok(CapabilityOutcome {
            data,
            cost: entry.descriptor.cost_estimate,
        })
    }

    /// Execute a capability. Every path returns an envelope; this is
    /// where the error taxonomy collapses into `success:false`
    /// responses, so one malfunctioning capability can never leave a
    /// request unanswered.
    async fn execute(&self, ctx: ExecutionContext) -> NodeResponse {
        let start = Instant::now();
        let result = self.dispatch(&ctx).await;
        let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;

        match result {
            Ok(outcome) => NodeResponse::success(outcome.data)
                .with_execution_time(elapsed_ms)
                .with_cost(outcome.cost)
                .with_metadata(json!({
                    "capability": ctx.capability,
                    "request_id": ctx.request_id,
                    "node_id": self.node_id(),
                })),
            Err(NodeError::Validation(msg)) => {
                error!(request_id = %ctx.request_id, error = %msg, "Validation error");
                NodeResponse::failure(format!("Input validation failed: {}", msg))
                    .with_execution_time(elapsed_ms)
            }
            Err(NodeError::Execution(msg)) => {
                error!(request_id = %ctx.request_id, error = %msg, "Execution error");
                NodeResponse::failure(msg).with_execution_time(elapsed_ms)
            }
            Err(err) => {
                error!(request_id = %ctx.request_id, error = %err, "Unexpected error");
                NodeResponse::failure(format!("Internal error: {}", err))
                    .with_execution_time(elapsed_ms)
            }
        }
    }

    /// Compose the standard health checks with the node-specific ones.
    async fn collect_health_checks(&self) -> Result<Map<String, Value>, NodeError> {
        let mut checks = Map::new();

        let metadata_valid = match self.validate_metadata() {
            Ok(()) => true,
            Err(e) => {
                error!(error = %e, "Metadata validation failed");
                false
            }
        };
        checks.insert("metadata_valid".to_string(), Value::Bool(metadata_valid));
        checks.insert(
            "capabilities_loaded".to_string(),
            Value::Bool(!self.registry().is_empty()),
        );
        checks.insert(
            "timestamp".to_string(),
            Value::String(Utc::now().to_rfc3339()),
        );

        checks.extend(self.custom_health_checks().await?);
        Ok(checks)
    }

    /// Health check. Overall success is the AND of all boolean-valued
    /// checks; non-boolean entries (the timestamp) are informational.
    /// Never returns an error; a failure inside the composition
    /// becomes a failed envelope.
    async fn health_check(&self) -> NodeResponse {
        match self.collect_health_checks().await {
            Ok(checks) => {
                let healthy = checks.values().filter_map(Value::as_bool).all(|b| b);
                let mut response = if healthy {
                    NodeResponse::success(json!({ "health_checks": checks }))
                } else {
                    NodeResponse {
                        success: false,
                        data: Some(json!({ "health_checks": checks })),
                        error: None,
                        metadata: None,
                        execution_time_ms: None,
                        cost: None,
                    }
                };
                response.metadata = Some(json!({ "node_id": self.node_id() }));
                response
            }
            Err(e) => {
                error!(error = %e, "Health check failed");
                NodeResponse::failure(format!("Health check failed: {}", e))
            }
        }
    }
}
