use thiserror::Error;

/// Error taxonomy for node operations.
/// `execute` maps every variant to a failed response envelope; nothing
/// here is allowed to escape to the transport as a raised error.
#[derive(Debug, Error)]
pub enum NodeError {
    /// A document (metadata, input or output) failed schema validation,
    /// or a schema document itself could not be loaded/compiled.
    #[error("{0}")]
    Validation(String),

    /// Capability-level semantic failure, including unknown capability.
    #[error("{0}")]
    Execution(String),

    /// The node is misconfigured. Raised during construction (e.g. a
    /// duplicate capability name), never during steady-state dispatch.
    #[error("{0}")]
    Configuration(String),

    /// Unclassified failure from a handler. The catch-all that keeps a
    /// malfunctioning capability from crashing the node.
    #[error("{0}")]
    Internal(String),
}

impl NodeError {
    pub fn validation(msg: impl Into<String>) -> Self {
        NodeError::Validation(msg.into())
    }

    pub fn execution(msg: impl Into<String>) -> Self {
        NodeError::Execution(msg.into())
    }

    pub fn configuration(msg: impl Into<String>) -> Self {
        NodeError::Configuration(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        NodeError::Internal(msg.into())
    }
}
