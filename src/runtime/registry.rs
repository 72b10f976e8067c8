use std::collections::HashMap;
use std::sync::Arc;

use jsonschema::JSONSchema;
use serde_json::Value;
use tracing::info;

use crate::error::NodeError;
use crate::runtime::capability::{CapabilityDescriptor, CapabilityHandler};
use crate::validation;

/// One registered capability: handler, descriptor, and the schemas
/// compiled once at registration so dispatch never re-parses them.
pub struct CapabilityEntry {
    pub handler: Arc<dyn CapabilityHandler>,
    pub descriptor: CapabilityDescriptor,
    input_validator: Option<JSONSchema>,
    output_validator: Option<JSONSchema>,
}

impl CapabilityEntry {
    pub fn check_input(&self, input: &Value) -> Result<(), NodeError> {
        match &self.input_validator {
            Some(compiled) => validation::check(compiled, input),
            None => Ok(()),
        }
    }

    pub fn check_output(&self, output: &Value) -> Result<(), NodeError> {
        match &self.output_validator {
            Some(compiled) => validation::check(compiled, output)
                .map_err(|e| NodeError::validation(format!("Output validation failed: {}", e))),
            None => Ok(()),
        }
    }
}

/// Mapping capability name -> entry. Built once during node
/// construction through explicit `register` calls; read-only after
/// that, so dispatch needs no locking.
#[derive(Default)]
pub struct CapabilityRegistry {
    entries: HashMap<String, CapabilityEntry>,
    // Declaration order, for listing.
    order: Vec<String>,
}

impl CapabilityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a capability. A duplicate name fails fast: a silent
    /// overwrite would mask a programmer error in the node definition.
    pub fn register(
        &mut self,
        descriptor: CapabilityDescriptor,
        handler: Arc<dyn CapabilityHandler>,
    ) -> Result<(), NodeError> {
        let name = descriptor.name.clone();
        if self.entries.contains_key(&name) {
            return Err(NodeError::configuration(format!(
                "Duplicate capability registration: {}",
                name
            )));
        }

        let input_validator = if descriptor.has_input_schema() {
            Some(validation::compile_schema(&descriptor.input_schema)?)
        } else {
            None
        };
        let output_validator = if descriptor.has_output_schema() {
            Some(validation::compile_schema(&descriptor.output_schema)?)
        } else {
            None
        };

        info!(capability = %name, "Registered capability");

        self.entries.insert(
            name.clone(),
            CapabilityEntry {
                handler,
                descriptor,
                input_validator,
                output_validator,
            },
        );
        self.order.push(name);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&CapabilityEntry> {
        self.entries.get(name)
    }

    /// Registered names in declaration order.
    pub fn names(&self) -> Vec<String> {
        self.order.clone()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
