use std::fs;
use std::path::Path;
use std::sync::OnceLock;

use jsonschema::JSONSchema;
use serde_json::Value;

use crate::error::NodeError;

/// The fixed schema every node's metadata document must satisfy.
/// Ships with the crate; parsed once on first use.
static METADATA_SCHEMA: OnceLock<Value> = OnceLock::new();

fn metadata_schema() -> &'static Value {
    METADATA_SCHEMA.get_or_init(|| {
        serde_json::from_str(include_str!("../../schemas/metadata.schema.json"))
            .expect("embedded metadata schema is valid JSON")
    })
}

/// Compile a JSON schema document. An uncompilable schema is a
/// `Validation` error, surfaced at registration time rather than per
/// request.
pub fn compile_schema(schema: &Value) -> Result<JSONSchema, NodeError> {
    JSONSchema::compile(schema)
        .map_err(|e| NodeError::validation(format!("Invalid schema: {}", e)))
}

/// Validate a document against a schema. Fails with the first
/// validation error's message, no prefix; call sites add their own.
pub fn validate(document: &Value, schema: &Value) -> Result<(), NodeError> {
    let compiled = compile_schema(schema)?;
    check(&compiled, document)
}

/// Validate a document against an already-compiled schema.
pub fn check(compiled: &JSONSchema, document: &Value) -> Result<(), NodeError> {
    if let Err(mut errors) = compiled.validate(document) {
        if let Some(first) = errors.next() {
            return Err(NodeError::validation(first.to_string()));
        }
    }
    Ok(())
}

/// Load a schema document from disk. Missing or malformed files are
/// `Validation` errors; this runs at node startup, not per request.
pub fn load_schema(path: &Path) -> Result<Value, NodeError> {
    let content = fs::read_to_string(path)
        .map_err(|e| NodeError::validation(format!("Schema file not found: {}: {}", path.display(), e)))?;

    serde_json::from_str(&content)
        .map_err(|e| NodeError::validation(format!("Invalid JSON in schema {}: {}", path.display(), e)))
}

/// Validate a node metadata document against the fixed metadata schema.
pub fn validate_metadata(metadata: &Value) -> Result<(), NodeError> {
    validate(metadata, metadata_schema())
        .map_err(|e| NodeError::validation(format!("Metadata validation failed: {}", e)))
}

/// Validate a handler's output against a capability's output schema.
/// Not on the dispatch path; concrete nodes opt in.
pub fn validate_output(output: &Value, schema: &Value) -> Result<(), NodeError> {
    validate(output, schema)
        .map_err(|e| NodeError::validation(format!("Output validation failed: {}", e)))
}
