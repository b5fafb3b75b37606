use log::warn;
use serde_json::Value;

use crate::error::{EngineError, EngineResult};

/// Validate a response document against the request schema
pub fn validate_against_schema(schema: &Value, document: &Value) -> EngineResult<()> {
    let validator = jsonschema::validator_for(schema)
        .map_err(|e| EngineError::InvalidSchema(e.to_string()))?;

    let errors: Vec<String> = validator
        .iter_errors(document)
        .map(|e| format!("{}: {}", e.instance_path, e))
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        warn!("Response failed schema validation with {} errors", errors.len());
        Err(EngineError::SchemaValidationFailed(errors))
    }
}
