use thiserror::Error;

/// Failures raised by the semantic tree engine.
///
/// A missing data-source row is not one of them: the engine degrades to an
/// all-empty tree and leaves "not found" to the caller.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("Schema has no properties")]
    SchemaHasNoProperties,

    #[error("Semantic id '{0}' is not mapped to a column")]
    SemanticIdNotMapped(String),

    #[error("Response is not parsable: {0}")]
    ResponseNotParsable(String),

    #[error("Schema exceeds the limit of {0} nodes")]
    TooManyNodes(usize),

    #[error("Request schema is not a valid JSON Schema: {0}")]
    InvalidSchema(String),

    #[error("Result does not match the request schema: {}", .0.join("; "))]
    SchemaValidationFailed(Vec<String>),
}

impl EngineError {
    /// Whether the caller supplied something the engine cannot work with
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            EngineError::SchemaHasNoProperties
                | EngineError::SemanticIdNotMapped(_)
                | EngineError::TooManyNodes(_)
                | EngineError::InvalidSchema(_)
        )
    }
}

pub type EngineResult<T> = std::result::Result<T, EngineError>;
