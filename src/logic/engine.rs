use log::info;
use serde_json::Value;
use std::sync::Arc;

use crate::config::EngineConfig;
use crate::error::EngineResult;
use crate::logic::{
    ColumnMapper, ResponseTreeParser, SchemaTreeBuilder, TreeReconciler, TreeToJsonSerializer,
};
use crate::model::{ColumnMapping, IndexContext, MappingTable, SemanticTreeNode};

/// Runs the full schema → tree → reconcile → JSON pipeline for one request.
///
/// Holds only read-only state; every call builds its own trees.
#[derive(Debug, Clone)]
pub struct SemanticTreeEngine {
    mapper: ColumnMapper,
    parser: ResponseTreeParser,
    index: IndexContext,
}

impl SemanticTreeEngine {
    pub fn new(table: Arc<MappingTable>, index: IndexContext) -> Self {
        Self {
            mapper: ColumnMapper::new(table, index.clone()),
            parser: ResponseTreeParser::new(index.clone()),
            index,
        }
    }

    pub fn from_config(config: &EngineConfig, table: Arc<MappingTable>) -> Self {
        let index = IndexContext::new(config.index_delimiter.clone());
        let mut engine = Self::new(table, index);
        engine.mapper = engine.mapper.with_max_nodes(config.max_nodes);
        engine
    }

    pub fn index_context(&self) -> &IndexContext {
        &self.index
    }

    pub fn build_request_tree(&self, schema: &Value) -> EngineResult<SemanticTreeNode> {
        SchemaTreeBuilder::build(schema)
    }

    pub fn resolve_mapping(&self, request: &SemanticTreeNode) -> EngineResult<ColumnMapping> {
        self.mapper.resolve(request)
    }

    /// `None` when the body is blank or `null`.
    pub fn parse_response(&self, raw: &str) -> EngineResult<Option<SemanticTreeNode>> {
        self.parser.parse_optional(raw)
    }

    pub fn reconcile(
        &self,
        request: &SemanticTreeNode,
        response: Option<&SemanticTreeNode>,
        mapping: &ColumnMapping,
    ) -> EngineResult<SemanticTreeNode> {
        TreeReconciler::new(mapping, &self.index).reconcile(request, response)
    }

    /// Shape the raw response into the schema without validating the result.
    pub fn shape(&self, schema: &Value, raw: Option<&str>) -> EngineResult<SemanticTreeNode> {
        let request = self.build_request_tree(schema)?;
        let mapping = self.resolve_mapping(&request)?;
        let response = match raw {
            Some(raw) => self.parse_response(raw)?,
            None => None,
        };
        self.reconcile(&request, response.as_ref(), &mapping)
    }

    /// Shape the raw response and validate the document against `schema`.
    pub fn evaluate(&self, schema: &Value, raw: Option<&str>) -> EngineResult<Value> {
        let filled = self.shape(schema, raw)?;
        let document = TreeToJsonSerializer::serialize_validated(&filled, schema)?;
        info!(
            "Evaluated '{}' ({} nodes, response {})",
            filled.semantic_id(),
            filled.node_count(),
            if raw.is_some() { "present" } else { "absent" }
        );
        Ok(document)
    }
}
