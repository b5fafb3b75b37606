use log::{debug, warn};
use std::collections::VecDeque;
use std::sync::Arc;

use crate::error::{EngineError, EngineResult};
use crate::model::{ColumnMapping, IndexContext, MappingTable, SemanticTreeNode};

/// Default ceiling on the number of request tree nodes mapped per request
pub const DEFAULT_MAX_NODES: usize = 10_000;

/// Resolves every semantic id of a request tree to a storage column name.
#[derive(Debug, Clone)]
pub struct ColumnMapper {
    table: Arc<MappingTable>,
    index: IndexContext,
    max_nodes: usize,
}

impl ColumnMapper {
    pub fn new(table: Arc<MappingTable>, index: IndexContext) -> Self {
        Self {
            table,
            index,
            max_nodes: DEFAULT_MAX_NODES,
        }
    }

    pub fn with_max_nodes(mut self, max_nodes: usize) -> Self {
        self.max_nodes = max_nodes;
        self
    }

    /// Breadth-first over the whole tree.
    pub fn resolve(&self, root: &SemanticTreeNode) -> EngineResult<ColumnMapping> {
        let mut mapping = ColumnMapping::new();
        let mut queue = VecDeque::from([root]);
        let mut visited = 0usize;

        while let Some(node) = queue.pop_front() {
            visited += 1;
            if visited > self.max_nodes {
                warn!("Request tree exceeds {} nodes", self.max_nodes);
                return Err(EngineError::TooManyNodes(self.max_nodes));
            }

            let column = self.column_for(node)?;
            mapping.insert(node.semantic_id(), column);
            queue.extend(node.children());
        }

        debug!("Resolved {} semantic ids over {} nodes", mapping.len(), visited);
        Ok(mapping)
    }

    fn column_for(&self, node: &SemanticTreeNode) -> EngineResult<String> {
        let (base, suffix) = self.index.split(node.semantic_id());

        if let Some(entry) = self.table.find(base) {
            return Ok(format!("{}{}", entry.column_name(), suffix.unwrap_or_default()));
        }

        match node {
            SemanticTreeNode::Branch(_) => Ok(String::new()),
            SemanticTreeNode::Leaf(_) => {
                warn!("Semantic id '{}' has no column mapping", base);
                Err(EngineError::SemanticIdNotMapped(base.to_string()))
            }
        }
    }
}
