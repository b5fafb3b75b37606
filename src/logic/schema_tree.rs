use log::{debug, warn};
use serde_json::{Map, Value};

use crate::error::{EngineError, EngineResult};
use crate::model::{BranchNode, DataType, LeafNode, SemanticTreeNode};

/// Name of the element template child of an array branch
pub const ARRAY_ITEM_ID: &str = "item";

/// Builds a request-shaped tree from a JSON Schema.
///
/// Leaves are placeholders with empty values; the reconciler fills them.
pub struct SchemaTreeBuilder<'a> {
    root_schema: &'a Value,
}

impl<'a> SchemaTreeBuilder<'a> {
    pub fn new(root_schema: &'a Value) -> Self {
        Self { root_schema }
    }

    /// Build the tree for the first declared top-level property.
    pub fn build(schema: &Value) -> EngineResult<SemanticTreeNode> {
        let properties = schema
            .get("properties")
            .and_then(Value::as_object)
            .filter(|props| !props.is_empty())
            .ok_or(EngineError::SchemaHasNoProperties)?;

        let (root_id, root_schema) = properties
            .iter()
            .next()
            .ok_or(EngineError::SchemaHasNoProperties)?;

        if properties.len() > 1 {
            debug!(
                "Schema declares {} top-level properties, using '{}' as root",
                properties.len(),
                root_id
            );
        }

        let mut resolving = Vec::new();
        let tree =
            SchemaTreeBuilder::new(schema).build_node(root_id, root_schema, true, &mut resolving);
        debug!("Built request tree '{}' with {} nodes", root_id, tree.node_count());
        Ok(tree)
    }

    /// `resolving` holds the `$ref`s being expanded above this node. A ref
    /// that refers back to one of them becomes a string leaf.
    fn build_node(
        &self,
        name: &str,
        node: &'a Value,
        follow_ref: bool,
        resolving: &mut Vec<&'a str>,
    ) -> SemanticTreeNode {
        if follow_ref {
            if let Some(reference) = node.get("$ref").and_then(Value::as_str) {
                if resolving.contains(&reference) {
                    warn!("Cyclic $ref '{}' on '{}'", reference, name);
                    return SemanticTreeNode::Leaf(LeafNode::empty(name, DataType::String));
                }
                return match self.resolve_ref(reference) {
                    None => {
                        warn!("Unresolved $ref '{}' on '{}'", reference, name);
                        SemanticTreeNode::Leaf(LeafNode::empty(name, DataType::Unknown))
                    }
                    Some(target) if target.get("type").is_none() => {
                        SemanticTreeNode::Leaf(LeafNode::empty(name, DataType::String))
                    }
                    Some(target) => {
                        resolving.push(reference);
                        let built = self.build_node(name, target, false, resolving);
                        resolving.pop();
                        built
                    }
                };
            }
        }

        let Some(type_keyword) = node.get("type") else {
            return SemanticTreeNode::Leaf(LeafNode::empty(name, DataType::String));
        };

        match schema_data_type(type_keyword) {
            DataType::Object => SemanticTreeNode::Branch(BranchNode::with_children(
                name,
                DataType::Object,
                self.build_properties(node, resolving),
            )),
            DataType::Array => {
                let children = match node.get("items") {
                    Some(items) if items.is_object() => {
                        vec![self.build_node(ARRAY_ITEM_ID, items, true, resolving)]
                    }
                    // non-standard: properties declared on the array itself
                    _ => self.build_properties(node, resolving),
                };
                SemanticTreeNode::Branch(BranchNode::with_children(name, DataType::Array, children))
            }
            scalar => SemanticTreeNode::Leaf(LeafNode::empty(name, scalar)),
        }
    }

    fn build_properties(
        &self,
        node: &'a Value,
        resolving: &mut Vec<&'a str>,
    ) -> Vec<SemanticTreeNode> {
        let Some(props) = node.get("properties").and_then(Value::as_object) else {
            return Vec::new();
        };
        props
            .iter()
            .map(|(key, child)| self.build_node(key, child, true, resolving))
            .collect()
    }

    /// Resolve `#/definitions/Name` or `#/$defs/Name` by the last path segment.
    fn resolve_ref(&self, reference: &str) -> Option<&'a Value> {
        let key = reference.rsplit('/').next()?;
        ["definitions", "$defs"]
            .iter()
            .filter_map(|section| self.root_schema.get(section).and_then(Value::as_object))
            .find_map(|defs: &Map<String, Value>| defs.get(key))
    }
}

/// Map a `type` keyword (string or array of strings) to a data type.
fn schema_data_type(type_keyword: &Value) -> DataType {
    let declared: Vec<&str> = match type_keyword {
        Value::String(name) => vec![name.as_str()],
        Value::Array(names) => names.iter().filter_map(Value::as_str).collect(),
        _ => Vec::new(),
    };

    [
        ("object", DataType::Object),
        ("array", DataType::Array),
        ("string", DataType::String),
        ("integer", DataType::Integer),
        ("number", DataType::Number),
        ("boolean", DataType::Boolean),
    ]
    .into_iter()
    .find(|(flag, _)| declared.contains(flag))
    .map(|(_, data_type)| data_type)
    .unwrap_or(DataType::String)
}
