use log::{debug, warn};
use serde_json::{Map, Value};

use crate::error::{EngineError, EngineResult};
use crate::model::{BranchNode, DataType, IndexContext, SemanticTreeNode};

/// Parses raw data-source JSON into a response tree.
///
/// The tree mirrors the JSON verbatim. Multiplicity is encoded by suffixing
/// array elements with the index context, but only when an array holds more
/// than one element.
#[derive(Debug, Clone, Default)]
pub struct ResponseTreeParser {
    index: IndexContext,
}

impl ResponseTreeParser {
    pub fn new(index: IndexContext) -> Self {
        Self { index }
    }

    pub fn parse(&self, raw: &str) -> EngineResult<SemanticTreeNode> {
        self.parse_value_root(Self::decode(raw)?)
    }

    /// Like [`parse`](Self::parse), but a blank body or a JSON `null` (also
    /// when string-encoded) is no response at all and yields `None`.
    pub fn parse_optional(&self, raw: &str) -> EngineResult<Option<SemanticTreeNode>> {
        if raw.trim().is_empty() {
            debug!("Response is blank, treating it as absent");
            return Ok(None);
        }
        match Self::decode(raw)? {
            Value::Null => {
                debug!("Response is null, treating it as absent");
                Ok(None)
            }
            value => self.parse_value_root(value).map(Some),
        }
    }

    fn parse_value_root(&self, value: Value) -> EngineResult<SemanticTreeNode> {
        let Value::Object(root) = value else {
            warn!("Response root is not a JSON object");
            return Err(EngineError::ResponseNotParsable(
                "response root is not a JSON object".to_string(),
            ));
        };

        let tree = self.parse_root(&root);
        debug!("Parsed response tree with {} nodes", tree.node_count());
        Ok(tree)
    }

    /// Parse, unwrapping one level of string encoding.
    fn decode(raw: &str) -> EngineResult<Value> {
        let not_parsable = |e: serde_json::Error| {
            warn!("Response is not valid JSON: {}", e);
            EngineError::ResponseNotParsable(e.to_string())
        };

        match serde_json::from_str::<Value>(raw).map_err(not_parsable)? {
            Value::String(inner) if inner.trim().is_empty() => Ok(Value::Null),
            Value::String(inner) => serde_json::from_str(&inner).map_err(not_parsable),
            value => Ok(value),
        }
    }

    fn parse_root(&self, root: &Map<String, Value>) -> SemanticTreeNode {
        let Some((key, value)) = root.iter().next() else {
            return SemanticTreeNode::Branch(BranchNode::new("", DataType::Unknown));
        };

        if root.len() == 1 {
            if let Value::String(text) = value {
                return SemanticTreeNode::leaf(key.as_str(), DataType::String, text.as_str());
            }
        }

        match value {
            Value::Array(elements) => SemanticTreeNode::branch(
                key.as_str(),
                DataType::Array,
                self.parse_array(key, elements),
            ),
            other => self.parse_value(key, other),
        }
    }

    fn parse_value(&self, semantic_id: &str, value: &Value) -> SemanticTreeNode {
        match value {
            Value::Object(members) => SemanticTreeNode::branch(
                semantic_id,
                DataType::Object,
                self.parse_members(members),
            ),
            Value::Array(elements) => SemanticTreeNode::branch(
                semantic_id,
                DataType::Array,
                self.parse_array(semantic_id, elements),
            ),
            primitive => SemanticTreeNode::leaf(
                semantic_id,
                DataType::of_json(primitive),
                leaf_text(primitive),
            ),
        }
    }

    fn parse_members(&self, members: &Map<String, Value>) -> Vec<SemanticTreeNode> {
        let mut children = Vec::with_capacity(members.len());
        for (key, value) in members {
            match value {
                // array elements hang directly off the enclosing branch
                Value::Array(elements) => children.extend(self.parse_array(key, elements)),
                other => children.push(self.parse_value(key, other)),
            }
        }
        children
    }

    fn parse_array(&self, base_id: &str, elements: &[Value]) -> Vec<SemanticTreeNode> {
        if elements.len() > 1 {
            elements
                .iter()
                .enumerate()
                .map(|(i, element)| self.parse_value(&self.index.indexed(base_id, i), element))
                .collect()
        } else {
            elements
                .iter()
                .map(|element| self.parse_value(base_id, element))
                .collect()
        }
    }
}

/// Text form of a primitive. Nulls become `""`.
fn leaf_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
