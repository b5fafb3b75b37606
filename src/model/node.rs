use serde::Serialize;

use crate::model::{DataType, IndexContext};

/// A node of a semantic tree.
///
/// Request trees are built from a JSON Schema and carry empty leaf values
/// until reconciliation; response trees mirror the raw data-source JSON.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SemanticTreeNode {
    Leaf(LeafNode),
    Branch(BranchNode),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeafNode {
    pub semantic_id: String,
    pub data_type: DataType,
    /// Always text; numeric/boolean interpretation happens at serialization
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BranchNode {
    pub semantic_id: String,
    pub data_type: DataType,
    pub children: Vec<SemanticTreeNode>,
}

impl LeafNode {
    pub fn new(
        semantic_id: impl Into<String>,
        data_type: DataType,
        value: impl Into<String>,
    ) -> Self {
        Self {
            semantic_id: semantic_id.into(),
            data_type,
            value: value.into(),
        }
    }

    pub fn empty(semantic_id: impl Into<String>, data_type: DataType) -> Self {
        Self::new(semantic_id, data_type, String::new())
    }
}

impl BranchNode {
    pub fn new(semantic_id: impl Into<String>, data_type: DataType) -> Self {
        Self {
            semantic_id: semantic_id.into(),
            data_type,
            children: Vec::new(),
        }
    }

    pub fn with_children(
        semantic_id: impl Into<String>,
        data_type: DataType,
        children: Vec<SemanticTreeNode>,
    ) -> Self {
        Self {
            semantic_id: semantic_id.into(),
            data_type,
            children,
        }
    }

    pub fn is_array(&self) -> bool {
        self.data_type == DataType::Array
    }

    /// Same shape and ids, every descendant leaf value reset to `""`.
    pub fn clone_unfilled(&self) -> BranchNode {
        BranchNode {
            semantic_id: self.semantic_id.clone(),
            data_type: self.data_type,
            children: self.children.iter().map(SemanticTreeNode::clone_unfilled).collect(),
        }
    }
}

impl SemanticTreeNode {
    pub fn leaf(
        semantic_id: impl Into<String>,
        data_type: DataType,
        value: impl Into<String>,
    ) -> Self {
        SemanticTreeNode::Leaf(LeafNode::new(semantic_id, data_type, value))
    }

    pub fn branch(
        semantic_id: impl Into<String>,
        data_type: DataType,
        children: Vec<SemanticTreeNode>,
    ) -> Self {
        SemanticTreeNode::Branch(BranchNode::with_children(semantic_id, data_type, children))
    }

    pub fn semantic_id(&self) -> &str {
        match self {
            SemanticTreeNode::Leaf(leaf) => &leaf.semantic_id,
            SemanticTreeNode::Branch(branch) => &branch.semantic_id,
        }
    }

    pub fn data_type(&self) -> DataType {
        match self {
            SemanticTreeNode::Leaf(leaf) => leaf.data_type,
            SemanticTreeNode::Branch(branch) => branch.data_type,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, SemanticTreeNode::Leaf(_))
    }

    pub fn children(&self) -> &[SemanticTreeNode] {
        match self {
            SemanticTreeNode::Leaf(_) => &[],
            SemanticTreeNode::Branch(branch) => &branch.children,
        }
    }

    pub fn as_branch(&self) -> Option<&BranchNode> {
        match self {
            SemanticTreeNode::Branch(branch) => Some(branch),
            SemanticTreeNode::Leaf(_) => None,
        }
    }

    pub fn clone_unfilled(&self) -> SemanticTreeNode {
        match self {
            SemanticTreeNode::Leaf(leaf) => {
                SemanticTreeNode::Leaf(LeafNode::empty(leaf.semantic_id.clone(), leaf.data_type))
            }
            SemanticTreeNode::Branch(branch) => SemanticTreeNode::Branch(branch.clone_unfilled()),
        }
    }

    /// Rename this node. Only used to add or remove an index-context suffix.
    pub fn with_semantic_id(mut self, semantic_id: impl Into<String>) -> Self {
        let semantic_id = semantic_id.into();
        match &mut self {
            SemanticTreeNode::Leaf(leaf) => leaf.semantic_id = semantic_id,
            SemanticTreeNode::Branch(branch) => branch.semantic_id = semantic_id,
        }
        self
    }

    /// Remove the index-context suffix from this node and every descendant.
    pub fn strip_index_context(self, index: &IndexContext) -> Self {
        match self {
            SemanticTreeNode::Leaf(mut leaf) => {
                leaf.semantic_id = index.base(&leaf.semantic_id).to_string();
                SemanticTreeNode::Leaf(leaf)
            }
            SemanticTreeNode::Branch(branch) => SemanticTreeNode::Branch(BranchNode {
                semantic_id: index.base(&branch.semantic_id).to_string(),
                data_type: branch.data_type,
                children: branch
                    .children
                    .into_iter()
                    .map(|child| child.strip_index_context(index))
                    .collect(),
            }),
        }
    }

    /// Total number of nodes in this subtree, including itself
    pub fn node_count(&self) -> usize {
        1 + self.children().iter().map(SemanticTreeNode::node_count).sum::<usize>()
    }

    /// Depth-first visit of every semantic id in the subtree
    pub fn semantic_ids(&self) -> Vec<&str> {
        let mut ids = vec![self.semantic_id()];
        for child in self.children() {
            ids.extend(child.semantic_ids());
        }
        ids
    }
}
