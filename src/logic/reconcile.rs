use log::debug;

use crate::error::{EngineError, EngineResult};
use crate::logic::schema_tree::ARRAY_ITEM_ID;
use crate::model::{
    same_name, BranchNode, ColumnMapping, DataType, IndexContext, LeafNode, SemanticTreeNode,
};

/// Fills a request tree from a response tree.
///
/// Every request branch resolves its column and is matched against the
/// response branches in scope:
/// - no column: children are filled one by one in the same scope
/// - zero matches: the branch is kept with every leaf emptied
/// - one match: children are filled against the match
/// - N matches: the branch fans out into N indexed clones, one per match
///
/// The request tree is never mutated; a new filled tree is returned with all
/// index-context suffixes removed.
pub struct TreeReconciler<'a> {
    mapping: &'a ColumnMapping,
    index: &'a IndexContext,
}

impl<'a> TreeReconciler<'a> {
    pub fn new(mapping: &'a ColumnMapping, index: &'a IndexContext) -> Self {
        Self { mapping, index }
    }

    /// A missing response is not an error: every branch takes the
    /// zero-match path and every leaf ends up empty.
    pub fn reconcile(
        &self,
        request: &SemanticTreeNode,
        response: Option<&SemanticTreeNode>,
    ) -> EngineResult<SemanticTreeNode> {
        let scope = response.map(std::slice::from_ref).unwrap_or_default();

        let filled = match request {
            SemanticTreeNode::Leaf(leaf) => SemanticTreeNode::Leaf(self.fill_leaf(leaf, scope)?),
            SemanticTreeNode::Branch(branch) => {
                let mut nodes = self.fill_branch(branch, scope)?;
                if nodes.len() == 1 {
                    nodes.swap_remove(0)
                } else {
                    // a fanned-out root has no parent to take the clones
                    SemanticTreeNode::branch(branch.semantic_id.clone(), branch.data_type, nodes)
                }
            }
        };

        Ok(filled.strip_index_context(self.index))
    }

    fn fill_children(
        &self,
        children: &[SemanticTreeNode],
        scope: &[SemanticTreeNode],
    ) -> EngineResult<Vec<SemanticTreeNode>> {
        let mut filled = Vec::with_capacity(children.len());
        for child in children {
            match child {
                SemanticTreeNode::Leaf(leaf) => {
                    filled.push(SemanticTreeNode::Leaf(self.fill_leaf(leaf, scope)?))
                }
                SemanticTreeNode::Branch(branch) => filled.extend(self.fill_branch(branch, scope)?),
            }
        }
        Ok(filled)
    }

    /// Returns the nodes that take the branch's place among its siblings.
    fn fill_branch(
        &self,
        branch: &BranchNode,
        scope: &[SemanticTreeNode],
    ) -> EngineResult<Vec<SemanticTreeNode>> {
        let column = self.mapping.column_for(&branch.semantic_id, self.index);

        if column.is_empty() {
            let children = self.fill_children(&branch.children, scope)?;
            return Ok(vec![SemanticTreeNode::branch(
                branch.semantic_id.clone(),
                branch.data_type,
                children,
            )]);
        }

        let matches = self.find_branches(scope, &column);
        debug!(
            "Branch '{}' (column '{}') matched {} response branches",
            branch.semantic_id,
            column,
            matches.len()
        );

        match matches.as_slice() {
            [] => Ok(vec![SemanticTreeNode::Branch(branch.clone_unfilled())]),
            [single] => {
                let children = self.fill_children(&branch.children, single.children())?;
                Ok(vec![SemanticTreeNode::branch(
                    branch.semantic_id.clone(),
                    branch.data_type,
                    children,
                )])
            }
            many => self.fan_out(branch, many),
        }
    }

    fn fan_out(
        &self,
        branch: &BranchNode,
        matches: &[&SemanticTreeNode],
    ) -> EngineResult<Vec<SemanticTreeNode>> {
        let base = self.index.base(&branch.semantic_id);
        let (clone_type, template) = if branch.is_array() {
            element_template(branch)
        } else {
            (branch.data_type, branch.children.as_slice())
        };

        let clones = matches
            .iter()
            .enumerate()
            .map(|(i, matched)| -> EngineResult<SemanticTreeNode> {
                let children = self.fill_children(template, matched.children())?;
                Ok(SemanticTreeNode::branch(
                    self.index.indexed(base, i),
                    clone_type,
                    children,
                ))
            })
            .collect::<EngineResult<Vec<_>>>()?;

        if branch.is_array() {
            Ok(vec![SemanticTreeNode::branch(
                branch.semantic_id.clone(),
                DataType::Array,
                clones,
            )])
        } else {
            Ok(clones)
        }
    }

    fn fill_leaf(&self, leaf: &LeafNode, scope: &[SemanticTreeNode]) -> EngineResult<LeafNode> {
        let column = self.leaf_column(leaf)?;
        let value = if column.is_empty() {
            String::new()
        } else {
            find_leaf(scope, &column)
                .filter(|found| found.data_type != DataType::Null)
                .map(|found| found.value.clone())
                .unwrap_or_default()
        };
        Ok(LeafNode::new(leaf.semantic_id.clone(), leaf.data_type, value))
    }

    fn leaf_column(&self, leaf: &LeafNode) -> EngineResult<String> {
        let base = self.index.base(&leaf.semantic_id);
        if self.mapping.get(&leaf.semantic_id).is_none() && self.mapping.get(base).is_none() {
            return Err(EngineError::SemanticIdNotMapped(base.to_string()));
        }
        Ok(self.mapping.column_for(&leaf.semantic_id, self.index))
    }

    /// Response branches matching `column`, in document order. A column that
    /// carries an index suffix only matches that exact indexed branch.
    fn find_branches<'r>(
        &self,
        scope: &'r [SemanticTreeNode],
        column: &str,
    ) -> Vec<&'r SemanticTreeNode> {
        let exact = self.index.has_suffix(column);
        let mut found = Vec::new();
        for node in scope {
            self.collect_branches(node, column, exact, &mut found);
        }
        found
    }

    fn collect_branches<'r>(
        &self,
        node: &'r SemanticTreeNode,
        column: &str,
        exact: bool,
        found: &mut Vec<&'r SemanticTreeNode>,
    ) {
        let SemanticTreeNode::Branch(branch) = node else {
            return;
        };
        let id = if exact {
            branch.semantic_id.as_str()
        } else {
            self.index.base(&branch.semantic_id)
        };
        if same_name(id, column) {
            found.push(node);
            return;
        }
        for child in &branch.children {
            self.collect_branches(child, column, exact, found);
        }
    }
}

/// Shape each clone of a fanned-out array takes: the `item` template when the
/// array declares one, otherwise the array's own children as an object.
fn element_template(branch: &BranchNode) -> (DataType, &[SemanticTreeNode]) {
    match branch.children.as_slice() {
        [SemanticTreeNode::Branch(item)] if item.semantic_id == ARRAY_ITEM_ID => {
            (item.data_type, item.children.as_slice())
        }
        children => (DataType::Object, children),
    }
}

/// First leaf in depth-first order whose id equals `column`, ignoring case.
fn find_leaf<'r>(scope: &'r [SemanticTreeNode], column: &str) -> Option<&'r LeafNode> {
    scope.iter().find_map(|node| match node {
        SemanticTreeNode::Leaf(leaf) if same_name(&leaf.semantic_id, column) => Some(leaf),
        SemanticTreeNode::Leaf(_) => None,
        SemanticTreeNode::Branch(branch) => find_leaf(&branch.children, column),
    })
}
