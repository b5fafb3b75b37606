use itertools::Itertools;
use serde_json::{Map, Number, Value};

use crate::error::EngineResult;
use crate::logic::schema_tree::ARRAY_ITEM_ID;
use crate::logic::validate::validate_against_schema;
use crate::model::{BranchNode, DataType, LeafNode, SemanticTreeNode};

/// Turns a reconciled request tree into the response document.
pub struct TreeToJsonSerializer;

impl TreeToJsonSerializer {
    /// `{ rootId: <converted root> }`
    pub fn to_value(root: &SemanticTreeNode) -> Value {
        let mut document = Map::new();
        document.insert(root.semantic_id().to_string(), convert(root));
        Value::Object(document)
    }

    pub fn serialize(root: &SemanticTreeNode) -> String {
        Self::to_value(root).to_string()
    }

    /// Convert and check the document against the schema the request was
    /// built from.
    pub fn serialize_validated(root: &SemanticTreeNode, schema: &Value) -> EngineResult<Value> {
        let document = Self::to_value(root);
        validate_against_schema(schema, &document)?;
        Ok(document)
    }
}

fn convert(node: &SemanticTreeNode) -> Value {
    match node {
        SemanticTreeNode::Leaf(leaf) => convert_leaf(leaf),
        SemanticTreeNode::Branch(branch) if branch.is_array() => convert_array(branch),
        SemanticTreeNode::Branch(branch) => convert_object(&branch.children),
    }
}

/// Coerce by declared type; anything that does not parse stays a string.
fn convert_leaf(leaf: &LeafNode) -> Value {
    let raw = leaf.value.as_str();
    let coerced = match leaf.data_type {
        DataType::Boolean => parse_bool(raw).map(Value::Bool),
        DataType::Integer => raw.parse::<i64>().ok().map(Value::from),
        DataType::Number => raw
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number),
        _ => None,
    };
    coerced.unwrap_or_else(|| Value::String(leaf.value.clone()))
}

fn parse_bool(raw: &str) -> Option<bool> {
    if raw.eq_ignore_ascii_case("true") {
        Some(true)
    } else if raw.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

fn convert_array(branch: &BranchNode) -> Value {
    let children = &branch.children;
    let shared_id = children.iter().map(SemanticTreeNode::semantic_id).all_equal();

    if children.len() >= 2 && shared_id {
        if children.iter().all(|child| !child.is_leaf()) {
            return Value::Array(children.iter().map(convert).collect());
        }
        if children.iter().all(SemanticTreeNode::is_leaf) {
            return Value::Array(
                children
                    .iter()
                    .map(|child| convert_object(std::slice::from_ref(child)))
                    .collect(),
            );
        }
    }

    match children.as_slice() {
        [item @ SemanticTreeNode::Branch(template)] if template.semantic_id == ARRAY_ITEM_ID => {
            Value::Array(vec![convert(item)])
        }
        _ => Value::Array(vec![convert_object(children)]),
    }
}

/// Siblings sharing an id are merged: arrays concatenate, anything else is
/// collected into an array.
fn convert_object(children: &[SemanticTreeNode]) -> Value {
    let mut object = Map::new();

    for id in children.iter().map(SemanticTreeNode::semantic_id).unique() {
        let mut members: Vec<Value> = children
            .iter()
            .filter(|child| child.semantic_id() == id)
            .map(convert)
            .collect();

        let value = if members.len() == 1 {
            members.swap_remove(0)
        } else if members.iter().all(Value::is_array) {
            Value::Array(
                members
                    .into_iter()
                    .flat_map(|member| match member {
                        Value::Array(items) => items,
                        other => vec![other],
                    })
                    .collect(),
            )
        } else {
            Value::Array(members)
        };
        object.insert(id.to_string(), value);
    }

    Value::Object(object)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn leaf(id: &str, data_type: DataType, value: &str) -> SemanticTreeNode {
        SemanticTreeNode::leaf(id, data_type, value)
    }

    fn convert_one(data_type: DataType, value: &str) -> Value {
        convert(&leaf("v", data_type, value))
    }

    #[test]
    fn test_number_coercion() {
        assert_eq!(convert_one(DataType::Number, "3.14"), json!(3.14));
        assert_eq!(convert_one(DataType::Number, "abc"), json!("abc"));
        assert_eq!(convert_one(DataType::Number, "NaN"), json!("NaN"));
        assert_eq!(convert_one(DataType::Number, ""), json!(""));
    }

    #[test]
    fn test_integer_and_boolean_coercion() {
        assert_eq!(convert_one(DataType::Integer, "42"), json!(42));
        assert_eq!(convert_one(DataType::Integer, "4.2"), json!("4.2"));
        assert_eq!(convert_one(DataType::Boolean, "True"), json!(true));
        assert_eq!(convert_one(DataType::Boolean, "FALSE"), json!(false));
        assert_eq!(convert_one(DataType::Boolean, "flase"), json!("flase"));
        assert_eq!(convert_one(DataType::String, "007"), json!("007"));
    }

    #[test]
    fn test_root_is_wrapped_under_its_id() {
        let root = SemanticTreeNode::branch(
            "Pump",
            DataType::Object,
            vec![leaf("Pressure", DataType::Number, "2.5"), leaf("On", DataType::Boolean, "true")],
        );
        assert_eq!(
            TreeToJsonSerializer::to_value(&root),
            json!({"Pump": {"Pressure": 2.5, "On": true}})
        );
        assert_eq!(
            TreeToJsonSerializer::serialize(&root),
            r#"{"Pump":{"Pressure":2.5,"On":true}}"#
        );
    }

    #[test]
    fn test_array_of_branches() {
        let element = |name: &str| {
            SemanticTreeNode::branch(
                "Items",
                DataType::Object,
                vec![leaf("Name", DataType::String, name)],
            )
        };
        let items =
            SemanticTreeNode::branch("Items", DataType::Array, vec![element("A"), element("B")]);
        assert_eq!(convert(&items), json!([{"Name": "A"}, {"Name": "B"}]));
    }

    #[test]
    fn test_array_of_leaves() {
        let tags = SemanticTreeNode::branch(
            "Tags",
            DataType::Array,
            vec![leaf("Tag", DataType::Integer, "1"), leaf("Tag", DataType::Integer, "2")],
        );
        assert_eq!(convert(&tags), json!([{"Tag": 1}, {"Tag": 2}]));
    }

    #[test]
    fn test_array_fallbacks() {
        let template = SemanticTreeNode::branch(
            "List",
            DataType::Array,
            vec![SemanticTreeNode::branch(
                ARRAY_ITEM_ID,
                DataType::Object,
                vec![leaf("Name", DataType::String, "")],
            )],
        );
        assert_eq!(convert(&template), json!([{"Name": ""}]));

        let mixed = SemanticTreeNode::branch(
            "Mixed",
            DataType::Array,
            vec![leaf("A", DataType::String, "x"), leaf("B", DataType::Integer, "1")],
        );
        assert_eq!(convert(&mixed), json!([{"A": "x", "B": 1}]));

        let empty = SemanticTreeNode::branch("Empty", DataType::Array, vec![]);
        assert_eq!(convert(&empty), json!([{}]));
    }

    #[test]
    fn test_object_groups_duplicate_ids() {
        let customer = |email: &str| {
            SemanticTreeNode::branch(
                "Customer",
                DataType::Object,
                vec![leaf("Email", DataType::String, email)],
            )
        };
        let order = SemanticTreeNode::branch(
            "Order",
            DataType::Object,
            vec![customer("a@x.io"), leaf("Total", DataType::Number, "3"), customer("b@x.io")],
        );
        assert_eq!(
            convert(&order),
            json!({"Customer": [{"Email": "a@x.io"}, {"Email": "b@x.io"}], "Total": 3.0})
        );
    }

    #[test]
    fn test_object_concatenates_array_fragments() {
        let fragment = |names: &[&str]| {
            SemanticTreeNode::branch(
                "Items",
                DataType::Array,
                names
                    .iter()
                    .map(|name| {
                        SemanticTreeNode::branch(
                            "Items",
                            DataType::Object,
                            vec![leaf("Name", DataType::String, name)],
                        )
                    })
                    .collect(),
            )
        };
        let order = SemanticTreeNode::branch(
            "Order",
            DataType::Object,
            vec![fragment(&["A", "B"][..]), fragment(&["C", "D"][..])],
        );
        assert_eq!(
            convert(&order),
            json!({"Items": [{"Name": "A"}, {"Name": "B"}, {"Name": "C"}, {"Name": "D"}]})
        );
    }
}
