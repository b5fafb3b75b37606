use semantic_twin::{
    ColumnMapper, DataType, EngineError, IndexContext, MappingEntry, MappingTable,
    SemanticTreeEngine, SemanticTreeNode, TreeToJsonSerializer,
};
use serde_json::{json, Value};
use std::sync::Arc;

fn order_mapping() -> Arc<MappingTable> {
    Arc::new(MappingTable::new(vec![
        MappingEntry::new("Order", vec!["Order"]),
        MappingEntry::new("Order.Items", vec!["Items"]),
        MappingEntry::new("Order.Items.Name", vec!["Name"]),
        MappingEntry::new("Order.Items.qty", vec!["Quantity"]),
        MappingEntry::new("Order.express", vec!["Express"]),
    ]))
}

fn order_schema() -> Value {
    json!({
        "$schema": "http://json-schema.org/draft-07/schema#",
        "type": "object",
        "properties": {
            "Order": {
                "type": "object",
                "properties": {
                    "Items": {
                        "type": "array",
                        "items": {
                            "type": "object",
                            "properties": {"Name": {"type": "string"}}
                        }
                    }
                }
            }
        }
    })
}

fn engine() -> SemanticTreeEngine {
    SemanticTreeEngine::new(order_mapping(), IndexContext::default())
}

#[test]
fn test_order_items_scenario() {
    let raw = r#"{"Order":{"Items[Index]:0":{"Name":"Widget"},"Items[Index]:1":{"Name":"Gadget"}}}"#;
    let document = engine().evaluate(&order_schema(), Some(raw)).unwrap();
    assert_eq!(
        document,
        json!({"Order": {"Items": [{"Name": "Widget"}, {"Name": "Gadget"}]}})
    );
}

#[test]
fn test_cardinality_round_trip() {
    for n in 2..6 {
        let items: Vec<Value> = (0..n).map(|i| json!({"Name": format!("part-{}", i)})).collect();
        let raw = json!({"Order": {"Items": items}}).to_string();

        let document = engine().evaluate(&order_schema(), Some(&raw)).unwrap();
        let output = document["Order"]["Items"].as_array().unwrap();
        assert_eq!(output.len(), n);
        for (i, element) in output.iter().enumerate() {
            assert_eq!(element["Name"], json!(format!("part-{}", i)));
        }
    }
}

#[test]
fn test_single_row_is_still_an_array() {
    let raw = r#"{"Order": {"Items": [{"Name": "Solo"}]}}"#;
    let document = engine().evaluate(&order_schema(), Some(raw)).unwrap();
    assert_eq!(document, json!({"Order": {"Items": [{"Name": "Solo"}]}}));
}

#[test]
fn test_zero_match_neutrality() {
    let engine = engine();
    for raw in [None, Some("{}"), Some(r#"{"Unrelated": {"x": 1}}"#)] {
        let document = engine.evaluate(&order_schema(), raw).unwrap();
        assert_eq!(document, json!({"Order": {"Items": [{"Name": ""}]}}));
    }
}

#[test]
fn test_blank_or_null_response_degrades_to_empty_values() {
    let engine = engine();
    let encoded_null = serde_json::to_string("null").unwrap();
    for raw in ["", " \t\n", "null", encoded_null.as_str()] {
        let document = engine.evaluate(&order_schema(), Some(raw)).unwrap();
        assert_eq!(document, json!({"Order": {"Items": [{"Name": ""}]}}));
    }
}

#[test]
fn test_self_referencing_schema_is_bounded() {
    let schema = json!({
        "definitions": {
            "Node": {
                "type": "object",
                "properties": {
                    "Name": {"type": "string"},
                    "Next": {"$ref": "#/definitions/Node"}
                }
            }
        },
        "properties": {"Order": {"$ref": "#/definitions/Node"}}
    });
    let table = Arc::new(MappingTable::new(vec![
        MappingEntry::new("Order", vec!["Order"]),
        MappingEntry::new("Order.Name", vec!["Name"]),
        MappingEntry::new("Order.next", vec!["Next"]),
    ]));
    let engine = SemanticTreeEngine::new(table, IndexContext::default());

    // the repeated ref collapses into a string leaf
    let filled = engine
        .shape(&schema, Some(r#"{"Order": {"Name": "A", "next": "B"}}"#))
        .unwrap();
    assert_eq!(filled.semantic_ids(), vec!["Order", "Name", "Next"]);
    assert_eq!(
        TreeToJsonSerializer::to_value(&filled),
        json!({"Order": {"Name": "A", "Next": "B"}})
    );
}

#[test]
fn test_non_ascii_ids_match_across_case() {
    let table = Arc::new(MappingTable::new(vec![
        MappingEntry::new("t.Order", vec!["Order"]),
        MappingEntry::new("t.GRÖSSE", vec!["Size"]),
    ]));
    let engine = SemanticTreeEngine::new(table, IndexContext::default());
    let schema = json!({
        "properties": {
            "Order": {"type": "object", "properties": {"Size": {"type": "string"}}}
        }
    });

    let document = engine
        .evaluate(&schema, Some(r#"{"Order": {"größe": "XL"}}"#))
        .unwrap();
    assert_eq!(document, json!({"Order": {"Size": "XL"}}));
}

#[test]
fn test_no_index_suffix_survives() {
    let raw =
        json!({"Order": {"Items": [{"Name": "a"}, {"Name": "b"}, {"Name": "c"}]}}).to_string();
    let filled = engine().shape(&order_schema(), Some(&raw)).unwrap();
    let delimiter = IndexContext::default().delimiter().to_string();
    assert!(filled.semantic_ids().iter().all(|id| !id.contains(&delimiter)));
    assert!(filled.semantic_ids().contains(&"Items"));
}

#[test]
fn test_typed_leaves_and_double_encoded_response() {
    let schema = json!({
        "type": "object",
        "properties": {
            "Order": {
                "type": "object",
                "properties": {
                    "Express": {"type": "boolean"},
                    "Items": {
                        "type": "array",
                        "items": {
                            "type": "object",
                            "properties": {
                                "Name": {"type": "string"},
                                "Quantity": {"type": "integer"}
                            }
                        }
                    }
                }
            }
        }
    });
    let inner = json!({
        "Order": {
            "express": "True",
            "Items": [{"Name": "Bolt", "qty": "12"}, {"Name": "Nut", "qty": "twelve"}]
        }
    })
    .to_string();
    let raw = serde_json::to_string(&inner).unwrap();

    let engine = engine();
    let filled = engine.shape(&schema, Some(&raw)).unwrap();
    assert_eq!(
        TreeToJsonSerializer::to_value(&filled),
        json!({
            "Order": {
                "Express": true,
                "Items": [
                    {"Name": "Bolt", "Quantity": 12},
                    {"Name": "Nut", "Quantity": "twelve"}
                ]
            }
        })
    );

    // the uncoercible quantity degrades to a string, which the schema rejects
    assert!(matches!(
        engine.evaluate(&schema, Some(&raw)),
        Err(EngineError::SchemaValidationFailed(_))
    ));
}

#[test]
fn test_mapping_is_case_symmetric() {
    let table = Arc::new(MappingTable::new(vec![MappingEntry::new(
        "catalog.product_name",
        vec!["ProductName"],
    )]));
    let mapper = ColumnMapper::new(table, IndexContext::default());

    let columns: Vec<String> = ["ProductName", "PRODUCTNAME", "productname"]
        .into_iter()
        .map(|id| {
            let leaf = SemanticTreeNode::leaf(id, DataType::String, "");
            mapper.resolve(&leaf).unwrap().get(id).unwrap().to_string()
        })
        .collect();
    assert!(columns.iter().all(|column| column == "product_name"));
}

#[test]
fn test_boolean_leaf_scenario() {
    let as_json = |value: &str| {
        let leaf = SemanticTreeNode::leaf("Flag", DataType::Boolean, value);
        TreeToJsonSerializer::to_value(&leaf)["Flag"].clone()
    };
    assert_eq!(as_json("True"), json!(true));
    assert_eq!(as_json("flase"), json!("flase"));
}
