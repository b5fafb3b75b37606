use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::model::Id;

/// A logical submodel: the pre-selected SQL statement that returns the raw
/// JSON for it, and the names of the parameters bound to `$1..$n`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmodelConfig {
    pub id: Id,
    pub sql: String,
    #[serde(default)]
    pub parameters: Vec<String>,
}

impl SubmodelConfig {
    /// Order the supplied parameters as declared.
    ///
    /// Returns the name of the first declared parameter that is missing.
    pub fn bind_parameters(
        &self,
        supplied: &HashMap<String, String>,
    ) -> Result<Vec<String>, String> {
        self.parameters
            .iter()
            .map(|name| supplied.get(name).cloned().ok_or_else(|| name.clone()))
            .collect()
    }
}

/// Body of a submodel query
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmodelQueryRequest {
    pub schema: serde_json::Value,
    #[serde(default)]
    pub parameters: HashMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmodelSummary {
    pub id: Id,
    pub parameters: Vec<String>,
}

impl From<&SubmodelConfig> for SubmodelSummary {
    fn from(config: &SubmodelConfig) -> Self {
        Self {
            id: config.id.clone(),
            parameters: config.parameters.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_parameters_in_declared_order() {
        let config = SubmodelConfig {
            id: "nameplate".to_string(),
            sql: "SELECT data FROM nameplate WHERE asset = $1 AND site = $2".to_string(),
            parameters: vec!["assetId".to_string(), "site".to_string()],
        };

        let mut supplied = HashMap::new();
        supplied.insert("site".to_string(), "north".to_string());
        supplied.insert("assetId".to_string(), "A-17".to_string());
        supplied.insert("ignored".to_string(), "x".to_string());

        assert_eq!(config.bind_parameters(&supplied).unwrap(), vec!["A-17", "north"]);

        supplied.remove("site");
        assert_eq!(config.bind_parameters(&supplied).unwrap_err(), "site");
    }

    #[test]
    fn test_query_request_parameters_default_to_empty() {
        let request: SubmodelQueryRequest =
            serde_json::from_str(r#"{"schema": {"type": "object"}}"#).unwrap();
        assert!(request.parameters.is_empty());
    }
}
