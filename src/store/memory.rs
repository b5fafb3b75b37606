use anyhow::Result;
use parking_lot::RwLock;
use std::collections::HashMap;

use crate::model::{Id, SubmodelConfig};
use crate::store::traits::SubmodelStore;

/// In-memory submodel data keyed by submodel id and bound parameter values.
#[derive(Debug, Default)]
pub struct MemoryStore {
    rows: RwLock<HashMap<(Id, Vec<String>), String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, submodel_id: &str, parameters: Vec<String>, raw_json: impl Into<String>) {
        self.rows
            .write()
            .insert((submodel_id.to_string(), parameters), raw_json.into());
    }

    pub fn remove(&self, submodel_id: &str, parameters: &[String]) -> Option<String> {
        self.rows
            .write()
            .remove(&(submodel_id.to_string(), parameters.to_vec()))
    }

    pub fn len(&self) -> usize {
        self.rows.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.read().is_empty()
    }
}

#[async_trait::async_trait]
impl SubmodelStore for MemoryStore {
    async fn fetch_submodel_json(
        &self,
        submodel: &SubmodelConfig,
        parameters: &[String],
    ) -> Result<Option<String>> {
        let key = (submodel.id.clone(), parameters.to_vec());
        Ok(self.rows.read().get(&key).cloned())
    }
}
