use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use crate::model::{fold_case, IndexContext};

/// One row of the semantic-id to column mapping table.
///
/// `column` may be a dotted path (`Order.Items.Name`); only the last segment
/// names the storage column. Every alias in `semantic_ids` resolves to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingEntry {
    pub column: String,
    pub semantic_ids: Vec<String>,
}

impl MappingEntry {
    pub fn new(column: impl Into<String>, semantic_ids: Vec<&str>) -> Self {
        Self {
            column: column.into(),
            semantic_ids: semantic_ids.into_iter().map(str::to_string).collect(),
        }
    }

    /// Last dot-separated segment of the column path
    pub fn column_name(&self) -> &str {
        self.column.rsplit('.').next().unwrap_or(&self.column)
    }
}

/// Read-only mapping table, loaded once and shared between requests.
#[derive(Debug, Clone, Default)]
pub struct MappingTable {
    entries: Vec<MappingEntry>,
    /// case-folded alias -> index into `entries`
    by_alias: HashMap<String, usize>,
}

impl MappingTable {
    pub fn new(entries: Vec<MappingEntry>) -> Self {
        let mut by_alias = HashMap::new();
        for (idx, entry) in entries.iter().enumerate() {
            for alias in &entry.semantic_ids {
                // first entry wins when two entries share an alias
                by_alias.entry(fold_case(alias)).or_insert(idx);
            }
        }
        Self { entries, by_alias }
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let entries: Vec<MappingEntry> =
            serde_json::from_str(json).context("Failed to parse mapping table")?;
        Ok(Self::new(entries))
    }

    /// Load the mapping table from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read mapping file {}", path.display()))?;
        Self::from_json_str(&json)
            .with_context(|| format!("Invalid mapping file {}", path.display()))
    }

    pub fn entries(&self) -> &[MappingEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Case-insensitive alias lookup
    pub fn find(&self, semantic_id: &str) -> Option<&MappingEntry> {
        self.by_alias
            .get(&fold_case(semantic_id))
            .map(|&idx| &self.entries[idx])
    }
}

/// Semantic id -> resolved column name for one request tree.
///
/// Unmapped branches hold `""`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnMapping {
    columns: HashMap<String, String>,
}

impl ColumnMapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, semantic_id: impl Into<String>, column: impl Into<String>) {
        self.columns.insert(semantic_id.into(), column.into());
    }

    pub fn get(&self, semantic_id: &str) -> Option<&str> {
        self.columns.get(semantic_id).map(String::as_str)
    }

    /// Column for a node id. Ids that were renamed with an index suffix after
    /// mapping (fan-out clones) resolve through their base id.
    pub fn column_for(&self, semantic_id: &str, index: &IndexContext) -> String {
        if let Some(column) = self.columns.get(semantic_id) {
            return column.clone();
        }
        let (base, suffix) = index.split(semantic_id);
        match self.columns.get(base) {
            Some(column) if column.is_empty() => String::new(),
            Some(column) => format!("{}{}", index.base(column), suffix.unwrap_or_default()),
            None => String::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}
