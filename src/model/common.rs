use serde::{Deserialize, Serialize};

pub type Id = String;

/// Delimiter used when no index context is configured.
pub const DEFAULT_INDEX_DELIMITER: &str = "[Index]:";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum DataType {
    String,
    Integer,
    Number,
    Boolean,
    Object,
    Array,
    Null,
    Unknown,
}

impl DataType {
    pub fn is_complex(&self) -> bool {
        matches!(self, DataType::Object | DataType::Array)
    }

    /// Kind of a raw JSON value as it appears in a data-source response
    pub fn of_json(value: &serde_json::Value) -> Self {
        use serde_json::Value;
        match value {
            Value::Null => DataType::Null,
            Value::Bool(_) => DataType::Boolean,
            Value::Number(_) => DataType::Number,
            Value::String(_) => DataType::String,
            Value::Array(_) => DataType::Array,
            Value::Object(_) => DataType::Object,
        }
    }
}

/// Case-folded form of an id or column name, used for every case-insensitive
/// comparison in the pipeline. Upper-casing first folds `ß` and `SS` together.
pub fn fold_case(name: &str) -> String {
    name.to_uppercase().to_lowercase()
}

/// Case-insensitive equality under [`fold_case`].
pub fn same_name(a: &str, b: &str) -> bool {
    a == b || fold_case(a) == fold_case(b)
}

/// Index-context bookkeeping for fanned-out semantic ids.
///
/// A semantic id such as `Items[Index]:1` carries the base id `Items` and the
/// suffix `[Index]:1`. The same delimiter must be used by the column mapper,
/// the response parser and the reconciler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexContext {
    delimiter: String,
}

impl IndexContext {
    pub fn new(delimiter: impl Into<String>) -> Self {
        Self {
            delimiter: delimiter.into(),
        }
    }

    pub fn delimiter(&self) -> &str {
        &self.delimiter
    }

    /// Split at the first delimiter. The suffix keeps the delimiter.
    pub fn split<'a>(&self, semantic_id: &'a str) -> (&'a str, Option<&'a str>) {
        if self.delimiter.is_empty() {
            return (semantic_id, None);
        }
        match semantic_id.find(&self.delimiter) {
            Some(pos) => (&semantic_id[..pos], Some(&semantic_id[pos..])),
            None => (semantic_id, None),
        }
    }

    pub fn base<'a>(&self, semantic_id: &'a str) -> &'a str {
        self.split(semantic_id).0
    }

    pub fn has_suffix(&self, semantic_id: &str) -> bool {
        self.split(semantic_id).1.is_some()
    }

    pub fn indexed(&self, base: &str, index: usize) -> String {
        format!("{}{}{}", base, self.delimiter, index)
    }
}

impl Default for IndexContext {
    fn default() -> Self {
        Self::new(DEFAULT_INDEX_DELIMITER)
    }
}
