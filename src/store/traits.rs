use crate::model::SubmodelConfig;
use anyhow::Result;

/// Source of the raw JSON behind a submodel.
#[async_trait::async_trait]
pub trait SubmodelStore: Send + Sync {
    /// Run the submodel's statement with the bound parameters and return the
    /// first column of the first row, or `None` when no row matched.
    async fn fetch_submodel_json(
        &self,
        submodel: &SubmodelConfig,
        parameters: &[String],
    ) -> Result<Option<String>>;
}
