use anyhow::{Context, Result};
use sqlx::{postgres::PgPoolOptions, postgres::PgRow, PgPool, Row};

use crate::model::SubmodelConfig;
use crate::store::traits::SubmodelStore;

#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Create a new PostgreSQL store with the given database URL
    pub async fn new(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .context("Failed to create PostgreSQL connection pool")?;

        Ok(Self { pool })
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait::async_trait]
impl SubmodelStore for PostgresStore {
    async fn fetch_submodel_json(
        &self,
        submodel: &SubmodelConfig,
        parameters: &[String],
    ) -> Result<Option<String>> {
        let mut query = sqlx::query(&submodel.sql);
        for value in parameters {
            query = query.bind(value.as_str());
        }

        let row = query
            .fetch_optional(&self.pool)
            .await
            .with_context(|| format!("Failed to query submodel '{}'", submodel.id))?;

        let Some(row) = row else {
            return Ok(None);
        };

        first_column_as_text(&row)
            .with_context(|| format!("Submodel '{}' returned an unreadable column", submodel.id))
    }
}

/// Text columns are returned as-is; json/jsonb columns are re-serialized.
/// A SQL `NULL` counts as no data.
fn first_column_as_text(row: &PgRow) -> Result<Option<String>> {
    if let Ok(text) = row.try_get::<Option<String>, _>(0) {
        return Ok(text);
    }
    let json: Option<serde_json::Value> = row.try_get(0)?;
    Ok(json.map(|value| value.to_string()))
}
