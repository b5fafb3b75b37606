pub mod api;
pub mod config;
pub mod error;
pub mod logic;
pub mod model;
pub mod store;

// Export API types
pub use api::handlers;
pub use api::routes;

// Export engine types
pub use error::{EngineError, EngineResult};
pub use logic::{
    ColumnMapper, ResponseTreeParser, SchemaTreeBuilder, SemanticTreeEngine, TreeReconciler,
    TreeToJsonSerializer,
};

// Export all model types
pub use model::*;

// Export store types
pub use store::{MemoryStore, PostgresStore, SubmodelStore};

use std::sync::Arc;

/// Build the router for a store, reading the mapping table from the
/// configured file.
pub fn build_app<S: SubmodelStore + 'static>(
    store: Arc<S>,
    config: &crate::config::AppConfig,
) -> anyhow::Result<axum::Router> {
    let table = MappingTable::load(&config.engine.mapping_file)?;
    Ok(build_app_with_mapping(store, config, table))
}

pub fn build_app_with_mapping<S: SubmodelStore + 'static>(
    store: Arc<S>,
    config: &crate::config::AppConfig,
    table: MappingTable,
) -> axum::Router {
    let engine = SemanticTreeEngine::from_config(&config.engine, Arc::new(table));
    let state = api::ServiceState::new(store, engine, config.submodels.clone());

    api::routes::create_router(config.server.max_body_bytes).with_state(Arc::new(state))
}

/// Serve the app on the configured address until the process stops
pub async fn run_server(
    app: axum::Router,
    config: &crate::config::AppConfig,
) -> anyhow::Result<()> {
    use axum::serve;
    use tokio::net::TcpListener;

    let bind_address = config.server_address();
    let listener = TcpListener::bind(&bind_address).await?;
    log::info!("Semantic twin server running on http://{}", bind_address);

    serve(listener, app).await?;

    Ok(())
}
