use semantic_twin::config::AppConfig;
use semantic_twin::store::PostgresStore;
use semantic_twin::{build_app, run_server};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if it exists
    dotenvy::dotenv().ok();

    // Initialize logging with explicit filter to suppress sqlx debug logs
    use env_logger::Builder;
    use log::LevelFilter;

    Builder::new()
        .filter_level(LevelFilter::Info)
        .filter_module("sqlx", LevelFilter::Warn)
        .parse_default_env()
        .init();

    println!("Semantic Twin: schema-shaped submodel server");

    // Load configuration
    let config = AppConfig::load()?;
    println!(
        "Configuration loaded: server={}:{}, {} submodels",
        config.server.host,
        config.server.port,
        config.submodels.len()
    );

    println!("Connecting to PostgreSQL...");
    let database_url = config.database_url()?;
    let max_connections = config.database.max_connections.unwrap_or(20);
    let store = Arc::new(PostgresStore::new(&database_url, max_connections).await?);

    println!("Loading mapping table from {}", config.engine.mapping_file);
    let app = build_app(store, &config)?;

    run_server(app, &config).await?;

    Ok(())
}
