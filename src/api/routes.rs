use axum::{
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::limit::RequestBodyLimitLayer;

use crate::api::handlers::{self, AppState};
use crate::store::traits::SubmodelStore;

pub fn create_router<S: SubmodelStore + 'static>(max_body_bytes: usize) -> Router<AppState<S>> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Submodels
        .route("/submodels", get(handlers::list_submodels::<S>))
        .route(
            "/submodels/:submodel_id/query",
            post(handlers::query_submodel::<S>),
        )
        .layer(ServiceBuilder::new().layer(RequestBodyLimitLayer::new(max_body_bytes)))
}
