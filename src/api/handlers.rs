use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    Json as RequestJson,
};
use log::{info, warn};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::EngineError;
use crate::logic::SemanticTreeEngine;
use crate::model::{Id, SubmodelConfig, SubmodelQueryRequest, SubmodelSummary};
use crate::store::traits::SubmodelStore;

/// Shared, read-only state of the service
pub struct ServiceState<S> {
    pub store: Arc<S>,
    pub engine: SemanticTreeEngine,
    pub submodels: HashMap<Id, SubmodelConfig>,
}

impl<S: SubmodelStore> ServiceState<S> {
    pub fn new(store: Arc<S>, engine: SemanticTreeEngine, submodels: Vec<SubmodelConfig>) -> Self {
        Self {
            store,
            engine,
            submodels: submodels
                .into_iter()
                .map(|submodel| (submodel.id.clone(), submodel))
                .collect(),
        }
    }
}

pub type AppState<S> = Arc<ServiceState<S>>;

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ErrorResponse>)>;

/// Simple health check endpoint
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

#[derive(Debug, Serialize)]
pub struct ListResponse<T> {
    pub items: Vec<T>,
    pub total: usize,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: &str) -> Self {
        Self {
            error: message.to_string(),
        }
    }
}

fn error(status: StatusCode, message: &str) -> (StatusCode, Json<ErrorResponse>) {
    (status, Json(ErrorResponse::new(message)))
}

/// Map engine failures to HTTP statuses
pub fn engine_error(err: &EngineError) -> (StatusCode, Json<ErrorResponse>) {
    let status = match err {
        EngineError::SchemaHasNoProperties
        | EngineError::SemanticIdNotMapped(_)
        | EngineError::TooManyNodes(_)
        | EngineError::InvalidSchema(_) => StatusCode::BAD_REQUEST,
        EngineError::SchemaValidationFailed(_) => StatusCode::NOT_FOUND,
        EngineError::ResponseNotParsable(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    error(status, &err.to_string())
}

pub async fn list_submodels<S: SubmodelStore>(
    State(state): State<AppState<S>>,
) -> Json<ListResponse<SubmodelSummary>> {
    let mut items: Vec<SubmodelSummary> =
        state.submodels.values().map(SubmodelSummary::from).collect();
    items.sort_by(|a, b| a.id.cmp(&b.id));
    let total = items.len();
    Json(ListResponse { items, total })
}

/// Shape the submodel's data into the caller's schema
pub async fn query_submodel<S: SubmodelStore>(
    State(state): State<AppState<S>>,
    Path(submodel_id): Path<String>,
    RequestJson(request): RequestJson<SubmodelQueryRequest>,
) -> ApiResult<Value> {
    let submodel = state.submodels.get(&submodel_id).ok_or_else(|| {
        error(
            StatusCode::NOT_FOUND,
            &format!("Submodel '{}' not found", submodel_id),
        )
    })?;

    let parameters = submodel.bind_parameters(&request.parameters).map_err(|missing| {
        error(
            StatusCode::BAD_REQUEST,
            &format!("Missing parameter '{}'", missing),
        )
    })?;

    let raw = state
        .store
        .fetch_submodel_json(submodel, &parameters)
        .await
        .map_err(|e| {
            warn!("Data source failed for submodel '{}': {:#}", submodel_id, e);
            error(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string())
        })?;

    let Some(raw) = raw else {
        info!("No data for submodel '{}' with {:?}", submodel_id, parameters);
        return Err(error(
            StatusCode::NOT_FOUND,
            &format!("No data found for submodel '{}'", submodel_id),
        ));
    };

    let document = state
        .engine
        .evaluate(&request.schema, Some(&raw))
        .map_err(|e| {
            warn!("Submodel '{}' query failed: {}", submodel_id, e);
            engine_error(&e)
        })?;

    Ok(Json(document))
}
