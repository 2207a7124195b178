//! Mock core banking endpoints
//!
//! Exposes the simulated core over HTTP so the service can exercise its
//! own HTTP gateway end to end in development. Mounted under
//! `/mock/core/v1`, never in production.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};

use crate::error::AppError;
use crate::gateway::{
    BureauReport, CoreBankingGateway, CoreStatusReport, QueryBureausRequest,
    RegisterApplicationRequest, RegisterApplicationResponse, SimulatedCoreBanking,
    ValidateClientRequest, ValidateClientResponse,
};

/// Router for the mock core endpoints, backed by one shared simulator
pub fn create_mock_router(simulator: Arc<SimulatedCoreBanking>) -> Router {
    Router::new()
        .route("/clients/validate", post(validate_client))
        .route("/risk-bureaus/query", post(query_bureaus))
        .route("/applications/register", post(register_application))
        .route("/applications/:id/status", get(query_status))
        .with_state(simulator)
}

async fn validate_client(
    State(simulator): State<Arc<SimulatedCoreBanking>>,
    Json(request): Json<ValidateClientRequest>,
) -> Result<Json<ValidateClientResponse>, AppError> {
    let response = simulator
        .validate_client(request)
        .await
        .map_err(|e| AppError::integration("client validation", e))?;

    Ok(Json(response))
}

async fn query_bureaus(
    State(simulator): State<Arc<SimulatedCoreBanking>>,
    Json(request): Json<QueryBureausRequest>,
) -> Result<Json<BureauReport>, AppError> {
    let report = simulator
        .query_risk_bureaus(request)
        .await
        .map_err(|e| AppError::integration("bureau query", e))?;

    Ok(Json(report))
}

async fn register_application(
    State(simulator): State<Arc<SimulatedCoreBanking>>,
    Json(request): Json<RegisterApplicationRequest>,
) -> Result<(StatusCode, Json<RegisterApplicationResponse>), AppError> {
    let response = simulator
        .register_application(request)
        .await
        .map_err(|e| AppError::integration("core registration", e))?;

    Ok((StatusCode::CREATED, Json(response)))
}

async fn query_status(
    State(simulator): State<Arc<SimulatedCoreBanking>>,
    Path(core_application_id): Path<String>,
) -> Result<Json<CoreStatusReport>, AppError> {
    let report = simulator
        .query_status(&core_application_id)
        .await
        .map_err(|e| AppError::integration("status query", e))?;

    Ok(Json(report))
}
