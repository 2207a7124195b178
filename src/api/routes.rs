//! API Routes
//!
//! HTTP endpoint definitions.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::{get, patch, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{Application, ApplicationStatus, CardTier};
use crate::error::AppError;
use crate::gateway::{CoreBankingGateway, CoreStatusReport};
use crate::handlers::{
    AbandonApplicationHandler, CoreStatusHandler, CreateApplicationCommand,
    CreateApplicationHandler, FindApplicationHandler, SubmissionResult, SubmitApplicationHandler,
    UpdateApplicationCommand, UpdateApplicationHandler,
};
use crate::integration::RetryPolicy;
use crate::repository::{ApplicationFilters, ApplicationRepository, Pagination};

// =========================================================================
// Shared state
// =========================================================================

#[derive(Clone)]
pub struct AppState {
    pub repository: Arc<dyn ApplicationRepository>,
    pub gateway: Arc<dyn CoreBankingGateway>,
    pub retry: RetryPolicy,
}

// =========================================================================
// Request/Response types
// =========================================================================

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub status: Option<ApplicationStatus>,
    #[serde(default)]
    pub card_tier: Option<CardTier>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub document_number: Option<String>,
    #[serde(default)]
    pub created_from: Option<DateTime<Utc>>,
    #[serde(default)]
    pub created_to: Option<DateTime<Utc>>,
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_page() -> u32 {
    1
}

fn default_limit() -> u32 {
    10
}

#[derive(Debug, Serialize)]
pub struct ApplicationListResponse {
    pub data: Vec<Application>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
}

// =========================================================================
// API Router
// =========================================================================

/// Create the API router
pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/applications", post(create_application))
        .route("/applications", get(list_applications))
        .route("/applications/number/:number", get(get_application_by_number))
        .route("/applications/:id", get(get_application))
        .route("/applications/:id", patch(update_application))
        .route("/applications/:id/submit", post(submit_application))
        .route("/applications/:id/abandon", post(abandon_application))
        .route("/applications/:id/core-status", get(core_status))
}

// =========================================================================
// POST /applications
// =========================================================================

/// Open a new application in draft
async fn create_application(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(mut command): Json<CreateApplicationCommand>,
) -> Result<(StatusCode, Json<Application>), AppError> {
    command.source_ip = header_string(&headers, "x-forwarded-for");
    command.user_agent = header_string(&headers, "user-agent");

    let handler = CreateApplicationHandler::new(state.repository.clone());
    let application = handler.execute(command).await?;

    Ok((StatusCode::CREATED, Json(application)))
}

fn header_string(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
}

// =========================================================================
// GET /applications
// =========================================================================

/// List applications with filters and pagination
async fn list_applications(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ApplicationListResponse>, AppError> {
    let handler = FindApplicationHandler::new(state.repository.clone());

    let filters = ApplicationFilters {
        status: query.status,
        card_tier: query.card_tier,
        created_from: query.created_from,
        created_to: query.created_to,
        email: query.email,
        document_number: query.document_number,
    };
    let pagination = Pagination {
        page: query.page.max(1),
        limit: query.limit.clamp(1, 100),
    };

    let page = handler.list(filters, pagination).await?;

    Ok(Json(ApplicationListResponse {
        data: page.data,
        total: page.total,
        page: page.page,
        limit: page.limit,
    }))
}

// =========================================================================
// GET /applications/:id
// =========================================================================

/// Get one application by id
async fn get_application(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Application>, AppError> {
    let handler = FindApplicationHandler::new(state.repository.clone());
    let application = handler.by_id(id).await?;

    Ok(Json(application))
}

// =========================================================================
// GET /applications/number/:number
// =========================================================================

/// Get one application by its human-readable number
async fn get_application_by_number(
    State(state): State<AppState>,
    Path(number): Path<String>,
) -> Result<Json<Application>, AppError> {
    let handler = FindApplicationHandler::new(state.repository.clone());
    let application = handler.by_number(&number).await?;

    Ok(Json(application))
}

// =========================================================================
// PATCH /applications/:id
// =========================================================================

/// Patch a draft application section by section
async fn update_application(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(command): Json<UpdateApplicationCommand>,
) -> Result<Json<Application>, AppError> {
    let handler = UpdateApplicationHandler::new(state.repository.clone());
    let application = handler.execute(id, command).await?;

    Ok(Json(application))
}

// =========================================================================
// POST /applications/:id/submit
// =========================================================================

/// Run the submission workflow against the core banking system
async fn submit_application(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SubmissionResult>, AppError> {
    let handler = SubmitApplicationHandler::new(
        state.repository.clone(),
        state.gateway.clone(),
        state.retry,
    );
    let result = handler.execute(id).await?;

    Ok(Json(result))
}

// =========================================================================
// POST /applications/:id/abandon
// =========================================================================

/// Abandon an application
async fn abandon_application(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Application>, AppError> {
    let handler = AbandonApplicationHandler::new(state.repository.clone());
    let application = handler.execute(id).await?;

    Ok(Json(application))
}

// =========================================================================
// GET /applications/:id/core-status
// =========================================================================

/// Poll the core banking system for the registered application
async fn core_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CoreStatusReport>, AppError> {
    let handler = CoreStatusHandler::new(state.repository.clone(), state.gateway.clone());
    let report = handler.execute(id).await?;

    Ok(Json(report))
}
