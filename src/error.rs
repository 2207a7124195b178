//! Error handling module
//!
//! Centralized error types and HTTP response conversion.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::domain::DomainError;
use crate::gateway::GatewayError;

/// Application-wide Result type
pub type AppResult<T> = Result<T, AppError>;

/// Application error types
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Client errors (4xx)
    #[error("Application not found: {0}")]
    NotFound(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Validation failed: {}", .errors.join(". "))]
    ValidationFailed { errors: Vec<String> },

    // Domain errors
    #[error(transparent)]
    Domain(#[from] DomainError),

    // Integration errors (5xx towards the caller)
    /// One gateway call failed; retried by the orchestrator
    #[error("core banking {step} failed: {source}")]
    Integration {
        step: &'static str,
        #[source]
        source: GatewayError,
    },

    /// Retries exhausted; the submission was compensated
    #[error("core validation failed: {0}")]
    IntegrationFailed(String),

    // Server errors (5xx)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),
}

impl AppError {
    pub fn validation_failed(errors: Vec<String>) -> Self {
        Self::ValidationFailed { errors }
    }

    pub fn integration(step: &'static str, source: GatewayError) -> Self {
        Self::Integration { step, source }
    }

    /// Transient errors are worth another attempt; everything else is not.
    /// Only gateway failures are retried — repository errors propagate.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Integration { .. })
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub error_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_code, details) = match &self {
            // 404 Not Found
            AppError::NotFound(id) => (StatusCode::NOT_FOUND, "application_not_found", Some(id.clone())),

            // 400 Bad Request
            AppError::InvalidState(msg) => {
                (StatusCode::BAD_REQUEST, "invalid_state", Some(msg.clone()))
            }
            AppError::ValidationFailed { errors } => (
                StatusCode::BAD_REQUEST,
                "validation_failed",
                Some(errors.join(". ")),
            ),

            // Domain errors - map to appropriate HTTP status
            AppError::Domain(ref domain_err) => match domain_err {
                DomainError::InvalidTransition { .. } => (
                    StatusCode::BAD_REQUEST,
                    "invalid_transition",
                    Some(domain_err.to_string()),
                ),
                DomainError::ConsentsMissing => {
                    (StatusCode::BAD_REQUEST, "consents_missing", None)
                }
                DomainError::NotEditable(_) => (
                    StatusCode::BAD_REQUEST,
                    "not_editable",
                    Some(domain_err.to_string()),
                ),
            },

            // 502 Bad Gateway - the core banking system failed us
            AppError::Integration { step, source } => {
                tracing::error!(step, error = %source, "core banking call failed");
                (
                    StatusCode::BAD_GATEWAY,
                    "core_banking_error",
                    Some(source.to_string()),
                )
            }
            AppError::IntegrationFailed(msg) => {
                tracing::error!(error = %msg, "submission failed after retries");
                (
                    StatusCode::BAD_GATEWAY,
                    "integration_failed",
                    Some(msg.clone()),
                )
            }

            // 500 Internal Server Error
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "database_error", None)
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None)
            }
            AppError::Config(e) => {
                tracing::error!("Config error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "config_error", None)
            }
        };

        let body = ErrorResponse {
            error: self.to_string(),
            error_code: error_code.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}
