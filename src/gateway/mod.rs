//! Core Banking Gateway
//!
//! Abstraction boundary through which the application reaches the
//! external core banking system: client identity validation, credit
//! bureau queries, application registration and status polling.
//!
//! The gateway is always injected explicitly; nothing in this crate
//! reaches the core through an ambient client.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{
    CoreStatus, DocumentType, EmploymentData, PersonalData, ProductRequest, RiskLevel,
    ValidationState,
};

mod http;
mod simulator;

pub use http::HttpCoreBankingGateway;
pub use simulator::SimulatedCoreBanking;

// =========================================================================
// Wire types
// =========================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidateClientRequest {
    pub document_type: DocumentType,
    pub document_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidateClientResponse {
    pub exists: bool,
    pub is_current_client: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub core_client_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_status: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryBureausRequest {
    pub document_type: DocumentType,
    pub document_number: String,
    pub first_name: String,
    pub last_name: String,
}

/// Credit bureau query result. Score is on a 0-1000 scale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BureauReport {
    pub score: i32,
    pub risk_level: RiskLevel,
    pub current_debt: Decimal,
    pub available_limit: Decimal,
    pub debt_percentage: i32,
    pub active_obligations: u32,
    pub delinquencies_last_12_months: u32,
    pub succeeded: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterApplicationRequest {
    pub application_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub core_client_id: Option<String>,
    pub personal_data: PersonalData,
    pub employment_data: EmploymentData,
    pub product_request: ProductRequest,
    pub validations: ValidationState,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterApplicationResponse {
    pub success: bool,
    pub core_application_id: String,
    pub core_status: CoreStatus,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoreStatusReport {
    pub core_application_id: String,
    pub core_status: CoreStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approved_limit: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_analyst: Option<String>,
    pub updated_at: DateTime<Utc>,
}

// =========================================================================
// Errors
// =========================================================================

/// Failures reaching or talking to the core banking system.
///
/// All gateway failures are treated as transient by the submission
/// orchestrator and retried; after the retry budget they escalate.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("transport failure: {0}")]
    Transport(String),

    #[error("core banking service error ({status}): {message}")]
    Service { status: u16, message: String },

    #[error("invalid response from core banking: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            GatewayError::Service {
                status: status.as_u16(),
                message: err.to_string(),
            }
        } else {
            GatewayError::Transport(err.to_string())
        }
    }
}

// =========================================================================
// Contract
// =========================================================================

/// The four remote operations the lifecycle engine depends on
#[async_trait]
pub trait CoreBankingGateway: Send + Sync {
    /// Check whether the applicant already exists as a core client
    async fn validate_client(
        &self,
        request: ValidateClientRequest,
    ) -> Result<ValidateClientResponse, GatewayError>;

    /// Query the credit bureaus for score, debt and risk level
    async fn query_risk_bureaus(
        &self,
        request: QueryBureausRequest,
    ) -> Result<BureauReport, GatewayError>;

    /// Register the application in the core banking system
    async fn register_application(
        &self,
        request: RegisterApplicationRequest,
    ) -> Result<RegisterApplicationResponse, GatewayError>;

    /// Poll the core for the current status of a registered application
    async fn query_status(
        &self,
        core_application_id: &str,
    ) -> Result<CoreStatusReport, GatewayError>;
}
