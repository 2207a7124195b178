//! Common test utilities

// Not every test binary uses every helper
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;

use card_apply::domain::application::Address;
use card_apply::domain::{
    Application, CardTier, Channel, Consents, CoreStatus, DocumentType, EmploymentData,
    PersonalData, ProductRequest, RiskLevel,
};
use card_apply::gateway::{
    BureauReport, CoreBankingGateway, CoreStatusReport, GatewayError, QueryBureausRequest,
    RegisterApplicationRequest, RegisterApplicationResponse, ValidateClientRequest,
    ValidateClientResponse,
};
use card_apply::repository::{ApplicationRepository, InMemoryApplicationRepository};

// =========================================================================
// Scripted gateway
// =========================================================================

/// Gateway double with a per-operation script of outcomes.
///
/// Each call pops the front of its script; an empty script yields a
/// canned success. Call counts are tracked per operation.
#[derive(Default)]
pub struct ScriptedGateway {
    validate_script: Mutex<VecDeque<Result<ValidateClientResponse, GatewayError>>>,
    bureau_script: Mutex<VecDeque<Result<BureauReport, GatewayError>>>,
    register_script: Mutex<VecDeque<Result<RegisterApplicationResponse, GatewayError>>>,
    status_script: Mutex<VecDeque<Result<CoreStatusReport, GatewayError>>>,
    pub validate_calls: AtomicUsize,
    pub bureau_calls: AtomicUsize,
    pub register_calls: AtomicUsize,
    pub status_calls: AtomicUsize,
}

impl ScriptedGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script_validate(&self, outcome: Result<ValidateClientResponse, GatewayError>) {
        self.validate_script.lock().unwrap().push_back(outcome);
    }

    pub fn script_bureau(&self, outcome: Result<BureauReport, GatewayError>) {
        self.bureau_script.lock().unwrap().push_back(outcome);
    }

    pub fn script_register(&self, outcome: Result<RegisterApplicationResponse, GatewayError>) {
        self.register_script.lock().unwrap().push_back(outcome);
    }

    pub fn script_status(&self, outcome: Result<CoreStatusReport, GatewayError>) {
        self.status_script.lock().unwrap().push_back(outcome);
    }
}

pub fn transport_error() -> GatewayError {
    GatewayError::Transport("connection reset by peer".to_string())
}

pub fn ok_validation(document_number: &str) -> ValidateClientResponse {
    ValidateClientResponse {
        exists: true,
        is_current_client: true,
        core_client_id: Some(format!("CLI-{document_number}")),
        full_name: Some("Test Client".to_string()),
        client_status: Some("ACTIVE".to_string()),
    }
}

pub fn ok_bureau(score: i32, current_debt: Decimal) -> BureauReport {
    let risk_level = if score >= 700 {
        RiskLevel::Low
    } else if score >= 550 {
        RiskLevel::Medium
    } else {
        RiskLevel::High
    };

    BureauReport {
        score,
        risk_level,
        current_debt,
        available_limit: Decimal::from(5_000_000u64),
        debt_percentage: 20,
        active_obligations: 1,
        delinquencies_last_12_months: 0,
        succeeded: true,
    }
}

pub fn ok_registration(application_number: &str) -> RegisterApplicationResponse {
    RegisterApplicationResponse {
        success: true,
        core_application_id: "CORE-0001".to_string(),
        core_status: CoreStatus::PendingValidation,
        message: format!("application {application_number} registered in core banking"),
        created_at: Utc::now(),
    }
}

#[async_trait]
impl CoreBankingGateway for ScriptedGateway {
    async fn validate_client(
        &self,
        request: ValidateClientRequest,
    ) -> Result<ValidateClientResponse, GatewayError> {
        self.validate_calls.fetch_add(1, Ordering::SeqCst);
        self.validate_script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(ok_validation(&request.document_number)))
    }

    async fn query_risk_bureaus(
        &self,
        _request: QueryBureausRequest,
    ) -> Result<BureauReport, GatewayError> {
        self.bureau_calls.fetch_add(1, Ordering::SeqCst);
        self.bureau_script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(ok_bureau(780, Decimal::from(1_000_000u64))))
    }

    async fn register_application(
        &self,
        request: RegisterApplicationRequest,
    ) -> Result<RegisterApplicationResponse, GatewayError> {
        self.register_calls.fetch_add(1, Ordering::SeqCst);
        self.register_script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(ok_registration(&request.application_number)))
    }

    async fn query_status(
        &self,
        core_application_id: &str,
    ) -> Result<CoreStatusReport, GatewayError> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        self.status_script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Ok(CoreStatusReport {
                    core_application_id: core_application_id.to_string(),
                    core_status: CoreStatus::InReview,
                    notes: Some("application under review by the credit area".to_string()),
                    approved_limit: None,
                    assigned_analyst: None,
                    updated_at: Utc::now(),
                })
            })
    }
}

// =========================================================================
// Fixtures
// =========================================================================

pub fn sample_personal_data() -> PersonalData {
    PersonalData {
        first_name: "Lucía".to_string(),
        last_name: "Rincón".to_string(),
        document_type: DocumentType::Cc,
        document_number: "1030405060".to_string(),
        birth_date: NaiveDate::from_ymd_opt(1991, 9, 3).unwrap(),
        email: "lucia@example.com".to_string(),
        phone: "3167788990".to_string(),
        residence_address: Address {
            street: "Cra 50 # 26-20".to_string(),
            city: "Bogotá".to_string(),
            state: "Cundinamarca".to_string(),
            postal_code: Some("111321".to_string()),
        },
    }
}

pub fn full_consents() -> Consents {
    Consents {
        accepts_terms: true,
        terms_accepted_at: Some(Utc::now()),
        accepts_data_processing: true,
        authorizes_bureau_query: true,
    }
}

/// A complete draft ready to submit: income 5M, Clasica card, 4M limit
pub fn submittable_draft() -> Application {
    Application::create(
        "APP-20260827-00001".to_string(),
        sample_personal_data(),
        EmploymentData {
            monthly_income: Some(Decimal::from(5_000_000u64)),
            ..Default::default()
        },
        ProductRequest {
            card_tier: Some(CardTier::Clasica),
            requested_limit: Some(Decimal::from(4_000_000u64)),
            ..Default::default()
        },
        full_consents(),
        Channel::Web,
    )
}

pub async fn seed(
    repository: &Arc<InMemoryApplicationRepository>,
    application: Application,
) -> Application {
    repository.save(application).await.unwrap()
}
