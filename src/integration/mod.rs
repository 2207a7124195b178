//! Core Banking Integration Service
//!
//! Drives the four remote operations against the gateway and keeps the
//! application aggregate in sync with their outcomes. Every failure is
//! recorded on the aggregate and persisted before the error propagates,
//! so the attempt history survives even when the caller gives up.

use std::sync::Arc;

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::{decide, Application, ApplicationStatus, CoreStatus, Decision, DecisionAction};
use crate::error::{AppError, AppResult};
use crate::gateway::{
    BureauReport, CoreBankingGateway, CoreStatusReport, GatewayError, QueryBureausRequest,
    RegisterApplicationRequest, RegisterApplicationResponse, ValidateClientRequest,
    ValidateClientResponse,
};
use crate::repository::ApplicationRepository;

pub mod retry;

pub use retry::{with_retry, RetryPolicy};

pub struct BankingIntegrationService {
    repository: Arc<dyn ApplicationRepository>,
    gateway: Arc<dyn CoreBankingGateway>,
}

impl BankingIntegrationService {
    pub fn new(
        repository: Arc<dyn ApplicationRepository>,
        gateway: Arc<dyn CoreBankingGateway>,
    ) -> Self {
        Self {
            repository,
            gateway,
        }
    }

    /// Validate the applicant's identity against the core client base.
    ///
    /// The aggregate records whatever the core answered: the existence
    /// flag becomes the validation result, and the client correlation id
    /// is stored only for current clients.
    pub async fn validate_client(&self, id: Uuid) -> AppResult<ValidateClientResponse> {
        let mut application = self.load(id).await?;

        let request = ValidateClientRequest {
            document_type: application.personal_data().document_type,
            document_number: application.personal_data().document_number.clone(),
            email: Some(application.personal_data().email.clone()),
        };

        match self.gateway.validate_client(request).await {
            Ok(response) => {
                // Only a current client has a usable correlation id
                let core_client_id = response
                    .is_current_client
                    .then(|| response.core_client_id.clone())
                    .flatten();
                application.mark_identity_validated(response.exists, core_client_id);
                self.repository.update(&application).await?;
                tracing::info!(
                    application_number = application.application_number(),
                    exists = response.exists,
                    "client identity validated"
                );
                Ok(response)
            }
            Err(err) => {
                self.record_failure(&mut application, "CLIENT_VALIDATION_ERROR", &err)
                    .await?;
                Err(AppError::integration("client validation", err))
            }
        }
    }

    /// Query the credit bureaus, store the score and apply the decision
    /// rules to the aggregate.
    pub async fn query_risk_bureaus(&self, id: Uuid) -> AppResult<(BureauReport, Decision)> {
        let mut application = self.load(id).await?;

        let request = QueryBureausRequest {
            document_type: application.personal_data().document_type,
            document_number: application.personal_data().document_number.clone(),
            first_name: application.personal_data().first_name.clone(),
            last_name: application.personal_data().last_name.clone(),
        };

        match self.gateway.query_risk_bureaus(request).await {
            Ok(report) => {
                application.update_credit_score(report.score, report.risk_level, report.current_debt);

                let monthly_income = application
                    .employment_data()
                    .monthly_income
                    .unwrap_or(Decimal::ZERO);
                let requested_limit = application
                    .product_request()
                    .requested_limit
                    .unwrap_or(Decimal::ZERO);
                let decision = decide(
                    report.score,
                    report.current_debt,
                    monthly_income,
                    requested_limit,
                );

                match decision.action {
                    DecisionAction::Approve => application.approve(decision.reason.clone()),
                    DecisionAction::Reject => application.reject(decision.reason.clone()),
                    DecisionAction::ManualReview => {
                        application.send_to_manual_review(decision.reason.clone())
                    }
                }

                self.repository.update(&application).await?;
                tracing::info!(
                    application_number = application.application_number(),
                    score = report.score,
                    action = ?decision.action,
                    "bureau query evaluated"
                );
                Ok((report, decision))
            }
            Err(err) => {
                self.record_failure(&mut application, "BUREAU_QUERY_ERROR", &err)
                    .await?;
                Err(AppError::integration("bureau query", err))
            }
        }
    }

    /// Register the application in the core banking system.
    ///
    /// Requires the application to have left draft; registering a draft
    /// would put an unconfirmed request on the core's books.
    pub async fn sync_with_core(&self, id: Uuid) -> AppResult<RegisterApplicationResponse> {
        let mut application = self.load(id).await?;

        if application.status() == ApplicationStatus::Draft {
            return Err(AppError::InvalidState(
                "cannot register a draft application in core banking".to_string(),
            ));
        }

        let request = RegisterApplicationRequest {
            application_number: application.application_number().to_string(),
            core_client_id: application.core_integration().core_application_id.clone(),
            personal_data: application.personal_data().clone(),
            employment_data: application.employment_data().clone(),
            product_request: application.product_request().clone(),
            validations: application.validation_state().clone(),
        };

        match self.gateway.register_application(request).await {
            Ok(response) => {
                application
                    .mark_sent_to_core(response.core_application_id.clone(), response.core_status);
                self.repository.update(&application).await?;
                tracing::info!(
                    application_number = application.application_number(),
                    core_application_id = %response.core_application_id,
                    "application registered in core banking"
                );
                Ok(response)
            }
            Err(err) => {
                self.record_failure(&mut application, "CORE_SYNC_ERROR", &err)
                    .await?;
                Err(AppError::integration("core registration", err))
            }
        }
    }

    /// Poll the core for the registered application's status and mirror
    /// terminal outcomes onto the aggregate.
    pub async fn query_core_status(&self, id: Uuid) -> AppResult<CoreStatusReport> {
        let mut application = self.load(id).await?;

        let core_application_id = application
            .core_integration()
            .core_application_id
            .clone()
            .ok_or_else(|| {
                AppError::InvalidState(
                    "application has not been registered in core banking".to_string(),
                )
            })?;

        match self.gateway.query_status(&core_application_id).await {
            Ok(report) => {
                application.update_core_status(report.core_status);

                match report.core_status {
                    CoreStatus::Approved => {
                        let limit = report
                            .approved_limit
                            .map(|l| l.to_string())
                            .unwrap_or_else(|| "n/a".to_string());
                        application.approve(format!("approved by core bank - limit: ${limit}"));
                    }
                    CoreStatus::Rejected => {
                        let reason = report
                            .notes
                            .clone()
                            .unwrap_or_else(|| "rejected by core bank".to_string());
                        application.reject(reason);
                    }
                    CoreStatus::PendingValidation | CoreStatus::InReview => {}
                }

                self.repository.update(&application).await?;
                Ok(report)
            }
            Err(err) => {
                self.record_failure(&mut application, "STATUS_QUERY_ERROR", &err)
                    .await?;
                Err(AppError::integration("status query", err))
            }
        }
    }

    async fn load(&self, id: Uuid) -> AppResult<Application> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(id.to_string()))
    }

    /// Persist the failure on the aggregate before the error propagates
    async fn record_failure(
        &self,
        application: &mut Application,
        code: &str,
        err: &GatewayError,
    ) -> AppResult<()> {
        application.record_core_error(code, err.to_string());
        self.repository.update(application).await?;
        Ok(())
    }
}
