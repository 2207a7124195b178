//! Submit Application Handler
//!
//! Orchestrates the submission workflow: the draft is moved to
//! submitted, then each core banking step runs under the retry policy.
//! If any step exhausts its retries the application is compensated back
//! to draft, keeping the failure visible in the status history.

use std::sync::Arc;

use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::gateway::CoreBankingGateway;
use crate::integration::{with_retry, BankingIntegrationService, RetryPolicy};
use crate::repository::ApplicationRepository;

use super::{IntegrationSummary, SubmissionResult};

pub struct SubmitApplicationHandler {
    repository: Arc<dyn ApplicationRepository>,
    integration: BankingIntegrationService,
    retry: RetryPolicy,
}

impl SubmitApplicationHandler {
    pub fn new(
        repository: Arc<dyn ApplicationRepository>,
        gateway: Arc<dyn CoreBankingGateway>,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            integration: BankingIntegrationService::new(repository.clone(), gateway),
            repository,
            retry,
        }
    }

    pub async fn execute(&self, id: Uuid) -> AppResult<SubmissionResult> {
        let mut application = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(id.to_string()))?;

        // Guards draft status and full consents
        application.submit()?;
        self.repository.update(&application).await?;
        tracing::info!(
            application_number = application.application_number(),
            "submission started"
        );

        if let Err(err) = self.run_workflow(id).await {
            return Err(self.compensate(id, err).await);
        }

        let application = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(id.to_string()))?;

        tracing::info!(
            application_number = application.application_number(),
            status = %application.status(),
            "submission completed"
        );

        Ok(SubmissionResult {
            id,
            application_number: application.application_number().to_string(),
            status: application.status(),
            integration: IntegrationSummary {
                identity_validated: application.validation_state().identity_validated,
                credit_score: application.validation_state().credit_score,
                core_application_id: application.core_integration().core_application_id.clone(),
                sent_to_core: application.core_integration().sent,
            },
        })
    }

    /// The three core banking steps, in order, each under the retry policy
    async fn run_workflow(&self, id: Uuid) -> AppResult<()> {
        with_retry(self.retry, "client validation", || {
            self.integration.validate_client(id)
        })
        .await?;

        with_retry(self.retry, "bureau query", || {
            self.integration.query_risk_bureaus(id)
        })
        .await?;

        with_retry(self.retry, "core registration", || {
            self.integration.sync_with_core(id)
        })
        .await?;

        Ok(())
    }

    /// Roll the application back to draft so the user can retry later.
    /// The workflow error wins over any failure during the rollback.
    async fn compensate(&self, id: Uuid, workflow_err: AppError) -> AppError {
        let rollback = async {
            let mut application = self
                .repository
                .find_by_id(id)
                .await?
                .ok_or_else(|| AppError::NotFound(id.to_string()))?;

            application.revert_to_draft(format!("submission reverted: {workflow_err}"));
            self.repository.update(&application).await?;
            Ok::<(), AppError>(())
        };

        if let Err(rollback_err) = rollback.await {
            tracing::error!(
                error = %rollback_err,
                "failed to revert application to draft after submission failure"
            );
        }

        AppError::IntegrationFailed(workflow_err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::application::Address;
    use crate::domain::{
        Application, Channel, Consents, DocumentType, DomainError, EmploymentData, PersonalData,
        ProductRequest,
    };
    use crate::gateway::SimulatedCoreBanking;
    use crate::repository::InMemoryApplicationRepository;
    use chrono::NaiveDate;

    fn handler(
        repository: Arc<InMemoryApplicationRepository>,
    ) -> SubmitApplicationHandler {
        SubmitApplicationHandler::new(
            repository,
            Arc::new(SimulatedCoreBanking::with_seed(7)),
            RetryPolicy::default(),
        )
    }

    async fn seeded(
        repository: &Arc<InMemoryApplicationRepository>,
        consents: Consents,
    ) -> Application {
        let application = Application::create(
            "APP-20260827-00001".to_string(),
            PersonalData {
                first_name: "Nora".to_string(),
                last_name: "Vélez".to_string(),
                document_type: DocumentType::Cc,
                document_number: "41778899".to_string(),
                birth_date: NaiveDate::from_ymd_opt(1984, 2, 17).unwrap(),
                email: "nora@example.com".to_string(),
                phone: "3156677889".to_string(),
                residence_address: Address {
                    street: "Cl 127 # 9-45".to_string(),
                    city: "Bogotá".to_string(),
                    state: "Cundinamarca".to_string(),
                    postal_code: None,
                },
            },
            EmploymentData::default(),
            ProductRequest::default(),
            consents,
            Channel::Web,
        );
        repository.save(application).await.unwrap()
    }

    #[tokio::test]
    async fn test_submit_without_consents_is_rejected_before_any_core_call() {
        let repository = Arc::new(InMemoryApplicationRepository::new());
        let draft = seeded(&repository, Consents::default()).await;

        let result = handler(repository.clone()).execute(draft.id().unwrap()).await;

        assert!(matches!(
            result,
            Err(AppError::Domain(DomainError::ConsentsMissing))
        ));
        let stored = repository
            .find_by_id(draft.id().unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.core_integration().attempt_count, 0);
    }

    #[tokio::test]
    async fn test_submit_unknown_application_is_not_found() {
        let repository = Arc::new(InMemoryApplicationRepository::new());

        let result = handler(repository).execute(Uuid::new_v4()).await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
