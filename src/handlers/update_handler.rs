//! Update Application Handler
//!
//! Applies per-section patches to a draft and re-checks the business
//! rules against the merged state before persisting.

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::{validate_all, Application};
use crate::error::{AppError, AppResult};
use crate::repository::ApplicationRepository;

use super::UpdateApplicationCommand;

pub struct UpdateApplicationHandler {
    repository: Arc<dyn ApplicationRepository>,
}

impl UpdateApplicationHandler {
    pub fn new(repository: Arc<dyn ApplicationRepository>) -> Self {
        Self { repository }
    }

    pub async fn execute(
        &self,
        id: Uuid,
        command: UpdateApplicationCommand,
    ) -> AppResult<Application> {
        let mut application = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(id.to_string()))?;

        if command.is_empty() {
            return Err(AppError::validation_failed(vec![
                "at least one section to update must be provided".to_string(),
            ]));
        }

        if let Some(patch) = command.personal_data {
            application.update_personal_data(patch)?;
        }
        if let Some(patch) = command.employment_data {
            application.update_employment_data(patch)?;
        }
        if let Some(patch) = command.product_request {
            application.update_product_request(patch)?;
        }
        if let Some(patch) = command.consents {
            application.update_consents(patch)?;
        }

        // Rules run against the merged state; nothing is persisted on failure
        let validation = validate_all(
            application.personal_data().birth_date,
            application.employment_data().monthly_income,
            application.product_request().card_tier,
            application.product_request().requested_limit,
        );
        if !validation.valid {
            return Err(AppError::validation_failed(validation.errors));
        }

        let application = self.repository.update(&application).await?;
        tracing::info!(
            application_number = application.application_number(),
            "application updated"
        );

        Ok(application)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::application::Address;
    use crate::domain::{
        CardTier, Channel, Consents, DocumentType, EmploymentData, EmploymentDataPatch,
        PersonalData, ProductRequest, ProductRequestPatch,
    };
    use crate::repository::InMemoryApplicationRepository;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    async fn seeded_draft(repository: &Arc<InMemoryApplicationRepository>) -> Application {
        let application = Application::create(
            "APP-20260827-00001".to_string(),
            PersonalData {
                first_name: "Marta".to_string(),
                last_name: "Silva".to_string(),
                document_type: DocumentType::Ce,
                document_number: "E-112233".to_string(),
                birth_date: NaiveDate::from_ymd_opt(1979, 11, 30).unwrap(),
                email: "marta@example.com".to_string(),
                phone: "3001112233".to_string(),
                residence_address: Address {
                    street: "Cl 45 # 12-80".to_string(),
                    city: "Medellín".to_string(),
                    state: "Antioquia".to_string(),
                    postal_code: None,
                },
            },
            EmploymentData {
                monthly_income: Some(dec!(4_000_000)),
                ..Default::default()
            },
            ProductRequest {
                card_tier: Some(CardTier::Oro),
                requested_limit: Some(dec!(10_000_000)),
                ..Default::default()
            },
            Consents::default(),
            Channel::Mobile,
        );
        repository.save(application).await.unwrap()
    }

    #[tokio::test]
    async fn test_update_merges_and_persists() {
        let repository = Arc::new(InMemoryApplicationRepository::new());
        let draft = seeded_draft(&repository).await;
        let handler = UpdateApplicationHandler::new(repository.clone());

        let updated = handler
            .execute(
                draft.id().unwrap(),
                UpdateApplicationCommand {
                    employment_data: Some(EmploymentDataPatch {
                        monthly_income: Some(dec!(5_000_000)),
                        ..Default::default()
                    }),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(
            updated.employment_data().monthly_income,
            Some(dec!(5_000_000))
        );
        // Untouched sections survive
        assert_eq!(updated.product_request().card_tier, Some(CardTier::Oro));
    }

    #[tokio::test]
    async fn test_update_breaking_a_rule_is_rejected_and_not_persisted() {
        let repository = Arc::new(InMemoryApplicationRepository::new());
        let draft = seeded_draft(&repository).await;
        let handler = UpdateApplicationHandler::new(repository.clone());

        // 20M breaks both the Oro cap and the 3x-income ratio
        let result = handler
            .execute(
                draft.id().unwrap(),
                UpdateApplicationCommand {
                    product_request: Some(ProductRequestPatch {
                        requested_limit: Some(dec!(20_000_000)),
                        ..Default::default()
                    }),
                    ..Default::default()
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::ValidationFailed { .. })));
        let stored = repository
            .find_by_id(draft.id().unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(
            stored.product_request().requested_limit,
            Some(dec!(10_000_000))
        );
    }

    #[tokio::test]
    async fn test_update_with_no_sections_is_rejected() {
        let repository = Arc::new(InMemoryApplicationRepository::new());
        let draft = seeded_draft(&repository).await;
        let handler = UpdateApplicationHandler::new(repository);

        let result = handler
            .execute(draft.id().unwrap(), UpdateApplicationCommand::default())
            .await;

        match result {
            Err(AppError::ValidationFailed { errors }) => {
                assert!(errors[0].contains("at least one section"));
            }
            other => panic!("expected a validation failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_update_missing_application_is_not_found() {
        let repository = Arc::new(InMemoryApplicationRepository::new());
        let handler = UpdateApplicationHandler::new(repository);

        let result = handler
            .execute(Uuid::new_v4(), UpdateApplicationCommand::default())
            .await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
