//! Create Application Handler
//!
//! Opens a new application in draft after checking the business rules.

use std::sync::Arc;

use crate::domain::{validate_all, Application};
use crate::error::{AppError, AppResult};
use crate::repository::ApplicationRepository;

use super::CreateApplicationCommand;

pub struct CreateApplicationHandler {
    repository: Arc<dyn ApplicationRepository>,
}

impl CreateApplicationHandler {
    pub fn new(repository: Arc<dyn ApplicationRepository>) -> Self {
        Self { repository }
    }

    pub async fn execute(&self, command: CreateApplicationCommand) -> AppResult<Application> {
        let validation = validate_all(
            command.personal_data.birth_date,
            command.employment_data.monthly_income,
            command.product_request.card_tier,
            command.product_request.requested_limit,
        );
        if !validation.valid {
            return Err(AppError::validation_failed(validation.errors));
        }

        let application_number = self.repository.generate_application_number().await?;

        let mut application = Application::create(
            application_number,
            command.personal_data,
            command.employment_data,
            command.product_request,
            command.consents,
            command.channel,
        );
        application.set_request_metadata(command.source_ip, command.user_agent);

        let application = self.repository.save(application).await?;
        tracing::info!(
            application_number = application.application_number(),
            "application created"
        );

        Ok(application)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::application::Address;
    use crate::domain::{
        ApplicationStatus, CardTier, Channel, Consents, DocumentType, EmploymentData, PersonalData,
        ProductRequest,
    };
    use crate::repository::InMemoryApplicationRepository;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn command(birth_year: i32, income: Option<rust_decimal::Decimal>) -> CreateApplicationCommand {
        CreateApplicationCommand {
            personal_data: PersonalData {
                first_name: "Carlos".to_string(),
                last_name: "Pérez".to_string(),
                document_type: DocumentType::Cc,
                document_number: "79551234".to_string(),
                birth_date: NaiveDate::from_ymd_opt(birth_year, 4, 2).unwrap(),
                email: "carlos@example.com".to_string(),
                phone: "3109876543".to_string(),
                residence_address: Address {
                    street: "Av 68 # 22-10".to_string(),
                    city: "Bogotá".to_string(),
                    state: "Cundinamarca".to_string(),
                    postal_code: Some("110911".to_string()),
                },
            },
            employment_data: EmploymentData {
                monthly_income: income,
                ..Default::default()
            },
            product_request: ProductRequest {
                card_tier: Some(CardTier::Clasica),
                requested_limit: Some(dec!(4_000_000)),
                ..Default::default()
            },
            consents: Consents::default(),
            channel: Channel::Web,
            source_ip: Some("10.0.0.9".to_string()),
            user_agent: None,
        }
    }

    #[tokio::test]
    async fn test_create_persists_a_draft_with_generated_number() {
        let repository = Arc::new(InMemoryApplicationRepository::new());
        let handler = CreateApplicationHandler::new(repository.clone());

        let application = handler.execute(command(1988, Some(dec!(2_000_000)))).await.unwrap();

        assert_eq!(application.status(), ApplicationStatus::Draft);
        assert!(application.application_number().starts_with("APP-"));
        assert!(application.id().is_some());
        assert_eq!(application.metadata().source_ip.as_deref(), Some("10.0.0.9"));

        let stored = repository
            .find_by_id(application.id().unwrap())
            .await
            .unwrap();
        assert!(stored.is_some());
    }

    #[tokio::test]
    async fn test_create_rejects_rule_violations_without_persisting() {
        let repository = Arc::new(InMemoryApplicationRepository::new());
        let handler = CreateApplicationHandler::new(repository.clone());

        // Income below the global minimum
        let result = handler.execute(command(1988, Some(dec!(1_000_000)))).await;

        assert!(matches!(result, Err(AppError::ValidationFailed { .. })));
        let page = repository
            .find_all(Default::default(), Default::default())
            .await
            .unwrap();
        assert_eq!(page.total, 0);
    }
}
