//! Abandon Application Handler

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::Application;
use crate::error::{AppError, AppResult};
use crate::repository::ApplicationRepository;

pub struct AbandonApplicationHandler {
    repository: Arc<dyn ApplicationRepository>,
}

impl AbandonApplicationHandler {
    pub fn new(repository: Arc<dyn ApplicationRepository>) -> Self {
        Self { repository }
    }

    pub async fn execute(&self, id: Uuid) -> AppResult<Application> {
        let mut application = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(id.to_string()))?;

        application.abandon()?;

        let application = self.repository.update(&application).await?;
        tracing::info!(
            application_number = application.application_number(),
            "application abandoned"
        );

        Ok(application)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::application::Address;
    use crate::domain::{
        ApplicationStatus, Channel, Consents, DocumentType, DomainError, EmploymentData,
        PersonalData, ProductRequest,
    };
    use crate::repository::InMemoryApplicationRepository;
    use chrono::NaiveDate;

    async fn seeded_draft(repository: &Arc<InMemoryApplicationRepository>) -> Application {
        let application = Application::create(
            "APP-20260827-00001".to_string(),
            PersonalData {
                first_name: "Iván".to_string(),
                last_name: "Castro".to_string(),
                document_type: DocumentType::Cc,
                document_number: "52998877".to_string(),
                birth_date: NaiveDate::from_ymd_opt(1995, 8, 9).unwrap(),
                email: "ivan@example.com".to_string(),
                phone: "3124455667".to_string(),
                residence_address: Address {
                    street: "Cra 15 # 93-60".to_string(),
                    city: "Bogotá".to_string(),
                    state: "Cundinamarca".to_string(),
                    postal_code: None,
                },
            },
            EmploymentData::default(),
            ProductRequest::default(),
            Consents::default(),
            Channel::CallCenter,
        );
        repository.save(application).await.unwrap()
    }

    #[tokio::test]
    async fn test_abandon_draft_persists_terminal_state() {
        let repository = Arc::new(InMemoryApplicationRepository::new());
        let draft = seeded_draft(&repository).await;
        let handler = AbandonApplicationHandler::new(repository.clone());

        let abandoned = handler.execute(draft.id().unwrap()).await.unwrap();

        assert_eq!(abandoned.status(), ApplicationStatus::Abandoned);
        let stored = repository
            .find_by_id(draft.id().unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.status(), ApplicationStatus::Abandoned);
    }

    #[tokio::test]
    async fn test_abandon_twice_is_rejected() {
        let repository = Arc::new(InMemoryApplicationRepository::new());
        let draft = seeded_draft(&repository).await;
        let handler = AbandonApplicationHandler::new(repository);

        handler.execute(draft.id().unwrap()).await.unwrap();
        let result = handler.execute(draft.id().unwrap()).await;

        assert!(matches!(
            result,
            Err(AppError::Domain(DomainError::InvalidTransition { .. }))
        ));
    }
}
