//! In-memory application repository
//!
//! Backs the integration tests and local experimentation; behaves like
//! the PostgreSQL repository for everything the use cases observe.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{day_prefix, ApplicationFilters, ApplicationRepository, Page, Pagination};
use crate::domain::Application;
use crate::error::AppError;

#[derive(Default)]
pub struct InMemoryApplicationRepository {
    applications: RwLock<HashMap<Uuid, Application>>,
    sequence: AtomicU32,
}

impl InMemoryApplicationRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn matches(application: &Application, filters: &ApplicationFilters) -> bool {
        if let Some(status) = filters.status {
            if application.status() != status {
                return false;
            }
        }
        if let Some(tier) = filters.card_tier {
            if application.product_request().card_tier != Some(tier) {
                return false;
            }
        }
        if let Some(from) = filters.created_from {
            if application.metadata().created_at < from {
                return false;
            }
        }
        if let Some(to) = filters.created_to {
            if application.metadata().created_at > to {
                return false;
            }
        }
        if let Some(email) = &filters.email {
            if &application.personal_data().email != email {
                return false;
            }
        }
        if let Some(document_number) = &filters.document_number {
            if &application.personal_data().document_number != document_number {
                return false;
            }
        }
        true
    }
}

#[async_trait]
impl ApplicationRepository for InMemoryApplicationRepository {
    async fn save(&self, mut application: Application) -> Result<Application, AppError> {
        let id = Uuid::new_v4();
        application.assign_id(id);
        self.applications
            .write()
            .await
            .insert(id, application.clone());
        Ok(application)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Application>, AppError> {
        Ok(self.applications.read().await.get(&id).cloned())
    }

    async fn find_by_number(
        &self,
        application_number: &str,
    ) -> Result<Option<Application>, AppError> {
        Ok(self
            .applications
            .read()
            .await
            .values()
            .find(|application| application.application_number() == application_number)
            .cloned())
    }

    async fn find_all(
        &self,
        filters: ApplicationFilters,
        pagination: Pagination,
    ) -> Result<Page<Application>, AppError> {
        let applications = self.applications.read().await;

        let mut matching: Vec<Application> = applications
            .values()
            .filter(|application| Self::matches(application, &filters))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.metadata().created_at.cmp(&a.metadata().created_at));

        let total = matching.len() as u64;
        let data = matching
            .into_iter()
            .skip(pagination.offset() as usize)
            .take(pagination.limit as usize)
            .collect();

        Ok(Page {
            data,
            total,
            page: pagination.page,
            limit: pagination.limit,
        })
    }

    async fn update(&self, application: &Application) -> Result<Application, AppError> {
        let id = application
            .id()
            .ok_or_else(|| AppError::Internal("cannot update an unsaved application".into()))?;

        let mut applications = self.applications.write().await;
        if !applications.contains_key(&id) {
            return Err(AppError::NotFound(id.to_string()));
        }
        applications.insert(id, application.clone());
        Ok(application.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        Ok(self.applications.write().await.remove(&id).is_some())
    }

    async fn generate_application_number(&self) -> Result<String, AppError> {
        let sequence = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(format!("{}-{sequence:05}", day_prefix(Utc::now())))
    }
}
