//! Find Application Handler
//!
//! Read-side lookups: by id, by application number, and filtered listing.

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::Application;
use crate::error::{AppError, AppResult};
use crate::repository::{ApplicationFilters, ApplicationRepository, Page, Pagination};

pub struct FindApplicationHandler {
    repository: Arc<dyn ApplicationRepository>,
}

impl FindApplicationHandler {
    pub fn new(repository: Arc<dyn ApplicationRepository>) -> Self {
        Self { repository }
    }

    pub async fn by_id(&self, id: Uuid) -> AppResult<Application> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(id.to_string()))
    }

    pub async fn by_number(&self, application_number: &str) -> AppResult<Application> {
        self.repository
            .find_by_number(application_number)
            .await?
            .ok_or_else(|| AppError::NotFound(application_number.to_string()))
    }

    pub async fn list(
        &self,
        filters: ApplicationFilters,
        pagination: Pagination,
    ) -> AppResult<Page<Application>> {
        self.repository.find_all(filters, pagination).await
    }
}
