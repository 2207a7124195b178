//! Application Repository
//!
//! Persistence port for the application aggregate. Use cases and the
//! integration service depend on this trait, never on a concrete store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{Application, ApplicationStatus, CardTier};
use crate::error::AppError;

mod memory;
mod postgres;

pub use memory::InMemoryApplicationRepository;
pub use postgres::PgApplicationRepository;

/// Prefix of generated application numbers: `APP-YYYYMMDD-NNNNN`
pub const NUMBER_PREFIX: &str = "APP";

/// Listing filters; absent fields do not constrain the query
#[derive(Debug, Clone, Default)]
pub struct ApplicationFilters {
    pub status: Option<ApplicationStatus>,
    pub card_tier: Option<CardTier>,
    pub created_from: Option<DateTime<Utc>>,
    pub created_to: Option<DateTime<Utc>>,
    pub email: Option<String>,
    pub document_number: Option<String>,
}

/// 1-based page selection
#[derive(Debug, Clone, Copy)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self { page: 1, limit: 10 }
    }
}

impl Pagination {
    pub fn offset(&self) -> u32 {
        self.page.saturating_sub(1) * self.limit
    }
}

/// One page of results plus the unpaged total
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
}

#[async_trait]
pub trait ApplicationRepository: Send + Sync {
    /// Persist a new application; assigns its id
    async fn save(&self, application: Application) -> Result<Application, AppError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Application>, AppError>;

    async fn find_by_number(
        &self,
        application_number: &str,
    ) -> Result<Option<Application>, AppError>;

    async fn find_all(
        &self,
        filters: ApplicationFilters,
        pagination: Pagination,
    ) -> Result<Page<Application>, AppError>;

    /// Persist the current state of an already-saved application
    async fn update(&self, application: &Application) -> Result<Application, AppError>;

    async fn delete(&self, id: Uuid) -> Result<bool, AppError>;

    /// Unique number, monotonic within a day: `APP-YYYYMMDD-NNNNN`
    async fn generate_application_number(&self) -> Result<String, AppError>;
}

/// Next per-day sequence given the highest existing number for the day
fn next_sequence(last_number: Option<&str>) -> u32 {
    last_number
        .and_then(|number| number.rsplit('-').next())
        .and_then(|sequence| sequence.parse::<u32>().ok())
        .map_or(1, |sequence| sequence + 1)
}

/// Today's number prefix, e.g. `APP-20260827`
fn day_prefix(now: DateTime<Utc>) -> String {
    format!("{NUMBER_PREFIX}-{}", now.format("%Y%m%d"))
}
