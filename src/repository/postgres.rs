//! PostgreSQL application repository
//!
//! One row per application: indexed columns for the common lookups, the
//! aggregate itself serialized as a JSONB document. The entity is the
//! source of truth; columns are projections for filtering and ordering.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use super::{day_prefix, next_sequence, ApplicationFilters, ApplicationRepository, Page, Pagination};
use crate::domain::Application;
use crate::error::AppError;

pub struct PgApplicationRepository {
    pool: PgPool,
}

impl PgApplicationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn serialize(application: &Application) -> Result<serde_json::Value, AppError> {
        serde_json::to_value(application)
            .map_err(|e| AppError::Internal(format!("failed to serialize application: {e}")))
    }

    fn deserialize(document: serde_json::Value) -> Result<Application, AppError> {
        serde_json::from_value(document)
            .map_err(|e| AppError::Internal(format!("failed to deserialize application: {e}")))
    }
}

#[async_trait]
impl ApplicationRepository for PgApplicationRepository {
    async fn save(&self, mut application: Application) -> Result<Application, AppError> {
        let id = Uuid::new_v4();
        application.assign_id(id);
        let document = Self::serialize(&application)?;

        sqlx::query(
            r#"
            INSERT INTO applications (id, application_number, status, created_at, updated_at, document)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(id)
        .bind(application.application_number())
        .bind(application.status().as_str())
        .bind(application.metadata().created_at)
        .bind(application.metadata().updated_at)
        .bind(&document)
        .execute(&self.pool)
        .await?;

        Ok(application)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Application>, AppError> {
        let document: Option<serde_json::Value> =
            sqlx::query_scalar("SELECT document FROM applications WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        document.map(Self::deserialize).transpose()
    }

    async fn find_by_number(
        &self,
        application_number: &str,
    ) -> Result<Option<Application>, AppError> {
        let document: Option<serde_json::Value> =
            sqlx::query_scalar("SELECT document FROM applications WHERE application_number = $1")
                .bind(application_number)
                .fetch_optional(&self.pool)
                .await?;

        document.map(Self::deserialize).transpose()
    }

    async fn find_all(
        &self,
        filters: ApplicationFilters,
        pagination: Pagination,
    ) -> Result<Page<Application>, AppError> {
        let status = filters.status.map(|s| s.as_str().to_string());
        let card_tier = filters.card_tier.map(|t| t.to_string());

        const WHERE_CLAUSE: &str = r#"
            ($1::text IS NULL OR status = $1)
            AND ($2::text IS NULL OR document->'product_request'->>'card_tier' = $2)
            AND ($3::timestamptz IS NULL OR created_at >= $3)
            AND ($4::timestamptz IS NULL OR created_at <= $4)
            AND ($5::text IS NULL OR document->'personal_data'->>'email' = $5)
            AND ($6::text IS NULL OR document->'personal_data'->>'document_number' = $6)
        "#;

        let query = format!(
            "SELECT document FROM applications WHERE {WHERE_CLAUSE} \
             ORDER BY created_at DESC LIMIT $7 OFFSET $8"
        );
        let documents: Vec<serde_json::Value> = sqlx::query_scalar(&query)
            .bind(&status)
            .bind(&card_tier)
            .bind(filters.created_from)
            .bind(filters.created_to)
            .bind(&filters.email)
            .bind(&filters.document_number)
            .bind(pagination.limit as i64)
            .bind(pagination.offset() as i64)
            .fetch_all(&self.pool)
            .await?;

        let count_query = format!("SELECT COUNT(*) FROM applications WHERE {WHERE_CLAUSE}");
        let total: i64 = sqlx::query_scalar(&count_query)
            .bind(&status)
            .bind(&card_tier)
            .bind(filters.created_from)
            .bind(filters.created_to)
            .bind(&filters.email)
            .bind(&filters.document_number)
            .fetch_one(&self.pool)
            .await?;

        let data = documents
            .into_iter()
            .map(Self::deserialize)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Page {
            data,
            total: total as u64,
            page: pagination.page,
            limit: pagination.limit,
        })
    }

    async fn update(&self, application: &Application) -> Result<Application, AppError> {
        let id = application
            .id()
            .ok_or_else(|| AppError::Internal("cannot update an unsaved application".into()))?;
        let document = Self::serialize(application)?;

        let result = sqlx::query(
            r#"
            UPDATE applications
            SET status = $2, updated_at = $3, document = $4
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(application.status().as_str())
        .bind(application.metadata().updated_at)
        .bind(&document)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(id.to_string()));
        }

        Ok(application.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM applications WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn generate_application_number(&self) -> Result<String, AppError> {
        let prefix = day_prefix(Utc::now());

        let last: Option<String> = sqlx::query_scalar(
            r#"
            SELECT application_number FROM applications
            WHERE application_number LIKE $1
            ORDER BY application_number DESC
            LIMIT 1
            "#,
        )
        .bind(format!("{prefix}-%"))
        .fetch_optional(&self.pool)
        .await?;

        let sequence = next_sequence(last.as_deref());
        Ok(format!("{prefix}-{sequence:05}"))
    }
}
