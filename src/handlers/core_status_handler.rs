//! Core Status Handler
//!
//! Polls the core banking system for a registered application and
//! mirrors terminal outcomes onto the aggregate.

use std::sync::Arc;

use uuid::Uuid;

use crate::error::AppResult;
use crate::gateway::{CoreBankingGateway, CoreStatusReport};
use crate::integration::BankingIntegrationService;
use crate::repository::ApplicationRepository;

pub struct CoreStatusHandler {
    integration: BankingIntegrationService,
}

impl CoreStatusHandler {
    pub fn new(
        repository: Arc<dyn ApplicationRepository>,
        gateway: Arc<dyn CoreBankingGateway>,
    ) -> Self {
        Self {
            integration: BankingIntegrationService::new(repository, gateway),
        }
    }

    pub async fn execute(&self, id: Uuid) -> AppResult<CoreStatusReport> {
        self.integration.query_core_status(id).await
    }
}
