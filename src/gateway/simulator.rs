//! Simulated core banking system
//!
//! In-process stand-in for the real core, used in development and by the
//! mock HTTP endpoints. Response distributions follow the behavior the
//! real integration has to cope with: most applicants exist as clients,
//! scores land between 350 and 800, and registration occasionally fails
//! at the transport level.

use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use std::sync::Mutex;

use async_trait::async_trait;

use super::{
    BureauReport, CoreBankingGateway, CoreStatusReport, GatewayError, QueryBureausRequest,
    RegisterApplicationRequest, RegisterApplicationResponse, ValidateClientRequest,
    ValidateClientResponse,
};
use crate::domain::{CoreStatus, RiskLevel};

pub struct SimulatedCoreBanking {
    rng: Mutex<StdRng>,
}

impl SimulatedCoreBanking {
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Deterministic simulator for tests
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    fn rng(&self) -> std::sync::MutexGuard<'_, StdRng> {
        // A poisoned lock only happens if a panic occurred mid-sample;
        // the RNG state is still usable.
        self.rng.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for SimulatedCoreBanking {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CoreBankingGateway for SimulatedCoreBanking {
    async fn validate_client(
        &self,
        request: ValidateClientRequest,
    ) -> Result<ValidateClientResponse, GatewayError> {
        let (exists, is_current_client) = {
            let mut rng = self.rng();
            let exists = rng.gen_bool(0.7);
            (exists, exists && rng.gen_bool(0.5))
        };

        Ok(ValidateClientResponse {
            exists,
            is_current_client,
            core_client_id: exists.then(|| format!("CLI-{}", request.document_number)),
            full_name: exists.then(|| "Juan Pérez (simulated)".to_string()),
            client_status: is_current_client.then(|| "ACTIVE".to_string()),
        })
    }

    async fn query_risk_bureaus(
        &self,
        _request: QueryBureausRequest,
    ) -> Result<BureauReport, GatewayError> {
        let mut rng = self.rng();

        let score = rng.gen_range(350..=800);
        let current_debt: i64 = rng.gen_range(0..20_000_000);
        let available_limit: i64 = rng.gen_range(0..10_000_000);
        let active_obligations = rng.gen_range(0..5);
        let delinquencies_last_12_months = if rng.gen_bool(0.2) {
            rng.gen_range(0..3)
        } else {
            0
        };

        let risk_level = if score >= 700 {
            RiskLevel::Low
        } else if score >= 550 {
            RiskLevel::Medium
        } else {
            RiskLevel::High
        };

        let debt_percentage = if available_limit > 0 {
            (current_debt * 100 / (current_debt + available_limit)) as i32
        } else {
            0
        };

        Ok(BureauReport {
            score,
            risk_level,
            current_debt: Decimal::from(current_debt),
            available_limit: Decimal::from(available_limit),
            debt_percentage,
            active_obligations,
            delinquencies_last_12_months,
            succeeded: true,
        })
    }

    async fn register_application(
        &self,
        request: RegisterApplicationRequest,
    ) -> Result<RegisterApplicationResponse, GatewayError> {
        if self.rng().gen_bool(0.05) {
            return Err(GatewayError::Transport(
                "simulated connectivity failure with core banking".to_string(),
            ));
        }

        let now = Utc::now();
        Ok(RegisterApplicationResponse {
            success: true,
            core_application_id: format!("CORE-{}", now.timestamp_millis()),
            core_status: CoreStatus::PendingValidation,
            message: format!(
                "application {} registered in core banking",
                request.application_number
            ),
            created_at: now,
        })
    }

    async fn query_status(
        &self,
        core_application_id: &str,
    ) -> Result<CoreStatusReport, GatewayError> {
        let roll: f64 = self.rng().gen();

        let (core_status, notes, approved_limit) = if roll < 0.2 {
            (
                CoreStatus::PendingValidation,
                "awaiting document validation",
                None,
            )
        } else if roll < 0.5 {
            (
                CoreStatus::InReview,
                "application under review by the credit area",
                None,
            )
        } else if roll < 0.8 {
            let limit: i64 = self.rng().gen_range(2_000_000..17_000_000);
            (
                CoreStatus::Approved,
                "application approved by the credit committee",
                Some(Decimal::from(limit)),
            )
        } else {
            (
                CoreStatus::Rejected,
                "application does not meet credit policies",
                None,
            )
        };

        Ok(CoreStatusReport {
            core_application_id: core_application_id.to_string(),
            core_status,
            notes: Some(notes.to_string()),
            approved_limit,
            assigned_analyst: (core_status != CoreStatus::PendingValidation)
                .then(|| "credit.analyst@bank.example".to_string()),
            updated_at: Utc::now(),
        })
    }
}
