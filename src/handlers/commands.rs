//! Command definitions
//!
//! Commands represent intentions to change the system state.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{
    ApplicationStatus, Channel, Consents, ConsentsPatch, EmploymentData, EmploymentDataPatch,
    PersonalData, PersonalDataPatch, ProductRequest, ProductRequestPatch,
};

// =========================================================================
// Commands
// =========================================================================

/// Command to open a new application in draft
#[derive(Debug, Clone, Deserialize)]
pub struct CreateApplicationCommand {
    pub personal_data: PersonalData,
    #[serde(default)]
    pub employment_data: EmploymentData,
    #[serde(default)]
    pub product_request: ProductRequest,
    #[serde(default)]
    pub consents: Consents,
    #[serde(default)]
    pub channel: Channel,
    #[serde(skip)]
    pub source_ip: Option<String>,
    #[serde(skip)]
    pub user_agent: Option<String>,
}

/// Command to patch a draft; absent sections are left untouched
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateApplicationCommand {
    #[serde(default)]
    pub personal_data: Option<PersonalDataPatch>,
    #[serde(default)]
    pub employment_data: Option<EmploymentDataPatch>,
    #[serde(default)]
    pub product_request: Option<ProductRequestPatch>,
    #[serde(default)]
    pub consents: Option<ConsentsPatch>,
}

impl UpdateApplicationCommand {
    pub fn is_empty(&self) -> bool {
        self.personal_data.is_none()
            && self.employment_data.is_none()
            && self.product_request.is_none()
            && self.consents.is_none()
    }
}

// =========================================================================
// Results
// =========================================================================

/// What the core banking integration achieved during a submission
#[derive(Debug, Clone, Serialize)]
pub struct IntegrationSummary {
    pub identity_validated: bool,
    pub credit_score: Option<i32>,
    pub core_application_id: Option<String>,
    pub sent_to_core: bool,
}

/// Result of a completed submission workflow
#[derive(Debug, Clone, Serialize)]
pub struct SubmissionResult {
    pub id: Uuid,
    pub application_number: String,
    pub status: ApplicationStatus,
    pub integration: IntegrationSummary,
}
