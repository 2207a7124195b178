//! Application Aggregate
//!
//! Application is the core aggregate for credit card applications.
//! It owns the lifecycle state machine and enforces transition guards;
//! all status changes go through its methods and are appended to the
//! status history.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::{
    ApplicationStatus, CardTier, Channel, ContractType, CoreStatus, DocumentType,
    EmploymentStatus, Franchise, RiskLevel,
};
use super::error::DomainError;

// =========================================================================
// Value objects
// =========================================================================

/// Residence address of the applicant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub street: String,
    pub city: String,
    pub state: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
}

/// Identity and contact data of the applicant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonalData {
    pub first_name: String,
    pub last_name: String,
    pub document_type: DocumentType,
    pub document_number: String,
    pub birth_date: NaiveDate,
    pub email: String,
    pub phone: String,
    pub residence_address: Address,
}

/// Employment and income data, filled in progressively while in draft
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmploymentData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employment_status: Option<EmploymentStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contract_type: Option<ContractType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenure_months: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monthly_income: Option<Decimal>,
}

/// Requested card product
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card_tier: Option<CardTier>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requested_limit: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub franchise: Option<Franchise>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra_insurance: Option<bool>,
}

/// Consent flags, all three must be accepted before submission
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Consents {
    #[serde(default)]
    pub accepts_terms: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terms_accepted_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub accepts_data_processing: bool,
    #[serde(default)]
    pub authorizes_bureau_query: bool,
}

/// Results of the external validations, written only by the integration service
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationState {
    #[serde(default)]
    pub identity_validated: bool,
    #[serde(default)]
    pub bureaus_queried: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credit_score: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_level: Option<RiskLevel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_debt: Option<Decimal>,
}

/// Last error recorded while talking to the core banking system
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoreError {
    pub code: String,
    pub message: String,
    pub at: DateTime<Utc>,
}

/// Correlation with the core banking system and its failure history
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CoreIntegration {
    #[serde(default)]
    pub sent: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sent_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub core_application_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub core_status: Option<CoreStatus>,
    /// Incremented on every send attempt, success or failure. Never resets.
    #[serde(default)]
    pub attempt_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error: Option<CoreError>,
}

/// One entry of the append-only status history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusEntry {
    pub status: ApplicationStatus,
    pub at: DateTime<Utc>,
    pub note: String,
}

/// Bookkeeping metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_ip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    #[serde(default)]
    pub channel: Channel,
}

// =========================================================================
// Patches (shallow per-section merges, draft only)
// =========================================================================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PersonalDataPatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub document_type: Option<DocumentType>,
    pub document_number: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub residence_address: Option<Address>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EmploymentDataPatch {
    pub employment_status: Option<EmploymentStatus>,
    pub contract_type: Option<ContractType>,
    pub company_name: Option<String>,
    pub job_title: Option<String>,
    pub tenure_months: Option<u32>,
    pub monthly_income: Option<Decimal>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductRequestPatch {
    pub card_tier: Option<CardTier>,
    pub requested_limit: Option<Decimal>,
    pub franchise: Option<Franchise>,
    pub extra_insurance: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConsentsPatch {
    pub accepts_terms: Option<bool>,
    pub accepts_data_processing: Option<bool>,
    pub authorizes_bureau_query: Option<bool>,
}

impl PersonalData {
    fn merge(&mut self, patch: PersonalDataPatch) {
        if let Some(v) = patch.first_name {
            self.first_name = v;
        }
        if let Some(v) = patch.last_name {
            self.last_name = v;
        }
        if let Some(v) = patch.document_type {
            self.document_type = v;
        }
        if let Some(v) = patch.document_number {
            self.document_number = v;
        }
        if let Some(v) = patch.birth_date {
            self.birth_date = v;
        }
        if let Some(v) = patch.email {
            self.email = v;
        }
        if let Some(v) = patch.phone {
            self.phone = v;
        }
        if let Some(v) = patch.residence_address {
            self.residence_address = v;
        }
    }
}

impl EmploymentData {
    fn merge(&mut self, patch: EmploymentDataPatch) {
        if patch.employment_status.is_some() {
            self.employment_status = patch.employment_status;
        }
        if patch.contract_type.is_some() {
            self.contract_type = patch.contract_type;
        }
        if patch.company_name.is_some() {
            self.company_name = patch.company_name;
        }
        if patch.job_title.is_some() {
            self.job_title = patch.job_title;
        }
        if patch.tenure_months.is_some() {
            self.tenure_months = patch.tenure_months;
        }
        if patch.monthly_income.is_some() {
            self.monthly_income = patch.monthly_income;
        }
    }
}

impl ProductRequest {
    fn merge(&mut self, patch: ProductRequestPatch) {
        if patch.card_tier.is_some() {
            self.card_tier = patch.card_tier;
        }
        if patch.requested_limit.is_some() {
            self.requested_limit = patch.requested_limit;
        }
        if patch.franchise.is_some() {
            self.franchise = patch.franchise;
        }
        if patch.extra_insurance.is_some() {
            self.extra_insurance = patch.extra_insurance;
        }
    }
}

impl Consents {
    fn merge(&mut self, patch: ConsentsPatch, now: DateTime<Utc>) {
        if let Some(v) = patch.accepts_terms {
            self.accepts_terms = v;
            if v && self.terms_accepted_at.is_none() {
                self.terms_accepted_at = Some(now);
            }
        }
        if let Some(v) = patch.accepts_data_processing {
            self.accepts_data_processing = v;
        }
        if let Some(v) = patch.authorizes_bureau_query {
            self.authorizes_bureau_query = v;
        }
    }

    pub fn all_accepted(&self) -> bool {
        self.accepts_terms && self.accepts_data_processing && self.authorizes_bureau_query
    }
}

// =========================================================================
// Aggregate
// =========================================================================

/// Credit card application aggregate
///
/// State is mutated in place through guarded methods. The status history
/// is append-only: one entry per transition, never truncated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Application {
    /// Assigned by the repository on first persistence
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<Uuid>,

    /// Human-readable unique number, immutable after creation
    application_number: String,

    status: ApplicationStatus,
    personal_data: PersonalData,
    #[serde(default)]
    employment_data: EmploymentData,
    #[serde(default)]
    product_request: ProductRequest,
    #[serde(default)]
    consents: Consents,
    #[serde(default)]
    validation_state: ValidationState,
    #[serde(default)]
    core_integration: CoreIntegration,
    status_history: Vec<StatusEntry>,
    metadata: Metadata,
}

impl Application {
    /// Create a new application in draft with exactly one history entry
    pub fn create(
        application_number: String,
        personal_data: PersonalData,
        employment_data: EmploymentData,
        product_request: ProductRequest,
        consents: Consents,
        channel: Channel,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: None,
            application_number,
            status: ApplicationStatus::Draft,
            personal_data,
            employment_data,
            product_request,
            consents,
            validation_state: ValidationState::default(),
            core_integration: CoreIntegration::default(),
            status_history: vec![StatusEntry {
                status: ApplicationStatus::Draft,
                at: now,
                note: "application created".to_string(),
            }],
            metadata: Metadata {
                created_at: now,
                updated_at: now,
                source_ip: None,
                user_agent: None,
                channel,
            },
        }
    }

    // =====================================================================
    // Getters
    // =====================================================================

    pub fn id(&self) -> Option<Uuid> {
        self.id
    }

    pub fn application_number(&self) -> &str {
        &self.application_number
    }

    pub fn status(&self) -> ApplicationStatus {
        self.status
    }

    pub fn personal_data(&self) -> &PersonalData {
        &self.personal_data
    }

    pub fn employment_data(&self) -> &EmploymentData {
        &self.employment_data
    }

    pub fn product_request(&self) -> &ProductRequest {
        &self.product_request
    }

    pub fn consents(&self) -> &Consents {
        &self.consents
    }

    pub fn validation_state(&self) -> &ValidationState {
        &self.validation_state
    }

    pub fn core_integration(&self) -> &CoreIntegration {
        &self.core_integration
    }

    pub fn status_history(&self) -> &[StatusEntry] {
        &self.status_history
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn is_draft(&self) -> bool {
        self.status == ApplicationStatus::Draft
    }

    pub fn can_be_updated(&self) -> bool {
        self.is_draft()
    }

    pub fn can_be_submitted(&self) -> bool {
        self.is_draft() && self.consents.all_accepted()
    }

    pub fn can_be_abandoned(&self) -> bool {
        !self.status.is_terminal() && self.status != ApplicationStatus::Abandoned
    }

    /// Used by the repository when the row is first inserted
    pub fn assign_id(&mut self, id: Uuid) {
        self.id = Some(id);
    }

    /// Attach request metadata captured at creation time
    pub fn set_request_metadata(&mut self, source_ip: Option<String>, user_agent: Option<String>) {
        self.metadata.source_ip = source_ip;
        self.metadata.user_agent = user_agent;
    }

    // =====================================================================
    // State transitions
    // =====================================================================

    /// Submit the draft for review. Requires draft status and all consents.
    pub fn submit(&mut self) -> Result<(), DomainError> {
        if !self.is_draft() {
            return Err(DomainError::invalid_transition(self.status, "submit"));
        }
        if !self.consents.all_accepted() {
            return Err(DomainError::ConsentsMissing);
        }
        self.change_state(ApplicationStatus::Submitted, "application submitted for review");
        Ok(())
    }

    /// Abandon the application. Not allowed once approved or rejected.
    pub fn abandon(&mut self) -> Result<(), DomainError> {
        if !self.can_be_abandoned() {
            return Err(DomainError::invalid_transition(self.status, "abandon"));
        }
        self.change_state(ApplicationStatus::Abandoned, "application abandoned by the user");
        Ok(())
    }

    // approve/reject/send_to_manual_review are deliberately unguarded:
    // the integration service invokes them from any post-submission state,
    // and the upstream call sites carry the precondition.

    pub fn approve(&mut self, reason: impl Into<String>) {
        self.change_state(ApplicationStatus::Approved, reason);
    }

    pub fn reject(&mut self, reason: impl Into<String>) {
        self.change_state(ApplicationStatus::Rejected, reason);
    }

    pub fn send_to_manual_review(&mut self, reason: impl Into<String>) {
        self.change_state(ApplicationStatus::InReview, reason);
    }

    /// Compensating transition used by the submission orchestrator
    pub fn revert_to_draft(&mut self, reason: impl Into<String>) {
        self.change_state(ApplicationStatus::Draft, reason);
    }

    fn change_state(&mut self, new_status: ApplicationStatus, note: impl Into<String>) {
        self.status = new_status;
        self.status_history.push(StatusEntry {
            status: new_status,
            at: Utc::now(),
            note: note.into(),
        });
        self.touch();
    }

    // =====================================================================
    // Draft updates
    // =====================================================================

    pub fn update_personal_data(&mut self, patch: PersonalDataPatch) -> Result<(), DomainError> {
        self.ensure_editable()?;
        self.personal_data.merge(patch);
        self.touch();
        Ok(())
    }

    pub fn update_employment_data(
        &mut self,
        patch: EmploymentDataPatch,
    ) -> Result<(), DomainError> {
        self.ensure_editable()?;
        self.employment_data.merge(patch);
        self.touch();
        Ok(())
    }

    pub fn update_product_request(
        &mut self,
        patch: ProductRequestPatch,
    ) -> Result<(), DomainError> {
        self.ensure_editable()?;
        self.product_request.merge(patch);
        self.touch();
        Ok(())
    }

    pub fn update_consents(&mut self, patch: ConsentsPatch) -> Result<(), DomainError> {
        self.ensure_editable()?;
        let now = Utc::now();
        self.consents.merge(patch, now);
        self.touch();
        Ok(())
    }

    fn ensure_editable(&self) -> Result<(), DomainError> {
        if !self.can_be_updated() {
            return Err(DomainError::NotEditable(self.status));
        }
        Ok(())
    }

    // =====================================================================
    // Integration mutators (unguarded: they run mid-submission)
    // =====================================================================

    pub fn mark_identity_validated(&mut self, validated: bool, core_client_id: Option<String>) {
        self.validation_state.identity_validated = validated;
        if let Some(client_id) = core_client_id {
            // The core uses the client correlation id until registration
            // assigns the definitive application id.
            self.core_integration.core_application_id = Some(client_id);
        }
        self.touch();
    }

    pub fn update_credit_score(&mut self, score: i32, risk_level: RiskLevel, current_debt: Decimal) {
        self.validation_state.bureaus_queried = true;
        self.validation_state.credit_score = Some(score);
        self.validation_state.risk_level = Some(risk_level);
        self.validation_state.current_debt = Some(current_debt);
        self.touch();
    }

    pub fn mark_sent_to_core(&mut self, core_application_id: String, core_status: CoreStatus) {
        self.core_integration.sent = true;
        self.core_integration.sent_at = Some(Utc::now());
        self.core_integration.core_application_id = Some(core_application_id);
        self.core_integration.core_status = Some(core_status);
        self.core_integration.attempt_count += 1;
        self.touch();
    }

    pub fn record_core_error(&mut self, code: impl Into<String>, message: impl Into<String>) {
        self.core_integration.attempt_count += 1;
        self.core_integration.last_error = Some(CoreError {
            code: code.into(),
            message: message.into(),
            at: Utc::now(),
        });
        self.touch();
    }

    pub fn update_core_status(&mut self, core_status: CoreStatus) {
        self.core_integration.core_status = Some(core_status);
        self.touch();
    }

    fn touch(&mut self) {
        self.metadata.updated_at = Utc::now();
    }
}

// =========================================================================
// Tests
// =========================================================================
