//! Domain layer
//!
//! The application aggregate, its enumerations, and the pure business
//! rules (validation and automatic decision). Nothing here touches the
//! network or the database.

pub mod application;
pub mod decision;
pub mod enums;
pub mod error;
pub mod validation;

pub use application::{
    Address, Application, Consents, ConsentsPatch, CoreIntegration, EmploymentData,
    EmploymentDataPatch, Metadata, PersonalData, PersonalDataPatch, ProductRequest,
    ProductRequestPatch, StatusEntry, ValidationState,
};
pub use decision::{decide, Decision, DecisionAction};
pub use enums::{ApplicationStatus, CardTier, Channel, CoreStatus, DocumentType, RiskLevel};
pub use error::DomainError;
pub use validation::{validate_all, ValidationResult};
