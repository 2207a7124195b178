//! Domain Error Types
//!
//! Pure domain errors that don't depend on infrastructure.

use thiserror::Error;

use super::enums::ApplicationStatus;

/// Domain-specific errors
///
/// These errors represent guard violations on the application aggregate.
/// They are independent of the web/infrastructure layer.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    /// A guarded state transition was attempted from the wrong status
    #[error("Cannot {action} an application in status '{from}'")]
    InvalidTransition {
        from: ApplicationStatus,
        action: &'static str,
    },

    /// Submission requires all three consents
    #[error("All consents must be accepted before submission")]
    ConsentsMissing,

    /// Application data can only be edited while in draft
    #[error("Application in status '{0}' cannot be edited")]
    NotEditable(ApplicationStatus),
}

impl DomainError {
    pub fn invalid_transition(from: ApplicationStatus, action: &'static str) -> Self {
        Self::InvalidTransition { from, action }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_transition_message() {
        let err = DomainError::invalid_transition(ApplicationStatus::Approved, "abandon");
        assert!(err.to_string().contains("abandon"));
        assert!(err.to_string().contains("approved"));
    }

    #[test]
    fn test_not_editable_message() {
        let err = DomainError::NotEditable(ApplicationStatus::Submitted);
        assert!(err.to_string().contains("submitted"));
    }
}
