//! Use case handlers
//!
//! One handler per operation over the application lifecycle. Handlers
//! own the orchestration; the domain owns the rules.

mod abandon_handler;
mod commands;
mod core_status_handler;
mod create_handler;
mod find_handler;
mod submit_handler;
mod update_handler;

pub use abandon_handler::AbandonApplicationHandler;
pub use commands::{
    CreateApplicationCommand, IntegrationSummary, SubmissionResult, UpdateApplicationCommand,
};
pub use core_status_handler::CoreStatusHandler;
pub use create_handler::CreateApplicationHandler;
pub use find_handler::FindApplicationHandler;
pub use submit_handler::SubmitApplicationHandler;
pub use update_handler::UpdateApplicationHandler;
