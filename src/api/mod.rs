//! API module
//!
//! HTTP API endpoints and the mock core banking routes.

pub mod mock_core;
pub mod routes;

pub use mock_core::create_mock_router;
pub use routes::{create_router, AppState};
