//! card_apply - Credit card application processing backend API
//!
//! Manages the lifecycle of credit card applications: draft intake,
//! business-rule validation, submission against the core banking system
//! and automatic decisioning.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use sqlx::postgres::PgPoolOptions;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub mod api;
mod config;
mod db;
pub mod domain;
mod error;
pub mod gateway;
pub mod handlers;
pub mod integration;
pub mod repository;

pub use config::{Config, CoreGatewayMode};
pub use error::{AppError, AppResult};

use api::AppState;
use gateway::{CoreBankingGateway, HttpCoreBankingGateway, SimulatedCoreBanking};
use integration::RetryPolicy;
use repository::PgApplicationRepository;

/// Initialize tracing/logging
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "card_apply=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Build the application router
fn build_router(state: AppState, mock_core: Option<Arc<SimulatedCoreBanking>>) -> Router {
    let mut router = Router::new()
        // Health check
        .route("/health", axum::routing::get(health_check))
        .nest("/api/v1", api::create_router().with_state(state));

    // The mock core endpoints let the HTTP gateway run end to end
    // against this very process in development
    if let Some(simulator) = mock_core {
        router = router.nest("/mock/core/v1", api::create_mock_router(simulator));
    }

    router.layer(TraceLayer::new_for_http())
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    init_tracing();

    // Load configuration
    let config = Config::from_env()?;
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    tracing::info!("Starting card_apply server");
    tracing::info!("Connecting to database...");

    // Create database pool
    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(&config.database_url)
        .await?;

    db::verify_connection(&pool).await?;

    if config.is_production() {
        if !db::check_schema(&pool).await? {
            tracing::error!("Database schema is not complete. Please run migrations.");
            return Err(anyhow::anyhow!("Database schema incomplete"));
        }
    } else {
        db::ensure_schema(&pool).await?;
    }

    tracing::info!("Database connected successfully");

    let repository = Arc::new(PgApplicationRepository::new(pool.clone()));

    let gateway: Arc<dyn CoreBankingGateway> = match config.core_gateway_mode {
        CoreGatewayMode::Simulated => {
            tracing::info!("Core banking gateway: in-process simulator");
            Arc::new(SimulatedCoreBanking::new())
        }
        CoreGatewayMode::Http => {
            tracing::info!(url = %config.core_api_url, "Core banking gateway: HTTP");
            Arc::new(HttpCoreBankingGateway::new(
                config.core_api_url.clone(),
                config.core_api_key.as_deref(),
                config.core_timeout,
            )?)
        }
    };

    let state = AppState {
        repository,
        gateway,
        retry: RetryPolicy::new(config.core_retry_max_attempts, config.core_backoff_base),
    };

    // Mock core endpoints are only mounted outside production
    let mock_core = (!config.is_production()).then(|| Arc::new(SimulatedCoreBanking::new()));

    tracing::info!("Listening on http://{}", addr);

    // Build router and start server
    let app = build_router(state, mock_core);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    // Graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Cleanup
    tracing::info!("Server shutting down...");
    pool.close().await;
    tracing::info!("Database connections closed. Goodbye!");

    Ok(())
}

/// Shutdown signal handler for graceful shutdown
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}
