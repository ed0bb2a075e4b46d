//! FX Mentor Billing service entrypoint.

use std::sync::Arc;
use std::time::Duration;

use axum::http::HeaderValue;
use axum::routing::get;
use axum::Router;
use secrecy::SecretString;
use sqlx::postgres::PgPoolOptions;
use tokio::signal;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use fxmentor_billing::adapters::http::billing::{billing_router, health, BillingAppState};
use fxmentor_billing::adapters::paystack::PaystackGateway;
use fxmentor_billing::adapters::postgres::{
    PgAuditLog, PgPaymentLedger, PgProfileStore, PgSubscriptionStore,
};
use fxmentor_billing::config::AppConfig;
use fxmentor_billing::domain::billing::PaystackWebhookVerifier;

#[tokio::main]
async fn main() {
    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(config.server.log_level.clone()))
        .init();

    if let Err(e) = config.validate() {
        tracing::error!(error = %e, "Invalid configuration");
        std::process::exit(1);
    }

    let pool = match PgPoolOptions::new()
        .min_connections(config.database.min_connections)
        .max_connections(config.database.max_connections)
        .acquire_timeout(config.database.acquire_timeout())
        .connect(&config.database.url)
        .await
    {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!(error = %e, "Failed to connect to database");
            std::process::exit(1);
        }
    };

    if config.database.run_migrations {
        if let Err(e) = sqlx::migrate!("./migrations").run(&pool).await {
            tracing::error!(error = %e, "Failed to run migrations");
            std::process::exit(1);
        }
        tracing::info!("Database migrations applied");
    }

    let state = BillingAppState {
        ledger: Arc::new(PgPaymentLedger::new(pool.clone())),
        profiles: Arc::new(PgProfileStore::new(pool.clone())),
        subscriptions: Arc::new(PgSubscriptionStore::new(pool.clone())),
        audit: Arc::new(PgAuditLog::new(pool)),
        gateway: Arc::new(PaystackGateway::new(&config.paystack)),
        webhook_verifier: PaystackWebhookVerifier::new(config.paystack.secret_key.clone()),
        admin_api_key: SecretString::new(config.admin.api_key.clone()),
        site_url: config.paystack.site_url.clone(),
    };

    let cors = build_cors_layer(&config.server.cors_origins_list());

    let app = Router::new()
        .route("/health", get(health))
        .merge(billing_router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .with_state(state);

    let addr = config.server.socket_addr();
    tracing::info!(
        %addr,
        environment = ?config.server.environment,
        test_mode = config.paystack.is_test_mode(),
        "Billing service listening"
    );

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(error = %e, "Failed to bind listener");
            std::process::exit(1);
        }
    };

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!(error = %e, "Server error");
        std::process::exit(1);
    }
}

fn build_cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::new().allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();
    CorsLayer::new().allow_origin(AllowOrigin::list(origins))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, stopping gracefully");
}
