use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    routing::{get, post},
    Json, Router,
};
use tokio::signal;
use tower::ServiceBuilder;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tracing::{error, info};

use epay_backend::api;
use epay_backend::config::AppConfig;
use epay_backend::database;
use epay_backend::database::transaction_repository::TransactionRepository;
use epay_backend::directory::client::DirectoryClient;
use epay_backend::gateway::client::GatewayClient;
use epay_backend::health::{HealthChecker, HealthState, HealthStatus};
use epay_backend::logging::init_tracing;
use epay_backend::middleware::logging::{request_logging_middleware, UuidRequestId};
use epay_backend::services::{CallbackReconciler, InquiryService, PaymentIntakeService};

/// Graceful shutdown signal handler
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

    info!("Shutdown signal received, starting graceful shutdown");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::from_env()?;
    config.validate()?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        gateway_environment = %config.gateway.environment,
        "🚀 Starting payment collection service"
    );

    info!("📊 Initializing database connection pool...");
    let db_pool = database::init_pool_from_config(&config.database)
        .await
        .map_err(|e| {
            error!("Failed to initialize database pool: {}", e);
            e
        })?;
    database::run_migrations(&db_pool).await?;
    info!("✅ Database ready");

    let transactions = TransactionRepository::new(db_pool.clone());
    let intake = Arc::new(PaymentIntakeService::new(transactions.clone()));
    let reconciler = Arc::new(CallbackReconciler::new(
        transactions.clone(),
        config.gateway.clone(),
    ));
    let inquiry = Arc::new(InquiryService::new(
        transactions,
        config.gateway.currency_code.clone(),
    ));
    let gateway_client = Arc::new(GatewayClient::new(config.gateway.clone())?);
    let directory_client = Arc::new(DirectoryClient::new(config.directory.clone())?);
    let health_checker = HealthChecker::new(db_pool);

    let payment_routes = Router::new()
        .route("/api/payments", post(api::payments::create_payment))
        .with_state(Arc::new(api::payments::PaymentsState { intake }));

    let token_routes = Router::new()
        .route("/api/payment/token", post(api::tokens::request_token))
        .with_state(Arc::new(api::tokens::TokensState {
            gateway: gateway_client,
        }));

    let callback_routes = Router::new()
        .route(
            "/api/payment/backend-return",
            post(api::callbacks::backend_return),
        )
        .with_state(Arc::new(api::callbacks::CallbacksState { reconciler }));

    let inquiry_routes = Router::new()
        .route("/api/payment/inquiry", post(api::inquiry::payment_inquiry))
        .with_state(Arc::new(api::inquiry::InquiryState { inquiry }));

    let member_routes = Router::new()
        .route(
            "/api/members",
            get(api::members::search_member).post(api::members::search_member_post),
        )
        .with_state(Arc::new(api::members::MembersState {
            directory: directory_client.clone(),
        }));

    let tracking_routes = Router::new()
        .route("/api/tracking", get(api::tracking::search_tracking))
        .with_state(Arc::new(api::tracking::TrackingState {
            directory: directory_client,
        }));

    info!("🛣️  Setting up application routes...");
    let app = Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .route("/health/live", get(liveness))
        .merge(payment_routes)
        .merge(token_routes)
        .merge(callback_routes)
        .merge(inquiry_routes)
        .merge(member_routes)
        .merge(tracking_routes)
        .with_state(AppState { health_checker })
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
                .layer(axum::middleware::from_fn(request_logging_middleware))
                .layer(PropagateRequestIdLayer::x_request_id()),
        );

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await.map_err(|e| {
        error!("❌ Failed to bind to address {}: {}", addr, e);
        e
    })?;

    info!(address = %addr, "🚀 Server listening on http://{}", addr);
    info!("✅ Server is ready to accept connections");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("👋 Server shutdown complete");

    Ok(())
}

// Application state for the root and health endpoints
#[derive(Clone)]
struct AppState {
    health_checker: HealthChecker,
}

async fn root() -> &'static str {
    "Payment collection service API"
}

async fn health(
    axum::extract::State(state): axum::extract::State<AppState>,
) -> Result<Json<HealthStatus>, (axum::http::StatusCode, String)> {
    let health_status = state.health_checker.check_health().await;

    // Return 503 if any component is unhealthy
    if matches!(health_status.status, HealthState::Unhealthy) {
        error!("❌ Health check failed - service unhealthy");
        Err((
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            "Service Unavailable".to_string(),
        ))
    } else {
        Ok(Json(health_status))
    }
}

/// Readiness probe - checks if the service is ready to accept traffic
async fn readiness(
    state: axum::extract::State<AppState>,
) -> Result<Json<HealthStatus>, (axum::http::StatusCode, String)> {
    health(state).await
}

/// Liveness probe - checks if the service is alive (basic check)
async fn liveness() -> &'static str {
    "OK"
}
