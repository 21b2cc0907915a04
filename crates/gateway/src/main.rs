//! Copydesk API Gateway
//!
//! The entry point for all external API requests.
//! Handles:
//! - Authentication
//! - Two-level context/action routing
//! - The periodic auth-token cleanup task
//! - Observability (logging, metrics, tracing)

mod handlers;
mod router;

use axum::routing::{any, get};
use copydesk_common::{
    ams::Ams,
    auth::Authenticator,
    config::AppConfig,
    metrics,
    notify::create_notifier,
    store::{create_store, RowStore},
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::{info, Level};

use router::Router;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub router: Arc<Router>,
    pub store: Arc<dyn RowStore>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .with_target(true)
        .json()
        .init();

    info!("Starting Copydesk API Gateway v{}", copydesk_common::VERSION);

    // Load configuration
    let config = AppConfig::load().map_err(|e| {
        tracing::error!(error = %e, "Failed to load configuration");
        e
    })?;

    let config = Arc::new(config);

    // Initialize metrics
    metrics::register_metrics();
    if config.observability.metrics_port != 0 {
        let addr = SocketAddr::from(([0, 0, 0, 0], config.observability.metrics_port));
        metrics_exporter_prometheus::PrometheusBuilder::new()
            .with_http_listener(addr)
            .install()?;
        info!("Metrics exporter listening on {}", addr);
    }

    // Wire up the collaborators
    let store = create_store(&config.storage)?;
    let notifier = create_notifier(&config.mail);
    let ams = Arc::new(Ams::new(store.clone(), notifier));
    let authenticator = Arc::new(Authenticator::new(
        store.clone(),
        config.auth.token_ttl_minutes,
    ));

    // Periodic cleanup of expired auth tokens
    let sweeper = authenticator.clone();
    let cleanup_interval = config.cleanup_interval();
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(cleanup_interval);
        loop {
            ticker.tick().await;
            if let Err(e) = sweeper.purge_expired_tokens().await {
                tracing::warn!(error = %e, "Token cleanup failed");
            }
        }
    });

    // Create app state
    let state = AppState {
        config: config.clone(),
        router: Arc::new(Router::new(ams, authenticator)),
        store,
    };

    // Build the router
    let app = create_router(state);

    // Start the server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Create the main application router
fn create_router(state: AppState) -> axum::Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Request ID propagation
    let request_id = SetRequestIdLayer::x_request_id(MakeRequestUuid);
    let propagate_id = PropagateRequestIdLayer::x_request_id();

    axum::Router::new()
        // Health endpoints (no auth)
        .route("/health", get(handlers::health::health))
        .route("/ready", get(handlers::health::ready))
        // Everything else goes through the context/action dispatcher
        .route("/", any(handlers::dispatch::dispatch_root))
        .route("/{context}", any(handlers::dispatch::dispatch_context))
        .route("/{context}/{action}", any(handlers::dispatch::dispatch_action))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(request_id)
        .layer(propagate_id)
        .with_state(state)
}

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
        _ = ctrl_c => info!("Received Ctrl+C, starting shutdown..."),
        _ = terminate => info!("Received SIGTERM, starting shutdown..."),
    }
}
