//! Profanity Sieve API Gateway
//!
//! The entry point for classification requests.
//! Handles:
//! - Request validation
//! - Rate limiting
//! - Request routing
//! - Observability (logging, metrics, tracing)

mod handlers;
mod middleware;
mod validation;

use axum::{
    extract::DefaultBodyLimit,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use profanity_classifier::Classifier;
use profanity_common::{
    config::{AppConfig, ObservabilityConfig},
    index::create_index,
    metrics,
};
use std::sync::Arc;
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::middleware::{
    metrics::track_metrics,
    rate_limit::{rate_limit_middleware, RateLimitState},
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub classifier: Arc<Classifier>,
    pub metrics: Option<PrometheusHandle>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load()?;

    // Initialize tracing
    init_tracing(&config.observability);

    info!(
        service = %config.observability.service_name,
        "Starting Profanity Sieve Gateway v{}",
        profanity_common::VERSION
    );

    let config = Arc::new(config);

    // Initialize metrics
    let metrics_handle = if config.observability.metrics_enabled {
        let handle = PrometheusBuilder::new()
            .set_buckets(metrics::LATENCY_BUCKETS)?
            .install_recorder()?;
        metrics::register_metrics();
        Some(handle)
    } else {
        None
    };

    // Connect the similarity index
    info!(provider = %config.index.provider, "Connecting to similarity index...");
    let index = create_index(&config).await?;
    let classifier = Classifier::from_config(index, &config.classifier)?;

    info!(
        word_threshold = config.classifier.word_threshold,
        semantic_threshold = config.classifier.semantic_threshold,
        whitelist = config.classifier.whitelist.len(),
        "Classifier ready"
    );

    // Create app state
    let state = AppState {
        config: config.clone(),
        classifier: Arc::new(classifier),
        metrics: metrics_handle,
    };

    // Build the router
    let app = create_router(state);

    // Start the server
    let listener =
        tokio::net::TcpListener::bind((config.server.host.as_str(), config.server.port)).await?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

fn init_tracing(config: &ObservabilityConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    if config.json_logging {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Create the main application router
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Request ID propagation
    let request_id = SetRequestIdLayer::x_request_id(MakeRequestUuid);
    let propagate_id = PropagateRequestIdLayer::x_request_id();

    // Classification routes
    let mut classify_routes = Router::new()
        .route("/", post(handlers::classify::classify))
        .route("/v1/classify", post(handlers::classify::classify))
        .layer(DefaultBodyLimit::max(state.config.server.max_body_bytes));

    if state.config.rate_limit.enabled {
        let limiter = RateLimitState::new(&state.config.rate_limit);
        classify_routes = classify_routes.route_layer(from_fn_with_state(limiter, rate_limit_middleware));
    }

    // Compose the app
    Router::new()
        .merge(classify_routes)
        .route("/health", get(handlers::health::health))
        .route("/metrics", get(handlers::health::metrics))
        .route_layer(from_fn(track_metrics))
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
