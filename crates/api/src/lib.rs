//! Traffic Violation API Server
//!
//! REST API for the violation rule engine: citizen self-checks, officer field
//! recording, record listing and payment, statistics.

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_governor::GovernorLayer;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

pub mod config;
pub mod error;
pub mod rate_limit;
pub mod routes;

use crate::config::{LoggingConfig, ServiceConfig};
use data_validator::{ValidationConfig, Validator};
use rule_engine::RuleSet;
use storage::Repository;

/// Application state shared across handlers
pub struct AppState {
    /// Violation record storage
    pub repository: Repository,
    /// Boundary validation for submitted stops
    pub validator: Validator,
    /// Rules every stop is evaluated against
    pub rules: RuleSet,
    /// Prometheus exporter, when installed
    pub metrics: Option<PrometheusHandle>,
    /// Version string
    pub version: String,
    /// Start time
    pub start_time: std::time::Instant,
}

impl AppState {
    /// Create new application state with the standard rule table
    pub fn new(repository: Repository, validator: Validator) -> Self {
        Self {
            repository,
            validator,
            rules: RuleSet::standard(),
            metrics: None,
            version: env!("CARGO_PKG_VERSION").to_string(),
            start_time: std::time::Instant::now(),
        }
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: i64,
    pub version: String,
    pub uptime_seconds: u64,
    pub components: ComponentStatus,
    pub metrics: SystemMetrics,
}

/// Component status
#[derive(Debug, Serialize)]
pub struct ComponentStatus {
    pub database: ComponentHealth,
}

/// Individual component health
#[derive(Debug, Serialize)]
pub struct ComponentHealth {
    pub status: String,
    pub backend: String,
}

/// System metrics
#[derive(Debug, Serialize)]
pub struct SystemMetrics {
    pub record_count: u64,
    pub rule_count: usize,
}

/// Create the application router
pub fn create_router(state: Arc<AppState>, config: &ServiceConfig) -> Router {
    let mut writes: Router<Arc<AppState>> = Router::new()
        .route(
            "/api/v1/check-violation",
            post(routes::checks::check_violation),
        )
        .route("/api/v1/officer/records", post(routes::records::record_stop))
        .route(
            "/api/v1/violations/:id/pay",
            post(routes::violations::pay_violation),
        )
        .route(
            "/api/v1/violations/:id/payment-status",
            put(routes::violations::set_payment_status),
        );

    if let Some(governor) = rate_limit::create_governor_config(&config.rate_limit) {
        writes = writes.layer(GovernorLayer { config: governor });
    }

    let mut router = Router::new()
        .route("/api/v1/health", get(health_handler))
        .route("/api/v1/violations", get(routes::violations::get_violations))
        .route("/api/v1/violations/:id", get(routes::violations::get_violation))
        .route("/api/v1/statistics", get(routes::stats::get_statistics))
        .route("/metrics", get(metrics_handler))
        .merge(writes)
        .layer(TraceLayer::new_for_http());

    if config.server.enable_cors {
        router = router.layer(CorsLayer::permissive());
    }

    router.with_state(state)
}

/// Health check handler
async fn health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let (database_status, record_count) = match state.repository.count().await {
        Ok(count) => ("ok", count),
        Err(e) => {
            warn!("Health check could not count records: {}", e);
            ("error", 0)
        }
    };

    let response = HealthResponse {
        status: if database_status == "ok" {
            "healthy".to_string()
        } else {
            "degraded".to_string()
        },
        timestamp: chrono::Utc::now().timestamp(),
        version: state.version.clone(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        components: ComponentStatus {
            database: ComponentHealth {
                status: database_status.to_string(),
                backend: state.repository.backend().to_string(),
            },
        },
        metrics: SystemMetrics {
            record_count,
            rule_count: state.rules.len(),
        },
    };

    Json(response)
}

/// Prometheus metrics handler
async fn metrics_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match &state.metrics {
        Some(handle) => (StatusCode::OK, handle.render()),
        None => (StatusCode::NOT_FOUND, "metrics exporter not installed".to_string()),
    }
}

/// Initialize logging
pub fn init_logging(config: &LoggingConfig) {
    let level = config.level.parse::<Level>().unwrap_or(Level::INFO);
    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true);

    let result = if config.json {
        tracing::subscriber::set_global_default(builder.json().finish())
    } else {
        tracing::subscriber::set_global_default(builder.finish())
    };

    if let Err(e) = result {
        eprintln!("Failed to set tracing subscriber: {e}");
    }
}

/// Run the server
pub async fn run_server(config: ServiceConfig) -> anyhow::Result<()> {
    let repository = Repository::open(&config.storage).await?;
    let validator = Validator::new(ValidationConfig::from(&config.validation));
    let mut state = AppState::new(repository, validator);

    if config.server.enable_metrics {
        match PrometheusBuilder::new().install_recorder() {
            Ok(handle) => state = state.with_metrics(handle),
            Err(e) => warn!("Prometheus exporter not installed: {}", e),
        }
    }

    info!(
        "Using {} storage, {} rules",
        state.repository.backend(),
        state.rules.len()
    );
    let app = create_router(Arc::new(state), &config);

    info!("Starting API server on {}", config.server.listen_addr);

    let listener = tokio::net::TcpListener::bind(&config.server.listen_addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
