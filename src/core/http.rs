//! HTTP endpoint server using Axum

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Instant;
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{error, info, warn, Level};

use crate::core::runtime::{AnalysisRuntime, RunError};
use crate::core::scheduler::JobScheduler;
use crate::metrics::Metrics;
use crate::services::error::NotifyError;

const SERVICE_NAME: &str = "swingscan";

#[derive(Clone)]
pub struct AppState {
    pub runtime: Arc<AnalysisRuntime>,
    pub scheduler: Option<Arc<JobScheduler>>,
    pub metrics: Arc<Metrics>,
    pub start_time: Arc<Instant>,
}

impl AppState {
    pub fn new(
        runtime: Arc<AnalysisRuntime>,
        scheduler: Option<Arc<JobScheduler>>,
        metrics: Arc<Metrics>,
    ) -> Self {
        Self {
            runtime,
            scheduler,
            metrics,
            start_time: Arc::new(Instant::now()),
        }
    }
}

async fn index() -> Json<Value> {
    Json(json!({
        "service": SERVICE_NAME,
        "status": "running",
        "endpoints": ["/health", "/status", "/analyze", "/report", "/test", "/metrics"],
    }))
}

pub async fn health_check(State(state): State<AppState>) -> Json<Value> {
    let last_run = state.runtime.last_run().await;
    let scheduler_running = match &state.scheduler {
        Some(scheduler) => scheduler.is_running().await,
        None => false,
    };

    Json(json!({
        "status": "healthy",
        "service": SERVICE_NAME,
        "uptime_seconds": state.start_time.elapsed().as_secs(),
        "scheduler_running": scheduler_running,
        "last_run": last_run,
    }))
}

async fn status(State(state): State<AppState>) -> Json<Value> {
    let last_run = state.runtime.last_run().await;
    let config = state.runtime.engine().config();
    let (cron, next_run) = match &state.scheduler {
        Some(scheduler) => (Some(scheduler.cron_expr().to_string()), scheduler.next_run()),
        None => (None, None),
    };

    Json(json!({
        "running": state.runtime.is_running(),
        "last_run": last_run,
        "schedule": cron,
        "next_run": next_run,
        "config": {
            "min_score": config.min_score,
            "min_market_cap": config.min_market_cap,
            "max_candidates": config.max_candidates,
            "weights": config.weights,
            "levels": config.levels,
        },
    }))
}

/// Start a run in the background; 409 while one is in progress
async fn trigger_analysis(State(state): State<AppState>) -> Response {
    if state.runtime.is_running() {
        return (
            StatusCode::CONFLICT,
            Json(json!({ "status": "already_running" })),
        )
            .into_response();
    }

    let runtime = state.runtime.clone();
    tokio::spawn(async move {
        match runtime.run_once().await {
            Ok(_) => {}
            Err(RunError::AlreadyRunning) => {
                info!("HTTP: manual analysis raced with another run, skipped");
            }
            Err(e) => error!(error = %e, "HTTP: manual analysis failed"),
        }
    });

    info!("HTTP: manual analysis triggered");
    (
        StatusCode::ACCEPTED,
        Json(json!({ "status": "started" })),
    )
        .into_response()
}

async fn latest_report(State(state): State<AppState>) -> Response {
    match state.runtime.latest_report().await {
        Some(report) => Json(report.as_ref().clone()).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "no report available yet" })),
        )
            .into_response(),
    }
}

async fn test_notification(State(state): State<AppState>) -> Response {
    match state.runtime.send_test_message().await {
        Ok(()) => Json(json!({ "status": "sent" })).into_response(),
        Err(NotifyError::NotConfigured) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "error", "error": "notifier not configured" })),
        )
            .into_response(),
        Err(e) => {
            warn!(error = %e, "HTTP: test notification failed");
            (
                StatusCode::BAD_GATEWAY,
                Json(json!({ "status": "error", "error": e.to_string() })),
            )
                .into_response()
        }
    }
}

pub async fn metrics_handler(State(state): State<AppState>) -> Result<String, StatusCode> {
    state
        .metrics
        .export()
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

/// Middleware to track HTTP request metrics
async fn metrics_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    state.metrics.http_requests_in_flight.inc();
    let response = next.run(request).await;
    let status = response.status();
    let duration = start.elapsed();
    state.metrics.http_requests_in_flight.dec();

    state.metrics.http_requests_total.inc();
    state
        .metrics
        .http_request_duration_seconds
        .observe(duration.as_secs_f64());

    if status.is_server_error() {
        error!(
            method = %method,
            path = %path,
            status = %status,
            duration_ms = duration.as_millis(),
            "HTTP request error"
        );
    }

    response
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health_check))
        .route("/status", get(status))
        .route("/analyze", get(trigger_analysis).post(trigger_analysis))
        .route("/report", get(latest_report))
        .route("/test", get(test_notification))
        .route("/metrics", get(metrics_handler))
        .layer(
            ServiceBuilder::new()
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(DefaultMakeSpan::new().level(Level::DEBUG))
                        .on_request(DefaultOnRequest::new().level(Level::DEBUG))
                        .on_response(DefaultOnResponse::new().level(Level::DEBUG)),
                )
                .layer(axum::middleware::from_fn_with_state(
                    state.clone(),
                    metrics_middleware,
                ))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

pub async fn start_server(
    port: u16,
    state: AppState,
    shutdown: impl std::future::Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;

    info!(port = port, "HTTP server listening on port {}", port);
    info!(
        "Metrics endpoint available at http://0.0.0.0:{}/metrics",
        port
    );
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
}
