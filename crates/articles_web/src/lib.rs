use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::any::Any;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

pub mod error;
pub mod handlers;
pub mod layer;
pub mod metrics;
pub mod state;

pub use error::ApiError;
pub use layer::MetricsLayer;
pub use metrics::Metrics;
pub use state::AppState;

pub fn create_app(state: AppState) -> Router {
    let articles = Router::new()
        .route("/articles", post(handlers::create_article))
        .route("/articles/:id", get(handlers::get_article));

    // Outermost first: panics become 500s before the metrics layer sees the status.
    let middleware = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(MetricsLayer::new(state.metrics.clone()))
        .layer(CatchPanicLayer::custom(panic_response as fn(_) -> _));

    Router::new()
        .route("/health", get(handlers::health))
        .route("/metrics", get(metrics::metrics_handler))
        .nest("/api/v1", articles)
        .layer(middleware)
        .with_state(Arc::new(state))
}

fn panic_response(err: Box<dyn Any + Send>) -> Response {
    let detail = err
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| err.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string());
    tracing::error!(layer = "handler", panic = %detail, "handler panicked");

    let body = json!({ "error": error::INTERNAL_MESSAGE });
    (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
}

/// Serve `app` until Ctrl-C or SIGTERM, letting in-flight requests finish.
pub async fn serve(listener: TcpListener, app: Router) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!("🚀 Listening on http://{}", addr);
    }
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for ctrl-c: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, draining connections");
}
