use axum::extract::State;
use axum::http::{header, StatusCode};
use prometheus::{
    HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts, Registry, TextEncoder,
};
use std::sync::Arc;
use tracing::error;

use crate::error::{ApiError, INTERNAL_MESSAGE};
use crate::AppState;

const CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Request metrics for one app instance, exposed on `GET /metrics`.
///
/// Each instance owns its registry, so two apps in one process never share
/// counters.
#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    requests_total: IntCounterVec,
    request_duration: HistogramVec,
    in_flight: IntGauge,
}

impl Metrics {
    pub fn new() -> prometheus::Result<Self> {
        let registry = Registry::new();

        let requests_total = IntCounterVec::new(
            Opts::new("http_requests_total", "Total number of HTTP requests"),
            &["method", "path", "status"],
        )?;
        let request_duration = HistogramVec::new(
            HistogramOpts::new(
                "http_request_duration_seconds",
                "HTTP request latency in seconds",
            ),
            &["method", "path"],
        )?;
        let in_flight = IntGauge::new(
            "http_requests_in_flight",
            "Number of HTTP requests currently being served",
        )?;

        registry.register(Box::new(requests_total.clone()))?;
        registry.register(Box::new(request_duration.clone()))?;
        registry.register(Box::new(in_flight.clone()))?;

        Ok(Self {
            registry,
            requests_total,
            request_duration,
            in_flight,
        })
    }

    pub(crate) fn request_started(&self) {
        self.in_flight.inc();
    }

    pub(crate) fn request_finished(&self, method: &str, path: &str, status: u16, seconds: f64) {
        self.in_flight.dec();
        let status = status.to_string();
        self.requests_total
            .with_label_values(&[method, path, status.as_str()])
            .inc();
        self.request_duration
            .with_label_values(&[method, path])
            .observe(seconds);
    }

    /// Render every registered metric in the Prometheus text format.
    pub fn encode(&self) -> prometheus::Result<String> {
        TextEncoder::new().encode_to_string(&self.registry.gather())
    }
}

/// `GET /metrics`
pub async fn metrics_handler(
    State(state): State<Arc<AppState>>,
) -> Result<([(header::HeaderName, &'static str); 1], String), ApiError> {
    let body = state.metrics.encode().map_err(|e| {
        error!(layer = "handler", error = %e, "failed to encode metrics");
        ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_MESSAGE)
    })?;
    Ok(([(header::CONTENT_TYPE, CONTENT_TYPE)], body))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_requests_per_label_set() {
        let metrics = Metrics::new().unwrap();

        metrics.request_started();
        metrics.request_finished("GET", "/api/v1/articles/{id}", 404, 0.002);
        metrics.request_started();
        metrics.request_finished("GET", "/api/v1/articles/{id}", 404, 0.001);

        let text = metrics.encode().unwrap();
        assert!(text.contains(
            r#"http_requests_total{method="GET",path="/api/v1/articles/{id}",status="404"} 2"#
        ));
        assert!(text.contains(
            r#"http_request_duration_seconds_count{method="GET",path="/api/v1/articles/{id}"} 2"#
        ));
        assert!(text.contains("http_requests_in_flight 0"));
    }

    #[test]
    fn instances_do_not_share_counters() {
        let first = Metrics::new().unwrap();
        let second = Metrics::new().unwrap();

        first.request_started();
        first.request_finished("POST", "/api/v1/articles", 201, 0.01);

        assert!(!second.encode().unwrap().contains("status=\"201\""));
    }
}
