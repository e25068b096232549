//! Metrics collection and exposition.
//!
//! # Metrics
//! - `schema_repo_requests_total` (counter): requests by group, method, status
//! - `schema_repo_request_duration_seconds` (histogram): latency by group
//!
//! # Design Decisions
//! - Recording is always on; without an installed recorder the macros are no-ops
//! - The Prometheus recorder is global and installed at most once per process
//! - Each running server owns its scrape listener and releases it on `stop`

use std::net::SocketAddr;
use std::sync::Mutex;
use std::time::Instant;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
    routing::get,
    Router,
};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use crate::lifecycle::ShutdownSignal;

#[derive(Debug, Error)]
pub enum ExporterError {
    #[error("failed to install Prometheus recorder: {0}")]
    Recorder(#[from] BuildError),

    #[error("failed to bind metrics listener {address}: {source}")]
    Bind {
        address: SocketAddr,
        #[source]
        source: std::io::Error,
    },
}

static PROMETHEUS: Mutex<Option<PrometheusHandle>> = Mutex::new(None);

/// Handle to the process-wide Prometheus recorder, installing it on first use.
pub fn prometheus_handle() -> Result<PrometheusHandle, BuildError> {
    let mut slot = PROMETHEUS.lock().unwrap_or_else(|e| e.into_inner());
    if let Some(handle) = slot.as_ref() {
        return Ok(handle.clone());
    }
    let handle = PrometheusBuilder::new().install_recorder()?;
    *slot = Some(handle.clone());
    Ok(handle)
}

/// Scrape endpoint over a recorder handle.
pub fn exporter_router(handle: PrometheusHandle) -> Router {
    Router::new()
        .route("/metrics", get(render))
        .with_state(handle)
}

async fn render(State(handle): State<PrometheusHandle>) -> String {
    handle.run_upkeep();
    handle.render()
}

/// A scrape listener owned by one running server.
pub struct MetricsExporter {
    local_addr: SocketAddr,
    task: JoinHandle<std::io::Result<()>>,
}

impl MetricsExporter {
    /// Bind `addr` and serve `/metrics` until `signal` resolves.
    pub async fn start(addr: SocketAddr, signal: ShutdownSignal) -> Result<Self, ExporterError> {
        let handle = prometheus_handle()?;
        let bind_err = |source| ExporterError::Bind {
            address: addr,
            source,
        };
        let listener = TcpListener::bind(addr).await.map_err(bind_err)?;
        let local_addr = listener.local_addr().map_err(bind_err)?;

        let task = tokio::spawn(async move {
            axum::serve(listener, exporter_router(handle))
                .with_graceful_shutdown(signal.recv())
                .await
        });
        tracing::info!(address = %local_addr, "Metrics exporter listening");
        Ok(Self { local_addr, task })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Wait for the listener to close; the signal must already be triggered.
    pub async fn join(self) {
        match self.task.await {
            Ok(Ok(())) => tracing::debug!(address = %self.local_addr, "Metrics exporter stopped"),
            Ok(Err(e)) => tracing::warn!(address = %self.local_addr, error = %e, "Metrics exporter failed"),
            Err(e) => tracing::warn!(address = %self.local_addr, error = %e, "Metrics exporter task failed"),
        }
    }
}

pub fn record_request(group: &'static str, method: &str, status: u16, start: Instant) {
    metrics::counter!(
        "schema_repo_requests_total",
        "group" => group,
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!("schema_repo_request_duration_seconds", "group" => group)
        .record(start.elapsed().as_secs_f64());
}

/// Middleware recording one sample per request, labelled with its group.
pub async fn track_requests(
    State(group): State<&'static str>,
    request: Request,
    next: Next,
) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let response = next.run(request).await;
    record_request(group, &method, response.status().as_u16(), start);
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::Shutdown;

    #[test]
    fn recorder_is_shared_across_handles() {
        let first = prometheus_handle().unwrap();
        let second = prometheus_handle().unwrap();
        record_request("unit", "GET", 200, Instant::now());
        assert!(first.render().contains("schema_repo_requests_total"));
        assert!(second.render().contains("group=\"unit\""));
    }

    #[tokio::test]
    async fn exporter_releases_its_listener() {
        let shutdown = Shutdown::new();
        let exporter = MetricsExporter::start("127.0.0.1:0".parse().unwrap(), shutdown.subscribe())
            .await
            .unwrap();
        let addr = exporter.local_addr();

        let client = reqwest::Client::builder()
            .pool_max_idle_per_host(0)
            .no_proxy()
            .build()
            .unwrap();
        let res = client.get(format!("http://{addr}/metrics")).send().await.unwrap();
        assert_eq!(res.status(), 200);

        shutdown.trigger();
        exporter.join().await;
        assert!(tokio::net::TcpStream::connect(addr).await.is_err());
    }
}
