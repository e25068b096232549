//! HTTP server lifecycle.
//!
//! # Responsibilities
//! - Bootstrap one service graph per server instance
//! - Build the router from the route table
//! - Bind the listener on `start`, release it on `stop`
//! - Enforce `Created → Running → Stopped`
//!
//! # Design Decisions
//! - `start`/`stop` take `&mut self`; transitions are serialized by the borrow checker
//! - A failed bind leaves the server in `Created`
//! - Dropping a running server triggers graceful shutdown
//! - The metrics scrape listener belongs to the running server and closes with it

use std::net::SocketAddr;

use axum::Router;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use url::Url;

use crate::config::Configuration;
use crate::error::ServerError;
use crate::graph::ServiceGraph;
use crate::http::routes;
use crate::lifecycle::startup::{self, ListenerSettings};
use crate::lifecycle::{LifecycleState, Shutdown};
use crate::observability::bridge::BridgeOutcome;
use crate::observability::metrics::MetricsExporter;

struct RunningServer {
    local_addr: SocketAddr,
    shutdown: Shutdown,
    task: JoinHandle<std::io::Result<()>>,
    metrics: Option<MetricsExporter>,
}

enum Phase {
    Created,
    Running(RunningServer),
    Stopped,
}

/// One HTTP listener bound to one service graph.
pub struct RepositoryServer {
    graph: ServiceGraph,
    settings: ListenerSettings,
    bridge: BridgeOutcome,
    router: Router,
    phase: Phase,
}

impl RepositoryServer {
    /// Build a server from overrides layered on the built-in defaults.
    pub fn new<I, K, V>(overrides: I) -> Result<Self, ServerError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        Self::with_configuration(Configuration::from_overrides(overrides))
    }

    pub fn with_configuration(config: Configuration) -> Result<Self, ServerError> {
        let startup::Bootstrap {
            graph,
            settings,
            bridge,
        } = startup::bootstrap(config)?;
        let router = routes::build_router(&graph, &settings);

        Ok(Self {
            graph,
            settings,
            bridge,
            router,
            phase: Phase::Created,
        })
    }

    pub fn state(&self) -> LifecycleState {
        match self.phase {
            Phase::Created => LifecycleState::Created,
            Phase::Running(_) => LifecycleState::Running,
            Phase::Stopped => LifecycleState::Stopped,
        }
    }

    pub fn graph(&self) -> &ServiceGraph {
        &self.graph
    }

    pub fn settings(&self) -> &ListenerSettings {
        &self.settings
    }

    pub fn bridge_outcome(&self) -> BridgeOutcome {
        self.bridge
    }

    /// Bound address, while running.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        match &self.phase {
            Phase::Running(running) => Some(running.local_addr),
            _ => None,
        }
    }

    /// Bound metrics scrape address, while running with `metrics.enabled`.
    pub fn metrics_addr(&self) -> Option<SocketAddr> {
        match &self.phase {
            Phase::Running(running) => running.metrics.as_ref().map(MetricsExporter::local_addr),
            _ => None,
        }
    }

    /// Base URL; reflects the actual port once running.
    pub fn base_url(&self) -> Url {
        let mut url = self.settings.base_url.clone();
        if let Some(addr) = self.local_addr() {
            // Only fails for URLs that cannot carry a port; ours always can.
            let _ = url.set_port(Some(addr.port()));
        }
        url
    }

    /// Bind the listener and begin accepting connections.
    pub async fn start(&mut self) -> Result<SocketAddr, ServerError> {
        if !matches!(self.phase, Phase::Created) {
            return Err(ServerError::Lifecycle {
                operation: "start",
                state: self.state(),
            });
        }

        let (host, port) = self.settings.bind_target();
        let listener = TcpListener::bind((host, port))
            .await
            .map_err(|source| ServerError::Bind {
                address: format!("{host}:{port}"),
                source,
            })?;
        let local_addr = listener.local_addr().map_err(|source| ServerError::Bind {
            address: format!("{host}:{port}"),
            source,
        })?;

        let shutdown = Shutdown::new();
        let metrics = match self.settings.metrics_address {
            Some(metrics_addr) => match MetricsExporter::start(metrics_addr, shutdown.subscribe()).await {
                Ok(exporter) => Some(exporter),
                Err(e) => {
                    tracing::warn!(
                        address = %metrics_addr,
                        error = %e,
                        "Metrics exporter unavailable, continuing without it"
                    );
                    None
                }
            },
            None => None,
        };

        let signal = shutdown.subscribe();
        let app = self.router.clone();
        let graph = self.graph.name().to_owned();
        let task = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(signal.recv())
                .await?;
            tracing::info!(graph = %graph, "HTTP server stopped");
            Ok(())
        });

        tracing::info!(
            address = %local_addr,
            graph = %self.graph.name(),
            "HTTP server started"
        );
        self.phase = Phase::Running(RunningServer {
            local_addr,
            shutdown,
            task,
            metrics,
        });
        Ok(local_addr)
    }

    /// Stop accepting connections and wait for in-flight requests to drain.
    pub async fn stop(&mut self) -> Result<(), ServerError> {
        match std::mem::replace(&mut self.phase, Phase::Stopped) {
            Phase::Created => {
                tracing::warn!(
                    graph = %self.graph.name(),
                    "Stopping a server that was never started"
                );
                Ok(())
            }
            Phase::Stopped => {
                tracing::debug!(graph = %self.graph.name(), "Server already stopped");
                Ok(())
            }
            Phase::Running(running) => {
                tracing::info!(address = %running.local_addr, "Stopping HTTP server");
                running.shutdown.trigger();
                let served = running.task.await;
                if let Some(exporter) = running.metrics {
                    exporter.join().await;
                }
                served?.map_err(ServerError::Serve)
            }
        }
    }
}

impl std::fmt::Debug for RepositoryServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RepositoryServer")
            .field("graph", &self.graph.name())
            .field("base_url", &self.base_url().as_str())
            .field("state", &self.state())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loopback() -> RepositoryServer {
        RepositoryServer::new([("server.host", "127.0.0.1"), ("server.port", "0")]).unwrap()
    }

    #[tokio::test]
    async fn start_then_stop() {
        let mut server = loopback();
        assert_eq!(server.state(), LifecycleState::Created);
        assert!(server.local_addr().is_none());

        let addr = server.start().await.unwrap();
        assert_eq!(server.state(), LifecycleState::Running);
        assert_eq!(server.local_addr(), Some(addr));
        assert_eq!(server.base_url().port(), Some(addr.port()));

        server.stop().await.unwrap();
        assert_eq!(server.state(), LifecycleState::Stopped);
        assert!(tokio::net::TcpStream::connect(addr).await.is_err());
    }

    #[tokio::test]
    async fn second_start_is_misuse() {
        let mut server = loopback();
        server.start().await.unwrap();
        let err = server.start().await.unwrap_err();
        assert!(err.is_lifecycle_misuse());
        assert_eq!(server.state(), LifecycleState::Running);
        server.stop().await.unwrap();

        let err = server.start().await.unwrap_err();
        assert!(matches!(
            err,
            ServerError::Lifecycle {
                operation: "start",
                state: LifecycleState::Stopped
            }
        ));
    }

    #[tokio::test]
    async fn stop_without_start_is_terminal() {
        let mut server = loopback();
        server.stop().await.unwrap();
        assert_eq!(server.state(), LifecycleState::Stopped);
        server.stop().await.unwrap();
        assert!(server.start().await.is_err());
    }

    #[tokio::test]
    async fn failed_bind_stays_created() {
        let mut first = loopback();
        let addr = first.start().await.unwrap();

        let mut second = RepositoryServer::new([
            ("server.host", "127.0.0.1".to_string()),
            ("server.port", addr.port().to_string()),
        ])
        .unwrap();
        let err = second.start().await.unwrap_err();
        assert!(matches!(err, ServerError::Bind { .. }));
        assert!(err.to_string().contains(&addr.port().to_string()));
        assert_eq!(second.state(), LifecycleState::Created);

        first.stop().await.unwrap();
    }

    #[tokio::test]
    async fn stop_closes_the_metrics_listener() {
        let mut server = RepositoryServer::new([
            ("server.host", "127.0.0.1"),
            ("server.port", "0"),
            ("metrics.enabled", "true"),
            ("metrics.address", "127.0.0.1:0"),
        ])
        .unwrap();
        assert!(server.metrics_addr().is_none());

        server.start().await.unwrap();
        let metrics_addr = server.metrics_addr().expect("exporter should be running");
        assert!(tokio::net::TcpStream::connect(metrics_addr).await.is_ok());

        server.stop().await.unwrap();
        assert!(server.metrics_addr().is_none());
        assert!(tokio::net::TcpStream::connect(metrics_addr).await.is_err());
    }

    #[test]
    fn invalid_port_fails_construction() {
        let err = RepositoryServer::new([("server.port", "eighty")]).unwrap_err();
        assert!(err.to_string().contains("server.port"));
    }
}
