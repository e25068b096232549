//! Startup orchestration.
//!
//! # Responsibilities
//! - Install (or skip) the log bridge before anything else logs
//! - Resolve listener settings from the effective configuration
//! - Compose the service graph
//!
//! # Design Decisions
//! - Fail fast: any configuration or composition error is fatal
//! - Nothing here binds a socket; that happens in `start`

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use url::Url;

use crate::config::defaults::{
    METRICS_ADDRESS, METRICS_ENABLED, SERVER_HOST, SERVER_MAX_BODY_BYTES, SERVER_PORT,
    SERVER_REQUEST_TIMEOUT_SECS,
};
use crate::config::{ConfigError, Configuration};
use crate::error::ServerError;
use crate::graph::ServiceGraph;
use crate::observability::bridge::{self, BridgeOutcome};

/// Listener-facing settings read from the configuration.
#[derive(Debug, Clone)]
pub struct ListenerSettings {
    pub host: String,
    pub port: u16,
    pub base_url: Url,
    pub request_timeout: Duration,
    pub max_body_bytes: usize,
    pub metrics_address: Option<SocketAddr>,
}

impl ListenerSettings {
    pub fn from_config(config: &Configuration) -> Result<Self, ConfigError> {
        let host = config
            .get(SERVER_HOST)
            .map(str::trim)
            .filter(|h| !h.is_empty())
            .ok_or_else(|| ConfigError::Missing {
                key: SERVER_HOST.to_owned(),
            })?
            .to_owned();
        let port: u16 = config.parse(SERVER_PORT)?;

        let authority = if host.contains(':') {
            format!("[{host}]:{port}")
        } else {
            format!("{host}:{port}")
        };
        let base_url = Url::parse(&format!("http://{authority}/")).map_err(|e| {
            ConfigError::InvalidValue {
                key: SERVER_HOST.to_owned(),
                value: host.clone(),
                reason: e.to_string(),
            }
        })?;

        let metrics_address = if config.get_bool(METRICS_ENABLED) {
            Some(config.parse(METRICS_ADDRESS)?)
        } else {
            None
        };

        Ok(Self {
            host,
            port,
            base_url,
            request_timeout: Duration::from_secs(config.parse(SERVER_REQUEST_TIMEOUT_SECS)?),
            max_body_bytes: config.parse(SERVER_MAX_BODY_BYTES)?,
            metrics_address,
        })
    }

    /// `host:port` as handed to the socket layer.
    pub fn bind_target(&self) -> (&str, u16) {
        (self.host.as_str(), self.port)
    }
}

/// Everything a server instance needs before it can start.
pub struct Bootstrap {
    pub graph: ServiceGraph,
    pub settings: ListenerSettings,
    pub bridge: BridgeOutcome,
}

/// Run the ordered startup steps for one server instance.
pub fn bootstrap(config: Configuration) -> Result<Bootstrap, ServerError> {
    // Redirects everything logged after it.
    let bridge = bridge::install_log_bridge(&config);

    let settings = ListenerSettings::from_config(&config)?;
    let graph = ServiceGraph::compose(Arc::new(config))?;

    tracing::info!(
        graph = %graph.name(),
        base_url = %settings.base_url,
        "Bootstrap complete"
    );

    Ok(Bootstrap {
        graph,
        settings,
        bridge,
    })
}
