//! Optional bridge routing `log` crate records into `tracing`.
//!
//! Dependencies that log through the `log` facade are invisible to the
//! tracing subscriber unless a bridge is installed. Installation is
//! controlled by `logging.bridge.enabled`, is best effort, and never aborts
//! startup.

use std::sync::Mutex;

use thiserror::Error;

use crate::config::defaults::LOGGING_BRIDGE_ENABLED;
use crate::config::Configuration;

/// Identifier of the bridging implementation, used in diagnostics.
pub const LOG_TRACER_BRIDGE: &str = "tracing-log::LogTracer";

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("bridge `{0}` is not compiled in; rebuild with the `log-bridge` feature")]
    Unavailable(&'static str),

    #[error("bridge `{id}` failed to install: {reason}")]
    Install { id: &'static str, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Installation {
    Installed,
    AlreadyInstalled,
}

/// What [`install_log_bridge`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeOutcome {
    /// The flag is off; nothing was attempted.
    Disabled,
    Installed,
    AlreadyInstalled,
    /// An attempt was made and failed; startup continued.
    Failed,
}

/// A sink that can capture records from the `log` facade.
pub trait LogBridge: Send + Sync {
    fn id(&self) -> &'static str;

    fn install(&self) -> Result<Installation, BridgeError>;
}

/// Stands in for a bridge whose dependency was compiled out.
#[derive(Debug, Clone, Copy)]
pub struct NoopBridge {
    requested: &'static str,
}

impl NoopBridge {
    pub fn new(requested: &'static str) -> Self {
        Self { requested }
    }
}

impl LogBridge for NoopBridge {
    fn id(&self) -> &'static str {
        self.requested
    }

    fn install(&self) -> Result<Installation, BridgeError> {
        Err(BridgeError::Unavailable(self.requested))
    }
}

/// Installs `tracing_log::LogTracer` as the global `log` logger, once per
/// process.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogTracerBridge;

static LOG_TRACER_INSTALLED: Mutex<bool> = Mutex::new(false);

impl LogBridge for LogTracerBridge {
    fn id(&self) -> &'static str {
        LOG_TRACER_BRIDGE
    }

    fn install(&self) -> Result<Installation, BridgeError> {
        let mut installed = LOG_TRACER_INSTALLED
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        if *installed {
            return Ok(Installation::AlreadyInstalled);
        }
        init_log_tracer()?;
        *installed = true;
        Ok(Installation::Installed)
    }
}

#[cfg(feature = "log-bridge")]
fn init_log_tracer() -> Result<(), BridgeError> {
    tracing_log::LogTracer::init().map_err(|e| BridgeError::Install {
        id: LOG_TRACER_BRIDGE,
        reason: e.to_string(),
    })
}

#[cfg(not(feature = "log-bridge"))]
fn init_log_tracer() -> Result<(), BridgeError> {
    Err(BridgeError::Unavailable(LOG_TRACER_BRIDGE))
}

/// The bridge this build can offer.
pub fn available_bridge() -> Box<dyn LogBridge> {
    if cfg!(feature = "log-bridge") {
        Box::new(LogTracerBridge)
    } else {
        Box::new(NoopBridge::new(LOG_TRACER_BRIDGE))
    }
}

/// Install the log bridge if the configuration asks for it.
pub fn install_log_bridge(config: &Configuration) -> BridgeOutcome {
    install_log_bridge_with(config, available_bridge().as_ref())
}

pub fn install_log_bridge_with(config: &Configuration, bridge: &dyn LogBridge) -> BridgeOutcome {
    if !config.get_bool(LOGGING_BRIDGE_ENABLED) {
        tracing::info!(
            bridge = bridge.id(),
            "log records are NOT routed through tracing; set {}=true to enable",
            LOGGING_BRIDGE_ENABLED
        );
        return BridgeOutcome::Disabled;
    }

    match bridge.install() {
        Ok(Installation::Installed) => {
            tracing::info!(bridge = bridge.id(), "Routing log records through tracing");
            BridgeOutcome::Installed
        }
        Ok(Installation::AlreadyInstalled) => {
            tracing::debug!(bridge = bridge.id(), "Log bridge already installed");
            BridgeOutcome::AlreadyInstalled
        }
        Err(e) => {
            tracing::warn!(
                bridge = bridge.id(),
                error = %e,
                "Failed to install log bridge, log records are unaffected"
            );
            BridgeOutcome::Failed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingBridge {
        calls: AtomicUsize,
        fail: bool,
    }

    impl CountingBridge {
        fn new(fail: bool) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail,
            }
        }
    }

    impl LogBridge for CountingBridge {
        fn id(&self) -> &'static str {
            "counting"
        }

        fn install(&self) -> Result<Installation, BridgeError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(BridgeError::Install {
                    id: "counting",
                    reason: "boom".into(),
                });
            }
            Ok(Installation::Installed)
        }
    }

    #[test]
    fn truthy_flag_attempts_install() {
        let config = Configuration::from_overrides([(LOGGING_BRIDGE_ENABLED, "true")]);
        let bridge = CountingBridge::new(false);
        assert_eq!(install_log_bridge_with(&config, &bridge), BridgeOutcome::Installed);
        assert_eq!(bridge.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn falsy_or_absent_flag_skips_install() {
        let bridge = CountingBridge::new(false);
        for config in [
            Configuration::from_overrides([(LOGGING_BRIDGE_ENABLED, "false")]),
            Configuration::from_overrides([(LOGGING_BRIDGE_ENABLED, "nope")]),
            Configuration::overlay(
                std::iter::empty::<(&str, &str)>(),
                std::iter::empty::<(&str, &str)>(),
            ),
        ] {
            assert_eq!(install_log_bridge_with(&config, &bridge), BridgeOutcome::Disabled);
        }
        assert_eq!(bridge.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn install_failure_is_not_fatal() {
        let config = Configuration::from_overrides([(LOGGING_BRIDGE_ENABLED, "TRUE")]);
        let bridge = CountingBridge::new(true);
        assert_eq!(install_log_bridge_with(&config, &bridge), BridgeOutcome::Failed);
    }

    #[test]
    fn noop_bridge_reports_unavailable() {
        let config = Configuration::from_overrides([(LOGGING_BRIDGE_ENABLED, "true")]);
        let bridge = NoopBridge::new(LOG_TRACER_BRIDGE);
        assert_eq!(bridge.id(), LOG_TRACER_BRIDGE);
        assert_eq!(install_log_bridge_with(&config, &bridge), BridgeOutcome::Failed);
    }

    #[cfg(feature = "log-bridge")]
    #[derive(Clone, Default)]
    struct Captured(std::sync::Arc<Mutex<Vec<u8>>>);

    #[cfg(feature = "log-bridge")]
    impl std::io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[cfg(feature = "log-bridge")]
    #[test]
    fn log_tracer_routes_log_records_into_tracing() {
        let first = LogTracerBridge.install().unwrap();
        assert!(matches!(
            first,
            Installation::Installed | Installation::AlreadyInstalled
        ));
        assert_eq!(
            LogTracerBridge.install().unwrap(),
            Installation::AlreadyInstalled
        );

        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();
        tracing::subscriber::with_default(subscriber, || {
            log::info!(target: "legacy_dependency", "record from the log facade");
        });

        let output = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("record from the log facade"), "{output}");
        assert!(output.contains("legacy_dependency"), "{output}");
    }
}
