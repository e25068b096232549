//! Configuration keys and their process-wide defaults.
//!
//! Every key the server reads is named here. Keys under [`VALIDATOR_PREFIX`]
//! are open-ended and have no defaults beyond [`VALIDATOR_DEFAULTS`].

/// Route `log` crate records into tracing.
pub const LOGGING_BRIDGE_ENABLED: &str = "logging.bridge.enabled";

/// Host the listener binds to.
pub const SERVER_HOST: &str = "server.host";

/// Port the listener binds to. `0` picks an ephemeral port.
pub const SERVER_PORT: &str = "server.port";

/// Per-request timeout in seconds.
pub const SERVER_REQUEST_TIMEOUT_SECS: &str = "server.request-timeout-secs";

/// Maximum accepted request body in bytes.
pub const SERVER_MAX_BODY_BYTES: &str = "server.max-body-bytes";

/// Repository implementation selector.
pub const REPOSITORY_KIND: &str = "repository.kind";

/// JSON codec implementation selector.
pub const CODEC_KIND: &str = "codec.kind";

/// Prefix for named validator registrations (`validator.<name> = <kind>`).
pub const VALIDATOR_PREFIX: &str = "validator.";

/// Comma-separated validators applied to subjects that name none.
pub const VALIDATOR_DEFAULTS: &str = "validator.defaults";

/// Install the Prometheus exporter.
pub const METRICS_ENABLED: &str = "metrics.enabled";

/// Prometheus exporter bind address.
pub const METRICS_ADDRESS: &str = "metrics.address";

/// Subject property listing the validators for that subject.
pub const SUBJECT_VALIDATORS: &str = "schema-repo.validators";

/// The default table every effective configuration is overlaid on.
pub const DEFAULTS: &[(&str, &str)] = &[
    (LOGGING_BRIDGE_ENABLED, "false"),
    (SERVER_HOST, "localhost"),
    (SERVER_PORT, "8888"),
    (SERVER_REQUEST_TIMEOUT_SECS, "30"),
    (SERVER_MAX_BODY_BYTES, "1048576"),
    (REPOSITORY_KIND, "in-memory"),
    (CODEC_KIND, "json"),
    (VALIDATOR_DEFAULTS, ""),
    (METRICS_ENABLED, "false"),
    (METRICS_ADDRESS, "127.0.0.1:9090"),
];

/// Look up the default value for `key`.
pub fn default_for(key: &str) -> Option<&'static str> {
    DEFAULTS
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, v)| *v)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn default_keys_are_unique() {
        let keys: HashSet<_> = DEFAULTS.iter().map(|(k, _)| *k).collect();
        assert_eq!(keys.len(), DEFAULTS.len());
    }

    #[test]
    fn bridge_is_disabled_by_default() {
        assert_eq!(default_for(LOGGING_BRIDGE_ENABLED), Some("false"));
        assert_eq!(default_for("no.such.key"), None);
    }
}
