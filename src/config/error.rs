//! Configuration errors.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading or reading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid TOML.
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// A file value has no flat string form (arrays).
    #[error("config key `{key}` holds an unsupported {kind} value")]
    UnsupportedValue { key: String, kind: &'static str },

    /// A required key resolved to nothing.
    #[error("config key `{key}` is not set")]
    Missing { key: String },

    /// A key resolved to a value its consumer rejects.
    #[error("config key `{key}` has invalid value `{value}`: {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },
}
