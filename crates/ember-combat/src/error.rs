use std::path::PathBuf;

use crate::field::FieldPhase;

/// Errors raised while configuring an area field.
///
/// These never stop the simulation; the registry logs them and carries on.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FieldError {
    #[error("setup rejected: field is already {0:?}")]
    AlreadyActive(FieldPhase),
}

/// Errors that can occur while loading combat configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file '{0}': {1}")]
    Read(PathBuf, #[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}
