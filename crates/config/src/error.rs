//! Configuration loading errors.

use std::path::PathBuf;
use thiserror::Error;

/// An error encountered while loading or validating a node configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config file {path}: {source}")]
    Read {
        /// The path that was attempted.
        path: PathBuf,
        /// The underlying io error.
        source: std::io::Error,
    },
    /// The configuration file is not valid TOML for the expected schema.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    /// The block time must be a positive number of seconds.
    #[error("block_time must be greater than zero")]
    ZeroBlockTime,
    /// Every transfer must move a positive amount.
    #[error("transfer {0} has a zero amount")]
    ZeroAmount(String),
    /// A fork schedules a transfer name the top-level table does not define.
    #[error("fork {fork} references undefined transfer {name}")]
    UnknownTransfer {
        /// The fork holding the dangling reference.
        fork: String,
        /// The undefined transfer name.
        name: String,
    },
}
