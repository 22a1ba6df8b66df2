#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

mod config;
pub use config::{ForkConfig, Mode, ServerConfig, TransferConfig};

mod error;
pub use error::ConfigError;
