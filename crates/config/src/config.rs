//! The node configuration schema.

use crate::ConfigError;
use alloy_primitives::{Address, B256, U256};
use mockchain_core::{ForkEvent, TransferEvent};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fs, path::Path};

/// Top-level node configuration, deserialized from a TOML file.
///
/// Transfers are defined once in the top-level `transfers` table and
/// referenced by name from each fork's schedule, so the same transfer shape
/// can recur across forks without repetition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// The contract address all fabricated transfers are sent to.
    pub contract_address: Address,
    /// The port the RPC server listens on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Seconds per fabricated block when ticking.
    #[serde(default = "default_block_time")]
    pub block_time: u64,
    /// Minimum transaction count every constructed block is padded to.
    #[serde(default = "default_random_fill")]
    pub random_fill: usize,
    /// The behaviors the node runs with.
    #[serde(default = "default_modes")]
    pub modes: Vec<Mode>,
    /// The fork layout, keyed by fork name.
    pub forks: BTreeMap<String, ForkConfig>,
    /// Named transfer definitions referenced from fork schedules.
    #[serde(default)]
    pub transfers: BTreeMap<String, TransferConfig>,
}

/// A node behavior toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Serve the prebuilt history behind a fixed head cursor.
    Syncing,
    /// Accepted in configuration files; no behavior is attached to it.
    Throughput,
    /// Advance the head on wall-clock time, one block per `block_time`.
    Ticking,
}

/// One fork's range, trigger, and transfer schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ForkConfig {
    /// First block number of the fork (inclusive).
    pub start_number: u64,
    /// Last block number of the fork (inclusive).
    pub end_number: u64,
    /// The externally observed block number that activates this fork.
    pub trigger_number: u64,
    /// Head position immediately after activation.
    pub post_trigger_number: u64,
    /// Difficulty baseline of the fork's first block.
    pub initial_difficulty: u64,
    /// Scheduled transfers: transfer name to the block number carrying it.
    #[serde(default)]
    pub transfers: BTreeMap<String, u64>,
}

/// A reusable transfer definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TransferConfig {
    /// The sending account. A fabricated one is used when absent.
    #[serde(default)]
    pub from: Option<Address>,
    /// The 32-byte recipient identifier on the destination chain.
    pub to: B256,
    /// The transferred amount. Always positive.
    pub amount: u64,
}

const fn default_port() -> u16 {
    8545
}

const fn default_block_time() -> u64 {
    10
}

const fn default_random_fill() -> usize {
    100
}

fn default_modes() -> Vec<Mode> {
    vec![Mode::Syncing]
}

impl ServerConfig {
    /// Reads and validates a configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path)
            .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
        let config: Self = toml::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the constraints the schema alone cannot express: a positive
    /// block time, positive transfer amounts, and fork schedules that only
    /// reference defined transfers.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.block_time == 0 {
            return Err(ConfigError::ZeroBlockTime);
        }
        for (name, transfer) in &self.transfers {
            if transfer.amount == 0 {
                return Err(ConfigError::ZeroAmount(name.clone()));
            }
        }
        for (fork_name, fork) in &self.forks {
            for name in fork.transfers.keys() {
                if !self.transfers.contains_key(name) {
                    return Err(ConfigError::UnknownTransfer {
                        fork: fork_name.clone(),
                        name: name.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Returns whether the node runs with the given behavior.
    pub fn has_mode(&self, mode: Mode) -> bool {
        self.modes.contains(&mode)
    }

    /// Converts the file-level fork layout into the fork set the population
    /// engine consumes, with each fork's transfers ordered by block number.
    pub fn fork_events(&self) -> Result<BTreeMap<String, ForkEvent>, ConfigError> {
        let mut forks = BTreeMap::new();
        for (fork_name, fork) in &self.forks {
            let mut transfers = Vec::with_capacity(fork.transfers.len());
            for (name, &block_number) in &fork.transfers {
                let transfer = self.transfers.get(name).ok_or_else(|| {
                    ConfigError::UnknownTransfer {
                        fork: fork_name.clone(),
                        name: name.clone(),
                    }
                })?;
                transfers.push(TransferEvent {
                    name: name.clone(),
                    sender: transfer.from,
                    recipient: transfer.to,
                    amount: U256::from(transfer.amount),
                    block_number,
                });
            }
            transfers.sort_by_key(|event| event.block_number);

            forks.insert(
                fork_name.clone(),
                ForkEvent {
                    name: fork_name.clone(),
                    start_number: fork.start_number,
                    end_number: fork.end_number,
                    trigger_number: fork.trigger_number,
                    post_trigger_number: fork.post_trigger_number,
                    initial_difficulty: U256::from(fork.initial_difficulty),
                    transfers,
                },
            );
        }
        Ok(forks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const FULL: &str = r#"
        contract_address = "0x00000000000000000000000000000000000000cc"
        port = 9545
        block_time = 5
        random_fill = 3
        modes = ["syncing", "ticking"]

        [transfers.bridge-burn]
        to = "0x5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a"
        amount = 77

        [forks.main]
        start_number = 0
        end_number = 100
        trigger_number = 1000
        post_trigger_number = 0
        initial_difficulty = 1000000

        [forks.main.transfers]
        bridge-burn = 10

        [forks.b]
        start_number = 45
        end_number = 80
        trigger_number = 50
        post_trigger_number = 60
        initial_difficulty = 2000000
    "#;

    #[test]
    fn full_document_parses_and_validates() {
        let config: ServerConfig = toml::from_str(FULL).unwrap();
        config.validate().unwrap();

        assert_eq!(config.port, 9545);
        assert_eq!(config.block_time, 5);
        assert_eq!(config.random_fill, 3);
        assert!(config.has_mode(Mode::Ticking));
        assert_eq!(config.forks.len(), 2);
        assert_eq!(config.forks["main"].transfers["bridge-burn"], 10);
    }

    #[test]
    fn omitted_fields_take_defaults() {
        let config: ServerConfig = toml::from_str(
            r#"
            contract_address = "0x00000000000000000000000000000000000000cc"

            [forks.main]
            start_number = 0
            end_number = 10
            trigger_number = 100
            post_trigger_number = 0
            initial_difficulty = 1
            "#,
        )
        .unwrap();

        assert_eq!(config.port, 8545);
        assert_eq!(config.block_time, 10);
        assert_eq!(config.random_fill, 100);
        assert_eq!(config.modes, vec![Mode::Syncing]);
        assert!(config.transfers.is_empty());
    }

    #[test]
    fn dangling_transfer_reference_is_rejected() {
        let mut config: ServerConfig = toml::from_str(FULL).unwrap();
        config.transfers.clear();

        assert!(matches!(
            config.validate().unwrap_err(),
            ConfigError::UnknownTransfer { .. }
        ));
    }

    #[test]
    fn zero_amount_is_rejected() {
        let mut config: ServerConfig = toml::from_str(FULL).unwrap();
        config.transfers.get_mut("bridge-burn").unwrap().amount = 0;

        assert!(matches!(config.validate().unwrap_err(), ConfigError::ZeroAmount(_)));
    }

    #[test]
    fn zero_block_time_is_rejected() {
        let mut config: ServerConfig = toml::from_str(FULL).unwrap();
        config.block_time = 0;

        assert!(matches!(config.validate().unwrap_err(), ConfigError::ZeroBlockTime));
    }

    #[test]
    fn fork_events_carry_the_resolved_transfers() {
        let config: ServerConfig = toml::from_str(FULL).unwrap();
        let forks = config.fork_events().unwrap();

        let main = &forks["main"];
        assert_eq!(main.start_number, 0);
        assert_eq!(main.initial_difficulty, U256::from(1_000_000u64));
        assert_eq!(main.transfers.len(), 1);

        let event = &main.transfers[0];
        assert_eq!(event.name, "bridge-burn");
        assert_eq!(event.block_number, 10);
        assert_eq!(event.amount, U256::from(77));
        assert_eq!(event.sender, None);
        assert!(forks["b"].transfers.is_empty());
    }

    #[test]
    fn load_reads_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(FULL.as_bytes()).unwrap();

        let config = ServerConfig::load(file.path()).unwrap();
        assert_eq!(config.port, 9545);

        let missing = ServerConfig::load(Path::new("/nonexistent/config.toml"));
        assert!(matches!(missing.unwrap_err(), ConfigError::Read { .. }));
    }
}
