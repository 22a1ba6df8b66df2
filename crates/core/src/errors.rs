//! Error types for the chain-state engine.
//!
//! Two tiers exist: configuration invariant violations surface at startup and
//! abort the population pass, and structural invariant violations at runtime
//! indicate a test or configuration bug rather than a recoverable fault.
//! "Not found" outcomes are never errors; lookups return `Option`.

use alloy_primitives::B256;
use thiserror::Error;

/// A structural invariant violation detected by the chain-state store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateError {
    /// Two blocks were inserted at the same number on the same fork.
    #[error("attempted to add two blocks at number {number} on fork {fork}")]
    DuplicateBlock {
        /// The duplicated block number.
        number: u64,
        /// The fork both blocks targeted.
        fork: String,
    },
    /// A block with this hash is already stored.
    #[error("block hash {0} already present in the chain state")]
    DuplicateHash(B256),
    /// A block's timestamp does not strictly exceed its parent's.
    #[error("block {number} timestamp {timestamp} does not exceed parent timestamp {parent_timestamp}")]
    NonMonotonicTimestamp {
        /// The offending block number.
        number: u64,
        /// The offending block's timestamp.
        timestamp: u64,
        /// The stored parent's timestamp.
        parent_timestamp: u64,
    },
    /// The transaction-info set handed alongside a block does not match its
    /// transaction list.
    #[error("block {number} carries {transactions} transactions but {infos} transaction infos")]
    ReceiptCountMismatch {
        /// The block number.
        number: u64,
        /// Transactions in the block.
        transactions: usize,
        /// Transaction infos supplied.
        infos: usize,
    },
}

/// A failure raised by a population rule.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleError {
    /// No fork named `main` was configured, or more than one was.
    #[error("cannot find exactly one main fork defined")]
    MissingMainFork,
    /// A fork's end number precedes its start number.
    #[error("fork {fork}: end number {end} precedes start number {start}")]
    InvalidRange {
        /// The offending fork.
        fork: String,
        /// Configured start number.
        start: u64,
        /// Configured end number.
        end: u64,
    },
    /// A scheduled transfer falls outside its fork's block range.
    #[error("fork {fork}: transfer {name} scheduled at {number} outside [{start}, {end}]")]
    TransferOutOfRange {
        /// The fork carrying the transfer.
        fork: String,
        /// The transfer's configured name.
        name: String,
        /// The scheduled block number.
        number: u64,
        /// Fork range start.
        start: u64,
        /// Fork range end.
        end: u64,
    },
    /// Two forks share a start, end, or trigger number; these must be
    /// pairwise distinct across the configuration.
    #[error("forks {first} and {second} share {field} number {number}")]
    OverlappingForkBound {
        /// First fork sharing the bound.
        first: String,
        /// Second fork sharing the bound.
        second: String,
        /// Which bound is shared: `start`, `end`, or `trigger`.
        field: &'static str,
        /// The shared number.
        number: u64,
    },
    /// More than one fork triggered at the same observed position. Should be
    /// unreachable given validation; reaching it means validation is broken.
    #[error("multiple forks trigger at block {number}")]
    AmbiguousTrigger {
        /// The observed position.
        number: u64,
    },
    /// A pipeline stage was handed a block for a fork it has no queue for.
    #[error("no scheduled transfer queue for fork {0}")]
    UnknownFork(String),
    /// Initial population was invoked more than once.
    #[error("initial population ran twice")]
    AlreadyPopulated,
    /// A chain-state invariant violation surfaced during rule execution.
    #[error(transparent)]
    State(#[from] StateError),
}

/// Top-level error surfaced through the chain facade.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainError {
    /// A rule failed during population or stepping.
    #[error(transparent)]
    Rule(#[from] RuleError),
    /// A chain-state invariant violation.
    #[error(transparent)]
    State(#[from] StateError),
}
