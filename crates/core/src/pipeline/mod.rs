//! The block construction pipeline.
//!
//! Every block produced during initial population is threaded through an
//! ordered list of transforms. A transform that changes the receipt set must
//! re-run block assembly before returning, so the block hash downstream
//! consumers read always reflects the final contents.

mod random;
pub use random::RandomFill;

mod scheduled;
pub use scheduled::ScheduledTransfers;

use crate::{Block, RuleError, TransactionReceipt};

/// The transport value threaded through the pipeline: a fork name, the block
/// in progress, and its receipts so far.
#[derive(Debug, Clone)]
pub struct BlockItem {
    /// Name of the fork the block is being built for.
    pub fork: String,
    /// The block under construction.
    pub block: Block,
    /// Receipts accumulated so far, one per transaction.
    pub receipts: Vec<TransactionReceipt>,
}

/// A single stage of the block construction pipeline.
///
/// Stages must be idempotent with respect to receipts already present: a stage
/// asked to top a block up to a target it already meets does nothing.
pub trait BlockTransform: Send {
    /// Transforms the block in progress, re-assembling it if the receipt set
    /// changed.
    fn process(&mut self, item: BlockItem) -> Result<BlockItem, RuleError>;
}
