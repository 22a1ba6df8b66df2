//! The chain facade consumed by the protocol adapter.
//!
//! A facade simulates surface-level chain mechanics — block, transaction, and
//! receipt structure — without any world-state simulation. Absent values are
//! ordinary results, never errors; an error from a facade method means a
//! structural invariant broke.

use crate::{
    Block, ChainError, ChainState, PopulationEngine, StepContext, Transaction,
    TransactionInfo, TransactionReceipt,
};
use alloy_primitives::B256;
use std::sync::Arc;

/// Chain-inspection queries answered against the fabricated history.
///
/// Implementations run the population step hook before resolving queries, so
/// time-based and trigger-based state progresses with traffic.
pub trait ChainFacade: Send + Sync {
    /// Returns the externally visible head block number.
    fn block_number(&self) -> Result<u64, ChainError>;

    /// Returns the block at the head of the active fork.
    fn best_block(&self) -> Result<Option<Arc<Block>>, ChainError>;

    /// Returns the block at `number` on the active fork, or nothing if
    /// `number` exceeds the head.
    fn block_by_number(&self, number: u64) -> Result<Option<Arc<Block>>, ChainError>;

    /// Returns the block with the given hash, across all forks.
    fn block_by_hash(&self, hash: B256) -> Result<Option<Arc<Block>>, ChainError>;

    /// Returns the transaction with the given content hash.
    fn transaction_by_hash(&self, hash: B256) -> Result<Option<Transaction>, ChainError>;

    /// Returns the receipt of the transaction with the given content hash.
    fn transaction_receipt_by_hash(
        &self,
        hash: B256,
    ) -> Result<Option<TransactionReceipt>, ChainError>;

    /// Returns the indexed transaction info for the given content hash.
    fn transaction_info(&self, hash: B256) -> Result<Option<Arc<TransactionInfo>>, ChainError>;
}

/// The default facade: a [`PopulationEngine`] plus the shared [`ChainState`].
#[derive(Debug)]
pub struct DefaultChainFacade {
    engine: PopulationEngine,
    state: Arc<ChainState>,
}

impl DefaultChainFacade {
    /// Builds the facade and runs initial population. Configuration
    /// invariant violations surface here, before any query is served.
    pub fn new(engine: PopulationEngine, state: Arc<ChainState>) -> Result<Self, ChainError> {
        engine.populate_initial()?;
        Ok(Self { engine, state })
    }
}

impl ChainFacade for DefaultChainFacade {
    fn block_number(&self) -> Result<u64, ChainError> {
        self.engine.populate_step(&StepContext::new())?;
        Ok(self.state.head_block_number())
    }

    fn best_block(&self) -> Result<Option<Arc<Block>>, ChainError> {
        self.engine.populate_step(&StepContext::new())?;
        let chain = self.state.locked();
        Ok(chain.block_by_number(chain.head_block_number()))
    }

    fn block_by_number(&self, number: u64) -> Result<Option<Arc<Block>>, ChainError> {
        // The requested number rides along so fork-trigger logic can react to
        // the exact position the caller asked about.
        self.engine.populate_step(&StepContext::for_number(number))?;
        Ok(self.state.block_by_number(number))
    }

    fn block_by_hash(&self, hash: B256) -> Result<Option<Arc<Block>>, ChainError> {
        Ok(self.state.block_by_hash(hash))
    }

    fn transaction_by_hash(&self, hash: B256) -> Result<Option<Transaction>, ChainError> {
        Ok(self
            .state
            .transaction_info(hash)
            .map(|info| info.receipt.transaction.clone()))
    }

    fn transaction_receipt_by_hash(
        &self,
        hash: B256,
    ) -> Result<Option<TransactionReceipt>, ChainError> {
        self.engine.populate_step(&StepContext::new())?;
        Ok(self.state.transaction_info(hash).map(|info| info.receipt.clone()))
    }

    fn transaction_info(&self, hash: B256) -> Result<Option<Arc<TransactionInfo>>, ChainError> {
        self.engine.populate_step(&StepContext::new())?;
        Ok(self.state.transaction_info(hash))
    }
}
