//! The versioned block/transaction store shared by rules and request threads.

use crate::{Block, StateError, TransactionInfo};
use alloy_primitives::B256;
use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

/// The chain state: blocks indexed by hash and by `(number, fork)`,
/// transaction lookup by hash, and the mutable cursors tracking the active
/// fork and the externally visible head.
///
/// All access is serialized through a single lock scoped to this instance.
/// The block and transaction maps are append-only after initial population;
/// only the cursors mutate while serving. Rules that need a check-then-act
/// sequence to be atomic hold the guard from [`Self::locked`] across the whole
/// sequence instead of using the per-call convenience methods.
#[derive(Debug, Default)]
pub struct ChainState {
    inner: Mutex<ChainStateInner>,
}

impl ChainState {
    /// Creates an empty chain state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquires the state lock for a multi-step atomic operation.
    pub fn locked(&self) -> MutexGuard<'_, ChainStateInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Adds a new block to the chain state. See [`ChainStateInner::add_block`].
    pub fn add_block(
        &self,
        block: Block,
        infos: Vec<TransactionInfo>,
        fork: &str,
    ) -> Result<(), StateError> {
        self.locked().add_block(block, infos, fork)
    }

    /// Looks a block up by hash, across all forks.
    pub fn block_by_hash(&self, hash: B256) -> Option<Arc<Block>> {
        self.locked().block_by_hash(hash)
    }

    /// Looks a block up by number on the active fork. Numbers beyond the head
    /// resolve to nothing.
    pub fn block_by_number(&self, number: u64) -> Option<Arc<Block>> {
        self.locked().block_by_number(number)
    }

    /// Looks a transaction info up by transaction hash.
    pub fn transaction_info(&self, hash: B256) -> Option<Arc<TransactionInfo>> {
        self.locked().transaction_info(hash)
    }

    /// Returns the active fork name.
    pub fn current_fork(&self) -> String {
        self.locked().current_fork().to_owned()
    }

    /// Switches the active fork.
    pub fn set_current_fork(&self, fork: &str) {
        self.locked().set_current_fork(fork);
    }

    /// Returns the externally visible head block number.
    pub fn head_block_number(&self) -> u64 {
        self.locked().head_block_number()
    }

    /// Moves the externally visible head.
    pub fn set_head_block_number(&self, number: u64) {
        self.locked().set_head_block_number(number);
    }

    /// Returns the maximum constructed block number on the active fork, if
    /// any block was built for it.
    pub fn current_fork_tip(&self) -> Option<u64> {
        self.locked().current_fork_tip()
    }
}

/// The lock-guarded contents of a [`ChainState`].
#[derive(Debug, Default)]
pub struct ChainStateInner {
    blocks_by_hash: HashMap<B256, Arc<Block>>,
    blocks_by_number: HashMap<u64, HashMap<String, Arc<Block>>>,
    transaction_infos: HashMap<B256, Arc<TransactionInfo>>,
    current_fork: String,
    head_block_number: u64,
    fork_tips: HashMap<String, u64>,
}

impl ChainStateInner {
    /// Adds a new block into the chain state, with consistency checks scoped
    /// to what the mock fabricates: the info set must match the transaction
    /// list, timestamps must strictly increase along parent links, and both
    /// the hash index and the `(number, fork)` index must be collision-free.
    pub fn add_block(
        &mut self,
        block: Block,
        infos: Vec<TransactionInfo>,
        fork: &str,
    ) -> Result<(), StateError> {
        self.check_block(&block, infos.len())?;

        let hash = block.hash();
        if self.blocks_by_hash.contains_key(&hash) {
            return Err(StateError::DuplicateHash(hash));
        }

        let number = block.number();
        let level = self.blocks_by_number.entry(number).or_default();
        if level.contains_key(fork) {
            return Err(StateError::DuplicateBlock { number, fork: fork.to_owned() });
        }

        let block = Arc::new(block);
        level.insert(fork.to_owned(), Arc::clone(&block));
        self.blocks_by_hash.insert(hash, block);

        for info in infos {
            let tx_hash = info.receipt.transaction.hash();
            self.transaction_infos.insert(tx_hash, Arc::new(info));
        }

        let tip = self.fork_tips.entry(fork.to_owned()).or_insert(number);
        if number > *tip {
            *tip = number;
        }
        Ok(())
    }

    fn check_block(&self, block: &Block, info_count: usize) -> Result<(), StateError> {
        if info_count != block.transactions.len() {
            return Err(StateError::ReceiptCountMismatch {
                number: block.number(),
                transactions: block.transactions.len(),
                infos: info_count,
            });
        }
        // The first block on a fork has no stored parent; everything after it
        // must advance the clock.
        if let Some(parent) = self.blocks_by_hash.get(&block.parent_hash()) {
            if block.timestamp() <= parent.timestamp() {
                return Err(StateError::NonMonotonicTimestamp {
                    number: block.number(),
                    timestamp: block.timestamp(),
                    parent_timestamp: parent.timestamp(),
                });
            }
        }
        Ok(())
    }

    /// Looks a block up by hash, across all forks.
    pub fn block_by_hash(&self, hash: B256) -> Option<Arc<Block>> {
        self.blocks_by_hash.get(&hash).cloned()
    }

    /// Looks a block up by number on the active fork.
    pub fn block_by_number(&self, number: u64) -> Option<Arc<Block>> {
        if number > self.head_block_number {
            return None;
        }
        self.blocks_by_number.get(&number)?.get(&self.current_fork).cloned()
    }

    /// Looks a block up by number on a specific fork, ignoring the head
    /// cursor.
    pub fn block_on_fork(&self, number: u64, fork: &str) -> Option<Arc<Block>> {
        self.blocks_by_number.get(&number)?.get(fork).cloned()
    }

    /// Looks a transaction info up by transaction hash.
    pub fn transaction_info(&self, hash: B256) -> Option<Arc<TransactionInfo>> {
        self.transaction_infos.get(&hash).cloned()
    }

    /// Returns the active fork name.
    pub fn current_fork(&self) -> &str {
        &self.current_fork
    }

    /// Switches the active fork.
    pub fn set_current_fork(&mut self, fork: &str) {
        fork.clone_into(&mut self.current_fork);
    }

    /// Returns the externally visible head block number.
    pub const fn head_block_number(&self) -> u64 {
        self.head_block_number
    }

    /// Moves the externally visible head.
    pub const fn set_head_block_number(&mut self, number: u64) {
        self.head_block_number = number;
    }

    /// Returns the maximum constructed block number on the active fork.
    pub fn current_fork_tip(&self) -> Option<u64> {
        self.fork_tips.get(&self.current_fork).copied()
    }
}
