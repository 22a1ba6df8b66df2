//! Pipeline stage that injects user-scheduled transfers at their due block.

use super::{BlockItem, BlockTransform};
use crate::{ForkEvent, RuleError, TransferEvent, assembler, execute_transfer};
use alloy_primitives::Address;
use std::{
    cmp::{Ordering, Reverse},
    collections::{BTreeMap, BinaryHeap, HashMap},
};
use tracing::debug;

/// A scheduled transfer waiting in a fork's queue.
///
/// Ordered by scheduled block number; ties are broken by insertion order so
/// two transfers due at the same block are injected in configuration order.
#[derive(Debug, Clone)]
struct QueuedTransfer {
    block_number: u64,
    seq: u64,
    event: TransferEvent,
}

impl QueuedTransfer {
    const fn key(&self) -> (u64, u64) {
        (self.block_number, self.seq)
    }
}

impl Ord for QueuedTransfer {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

impl PartialOrd for QueuedTransfer {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for QueuedTransfer {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for QueuedTransfer {}

/// Injects configured transfers into the block scheduled for them.
///
/// Each fork owns a priority queue of its transfers, ordered by scheduled
/// block number. Events are dequeued and applied only when their scheduled
/// number exactly equals the block being built; events whose number has
/// already passed indicate a configuration defect and are dequeued and
/// skipped so they cannot wedge the queue.
pub struct ScheduledTransfers {
    contract: Address,
    queues: HashMap<String, BinaryHeap<Reverse<QueuedTransfer>>>,
}

impl std::fmt::Debug for ScheduledTransfers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScheduledTransfers")
            .field("contract", &self.contract)
            .field("forks", &self.queues.len())
            .finish()
    }
}

impl ScheduledTransfers {
    /// Builds the per-fork queues from the configured fork events.
    pub fn new(contract: Address, forks: &BTreeMap<String, ForkEvent>) -> Self {
        let queues = forks
            .iter()
            .map(|(name, fork)| {
                let heap = fork
                    .transfers
                    .iter()
                    .enumerate()
                    .map(|(seq, event)| {
                        Reverse(QueuedTransfer {
                            block_number: event.block_number,
                            seq: seq as u64,
                            event: event.clone(),
                        })
                    })
                    .collect();
                (name.clone(), heap)
            })
            .collect();
        Self { contract, queues }
    }
}

impl BlockTransform for ScheduledTransfers {
    fn process(&mut self, mut item: BlockItem) -> Result<BlockItem, RuleError> {
        let queue = self
            .queues
            .get_mut(&item.fork)
            .ok_or_else(|| RuleError::UnknownFork(item.fork.clone()))?;

        let number = item.block.number();
        let mut due = Vec::new();
        loop {
            let due_now = match queue.peek() {
                Some(Reverse(next)) if next.block_number < number => false,
                Some(Reverse(next)) if next.block_number == number => true,
                _ => break,
            };
            let Some(Reverse(transfer)) = queue.pop() else { break };
            if due_now {
                due.push(transfer.event);
            } else {
                debug!(
                    fork = %item.fork,
                    transfer = %transfer.event.name,
                    scheduled = transfer.block_number,
                    block = number,
                    "skipping stale scheduled transfer"
                );
            }
        }

        if due.is_empty() {
            return Ok(item);
        }

        for event in &due {
            let executed = execute_transfer(
                self.contract,
                event.sender,
                Some(self.contract),
                std::slice::from_ref(event),
            );
            item.receipts.push(executed.receipt);
        }

        assembler::reassemble(&mut item.block, &item.receipts);
        Ok(item)
    }
}
