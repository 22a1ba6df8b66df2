//! The fork construction and switching rule.
//!
//! The most involved rule: it validates the fork configuration, constructs
//! every fork's block range through the pipeline during initial population,
//! and switches the active fork when the externally observed position crosses
//! a configured trigger point.

use super::{Rule, StepContext};
use crate::{
    BlockItem, BlockParams, BlockTransform, ChainState, ForkEvent, MAIN_FORK, RuleError,
    TransactionInfo, assembler,
};
use alloy_primitives::B256;
use std::{
    collections::{BTreeMap, HashMap},
    sync::{Mutex, PoisonError},
};
use tracing::{debug, info};

/// Timestamp assigned to block number zero. Every later block advances the
/// clock by [`BLOCK_TIMESTAMP_STRIDE`], which keeps timestamps strictly
/// increasing along every fork.
const GENESIS_TIMESTAMP: u64 = 1_546_300_800;

/// Seconds between consecutive fabricated block timestamps.
const BLOCK_TIMESTAMP_STRIDE: u64 = 10;

/// Builds every configured fork through the block pipeline and drives
/// trigger-based fork switching while serving.
pub struct ForkRule {
    forks: BTreeMap<String, ForkEvent>,
    pipeline: Mutex<Vec<Box<dyn BlockTransform>>>,
}

impl std::fmt::Debug for ForkRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ForkRule")
            .field("forks", &self.forks.keys().collect::<Vec<_>>())
            .field("pipeline_stages", &self.pipeline.lock().map(|p| p.len()).unwrap_or(0))
            .finish()
    }
}

impl ForkRule {
    /// Creates the rule over the configured fork set.
    pub const fn new(forks: BTreeMap<String, ForkEvent>) -> Self {
        Self { forks, pipeline: Mutex::new(Vec::new()) }
    }

    /// Attaches a pipeline stage. Stages run in attachment order on every
    /// block constructed during initial population.
    pub fn attach<T: BlockTransform + 'static>(&self, stage: T) {
        self.pipeline.lock().unwrap_or_else(PoisonError::into_inner).push(Box::new(stage));
    }

    /// Validates the fork configuration invariants: exactly one `main` fork,
    /// well-ordered ranges, in-range scheduled transfers, and pairwise
    /// distinct start/end/trigger numbers across forks.
    pub fn validate(&self) -> Result<(), RuleError> {
        let main_count =
            self.forks.values().filter(|fork| fork.name == MAIN_FORK).count();
        if main_count != 1 {
            return Err(RuleError::MissingMainFork);
        }

        for fork in self.forks.values() {
            if fork.end_number < fork.start_number {
                return Err(RuleError::InvalidRange {
                    fork: fork.name.clone(),
                    start: fork.start_number,
                    end: fork.end_number,
                });
            }
            for event in &fork.transfers {
                if !fork.contains(event.block_number) {
                    return Err(RuleError::TransferOutOfRange {
                        fork: fork.name.clone(),
                        name: event.name.clone(),
                        number: event.block_number,
                        start: fork.start_number,
                        end: fork.end_number,
                    });
                }
            }
        }

        self.check_distinct("start", |fork| fork.start_number)?;
        self.check_distinct("end", |fork| fork.end_number)?;
        self.check_distinct("trigger", |fork| fork.trigger_number)?;
        Ok(())
    }

    fn check_distinct(
        &self,
        field: &'static str,
        bound: impl Fn(&ForkEvent) -> u64,
    ) -> Result<(), RuleError> {
        let mut seen: HashMap<u64, &str> = HashMap::new();
        for fork in self.forks.values() {
            let number = bound(fork);
            if let Some(first) = seen.insert(number, &fork.name) {
                return Err(RuleError::OverlappingForkBound {
                    first: first.to_owned(),
                    second: fork.name.clone(),
                    field,
                    number,
                });
            }
        }
        Ok(())
    }

    /// Constructs the default block shell for `number` on `fork`; contents
    /// and derived roots come from the pipeline afterwards.
    fn default_params(number: u64, fork: &ForkEvent) -> BlockParams {
        BlockParams {
            number,
            difficulty: fork.difficulty_at(number),
            timestamp: GENESIS_TIMESTAMP + number * BLOCK_TIMESTAMP_STRIDE,
            ..Default::default()
        }
    }

    /// Finalizes a pipeline output: re-derives the roots and hash from the
    /// post-pipeline receipt set, wraps the receipts into indexed transaction
    /// infos, and commits everything into the chain state. Returns the final
    /// block hash for parent linkage.
    fn commit(&self, state: &ChainState, mut item: BlockItem) -> Result<B256, RuleError> {
        assembler::reassemble(&mut item.block, &item.receipts);
        let block_hash = item.block.hash();

        let infos: Vec<TransactionInfo> = item
            .receipts
            .into_iter()
            .enumerate()
            .map(|(index, receipt)| TransactionInfo {
                receipt,
                block_hash,
                index: index as u64,
            })
            .collect();

        state.add_block(item.block, infos, &item.fork)?;
        Ok(block_hash)
    }
}

impl Rule for ForkRule {
    fn name(&self) -> &'static str {
        "fork-builder"
    }

    /// Constructs all configured forks. For each block number in the covered
    /// range, every fork containing that number gets a block chained onto the
    /// previous block built for *that fork*, threaded through the pipeline.
    fn apply(&self, state: &ChainState) -> Result<(), RuleError> {
        self.validate()?;

        // Non-empty after validation: a main fork exists.
        let min = self.forks.values().map(|fork| fork.start_number).min().unwrap_or(0);
        let max = self.forks.values().map(|fork| fork.end_number).max().unwrap_or(0);

        info!(
            forks = self.forks.len(),
            from = min,
            to = max,
            "building forks"
        );

        let mut pipeline = self.pipeline.lock().unwrap_or_else(PoisonError::into_inner);
        let mut parent_hashes: HashMap<String, B256> = HashMap::new();

        for number in min..max {
            for fork in self.forks.values() {
                if !fork.contains(number) {
                    continue;
                }
                let mut params = Self::default_params(number, fork);
                if let Some(parent) = parent_hashes.get(&fork.name) {
                    params.parent_hash = *parent;
                }

                let mut item = BlockItem {
                    fork: fork.name.clone(),
                    block: assembler::assemble(&params, &[]),
                    receipts: Vec::new(),
                };
                for stage in pipeline.iter_mut() {
                    item = stage.process(item)?;
                }

                let block_hash = self.commit(state, item)?;
                parent_hashes.insert(fork.name.clone(), block_hash);
            }
        }

        state.set_current_fork(MAIN_FORK);
        Ok(())
    }

    /// Compares the externally observed position against every fork's
    /// trigger. Exactly one match switches the active fork and jumps the head
    /// to the fork's post-trigger position, atomically under the state lock.
    fn step(&self, state: &ChainState, ctx: &StepContext) -> Result<(), RuleError> {
        let mut chain = state.locked();
        let observed = ctx.requested_number.unwrap_or_else(|| chain.head_block_number());
        let active = chain.current_fork().to_owned();

        let mut matches = self
            .forks
            .values()
            .filter(|fork| fork.trigger_number == observed && fork.name != active);
        let Some(fork) = matches.next() else {
            return Ok(());
        };
        if matches.next().is_some() {
            return Err(RuleError::AmbiguousTrigger { number: observed });
        }

        info!(
            from = %active,
            to = %fork.name,
            head = fork.post_trigger_number,
            "fork trigger crossed, switching active fork"
        );
        chain.set_current_fork(&fork.name);
        chain.set_head_block_number(fork.post_trigger_number);
        debug!(trigger = observed, "fork switch committed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{RandomFill, ScheduledTransfers, TransferEvent};
    use alloy_primitives::{Address, B256, U256};
    use rstest::rstest;

    fn fork(
        name: &str,
        start: u64,
        end: u64,
        trigger: u64,
        post_trigger: u64,
    ) -> ForkEvent {
        ForkEvent {
            name: name.to_owned(),
            start_number: start,
            end_number: end,
            trigger_number: trigger,
            post_trigger_number: post_trigger,
            initial_difficulty: U256::from(1_000_000),
            transfers: Vec::new(),
        }
    }

    fn fork_map(forks: Vec<ForkEvent>) -> BTreeMap<String, ForkEvent> {
        forks.into_iter().map(|fork| (fork.name.clone(), fork)).collect()
    }

    #[test]
    fn missing_main_fork_fails_validation() {
        let rule = ForkRule::new(fork_map(vec![
            fork("alpha", 0, 10, 100, 0),
            fork("beta", 20, 30, 200, 0),
        ]));
        assert_eq!(rule.validate().unwrap_err(), RuleError::MissingMainFork);
    }

    #[test]
    fn inverted_range_fails_validation() {
        let rule = ForkRule::new(fork_map(vec![fork(MAIN_FORK, 10, 5, 100, 0)]));
        assert!(matches!(
            rule.validate().unwrap_err(),
            RuleError::InvalidRange { start: 10, end: 5, .. }
        ));
    }

    #[rstest]
    #[case::same_start(fork("b", 0, 60, 201, 0), "start")]
    #[case::same_end(fork("b", 30, 50, 201, 0), "end")]
    #[case::same_trigger(fork("b", 30, 60, 200, 0), "trigger")]
    fn shared_bounds_fail_validation(#[case] other: ForkEvent, #[case] field: &str) {
        let rule =
            ForkRule::new(fork_map(vec![fork(MAIN_FORK, 0, 50, 200, 0), other]));
        match rule.validate().unwrap_err() {
            RuleError::OverlappingForkBound { field: found, .. } => {
                assert_eq!(found, field)
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn out_of_range_transfer_fails_validation() {
        let mut main = fork(MAIN_FORK, 10, 50, 200, 0);
        main.transfers.push(TransferEvent {
            name: "straggler".to_owned(),
            sender: None,
            recipient: B256::repeat_byte(1),
            amount: U256::ONE,
            block_number: 51,
        });
        let rule = ForkRule::new(fork_map(vec![main]));
        assert!(matches!(
            rule.validate().unwrap_err(),
            RuleError::TransferOutOfRange { number: 51, .. }
        ));
    }

    #[test]
    fn built_blocks_link_to_their_fork_parent() {
        let state = ChainState::new();
        let rule = ForkRule::new(fork_map(vec![
            fork(MAIN_FORK, 0, 20, 200, 0),
            fork("side", 5, 15, 210, 12),
        ]));
        rule.apply(&state).unwrap();

        let inner = state.locked();
        for fork_name in ["main", "side"] {
            let (start, end) = if fork_name == "main" { (0, 20) } else { (5, 15) };
            for number in start..end {
                let block = inner
                    .block_on_fork(number, fork_name)
                    .unwrap_or_else(|| panic!("missing block {number} on {fork_name}"));
                if number > start {
                    let parent = inner.block_on_fork(number - 1, fork_name).unwrap();
                    assert_eq!(block.parent_hash(), parent.hash());
                    assert!(block.timestamp() > parent.timestamp());
                }
            }
        }
        assert_eq!(inner.current_fork(), MAIN_FORK);
    }

    #[test]
    fn difficulty_is_baseline_plus_offset() {
        let state = ChainState::new();
        let rule = ForkRule::new(fork_map(vec![fork(MAIN_FORK, 3, 10, 200, 0)]));
        rule.apply(&state).unwrap();

        let inner = state.locked();
        let block = inner.block_on_fork(7, MAIN_FORK).unwrap();
        assert_eq!(block.header.difficulty, U256::from(1_000_004u64));
    }

    #[test]
    fn pipeline_output_is_committed_with_indexed_infos() {
        let state = ChainState::new();
        let rule = ForkRule::new(fork_map(vec![fork(MAIN_FORK, 0, 4, 200, 0)]));
        rule.attach(RandomFill::new(3, Address::ZERO));
        rule.apply(&state).unwrap();

        let inner = state.locked();
        let block = inner.block_on_fork(2, MAIN_FORK).unwrap();
        assert_eq!(block.transactions.len(), 3);
        for (index, tx) in block.transactions.iter().enumerate() {
            let info = inner.transaction_info(tx.hash()).expect("indexed transaction");
            assert_eq!(info.block_hash, block.hash());
            assert_eq!(info.index, index as u64);
        }
    }

    #[test]
    fn scheduled_transfer_lands_in_exactly_one_block() {
        let contract = Address::repeat_byte(0xcc);
        let mut main = fork(MAIN_FORK, 0, 20, 200, 0);
        let recipient = B256::repeat_byte(0x5a);
        main.transfers.push(TransferEvent {
            name: "burn-10".to_owned(),
            sender: None,
            recipient,
            amount: U256::from(77),
            block_number: 10,
        });
        let forks = fork_map(vec![main]);

        let state = ChainState::new();
        let rule = ForkRule::new(forks.clone());
        rule.attach(ScheduledTransfers::new(contract, &forks));
        rule.apply(&state).unwrap();

        let inner = state.locked();
        let mut carriers = 0;
        for number in 0..20 {
            let block = inner.block_on_fork(number, MAIN_FORK).unwrap();
            let carried = block
                .transactions
                .iter()
                .any(|tx| tx.input == crate::burn_calldata(recipient, U256::from(77)));
            if carried {
                carriers += 1;
                assert_eq!(number, 10);
            }
        }
        assert_eq!(carriers, 1);
    }

    #[test]
    fn trigger_switches_fork_and_jumps_head() {
        let state = ChainState::new();
        let forks = fork_map(vec![
            fork(MAIN_FORK, 0, 100, 1000, 0),
            fork("b", 45, 80, 50, 60),
        ]);
        let rule = ForkRule::new(forks);
        rule.apply(&state).unwrap();
        state.set_head_block_number(49);

        // Requesting 49 leaves the active fork alone.
        rule.step(&state, &StepContext::for_number(49)).unwrap();
        assert_eq!(state.current_fork(), MAIN_FORK);
        assert_eq!(state.head_block_number(), 49);

        // Requesting 50 crosses b's trigger: fork switches, head jumps to 60.
        rule.step(&state, &StepContext::for_number(50)).unwrap();
        assert_eq!(state.current_fork(), "b");
        assert_eq!(state.head_block_number(), 60);

        // Re-stepping at the trigger is a no-op once b is active.
        rule.step(&state, &StepContext::for_number(50)).unwrap();
        assert_eq!(state.current_fork(), "b");
        assert_eq!(state.head_block_number(), 60);
    }

    #[test]
    fn no_trigger_match_is_a_no_op() {
        let state = ChainState::new();
        let rule = ForkRule::new(fork_map(vec![fork(MAIN_FORK, 0, 10, 1000, 0)]));
        rule.apply(&state).unwrap();
        state.set_head_block_number(3);

        rule.step(&state, &StepContext::new()).unwrap();
        assert_eq!(state.current_fork(), MAIN_FORK);
        assert_eq!(state.head_block_number(), 3);
    }
}
