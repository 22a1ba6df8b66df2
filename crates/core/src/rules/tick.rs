//! Wall-clock driven head advancement.

use super::{Rule, StepContext};
use crate::{ChainState, RuleError};
use std::{
    sync::{Mutex, PoisonError},
    time::Instant,
};
use tracing::info;

/// Advances the publicly visible head as a function of elapsed wall-clock
/// time, capped at the active fork's upper bound.
///
/// Progression only happens synchronously inside a step invocation; there is
/// no background timer. The head never regresses under this rule.
#[derive(Debug)]
pub struct TickRule {
    /// Seconds of wall-clock time per fabricated block. Never zero.
    block_time: u64,
    starting_block_number: u64,
    reference: Mutex<Option<Instant>>,
}

impl TickRule {
    /// Creates the rule. `block_time` is in seconds and must be non-zero
    /// (enforced by configuration validation upstream).
    pub const fn new(block_time: u64, starting_block_number: u64) -> Self {
        debug_assert!(block_time > 0);
        Self { block_time, starting_block_number, reference: Mutex::new(None) }
    }

    /// Advances the head for `elapsed_secs` of elapsed time since the
    /// reference point. Split out from [`Rule::step`] so simulated time can
    /// drive it directly.
    fn advance(&self, state: &ChainState, elapsed_secs: u64) {
        let mut chain = state.locked();
        // On a fork that has "ended" without a switch, the tip is the head.
        let Some(tip) = chain.current_fork_tip() else {
            return;
        };

        let candidate =
            (elapsed_secs / self.block_time + self.starting_block_number).min(tip);
        if candidate > chain.head_block_number() {
            chain.set_head_block_number(candidate);
            info!(head = candidate, "applied tick, new head block number");
        }
    }
}

impl Rule for TickRule {
    fn name(&self) -> &'static str {
        "tick"
    }

    fn start(&self) {
        *self.reference.lock().unwrap_or_else(PoisonError::into_inner) =
            Some(Instant::now());
    }

    fn step(&self, state: &ChainState, _ctx: &StepContext) -> Result<(), RuleError> {
        let reference =
            *self.reference.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(reference) = reference {
            self.advance(state, reference.elapsed().as_secs());
        }
        Ok(())
    }
}
