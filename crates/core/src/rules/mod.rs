//! Rules driving population and steady-state progression of the chain state.
//!
//! A rule is an action on the chain state: it runs once during initial
//! population and then once per external access. Rules hold only the state
//! they need and reach the shared chain state exclusively through its lock.

mod fork;
pub use fork::ForkRule;

mod tick;
pub use tick::TickRule;

use crate::{ChainState, RuleError};

/// Context handed to every rule step, describing the external access that
/// triggered it.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StepContext {
    /// The block number the caller asked about, when the access names one.
    pub requested_number: Option<u64>,
}

impl StepContext {
    /// A context for an access that names no block number.
    pub const fn new() -> Self {
        Self { requested_number: None }
    }

    /// A context for an access that asked about a specific block number.
    pub const fn for_number(number: u64) -> Self {
        Self { requested_number: Some(number) }
    }
}

/// An action applied to the chain state per execution.
pub trait Rule: Send + Sync {
    /// A short identifier used in logs.
    fn name(&self) -> &'static str;

    /// Captures any reference state needed before the initial population
    /// pass. Not every rule needs one.
    fn start(&self) {}

    /// Runs the rule's one-time initial population work.
    fn apply(&self, state: &ChainState) -> Result<(), RuleError> {
        let _ = state;
        Ok(())
    }

    /// Runs on every subsequent external access.
    fn step(&self, state: &ChainState, ctx: &StepContext) -> Result<(), RuleError>;
}
