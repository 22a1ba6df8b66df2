//! The population lifecycle wrapper connecting rules to the chain state.

use crate::{ChainState, Rule, RuleError, StepContext};
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use tracing::info;

/// Runs every rule once at startup (initial population) and re-invokes each
/// rule's step function on every subsequent externally observed access.
///
/// The engine owns no chain data itself; it only connects rules to the shared
/// [`ChainState`].
pub struct PopulationEngine {
    state: Arc<ChainState>,
    rules: Vec<Box<dyn Rule>>,
    populated: AtomicBool,
}

impl std::fmt::Debug for PopulationEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PopulationEngine")
            .field("rules", &self.rules.iter().map(|rule| rule.name()).collect::<Vec<_>>())
            .field("populated", &self.populated.load(Ordering::SeqCst))
            .finish()
    }
}

impl PopulationEngine {
    /// Creates the engine over a shared chain state and an ordered rule list.
    pub fn new(state: Arc<ChainState>, rules: Vec<Box<dyn Rule>>) -> Self {
        Self { state, rules, populated: AtomicBool::new(false) }
    }

    /// Runs the one-time initial population pass: every rule's `start` and
    /// `apply`, in registration order. Running it twice is an invariant
    /// violation.
    pub fn populate_initial(&self) -> Result<(), RuleError> {
        if self.populated.swap(true, Ordering::SeqCst) {
            return Err(RuleError::AlreadyPopulated);
        }
        for rule in &self.rules {
            info!(rule = rule.name(), "initial rule application");
            rule.start();
            rule.apply(&self.state)?;
        }
        Ok(())
    }

    /// Runs every rule's step function for one external access.
    pub fn populate_step(&self, ctx: &StepContext) -> Result<(), RuleError> {
        for rule in &self.rules {
            rule.step(&self.state, ctx)?;
        }
        Ok(())
    }
}
