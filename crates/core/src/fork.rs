//! Fork definitions consumed by the fork construction rule.

use crate::TransferEvent;
use alloy_primitives::U256;

/// The name of the fork that is always present and initially active.
pub const MAIN_FORK: &str = "main";

/// A named, bounded range of block numbers representing one candidate chain
/// history, plus the trigger point at which it becomes the active fork.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForkEvent {
    /// Fork identity. Exactly one fork across a configuration is named
    /// [`MAIN_FORK`].
    pub name: String,
    /// First block number of the fork's range (inclusive).
    pub start_number: u64,
    /// Last block number of the fork's range (inclusive). Never precedes
    /// `start_number`.
    pub end_number: u64,
    /// The externally observed block number at which this fork activates.
    pub trigger_number: u64,
    /// Head position immediately after activation.
    pub post_trigger_number: u64,
    /// Difficulty baseline of the fork's first block.
    pub initial_difficulty: U256,
    /// Transfers scheduled on this fork, ordered by block number. Every
    /// scheduled block number lies within `[start_number, end_number]`.
    pub transfers: Vec<TransferEvent>,
}

impl ForkEvent {
    /// Returns whether `number` lies within this fork's range.
    pub const fn contains(&self, number: u64) -> bool {
        number >= self.start_number && number <= self.end_number
    }

    /// Difficulty of the block at `number`: the fork's baseline plus the
    /// offset from the fork start.
    pub fn difficulty_at(&self, number: u64) -> U256 {
        self.initial_difficulty + U256::from(number - self.start_number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fork(start: u64, end: u64) -> ForkEvent {
        ForkEvent {
            name: MAIN_FORK.to_owned(),
            start_number: start,
            end_number: end,
            trigger_number: 0,
            post_trigger_number: 0,
            initial_difficulty: U256::from(1000),
            transfers: Vec::new(),
        }
    }

    #[test]
    fn range_is_inclusive_on_both_ends() {
        let f = fork(10, 20);
        assert!(!f.contains(9));
        assert!(f.contains(10));
        assert!(f.contains(20));
        assert!(!f.contains(21));
    }

    #[test]
    fn difficulty_grows_with_offset_from_start() {
        let f = fork(10, 20);
        assert_eq!(f.difficulty_at(10), U256::from(1000));
        assert_eq!(f.difficulty_at(15), U256::from(1005));
    }
}
