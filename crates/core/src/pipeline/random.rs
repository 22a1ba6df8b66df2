//! Pipeline stage that tops blocks up with pseudo-random transfers.

use super::{BlockItem, BlockTransform};
use crate::{RuleError, TransferEvent, assembler, execute_transfer, synthetic_address, synthetic_word};
use alloy_primitives::{Address, U256};

/// Fills every block with synthetic transfers until it carries a target
/// number of transactions.
///
/// Addresses come from the seeded synthetic generator, so the fabricated
/// traffic is reproducible across runs. Blocks already at or above the target
/// pass through untouched.
#[derive(Debug, Clone, Copy)]
pub struct RandomFill {
    target: usize,
    contract: Address,
}

impl RandomFill {
    /// Creates a fill stage topping blocks up to `target` transactions.
    pub const fn new(target: usize, contract: Address) -> Self {
        Self { target, contract }
    }
}

impl BlockTransform for RandomFill {
    fn process(&mut self, mut item: BlockItem) -> Result<BlockItem, RuleError> {
        debug_assert_eq!(item.block.transactions.len(), item.receipts.len());

        if item.receipts.len() >= self.target {
            return Ok(item);
        }

        let missing = self.target - item.receipts.len();
        for i in 0..missing {
            let event = TransferEvent {
                name: format!("random-{i}"),
                sender: None,
                recipient: synthetic_word(),
                amount: U256::ONE,
                block_number: item.block.number(),
            };
            let executed = execute_transfer(
                self.contract,
                Some(synthetic_address()),
                Some(synthetic_address()),
                std::slice::from_ref(&event),
            );
            item.receipts.push(executed.receipt);
        }

        assembler::reassemble(&mut item.block, &item.receipts);
        Ok(item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BlockParams, assembler::assemble};

    fn empty_item(number: u64) -> BlockItem {
        let params = BlockParams { number, ..Default::default() };
        BlockItem {
            fork: "main".to_owned(),
            block: assemble(&params, &[]),
            receipts: Vec::new(),
        }
    }

    #[test]
    fn tops_up_to_the_target() {
        let mut stage = RandomFill::new(4, Address::ZERO);
        let item = stage.process(empty_item(3)).unwrap();

        assert_eq!(item.receipts.len(), 4);
        assert_eq!(item.block.transactions.len(), 4);
        // The derived header fields must reflect the injected contents.
        assert_eq!(
            item.block.header.receipts_root,
            assembler::receipts_root(&item.receipts)
        );
        assert_eq!(
            item.block.header.transactions_root,
            assembler::transactions_root(&item.block.transactions)
        );
    }

    #[test]
    fn met_target_is_a_no_op() {
        let mut stage = RandomFill::new(2, Address::ZERO);
        let filled = stage.process(empty_item(3)).unwrap();
        let hash = filled.block.hash();

        let unchanged = stage.process(filled).unwrap();
        assert_eq!(unchanged.receipts.len(), 2);
        assert_eq!(unchanged.block.hash(), hash);
    }

    #[test]
    fn injection_changes_the_block_hash() {
        let original = empty_item(3);
        let before = original.block.hash();

        let mut stage = RandomFill::new(1, Address::ZERO);
        let filled = stage.process(original).unwrap();
        assert_ne!(filled.block.hash(), before);
    }
}
