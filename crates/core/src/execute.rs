//! Pseudo-execution of synthetic transfer payloads.
//!
//! This is a generator, not an executor: gas is always zero, status is always
//! success, and the only observable effect is a `Burn` log per transfer event.

use crate::{Transaction, TransactionReceipt, abi};
use alloy_primitives::{Address, B256, U256, Log};
use rand::{SeedableRng, rngs::StdRng};
use std::sync::{LazyLock, Mutex, PoisonError};

/// Fixed seed for the synthetic address generator, so fabricated chains are
/// reproducible across runs.
const ADDRESS_SEED: u64 = 42;

static ADDRESS_RNG: LazyLock<Mutex<StdRng>> =
    LazyLock::new(|| Mutex::new(StdRng::seed_from_u64(ADDRESS_SEED)));

/// Returns a deterministic-but-unique synthetic 20-byte address.
pub fn synthetic_address() -> Address {
    let mut rng = ADDRESS_RNG.lock().unwrap_or_else(PoisonError::into_inner);
    Address::random_with(&mut *rng)
}

/// Returns a deterministic-but-unique synthetic 32-byte recipient identifier.
pub fn synthetic_word() -> B256 {
    let mut rng = ADDRESS_RNG.lock().unwrap_or_else(PoisonError::into_inner);
    B256::random_with(&mut *rng)
}

/// A transfer to inject into the chain at a specific block number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferEvent {
    /// Configured name, used only for logging.
    pub name: String,
    /// Sender address; a synthetic one is generated when absent.
    pub sender: Option<Address>,
    /// 32-byte recipient identifier on the destination chain.
    pub recipient: B256,
    /// Transferred amount.
    pub amount: U256,
    /// The block number at which the transfer must be injected.
    pub block_number: u64,
}

/// The transaction/receipt pair produced by pseudo-executing a transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutedTransfer {
    /// The fabricated transaction.
    pub transaction: Transaction,
    /// Its receipt, carrying one `Burn` log per input event.
    pub receipt: TransactionReceipt,
}

/// Fabricates a burn-call transaction and its receipt for the given events.
///
/// Unspecified sender/recipient addresses are filled with synthetic ones. The
/// receipt's log list has exactly one entry per input event, keyed by the
/// bridge contract address and the event's recipient and amount.
pub fn execute_transfer(
    contract: Address,
    sender: Option<Address>,
    recipient: Option<Address>,
    events: &[TransferEvent],
) -> ExecutedTransfer {
    let sender = sender.unwrap_or_else(synthetic_address);
    let recipient = recipient.unwrap_or_else(synthetic_address);
    let input = events
        .first()
        .map(|event| abi::burn_calldata(event.recipient, event.amount))
        .unwrap_or_default();

    let transaction = Transaction {
        nonce: 0,
        gas_price: 0,
        gas_limit: 0,
        to: recipient,
        value: U256::ZERO,
        input,
        from: sender,
    };
    let receipt = build_receipt(contract, transaction.clone(), events);
    ExecutedTransfer { transaction, receipt }
}

fn build_receipt(
    contract: Address,
    transaction: Transaction,
    events: &[TransferEvent],
) -> TransactionReceipt {
    let sender_topic = transaction.from.into_word();
    let logs = events
        .iter()
        .map(|event| {
            Log::new_unchecked(
                contract,
                vec![abi::burn_event_topic(), sender_topic, event.recipient],
                event.amount.to_be_bytes::<32>().to_vec().into(),
            )
        })
        .collect();

    TransactionReceipt {
        transaction,
        success: true,
        cumulative_gas_used: 0,
        gas_used: 0,
        post_state: B256::ZERO,
        logs,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;

    fn event(name: &str, recipient: u8, amount: u64) -> TransferEvent {
        TransferEvent {
            name: name.to_owned(),
            sender: None,
            recipient: B256::repeat_byte(recipient),
            amount: U256::from(amount),
            block_number: 0,
        }
    }

    #[test]
    fn synthetic_addresses_are_unique() {
        let a = synthetic_address();
        let b = synthetic_address();
        assert_ne!(a, b);
        assert_ne!(a, Address::ZERO);
    }

    #[test]
    fn fabricated_transfer_never_models_failure() {
        let executed = execute_transfer(Address::ZERO, None, None, &[event("a", 1, 5)]);
        assert!(executed.receipt.success);
        assert_eq!(executed.receipt.gas_used, 0);
        assert_eq!(executed.receipt.cumulative_gas_used, 0);
        assert_eq!(executed.transaction.gas_price, 0);
        assert_eq!(executed.transaction.gas_limit, 0);
    }

    #[test]
    fn one_log_per_event() {
        let contract = address!("0x00000000000000000000000000000000000000cc");
        let events = vec![event("a", 1, 5), event("b", 2, 6)];
        let executed = execute_transfer(contract, None, None, &events);

        assert_eq!(executed.receipt.logs.len(), 2);
        for (log, event) in executed.receipt.logs.iter().zip(&events) {
            assert_eq!(log.address, contract);
            assert_eq!(log.topics()[0], abi::burn_event_topic());
            assert_eq!(log.topics()[2], event.recipient);
            assert_eq!(log.data.data.as_ref(), event.amount.to_be_bytes::<32>());
        }
    }

    #[test]
    fn explicit_sender_is_preserved() {
        let sender = address!("0x00000000000000000000000000000000000000aa");
        let executed = execute_transfer(Address::ZERO, Some(sender), None, &[event("a", 1, 5)]);
        assert_eq!(executed.transaction.from, sender);
        assert_eq!(executed.receipt.logs[0].topics()[1], sender.into_word());
    }

    #[test]
    fn payload_is_burn_calldata() {
        let executed = execute_transfer(Address::ZERO, None, None, &[event("a", 3, 9)]);
        assert_eq!(
            executed.transaction.input,
            abi::burn_calldata(B256::repeat_byte(3), U256::from(9))
        );
    }
}
