//! Block assembly primitives: trie roots, log bloom aggregation, and header
//! derivation.
//!
//! Every content-mutating step of the construction pipeline must come back
//! through [`reassemble`] before the block's hash is read, since the hash
//! depends on the derived roots.

use crate::{Block, BlockParams, Transaction, TransactionReceipt};
use alloy_consensus::Header;
use alloy_primitives::{B256, Bloom};
use alloy_rlp::Encodable;
use alloy_trie::root::ordered_trie_root_with_encoder;

/// Computes the transaction-trie root over an ordered transaction set.
///
/// Keys are the RLP-encoded transaction indices; the empty set yields the
/// well-known empty-trie hash.
pub fn transactions_root(transactions: &[Transaction]) -> B256 {
    ordered_trie_root_with_encoder(transactions, |tx, buf| tx.encode(buf))
}

/// Computes the receipt-trie root over an ordered receipt set.
pub fn receipts_root(receipts: &[TransactionReceipt]) -> B256 {
    ordered_trie_root_with_encoder(receipts, |receipt, buf| receipt.trie_encode(buf))
}

/// Aggregates the log bloom across a receipt set.
pub fn logs_bloom(receipts: &[TransactionReceipt]) -> Bloom {
    let mut bloom = Bloom::ZERO;
    for receipt in receipts {
        bloom |= receipt.bloom();
    }
    bloom
}

/// Assembles an immutable block from header fields and a receipt set.
///
/// The block's transaction list is derived from the receipts (one transaction
/// per receipt, in order), and the transaction root, receipt root, and log
/// bloom are computed from it.
pub fn assemble(params: &BlockParams, receipts: &[TransactionReceipt]) -> Block {
    let transactions: Vec<Transaction> =
        receipts.iter().map(|receipt| receipt.transaction.clone()).collect();
    let header = Header {
        parent_hash: params.parent_hash,
        ommers_hash: params.ommers_hash,
        beneficiary: params.beneficiary,
        state_root: params.state_root,
        transactions_root: transactions_root(&transactions),
        receipts_root: receipts_root(receipts),
        logs_bloom: logs_bloom(receipts),
        difficulty: params.difficulty,
        number: params.number,
        gas_limit: params.gas_limit,
        gas_used: params.gas_used,
        timestamp: params.timestamp,
        extra_data: params.extra_data.clone(),
        mix_hash: params.mix_hash,
        nonce: params.nonce,
        ..Default::default()
    };
    Block { header, transactions, ommers: Vec::new() }
}

/// Refreshes a block's transaction list and derived header fields from an
/// updated receipt set.
///
/// The block hash changes as a side effect; callers chaining blocks must read
/// the parent hash only after the final reassembly.
pub fn reassemble(block: &mut Block, receipts: &[TransactionReceipt]) {
    block.transactions = receipts.iter().map(|receipt| receipt.transaction.clone()).collect();
    block.header.transactions_root = transactions_root(&block.transactions);
    block.header.receipts_root = receipts_root(receipts);
    block.header.logs_bloom = logs_bloom(receipts);
}
