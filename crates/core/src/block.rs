//! Block, transaction, and receipt values fabricated by the engine.

use alloy_consensus::{
    Header,
    constants::{EMPTY_OMMER_ROOT_HASH, EMPTY_ROOT_HASH},
};
use alloy_primitives::{Address, B64, B256, Bloom, Bytes, Log, U256, keccak256};
use alloy_rlp::{Encodable, RlpEncodable};

/// A synthetic transaction.
///
/// Unlike a real Ethereum transaction, the sender is carried explicitly in the
/// payload rather than recovered from a signature; the mock never signs
/// anything. The content hash is the keccak of the RLP encoding, so any field
/// change yields a new identity.
#[derive(Debug, Clone, PartialEq, Eq, RlpEncodable)]
pub struct Transaction {
    /// Sender account nonce.
    pub nonce: u64,
    /// Gas price in wei. Always zero for fabricated transactions.
    pub gas_price: u128,
    /// Gas limit. Always zero for fabricated transactions.
    pub gas_limit: u64,
    /// Recipient address.
    pub to: Address,
    /// Transferred value in wei.
    pub value: U256,
    /// Call payload.
    pub input: Bytes,
    /// Sender address.
    pub from: Address,
}

impl Transaction {
    /// Computes the content hash of this transaction.
    pub fn hash(&self) -> B256 {
        let mut buf = Vec::new();
        self.encode(&mut buf);
        keccak256(&buf)
    }
}

/// The outcome of pseudo-executing a [`Transaction`].
///
/// Fabricated receipts always succeed and consume no gas; the builder models a
/// generator, not an executor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionReceipt {
    /// The transaction this receipt belongs to.
    pub transaction: Transaction,
    /// Outcome status. Always `true` for fabricated receipts.
    pub success: bool,
    /// Cumulative gas used in the block up to and including this transaction.
    pub cumulative_gas_used: u64,
    /// Gas used by this transaction alone.
    pub gas_used: u64,
    /// Post-transaction state root placeholder.
    pub post_state: B256,
    /// Log entries emitted by the pseudo-execution.
    pub logs: Vec<Log>,
}

impl TransactionReceipt {
    /// Derives the bloom filter covering this receipt's logs.
    pub fn bloom(&self) -> Bloom {
        let mut bloom = Bloom::ZERO;
        for log in &self.logs {
            bloom.accrue_log(log);
        }
        bloom
    }

    /// Encodes the receipt for inclusion in the receipt trie.
    ///
    /// Pre-Byzantium shape: `[post_state, cumulative_gas, bloom, logs]`.
    pub fn trie_encode(&self, out: &mut Vec<u8>) {
        ReceiptTrieRlp {
            post_state: self.post_state,
            cumulative_gas_used: self.cumulative_gas_used,
            bloom: self.bloom(),
            logs: &self.logs,
        }
        .encode(out);
    }
}

#[derive(RlpEncodable)]
struct ReceiptTrieRlp<'a> {
    post_state: B256,
    cumulative_gas_used: u64,
    bloom: Bloom,
    logs: &'a Vec<Log>,
}

/// A receipt paired with the hash of its containing block and the
/// transaction's index within that block.
///
/// This is the unit indexed for hash-based transaction lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionInfo {
    /// The receipt, which carries its transaction.
    pub receipt: TransactionReceipt,
    /// Hash of the block containing the transaction.
    pub block_hash: B256,
    /// Index of the transaction within its block.
    pub index: u64,
}

/// The non-derived header fields handed to the assembler.
///
/// The roots and bloom are computed by [`crate::assembler::assemble`] from the
/// receipt set, never supplied here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockParams {
    /// Hash of the parent block header.
    pub parent_hash: B256,
    /// Hash of the uncle list.
    pub ommers_hash: B256,
    /// Beneficiary (coinbase) address.
    pub beneficiary: Address,
    /// Block difficulty.
    pub difficulty: U256,
    /// Block number.
    pub number: u64,
    /// Gas limit.
    pub gas_limit: u64,
    /// Gas used.
    pub gas_used: u64,
    /// Block timestamp, in seconds.
    pub timestamp: u64,
    /// Arbitrary extra data.
    pub extra_data: Bytes,
    /// Mix hash.
    pub mix_hash: B256,
    /// Proof-of-work nonce.
    pub nonce: B64,
    /// State trie root placeholder; the mock never executes state.
    pub state_root: B256,
}

impl Default for BlockParams {
    fn default() -> Self {
        Self {
            parent_hash: B256::ZERO,
            ommers_hash: EMPTY_OMMER_ROOT_HASH,
            beneficiary: Address::ZERO,
            difficulty: U256::ZERO,
            number: 0,
            gas_limit: 0,
            gas_used: 0,
            timestamp: 0,
            extra_data: Bytes::new(),
            mix_hash: B256::ZERO,
            nonce: B64::ZERO,
            state_root: EMPTY_ROOT_HASH,
        }
    }
}

/// A fabricated block.
///
/// The hash is always recomputed from the header, never stored independently
/// of it; whenever the transaction set changes the block must be re-assembled
/// so the derived roots (and therefore the hash) stay consistent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    /// The block header.
    pub header: Header,
    /// Transactions included in the block, in order.
    pub transactions: Vec<Transaction>,
    /// Uncle headers.
    pub ommers: Vec<Header>,
}

impl Block {
    /// Computes the block hash from the header.
    pub fn hash(&self) -> B256 {
        self.header.hash_slow()
    }

    /// Returns the block number.
    pub const fn number(&self) -> u64 {
        self.header.number
    }

    /// Returns the parent block hash.
    pub const fn parent_hash(&self) -> B256 {
        self.header.parent_hash
    }

    /// Returns the block timestamp.
    pub const fn timestamp(&self) -> u64 {
        self.header.timestamp
    }
}
