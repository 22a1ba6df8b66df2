//! Wire-format response types for the `eth` namespace.
//!
//! Shapes follow the standard Ethereum JSON-RPC encoding: camelCase keys and
//! hex-encoded quantities. Conversions take the fabricated domain values plus
//! whatever block context the caller resolved.

use alloy_primitives::{Address, B64, B256, Bloom, Bytes, Log, U64, U256};
use mockchain_core::{Block, Transaction, TransactionInfo};
use serde::{Deserialize, Serialize};

/// The block position argument of `eth_getBlockByNumber`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BlockSelector {
    /// An explicit block number, hex encoded.
    Number(U64),
    /// A named position tag.
    Tag(BlockTag),
}

/// A named block position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockTag {
    /// The current head.
    Latest,
    /// Block number zero.
    Earliest,
    /// Treated as the current head; the mock holds nothing in flight.
    Pending,
}

/// A block as served over the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcBlock {
    /// Block number.
    pub number: U64,
    /// Block hash.
    pub hash: B256,
    /// Parent block hash.
    pub parent_hash: B256,
    /// Hash of the uncle list.
    pub sha3_uncles: B256,
    /// Beneficiary address.
    pub miner: Address,
    /// State trie root.
    pub state_root: B256,
    /// Transaction trie root.
    pub transactions_root: B256,
    /// Receipt trie root.
    pub receipts_root: B256,
    /// Union of the receipt blooms.
    pub logs_bloom: Bloom,
    /// Block difficulty.
    pub difficulty: U256,
    /// Gas limit.
    pub gas_limit: U64,
    /// Gas used.
    pub gas_used: U64,
    /// Block timestamp, in seconds.
    pub timestamp: U64,
    /// Extra data bytes.
    pub extra_data: Bytes,
    /// Mix hash.
    pub mix_hash: B256,
    /// Proof-of-work nonce.
    pub nonce: B64,
    /// The block's transactions, full or hashes only per the request.
    pub transactions: BlockTransactions,
}

/// The transaction list of an [`RpcBlock`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BlockTransactions {
    /// Transaction hashes only.
    Hashes(Vec<B256>),
    /// Fully encoded transactions.
    Full(Vec<RpcTransaction>),
}

impl RpcBlock {
    /// Encodes a block, embedding full transactions or hashes only.
    pub fn from_block(block: &Block, full: bool) -> Self {
        let hash = block.hash();
        let transactions = if full {
            BlockTransactions::Full(
                block
                    .transactions
                    .iter()
                    .enumerate()
                    .map(|(index, tx)| {
                        RpcTransaction::new(tx, hash, block.number(), index as u64)
                    })
                    .collect(),
            )
        } else {
            BlockTransactions::Hashes(
                block.transactions.iter().map(Transaction::hash).collect(),
            )
        };

        Self {
            number: U64::from(block.number()),
            hash,
            parent_hash: block.header.parent_hash,
            sha3_uncles: block.header.ommers_hash,
            miner: block.header.beneficiary,
            state_root: block.header.state_root,
            transactions_root: block.header.transactions_root,
            receipts_root: block.header.receipts_root,
            logs_bloom: block.header.logs_bloom,
            difficulty: block.header.difficulty,
            gas_limit: U64::from(block.header.gas_limit),
            gas_used: U64::from(block.header.gas_used),
            timestamp: U64::from(block.header.timestamp),
            extra_data: block.header.extra_data.clone(),
            mix_hash: block.header.mix_hash,
            nonce: block.header.nonce,
            transactions,
        }
    }
}

/// A transaction as served over the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcTransaction {
    /// Transaction content hash.
    pub hash: B256,
    /// Sender account nonce.
    pub nonce: U64,
    /// Hash of the containing block.
    pub block_hash: B256,
    /// Number of the containing block.
    pub block_number: U64,
    /// Index within the containing block.
    pub transaction_index: U64,
    /// Sender address.
    pub from: Address,
    /// Recipient address.
    pub to: Address,
    /// Transferred value in wei.
    pub value: U256,
    /// Gas price in wei.
    pub gas_price: U256,
    /// Gas limit.
    pub gas: U64,
    /// Call payload.
    pub input: Bytes,
}

impl RpcTransaction {
    /// Encodes a transaction with its block context.
    pub fn new(tx: &Transaction, block_hash: B256, block_number: u64, index: u64) -> Self {
        Self {
            hash: tx.hash(),
            nonce: U64::from(tx.nonce),
            block_hash,
            block_number: U64::from(block_number),
            transaction_index: U64::from(index),
            from: tx.from,
            to: tx.to,
            value: tx.value,
            gas_price: U256::from(tx.gas_price),
            gas: U64::from(tx.gas_limit),
            input: tx.input.clone(),
        }
    }
}

/// A transaction receipt as served over the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcTransactionReceipt {
    /// Transaction content hash.
    pub transaction_hash: B256,
    /// Index within the containing block.
    pub transaction_index: U64,
    /// Hash of the containing block.
    pub block_hash: B256,
    /// Number of the containing block.
    pub block_number: U64,
    /// Sender address.
    pub from: Address,
    /// Recipient address.
    pub to: Address,
    /// Cumulative gas used in the block up to this transaction.
    pub cumulative_gas_used: U64,
    /// Gas used by this transaction.
    pub gas_used: U64,
    /// Logs emitted by the transaction.
    pub logs: Vec<RpcLog>,
    /// Bloom filter over the logs.
    pub logs_bloom: Bloom,
    /// Outcome status, `0x1` on success.
    pub status: U64,
    /// Post-transaction state root.
    pub root: B256,
}

impl RpcTransactionReceipt {
    /// Encodes a receipt from its indexed info and the containing block's
    /// number.
    pub fn new(info: &TransactionInfo, block_number: u64) -> Self {
        let receipt = &info.receipt;
        let transaction_hash = receipt.transaction.hash();
        let logs = receipt
            .logs
            .iter()
            .enumerate()
            .map(|(log_index, log)| {
                RpcLog::new(
                    log,
                    info.block_hash,
                    block_number,
                    transaction_hash,
                    info.index,
                    log_index as u64,
                )
            })
            .collect();

        Self {
            transaction_hash,
            transaction_index: U64::from(info.index),
            block_hash: info.block_hash,
            block_number: U64::from(block_number),
            from: receipt.transaction.from,
            to: receipt.transaction.to,
            cumulative_gas_used: U64::from(receipt.cumulative_gas_used),
            gas_used: U64::from(receipt.gas_used),
            logs,
            logs_bloom: receipt.bloom(),
            status: U64::from(u64::from(receipt.success)),
            root: receipt.post_state,
        }
    }
}

/// A log entry as served over the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcLog {
    /// Emitting contract address.
    pub address: Address,
    /// Indexed log topics.
    pub topics: Vec<B256>,
    /// Unindexed log payload.
    pub data: Bytes,
    /// Hash of the containing block.
    pub block_hash: B256,
    /// Number of the containing block.
    pub block_number: U64,
    /// Hash of the emitting transaction.
    pub transaction_hash: B256,
    /// Index of the emitting transaction within its block.
    pub transaction_index: U64,
    /// Index of the log within its block.
    pub log_index: U64,
}

impl RpcLog {
    fn new(
        log: &Log,
        block_hash: B256,
        block_number: u64,
        transaction_hash: B256,
        transaction_index: u64,
        log_index: u64,
    ) -> Self {
        Self {
            address: log.address,
            topics: log.topics().to_vec(),
            data: log.data.data.clone(),
            block_hash,
            block_number: U64::from(block_number),
            transaction_hash,
            transaction_index: U64::from(transaction_index),
            log_index: U64::from(log_index),
        }
    }
}
