#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

mod response;
pub use response::{
    BlockSelector, BlockTag, BlockTransactions, RpcBlock, RpcLog, RpcTransaction,
    RpcTransactionReceipt,
};

mod eth;
pub use eth::{EthApiServer, EthRpc};

mod server;
pub use server::launch;
