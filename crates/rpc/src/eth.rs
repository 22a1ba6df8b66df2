//! The `eth` namespace handlers.

use crate::{BlockSelector, BlockTag, RpcBlock, RpcTransaction, RpcTransactionReceipt};
use alloy_primitives::{B256, U64};
use async_trait::async_trait;
use jsonrpsee::{
    core::RpcResult,
    proc_macros::rpc,
    types::{ErrorObjectOwned, error::INTERNAL_ERROR_CODE},
};
use mockchain_core::{ChainError, ChainFacade};
use std::sync::Arc;
use tracing::{debug, warn};

/// The subset of the `eth` namespace the mock serves.
#[rpc(server, namespace = "eth")]
pub trait EthApi {
    /// Returns the current head block number.
    #[method(name = "blockNumber")]
    async fn block_number(&self) -> RpcResult<U64>;

    /// Returns the block at the given position on the active fork.
    #[method(name = "getBlockByNumber")]
    async fn block_by_number(
        &self,
        selector: BlockSelector,
        full: bool,
    ) -> RpcResult<Option<RpcBlock>>;

    /// Returns the block with the given hash, across all forks.
    #[method(name = "getBlockByHash")]
    async fn block_by_hash(&self, hash: B256, full: bool) -> RpcResult<Option<RpcBlock>>;

    /// Returns the transaction with the given hash.
    #[method(name = "getTransactionByHash")]
    async fn transaction_by_hash(&self, hash: B256) -> RpcResult<Option<RpcTransaction>>;

    /// Returns the receipt of the transaction with the given hash.
    #[method(name = "getTransactionReceipt")]
    async fn transaction_receipt(
        &self,
        hash: B256,
    ) -> RpcResult<Option<RpcTransactionReceipt>>;
}

/// [`EthApiServer`] over a [`ChainFacade`].
pub struct EthRpc {
    facade: Arc<dyn ChainFacade>,
}

impl std::fmt::Debug for EthRpc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EthRpc").finish_non_exhaustive()
    }
}

impl EthRpc {
    /// Creates the handler over the given facade.
    pub fn new(facade: Arc<dyn ChainFacade>) -> Self {
        Self { facade }
    }

    /// Resolves the block number of the containing block for transaction
    /// context fields. The info's block hash always resolves while the store
    /// is intact.
    fn containing_block_number(&self, block_hash: B256) -> Result<Option<u64>, ChainError> {
        Ok(self.facade.block_by_hash(block_hash)?.map(|block| block.number()))
    }
}

/// A facade failure is an internal invariant violation, never a caller
/// mistake; it maps to a generic internal error.
fn internal_error(err: ChainError) -> ErrorObjectOwned {
    warn!(%err, "chain facade failure");
    ErrorObjectOwned::owned(INTERNAL_ERROR_CODE, err.to_string(), None::<()>)
}

#[async_trait]
impl EthApiServer for EthRpc {
    async fn block_number(&self) -> RpcResult<U64> {
        let number = self.facade.block_number().map_err(internal_error)?;
        Ok(U64::from(number))
    }

    async fn block_by_number(
        &self,
        selector: BlockSelector,
        full: bool,
    ) -> RpcResult<Option<RpcBlock>> {
        let block = match selector {
            BlockSelector::Number(number) => {
                self.facade.block_by_number(number.to::<u64>()).map_err(internal_error)?
            }
            BlockSelector::Tag(BlockTag::Earliest) => {
                self.facade.block_by_number(0).map_err(internal_error)?
            }
            BlockSelector::Tag(BlockTag::Latest | BlockTag::Pending) => {
                self.facade.best_block().map_err(internal_error)?
            }
        };
        debug!(?selector, found = block.is_some(), "eth_getBlockByNumber");
        Ok(block.map(|block| RpcBlock::from_block(&block, full)))
    }

    async fn block_by_hash(&self, hash: B256, full: bool) -> RpcResult<Option<RpcBlock>> {
        let block = self.facade.block_by_hash(hash).map_err(internal_error)?;
        Ok(block.map(|block| RpcBlock::from_block(&block, full)))
    }

    async fn transaction_by_hash(&self, hash: B256) -> RpcResult<Option<RpcTransaction>> {
        let Some(info) = self.facade.transaction_info(hash).map_err(internal_error)? else {
            return Ok(None);
        };
        let Some(block_number) =
            self.containing_block_number(info.block_hash).map_err(internal_error)?
        else {
            return Ok(None);
        };
        Ok(Some(RpcTransaction::new(
            &info.receipt.transaction,
            info.block_hash,
            block_number,
            info.index,
        )))
    }

    async fn transaction_receipt(
        &self,
        hash: B256,
    ) -> RpcResult<Option<RpcTransactionReceipt>> {
        let Some(info) = self.facade.transaction_info(hash).map_err(internal_error)? else {
            return Ok(None);
        };
        let Some(block_number) =
            self.containing_block_number(info.block_hash).map_err(internal_error)?
        else {
            return Ok(None);
        };
        Ok(Some(RpcTransactionReceipt::new(&info, block_number)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{Address, U256};
    use mockchain_core::{
        ChainState, DefaultChainFacade, ForkEvent, ForkRule, MAIN_FORK, PopulationEngine,
        RandomFill,
    };
    use std::collections::BTreeMap;

    fn handler() -> (EthRpc, Arc<ChainState>) {
        let main = ForkEvent {
            name: MAIN_FORK.to_owned(),
            start_number: 0,
            end_number: 20,
            trigger_number: 1000,
            post_trigger_number: 0,
            initial_difficulty: U256::from(1000),
            transfers: Vec::new(),
        };
        let forks: BTreeMap<String, ForkEvent> =
            [(main.name.clone(), main)].into_iter().collect();
        let rule = ForkRule::new(forks);
        rule.attach(RandomFill::new(2, Address::repeat_byte(0xcc)));

        let state = Arc::new(ChainState::new());
        let engine = PopulationEngine::new(Arc::clone(&state), vec![Box::new(rule)]);
        let facade = DefaultChainFacade::new(engine, Arc::clone(&state)).unwrap();
        (EthRpc::new(Arc::new(facade)), state)
    }

    #[tokio::test]
    async fn block_number_reflects_the_head() {
        let (rpc, state) = handler();
        state.set_head_block_number(5);
        assert_eq!(rpc.block_number().await.unwrap(), U64::from(5));
    }

    #[tokio::test]
    async fn latest_and_explicit_number_agree_at_the_head() {
        let (rpc, state) = handler();
        state.set_head_block_number(5);

        let latest = rpc
            .block_by_number(BlockSelector::Tag(BlockTag::Latest), false)
            .await
            .unwrap()
            .unwrap();
        let explicit = rpc
            .block_by_number(BlockSelector::Number(U64::from(5)), false)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(latest.hash, explicit.hash);

        let beyond = rpc
            .block_by_number(BlockSelector::Number(U64::from(6)), false)
            .await
            .unwrap();
        assert!(beyond.is_none());
    }

    #[tokio::test]
    async fn transaction_lookup_carries_block_context() {
        let (rpc, state) = handler();
        state.set_head_block_number(5);

        let block = rpc
            .block_by_number(BlockSelector::Number(U64::from(3)), true)
            .await
            .unwrap()
            .unwrap();
        let crate::BlockTransactions::Full(txs) = &block.transactions else {
            panic!("full transactions requested");
        };
        let tx_hash = txs[0].hash;

        let tx = rpc.transaction_by_hash(tx_hash).await.unwrap().unwrap();
        assert_eq!(tx.block_hash, block.hash);
        assert_eq!(tx.block_number, U64::from(3));

        let receipt = rpc.transaction_receipt(tx_hash).await.unwrap().unwrap();
        assert_eq!(receipt.status, U64::from(1));
        assert_eq!(receipt.block_hash, block.hash);
    }

    #[tokio::test]
    async fn unknown_hashes_resolve_to_null() {
        let (rpc, _state) = handler();
        let missing = B256::repeat_byte(0xee);
        assert!(rpc.block_by_hash(missing, false).await.unwrap().is_none());
        assert!(rpc.transaction_by_hash(missing).await.unwrap().is_none());
        assert!(rpc.transaction_receipt(missing).await.unwrap().is_none());
    }
}
