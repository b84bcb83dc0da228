// Copyright 2022-2024 Protocol Labs
// SPDX-License-Identifier: MIT

//! Clients for the execution chain and for Portal nodes.

pub mod eth;
pub mod portal;
pub mod rpc;

pub use eth::EthClient;
pub use portal::PortalClient;
pub use rpc::JsonRpcClient;

use anyhow::Result;
use async_trait::async_trait;
use ethereum_types::H256;

use crate::types::{BlockId, RpcBlock, RpcReceipt};

/// Source of canonical chain data.
///
/// `Ok(None)` means the provider does not (yet) know the requested item.
#[async_trait]
pub trait ChainProvider: Send + Sync {
    async fn block(&self, id: BlockId) -> Result<Option<RpcBlock>>;

    async fn transaction_receipt(&self, tx_hash: H256) -> Result<Option<RpcReceipt>>;
}

/// Stream of new block hashes, exposed as a polled filter
#[async_trait]
pub trait HeaderSource: Send + Sync {
    async fn new_block_filter(&self) -> Result<String>;

    /// Hashes of blocks added since the previous poll of `filter_id`
    async fn filter_changes(&self, filter_id: &str) -> Result<Vec<H256>>;
}
