// Copyright 2022-2024 Protocol Labs
// SPDX-License-Identifier: MIT

use anyhow::Result;
use async_trait::async_trait;
use ethereum_types::H256;
use serde_json::json;
use url::Url;

use super::rpc::JsonRpcClient;
use super::{ChainProvider, HeaderSource};
use crate::types::{BlockId, RpcBlock, RpcReceipt};

/// Execution client reached over the standard `eth_` JSON-RPC namespace
#[derive(Clone)]
pub struct EthClient {
    rpc: JsonRpcClient,
}

impl EthClient {
    pub fn new(url: Url, bearer_token: Option<&str>) -> Self {
        Self {
            rpc: JsonRpcClient::new(url, bearer_token),
        }
    }

    pub fn url(&self) -> &Url {
        self.rpc.url()
    }
}

#[async_trait]
impl ChainProvider for EthClient {
    async fn block(&self, id: BlockId) -> Result<Option<RpcBlock>> {
        let r = match id {
            BlockId::Hash(hash) => {
                self.rpc
                    .request::<Option<RpcBlock>>("eth_getBlockByHash", json!([hash, false]))
                    .await?
            }
            BlockId::Number(n) => {
                self.rpc
                    .request::<Option<RpcBlock>>(
                        "eth_getBlockByNumber",
                        json!([format!("{n:#x}"), false]),
                    )
                    .await?
            }
        };
        tracing::debug!("received block {id}: found={}", r.is_some());
        Ok(r)
    }

    async fn transaction_receipt(&self, tx_hash: H256) -> Result<Option<RpcReceipt>> {
        self.rpc
            .request::<Option<RpcReceipt>>("eth_getTransactionReceipt", json!([tx_hash]))
            .await
    }
}

#[async_trait]
impl HeaderSource for EthClient {
    async fn new_block_filter(&self) -> Result<String> {
        let id = self
            .rpc
            .request::<String>("eth_newBlockFilter", json!([]))
            .await?;
        tracing::info!("installed block filter {id}");
        Ok(id)
    }

    async fn filter_changes(&self, filter_id: &str) -> Result<Vec<H256>> {
        self.rpc
            .request::<Vec<H256>>("eth_getFilterChanges", json!([filter_id]))
            .await
    }
}
