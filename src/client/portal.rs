// Copyright 2022-2024 Protocol Labs
// SPDX-License-Identifier: MIT

use anyhow::{Context, Result};
use async_trait::async_trait;
use ethereum_types::H256;
use serde_json::json;
use url::Url;

use super::rpc::JsonRpcClient;
use crate::distribute::PortalNode;
use crate::types::NodeInfo;

/// Session with one running Portal node over its JSON-RPC endpoint
pub struct PortalClient {
    rpc: JsonRpcClient,
    endpoint: String,
    info: NodeInfo,
}

impl PortalClient {
    /// Open a session: the node must answer `discv5_nodeInfo`
    pub async fn connect(url: Url) -> Result<Self> {
        let rpc = JsonRpcClient::new(url.clone(), None);
        let info = rpc
            .request::<NodeInfo>("discv5_nodeInfo", json!([]))
            .await
            .with_context(|| format!("failed to reach portal node at {url}"))?;
        tracing::info!(node_id = ?info.node_id, "connected to portal node {url}");
        Ok(Self {
            rpc,
            endpoint: url.to_string(),
            info,
        })
    }

    pub fn enr(&self) -> &str {
        &self.info.enr
    }
}

#[async_trait]
impl PortalNode for PortalClient {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn node_id(&self) -> Option<H256> {
        Some(self.info.node_id)
    }

    async fn store(&self, content_key: &str, content_value: &str) -> Result<()> {
        let stored = self
            .rpc
            .request::<bool>("portal_historyStore", json!([content_key, content_value]))
            .await?;
        if !stored {
            anyhow::bail!("node declined to store {content_key}");
        }
        Ok(())
    }
}
