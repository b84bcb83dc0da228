use anyhow::Result;
use async_trait::async_trait;
use ethereum_types::H256;

/// A Portal node able to accept history content
#[async_trait]
pub trait PortalNode: Send + Sync {
    /// Human readable address, used in logs and transport errors
    fn endpoint(&self) -> &str;

    /// Overlay node id, when the node reported one
    fn node_id(&self) -> Option<H256>;

    /// Store one record; both arguments are 0x-prefixed hex
    async fn store(&self, content_key: &str, content_value: &str) -> Result<()>;
}

/// Owned session with one node. The session ends when the handle is dropped.
pub struct NodeHandle {
    node: Box<dyn PortalNode>,
}

impl NodeHandle {
    pub fn new(node: Box<dyn PortalNode>) -> Self {
        Self { node }
    }

    pub fn endpoint(&self) -> &str {
        self.node.endpoint()
    }

    pub fn node_id(&self) -> Option<H256> {
        self.node.node_id()
    }

    pub(crate) fn node(&self) -> &dyn PortalNode {
        self.node.as_ref()
    }
}

impl<N: PortalNode + 'static> From<N> for NodeHandle {
    fn from(node: N) -> Self {
        Self::new(Box::new(node))
    }
}

impl std::fmt::Debug for NodeHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeHandle")
            .field("endpoint", &self.endpoint())
            .field("node_id", &self.node_id())
            .finish()
    }
}

impl Drop for NodeHandle {
    fn drop(&mut self) {
        tracing::debug!("released portal node session {}", self.node.endpoint());
    }
}
