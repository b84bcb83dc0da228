use futures::future::join_all;

use super::node::NodeHandle;
use super::selector::{Broadcast, TargetSelector};
use crate::content::ContentKey;
use crate::error::TransportError;

/// Outcome of pushing one record
#[derive(Debug, Clone)]
pub struct PushReport {
    pub content_key: ContentKey,
    /// Number of nodes a store was attempted on
    pub attempted: usize,
    /// Failed attempts, in establishment order
    pub failures: Vec<TransportError>,
}

impl PushReport {
    /// Number of nodes that accepted the record
    pub fn delivered(&self) -> usize {
        self.attempted - self.failures.len()
    }
}

/// Pushes content records to the Portal nodes it owns
pub struct Distributor {
    nodes: Vec<NodeHandle>,
    selector: Box<dyn TargetSelector>,
}

impl Distributor {
    pub fn new(nodes: Vec<NodeHandle>, selector: Box<dyn TargetSelector>) -> Self {
        Self { nodes, selector }
    }

    /// Distributor sending every record to every node
    pub fn broadcast(nodes: Vec<NodeHandle>) -> Self {
        Self::new(nodes, Box::new(Broadcast))
    }

    pub fn nodes(&self) -> &[NodeHandle] {
        &self.nodes
    }

    /// Push one record to the selected nodes.
    ///
    /// Every target gets its own attempt; a node that fails is recorded in
    /// the report and does not affect the others.
    pub async fn push(&self, key: &ContentKey, value: &[u8]) -> PushReport {
        let key_hex = key.to_hex();
        let value_hex = format!("0x{}", hex::encode(value));
        let targets = self.selector.select_targets(key, &self.nodes);

        tracing::info!(
            content_type = %key.content_type(),
            targets = targets.len(),
            value_len = value.len(),
            "propagating history content {key_hex}"
        );

        let results = join_all(targets.iter().map(|node| {
            let key_hex = &key_hex;
            let value_hex = &value_hex;
            async move {
                node.node()
                    .store(key_hex, value_hex)
                    .await
                    .map_err(|e| TransportError {
                        endpoint: node.endpoint().to_string(),
                        message: format!("{e:#}"),
                    })
            }
        }))
        .await;

        let failures: Vec<TransportError> = results.into_iter().filter_map(Result::err).collect();
        for failure in &failures {
            tracing::warn!("{failure}");
        }

        PushReport {
            content_key: *key,
            attempted: targets.len(),
            failures,
        }
    }
}
