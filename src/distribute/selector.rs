//! Choice of which nodes receive a given piece of content.

use ethereum_types::H256;

use super::node::NodeHandle;
use crate::content::ContentKey;

/// Picks the subset of nodes a record is pushed to
pub trait TargetSelector: Send + Sync {
    fn select_targets<'a>(&self, key: &ContentKey, nodes: &'a [NodeHandle]) -> Vec<&'a NodeHandle>;
}

/// Every node, in establishment order
#[derive(Debug, Clone, Copy, Default)]
pub struct Broadcast;

impl TargetSelector for Broadcast {
    fn select_targets<'a>(
        &self,
        _key: &ContentKey,
        nodes: &'a [NodeHandle],
    ) -> Vec<&'a NodeHandle> {
        nodes.iter().collect()
    }
}

/// The `count` nodes whose id is closest (XOR metric) to the content id.
/// Nodes that did not report an id rank after all others.
#[derive(Debug, Clone, Copy)]
pub struct ClosestNodes {
    pub count: usize,
}

impl TargetSelector for ClosestNodes {
    fn select_targets<'a>(&self, key: &ContentKey, nodes: &'a [NodeHandle]) -> Vec<&'a NodeHandle> {
        let content_id = key.content_id();
        let mut ranked: Vec<(Option<H256>, &NodeHandle)> = nodes
            .iter()
            .map(|n| (n.node_id().map(|id| id ^ content_id), n))
            .collect();
        // stable: ties keep establishment order
        ranked.sort_by(|(a, _), (b, _)| match (a, b) {
            (Some(a), Some(b)) => a.cmp(b),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        });
        ranked.into_iter().take(self.count).map(|(_, n)| n).collect()
    }
}
