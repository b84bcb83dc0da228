//! Scoped acquisition of node sessions.

use std::future::Future;

use anyhow::{Context, Result};
use url::Url;

use super::distributor::Distributor;
use super::node::NodeHandle;
use super::selector::TargetSelector;
use crate::client::PortalClient;

/// Connect to every Portal node at `urls` and hand them to a [`Distributor`].
///
/// Either all nodes are connected or none are kept: on the first failure the
/// sessions opened so far are released and the error is returned.
pub async fn connect_nodes(urls: &[Url], selector: Box<dyn TargetSelector>) -> Result<Distributor> {
    connect_with(
        urls,
        |url| async move { PortalClient::connect(url).await.map(NodeHandle::from) },
        selector,
    )
    .await
}

/// [`connect_nodes`] with a custom connector
pub async fn connect_with<F, Fut>(
    urls: &[Url],
    connect: F,
    selector: Box<dyn TargetSelector>,
) -> Result<Distributor>
where
    F: Fn(Url) -> Fut,
    Fut: Future<Output = Result<NodeHandle>>,
{
    let mut handles = Vec::with_capacity(urls.len());
    for (idx, url) in urls.iter().enumerate() {
        // Dropping `handles` on the error path releases the opened sessions
        let handle = connect(url.clone())
            .await
            .with_context(|| format!("portal node {} of {} ({url})", idx + 1, urls.len()))?;
        handles.push(handle);
    }
    tracing::info!("✅ connected to {} portal node(s)", handles.len());
    Ok(Distributor::new(handles, selector))
}
