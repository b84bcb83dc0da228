use std::time::Duration;

use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

use super::pipeline::Bridge;
use crate::client::{ChainProvider, HeaderSource};

/// Counters of a watcher run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WatchStats {
    pub notifications: usize,
    pub failures: usize,
}

/// Follows new block hashes from a [`HeaderSource`] and feeds them to the
/// bridge one at a time
pub struct HeaderWatcher<S, P> {
    source: S,
    bridge: Bridge<P>,
    poll_interval: Duration,
}

impl<S: HeaderSource, P: ChainProvider> HeaderWatcher<S, P> {
    pub fn new(source: S, bridge: Bridge<P>, poll_interval: Duration) -> Self {
        Self {
            source,
            bridge,
            poll_interval,
        }
    }

    pub fn bridge(&self) -> &Bridge<P> {
        &self.bridge
    }

    /// Run until the bridge's cancellation token fires.
    ///
    /// A failed notification is logged and the next one is handled; a failed
    /// filter poll installs a new filter.
    pub async fn run(&self) -> WatchStats {
        let cancel = self.bridge.cancellation().clone();
        let mut stats = WatchStats::default();

        'install: loop {
            let Some(filter_id) = self.install_filter(&cancel).await else {
                break;
            };

            loop {
                if !self.pause(&cancel).await {
                    break 'install;
                }

                let hashes = match self.source.filter_changes(&filter_id).await {
                    Ok(hashes) => hashes,
                    Err(e) => {
                        tracing::warn!("polling block filter {filter_id} failed: {e:#}");
                        continue 'install;
                    }
                };

                for hash in hashes {
                    if cancel.is_cancelled() {
                        break 'install;
                    }
                    stats.notifications += 1;
                    if let Ok(report) = self.bridge.handle_new_header(hash).await {
                        tracing::debug!(
                            header_failures = report.header.failures.len(),
                            receipts_failures = report.receipts.failures.len(),
                            "block #{} done",
                            report.block_number
                        );
                    } else {
                        // already logged by the bridge
                        stats.failures += 1;
                    }
                }
            }
        }

        tracing::info!(
            "header watcher stopped after {} notification(s), {} failed",
            stats.notifications,
            stats.failures
        );
        stats
    }

    /// Install a block filter, retrying until it succeeds or the run is
    /// cancelled
    async fn install_filter(&self, cancel: &CancellationToken) -> Option<String> {
        loop {
            match self.source.new_block_filter().await {
                Ok(id) => return Some(id),
                Err(e) => tracing::warn!("failed to install block filter, retrying: {e:#}"),
            }
            if !self.pause(cancel).await {
                return None;
            }
        }
    }

    /// Sleep one poll interval; false when cancelled instead
    async fn pause(&self, cancel: &CancellationToken) -> bool {
        tokio::select! {
            _ = cancel.cancelled() => false,
            _ = sleep(self.poll_interval) => true,
        }
    }
}
