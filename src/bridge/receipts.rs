use std::time::Duration;

use ethereum_types::H256;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

use crate::client::ChainProvider;
use crate::error::{BridgeError, BridgeResult};
use crate::types::RpcReceipt;

/// Poll the provider until the receipt of `tx_hash` is available.
///
/// Provider errors end the wait; an unknown receipt is asked for again
/// after `poll_interval`.
pub async fn wait_for_transaction_receipt<P>(
    provider: &P,
    tx_hash: H256,
    poll_interval: Duration,
    cancel: &CancellationToken,
) -> BridgeResult<RpcReceipt>
where
    P: ChainProvider + ?Sized,
{
    loop {
        match provider.transaction_receipt(tx_hash).await {
            Ok(Some(receipt)) => return Ok(receipt),
            Ok(None) => tracing::debug!("receipt for {tx_hash:?} not available yet"),
            Err(e) => {
                return Err(BridgeError::rpc_with_source(
                    format!("eth_getTransactionReceipt({tx_hash:?}) failed"),
                    e,
                ))
            }
        }

        tokio::select! {
            _ = cancel.cancelled() => return Err(BridgeError::Cancelled),
            _ = sleep(poll_interval) => {}
        }
    }
}

/// Receipts of every transaction of a block, in transaction order.
///
/// `timeout` bounds the whole collection, not each receipt.
pub async fn collect_receipts<P>(
    provider: &P,
    block_hash: H256,
    tx_hashes: &[H256],
    poll_interval: Duration,
    timeout: Option<Duration>,
    cancel: &CancellationToken,
) -> BridgeResult<Vec<RpcReceipt>>
where
    P: ChainProvider + ?Sized,
{
    let collect = async {
        let mut receipts = Vec::with_capacity(tx_hashes.len());
        for tx_hash in tx_hashes {
            let receipt =
                wait_for_transaction_receipt(provider, *tx_hash, poll_interval, cancel).await?;
            if receipt.transaction_hash != *tx_hash {
                return Err(BridgeError::rpc(format!(
                    "asked for receipt of {tx_hash:?}, got {:?}",
                    receipt.transaction_hash
                )));
            }
            receipts.push(receipt);
        }
        Ok(receipts)
    };

    match timeout {
        Some(limit) => tokio::time::timeout(limit, collect)
            .await
            .map_err(|_| BridgeError::ReceiptsTimeout {
                block_hash,
                timeout: limit,
            })?,
        None => collect.await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BlockId, RpcBlock};
    use async_trait::async_trait;
    use ethereum_types::{Bloom, U256, U64};
    use parking_lot::Mutex;
    use std::collections::HashMap;

    /// Knows every receipt, but only reveals one after it was asked for
    /// `delay` times
    #[derive(Default)]
    struct SlowReceipts {
        delay: usize,
        polls: Mutex<HashMap<H256, usize>>,
        fail: bool,
    }

    #[async_trait]
    impl ChainProvider for SlowReceipts {
        async fn block(&self, _: BlockId) -> anyhow::Result<Option<RpcBlock>> {
            Ok(None)
        }

        async fn transaction_receipt(&self, tx_hash: H256) -> anyhow::Result<Option<RpcReceipt>> {
            if self.fail {
                anyhow::bail!("node is syncing");
            }
            let mut polls = self.polls.lock();
            let seen = polls.entry(tx_hash).or_default();
            *seen += 1;
            if *seen <= self.delay {
                return Ok(None);
            }
            Ok(Some(RpcReceipt {
                transaction_hash: tx_hash,
                transaction_index: U64::zero(),
                block_hash: None,
                block_number: None,
                status: Some(U64::one()),
                root: None,
                cumulative_gas_used: U256::from(21_000),
                logs: Vec::new(),
                logs_bloom: Bloom::zero(),
                tx_type: None,
            }))
        }
    }

    fn hashes(n: u8) -> Vec<H256> {
        (1..=n).map(H256::repeat_byte).collect()
    }

    #[tokio::test(start_paused = true)]
    async fn polls_until_available() {
        let provider = SlowReceipts {
            delay: 3,
            ..Default::default()
        };
        let cancel = CancellationToken::new();
        let receipt = wait_for_transaction_receipt(
            &provider,
            H256::repeat_byte(1),
            Duration::from_secs(2),
            &cancel,
        )
        .await
        .unwrap();
        assert_eq!(receipt.transaction_hash, H256::repeat_byte(1));
        assert_eq!(provider.polls.lock()[&H256::repeat_byte(1)], 4);
    }

    #[tokio::test(start_paused = true)]
    async fn collects_in_transaction_order() {
        let provider = SlowReceipts {
            delay: 1,
            ..Default::default()
        };
        let cancel = CancellationToken::new();
        let receipts = collect_receipts(
            &provider,
            H256::zero(),
            &hashes(3),
            Duration::from_secs(2),
            None,
            &cancel,
        )
        .await
        .unwrap();
        let got: Vec<H256> = receipts.iter().map(|r| r.transaction_hash).collect();
        assert_eq!(got, hashes(3));
    }

    #[tokio::test(start_paused = true)]
    async fn overall_timeout_applies() {
        let provider = SlowReceipts {
            delay: usize::MAX,
            ..Default::default()
        };
        let cancel = CancellationToken::new();
        let err = collect_receipts(
            &provider,
            H256::repeat_byte(0xbb),
            &hashes(2),
            Duration::from_secs(2),
            Some(Duration::from_secs(30)),
            &cancel,
        )
        .await
        .unwrap_err();
        assert!(matches!(
            err,
            BridgeError::ReceiptsTimeout { timeout, .. } if timeout == Duration::from_secs(30)
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_stops_waiting() {
        let provider = SlowReceipts {
            delay: usize::MAX,
            ..Default::default()
        };
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            sleep(Duration::from_secs(5)).await;
            trigger.cancel();
        });
        let err = wait_for_transaction_receipt(
            &provider,
            H256::repeat_byte(1),
            Duration::from_secs(2),
            &cancel,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, BridgeError::Cancelled));
    }

    #[tokio::test]
    async fn provider_error_is_reported() {
        let provider = SlowReceipts {
            fail: true,
            ..Default::default()
        };
        let err = wait_for_transaction_receipt(
            &provider,
            H256::repeat_byte(1),
            Duration::from_secs(2),
            &CancellationToken::new(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, BridgeError::Rpc { .. }));
    }
}
