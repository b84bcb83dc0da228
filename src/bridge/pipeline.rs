// Copyright 2022-2024 Protocol Labs
// SPDX-License-Identifier: MIT

use std::time::Duration;

use ethereum_types::H256;
use tokio_util::sync::CancellationToken;

use super::receipts::collect_receipts;
use crate::client::ChainProvider;
use crate::content::{
    encode_header, encode_receipts, validate_root, ChainId, ContentKey, ForkSchedule,
};
use crate::distribute::{Distributor, PushReport};
use crate::error::{BridgeError, EncodingError, NotificationError};
use crate::types::{BlockId, RpcBlock};

/// Default interval between receipt availability polls
pub const DEFAULT_RECEIPT_POLL: Duration = Duration::from_secs(2);

/// Progress of a single header notification. Stages only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    Received,
    Fetched,
    HeaderEncoded,
    HeaderValidated,
    HeaderPushed,
    ReceiptsFetched,
    ReceiptsEncoded,
    ReceiptsValidated,
    ReceiptsPushed,
    Done,
}

/// What a fully processed notification pushed
#[derive(Debug, Clone)]
pub struct NotificationReport {
    pub block_hash: H256,
    pub block_number: u64,
    /// Last stage reached, `Stage::Done` for a complete notification
    pub stage: Stage,
    pub header: PushReport,
    pub receipts: PushReport,
}

/// Turns header notifications into validated history content and hands it
/// to the distributor
pub struct Bridge<P> {
    provider: P,
    distributor: Distributor,
    chain_id: ChainId,
    forks: ForkSchedule,
    receipt_poll: Duration,
    receipt_timeout: Option<Duration>,
    cancel: CancellationToken,
}

/// Failure of one stage, before the chain id and block hash are attached
struct StageFailure {
    stage: Stage,
    source: BridgeError,
}

/// What a notification has established so far, kept for error reporting
#[derive(Default)]
struct Progress {
    block_hash: H256,
    header: Option<PushReport>,
}

impl Progress {
    fn reach(&self, stage: Stage) {
        tracing::debug!(block_hash = ?self.block_hash, "reached {stage:?}");
    }
}

trait AtStage<T> {
    fn at(self, stage: Stage) -> Result<T, StageFailure>;
}

impl<T, E: Into<BridgeError>> AtStage<T> for Result<T, E> {
    fn at(self, stage: Stage) -> Result<T, StageFailure> {
        self.map_err(|e| StageFailure {
            stage,
            source: e.into(),
        })
    }
}

impl<P: ChainProvider> Bridge<P> {
    pub fn new(provider: P, distributor: Distributor, chain_id: ChainId) -> Self {
        Self {
            provider,
            distributor,
            chain_id,
            forks: ForkSchedule::mainnet(),
            receipt_poll: DEFAULT_RECEIPT_POLL,
            receipt_timeout: None,
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_forks(mut self, forks: ForkSchedule) -> Self {
        self.forks = forks;
        self
    }

    /// Receipt polling interval and optional bound on collecting all
    /// receipts of a block
    pub fn with_receipt_polling(mut self, interval: Duration, timeout: Option<Duration>) -> Self {
        self.receipt_poll = interval;
        self.receipt_timeout = timeout;
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn chain_id(&self) -> ChainId {
        self.chain_id
    }

    pub fn distributor(&self) -> &Distributor {
        &self.distributor
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Propagate the header and receipts of a newly announced block
    pub async fn handle_new_header(
        &self,
        block_hash: H256,
    ) -> Result<NotificationReport, NotificationError> {
        self.handle_block(BlockId::Hash(block_hash)).await
    }

    /// Propagate the header and receipts of any block.
    ///
    /// When the block is requested by number and cannot be fetched, the
    /// error carries a zero block hash.
    pub async fn handle_block(&self, id: BlockId) -> Result<NotificationReport, NotificationError> {
        let mut progress = Progress {
            block_hash: match id {
                BlockId::Hash(hash) => hash,
                BlockId::Number(_) => H256::zero(),
            },
            ..Progress::default()
        };

        let result = self.process(id, &mut progress).await;
        result.map_err(|failure| {
            let err = NotificationError {
                chain_id: self.chain_id,
                block_hash: progress.block_hash,
                stage: failure.stage,
                header: progress.header.take(),
                source: failure.source,
            };
            tracing::error!("{err}");
            err
        })
    }

    async fn process(
        &self,
        id: BlockId,
        progress: &mut Progress,
    ) -> Result<NotificationReport, StageFailure> {
        tracing::info!(chain_id = %self.chain_id, "handling block {id}");
        progress.reach(Stage::Received);

        // Step 1: fetch the block and check it is the one asked for
        self.check_cancelled(Stage::Received)?;
        let block = self.fetch_block(id).await.at(Stage::Received)?;
        progress.reach(Stage::Fetched);
        let asserted_hash = block
            .hash
            .ok_or(EncodingError::missing("hash"))
            .at(Stage::Fetched)?;
        if let BlockId::Hash(requested) = id {
            validate_root(asserted_hash, requested, "block hash").at(Stage::Fetched)?;
        }
        progress.block_hash = asserted_hash;

        // Step 2: header, recomputed hash against the provider-asserted one
        let header = encode_header(&block).at(Stage::Fetched)?;
        progress.reach(Stage::HeaderEncoded);
        validate_root(header.hash, asserted_hash, "header hash").at(Stage::HeaderEncoded)?;
        progress.reach(Stage::HeaderValidated);
        self.check_cancelled(Stage::HeaderValidated)?;
        let header_key = ContentKey::header(self.chain_id, asserted_hash);
        let header_report = self.distributor.push(&header_key, &header.rlp).await;
        progress.header = Some(header_report.clone());
        progress.reach(Stage::HeaderPushed);

        // Step 3: receipts
        self.check_cancelled(Stage::HeaderPushed)?;
        let block_number = block
            .block_number()
            .ok_or(EncodingError::missing("number"))
            .at(Stage::HeaderPushed)?;
        tracing::info!(
            "collecting {} receipt(s) for block #{block_number}",
            block.transactions.len()
        );
        let receipts = collect_receipts(
            &self.provider,
            asserted_hash,
            &block.transactions,
            self.receipt_poll,
            self.receipt_timeout,
            &self.cancel,
        )
        .await
        .at(Stage::HeaderPushed)?;
        progress.reach(Stage::ReceiptsFetched);

        let encoded = encode_receipts(&receipts, block_number, &self.forks)
            .at(Stage::ReceiptsFetched)?;
        progress.reach(Stage::ReceiptsEncoded);
        validate_root(encoded.root, block.receipts_root, "receipts root")
            .at(Stage::ReceiptsEncoded)?;
        let value = encoded.content_value().at(Stage::ReceiptsValidated)?;
        progress.reach(Stage::ReceiptsValidated);
        self.check_cancelled(Stage::ReceiptsValidated)?;
        let receipts_key = ContentKey::receipts(self.chain_id, asserted_hash);
        let receipts_report = self.distributor.push(&receipts_key, &value).await;
        progress.reach(Stage::ReceiptsPushed);

        tracing::info!(
            "✅ block #{block_number} {asserted_hash:?} propagated ({} receipts)",
            encoded.receipts.len()
        );
        progress.reach(Stage::Done);
        Ok(NotificationReport {
            block_hash: asserted_hash,
            block_number,
            stage: Stage::Done,
            header: header_report,
            receipts: receipts_report,
        })
    }

    async fn fetch_block(&self, id: BlockId) -> Result<RpcBlock, BridgeError> {
        self.provider
            .block(id)
            .await
            .map_err(|e| BridgeError::rpc_with_source(format!("failed to fetch block {id}"), e))?
            .ok_or_else(|| BridgeError::missing_data(format!("block {id}")))
    }

    fn check_cancelled(&self, completed: Stage) -> Result<(), StageFailure> {
        if self.cancel.is_cancelled() {
            return Err(StageFailure {
                stage: completed,
                source: BridgeError::Cancelled,
            });
        }
        Ok(())
    }
}
