// Copyright 2022-2024 Protocol Labs
// SPDX-License-Identifier: MIT

use std::time::Duration;

use ethereum_types::H256;
use thiserror::Error;

use crate::bridge::pipeline::Stage;
use crate::content::key::ChainId;
use crate::distribute::PushReport;

/// Chain data could not be translated into its canonical network encoding
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodingError {
    /// A field required by the canonical encoding is absent
    #[error("missing required field `{field}`")]
    MissingField { field: &'static str },

    /// A fork-gated header field is present while an earlier one is absent
    #[error("header field `{present}` is set but earlier field `{missing}` is not")]
    FieldGap {
        present: &'static str,
        missing: &'static str,
    },

    /// A receipt cannot be expressed under the rules of its block's fork
    #[error("receipt {tx_hash:?} cannot be encoded for the {era} era: {reason}")]
    UnsupportedReceipt {
        tx_hash: H256,
        era: &'static str,
        reason: String,
    },

    /// An encoded item exceeds a network size limit
    #[error("{what} exceeds limit: {len} > {max}")]
    TooLarge {
        what: &'static str,
        len: usize,
        max: usize,
    },

    /// Bytes that should hold a content key or value are malformed
    #[error("malformed {what}: {reason}")]
    Malformed { what: &'static str, reason: String },
}

impl EncodingError {
    pub fn missing(field: &'static str) -> Self {
        Self::MissingField { field }
    }

    pub fn unsupported_receipt(tx_hash: H256, era: &'static str, reason: impl Into<String>) -> Self {
        Self::UnsupportedReceipt {
            tx_hash,
            era,
            reason: reason.into(),
        }
    }

    pub fn malformed(what: &'static str, reason: impl Into<String>) -> Self {
        Self::Malformed {
            what,
            reason: reason.into(),
        }
    }
}

/// A locally recomputed hash or root differs from the chain-asserted one
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{context} validation failed: computed {computed:?} != expected {expected:?}")]
pub struct ValidationError {
    pub context: String,
    pub computed: H256,
    pub expected: H256,
}

/// One Portal node could not be reached or rejected a store request
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("node {endpoint} failed to store content: {message}")]
pub struct TransportError {
    pub endpoint: String,
    pub message: String,
}

/// Errors that end the processing of a single header notification
#[derive(Error, Debug)]
pub enum BridgeError {
    /// Chain data provider communication errors
    #[error("RPC error: {message}")]
    Rpc {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    #[error("encoding error: {0}")]
    Encoding(#[from] EncodingError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The provider does not know about requested data
    #[error("Missing data: {what}")]
    MissingData { what: String },

    /// Receipts for the block did not all become available in time
    #[error("timed out after {timeout:?} waiting for receipts of block {block_hash:?}")]
    ReceiptsTimeout { block_hash: H256, timeout: Duration },

    #[error("cancelled")]
    Cancelled,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl BridgeError {
    /// Create an RPC error
    pub fn rpc(message: impl Into<String>) -> Self {
        Self::Rpc {
            message: message.into(),
            source: None,
        }
    }

    /// Create an RPC error with source
    pub fn rpc_with_source(message: impl Into<String>, source: anyhow::Error) -> Self {
        Self::Rpc {
            message: message.into(),
            source: Some(source),
        }
    }

    /// Create a missing data error
    pub fn missing_data(what: impl Into<String>) -> Self {
        Self::MissingData { what: what.into() }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

/// A header notification that could not be processed to completion
#[derive(Error, Debug)]
#[error("chain {chain_id} block {block_hash:?} failed after stage {stage:?}: {source}")]
pub struct NotificationError {
    pub chain_id: ChainId,
    pub block_hash: H256,
    /// Last stage that completed before the failure
    pub stage: Stage,
    /// Per-node outcome of the header push, when it happened
    pub header: Option<PushReport>,
    #[source]
    pub source: BridgeError,
}

impl NotificationError {
    /// Whether the header content reached the distributor before the failure
    pub fn header_pushed(&self) -> bool {
        self.stage >= Stage::HeaderPushed
    }
}

/// Result type alias using BridgeError
pub type BridgeResult<T> = Result<T, BridgeError>;
