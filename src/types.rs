// Copyright 2022-2024 Protocol Labs
// SPDX-License-Identifier: MIT

use std::fmt;
use std::str::FromStr;

use ethereum_types::{Bloom, H160, H256, H64, U256, U64};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Byte string carried as 0x-prefixed hex on the wire
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct HexBytes(pub Vec<u8>);

impl HexBytes {
    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for HexBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(&self.0))
    }
}

impl From<Vec<u8>> for HexBytes {
    fn from(v: Vec<u8>) -> Self {
        Self(v)
    }
}

impl Serialize for HexBytes {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format!("0x{}", hex::encode(&self.0)))
    }
}

impl<'de> Deserialize<'de> for HexBytes {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let digits = s.strip_prefix("0x").unwrap_or(&s);
        hex::decode(digits)
            .map(HexBytes)
            .map_err(serde::de::Error::custom)
    }
}

/// Block selector accepted by `eth_getBlockBy*`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlockId {
    Hash(H256),
    Number(u64),
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hash(h) => write!(f, "{h:?}"),
            Self::Number(n) => write!(f, "#{n}"),
        }
    }
}

impl FromStr for BlockId {
    type Err = anyhow::Error;

    /// Parses a 0x-prefixed 32-byte hash or a decimal block number
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(digits) = s.strip_prefix("0x") {
            let raw = hex::decode(digits)?;
            if raw.len() != 32 {
                anyhow::bail!("block hash must be 32 bytes, got {}", raw.len());
            }
            return Ok(Self::Hash(H256::from_slice(&raw)));
        }
        Ok(Self::Number(s.parse()?))
    }
}

/// Block as returned by `eth_getBlockByHash(hash, false)`
///
/// `hash`, `number`, `nonce` and `mix_hash` are `null` for pending blocks.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcBlock {
    pub hash: Option<H256>,
    pub parent_hash: H256,
    pub sha3_uncles: H256,
    pub miner: H160,
    pub state_root: H256,
    pub transactions_root: H256,
    pub receipts_root: H256,
    pub logs_bloom: Bloom,
    pub difficulty: U256,
    pub number: Option<U64>,
    pub gas_limit: U256,
    pub gas_used: U256,
    pub timestamp: U256,
    pub extra_data: HexBytes,
    pub mix_hash: Option<H256>,
    pub nonce: Option<H64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_fee_per_gas: Option<U256>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub withdrawals_root: Option<H256>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blob_gas_used: Option<U256>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excess_blob_gas: Option<U256>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_beacon_block_root: Option<H256>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requests_hash: Option<H256>,
    /// Transaction hashes, in block order
    #[serde(default)]
    pub transactions: Vec<H256>,
}

impl RpcBlock {
    pub fn block_number(&self) -> Option<u64> {
        self.number.map(|n| n.as_u64())
    }
}

/// Log entry inside a receipt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcLog {
    pub address: H160,
    pub topics: Vec<H256>,
    pub data: HexBytes,
}

/// Receipt as returned by `eth_getTransactionReceipt`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcReceipt {
    pub transaction_hash: H256,
    pub transaction_index: U64,
    #[serde(default)]
    pub block_hash: Option<H256>,
    #[serde(default)]
    pub block_number: Option<U64>,
    /// Execution status (Byzantium and later)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<U64>,
    /// Post-transaction state root (before Byzantium)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root: Option<H256>,
    pub cumulative_gas_used: U256,
    pub logs: Vec<RpcLog>,
    pub logs_bloom: Bloom,
    /// EIP-2718 transaction type; absent means legacy
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub tx_type: Option<U64>,
}

impl RpcReceipt {
    pub fn tx_type(&self) -> u64 {
        self.tx_type.map(|t| t.as_u64()).unwrap_or(0)
    }
}

/// Result of the Portal `discv5_nodeInfo` call
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeInfo {
    pub enr: String,
    pub node_id: H256,
}
