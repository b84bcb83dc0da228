//! Fork-aware receipt encoding and the receipts content value.

use ethereum_types::H256;
use rlp::RlpStream;

use super::ssz::{encode_byte_lists, MAX_RECEIPT_LENGTH, MAX_TRANSACTION_COUNT};
use super::trie::ordered_trie_root;
use crate::error::EncodingError;
use crate::types::{RpcLog, RpcReceipt};

/// Highest EIP-2718 receipt type known to the Berlin-and-later encoder
/// (access list, dynamic fee, blob, set code)
const MAX_TYPED_RECEIPT: u64 = 4;

/// Activation heights of the forks that changed the receipt format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForkSchedule {
    /// Status code replaces the post-state root (EIP-658)
    pub byzantium: u64,
    /// Typed receipts (EIP-2718)
    pub berlin: u64,
}

impl ForkSchedule {
    pub const fn mainnet() -> Self {
        Self {
            byzantium: 4_370_000,
            berlin: 12_244_000,
        }
    }

    /// Every fork active from the first block
    pub const fn genesis() -> Self {
        Self {
            byzantium: 0,
            berlin: 0,
        }
    }

    pub fn era_at(&self, block_number: u64) -> ReceiptEra {
        if block_number >= self.berlin {
            ReceiptEra::Berlin
        } else if block_number >= self.byzantium {
            ReceiptEra::Byzantium
        } else {
            ReceiptEra::Frontier
        }
    }
}

impl Default for ForkSchedule {
    fn default() -> Self {
        Self::mainnet()
    }
}

/// Receipt encoding rules in force for a block
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ReceiptEra {
    Frontier,
    Byzantium,
    Berlin,
}

impl ReceiptEra {
    pub fn name(self) -> &'static str {
        match self {
            Self::Frontier => "frontier",
            Self::Byzantium => "byzantium",
            Self::Berlin => "berlin",
        }
    }

    /// Canonical bytes of one receipt, as committed to by the receipts root
    pub fn encode(self, receipt: &RpcReceipt) -> Result<Vec<u8>, EncodingError> {
        let tx_type = receipt.tx_type();
        match self {
            Self::Frontier => {
                self.require_legacy(receipt, tx_type)?;
                let root = receipt.root.ok_or_else(|| {
                    EncodingError::unsupported_receipt(
                        receipt.transaction_hash,
                        self.name(),
                        "post-state root missing",
                    )
                })?;
                Ok(legacy_payload(receipt, |s| {
                    s.append(&root);
                }))
            }
            Self::Byzantium => {
                self.require_legacy(receipt, tx_type)?;
                let status = self.status(receipt)?;
                Ok(legacy_payload(receipt, |s| {
                    s.append(&status);
                }))
            }
            Self::Berlin => {
                let status = self.status(receipt)?;
                let payload = legacy_payload(receipt, |s| {
                    s.append(&status);
                });
                match tx_type {
                    0 => Ok(payload),
                    1..=MAX_TYPED_RECEIPT => {
                        let mut out = Vec::with_capacity(payload.len() + 1);
                        out.push(tx_type as u8);
                        out.extend_from_slice(&payload);
                        Ok(out)
                    }
                    other => Err(EncodingError::unsupported_receipt(
                        receipt.transaction_hash,
                        self.name(),
                        format!("unknown receipt type {other:#x}"),
                    )),
                }
            }
        }
    }

    fn require_legacy(self, receipt: &RpcReceipt, tx_type: u64) -> Result<(), EncodingError> {
        if tx_type == 0 {
            return Ok(());
        }
        Err(EncodingError::unsupported_receipt(
            receipt.transaction_hash,
            self.name(),
            format!("typed receipt {tx_type:#x} before typed transactions were enabled"),
        ))
    }

    fn status(self, receipt: &RpcReceipt) -> Result<u64, EncodingError> {
        match receipt.status.map(|s| s.as_u64()) {
            Some(status @ (0 | 1)) => Ok(status),
            Some(other) => Err(EncodingError::unsupported_receipt(
                receipt.transaction_hash,
                self.name(),
                format!("status {other} is not 0 or 1"),
            )),
            None => Err(EncodingError::unsupported_receipt(
                receipt.transaction_hash,
                self.name(),
                "status missing",
            )),
        }
    }
}

/// `rlp([first, cumulativeGasUsed, logsBloom, logs])` where `first` is the
/// post-state root or the status code
fn legacy_payload(receipt: &RpcReceipt, first: impl FnOnce(&mut RlpStream)) -> Vec<u8> {
    let mut s = RlpStream::new_list(4);
    first(&mut s);
    s.append(&receipt.cumulative_gas_used);
    s.append(&receipt.logs_bloom);
    s.begin_list(receipt.logs.len());
    for log in &receipt.logs {
        append_log(&mut s, log);
    }
    s.out().to_vec()
}

fn append_log(s: &mut RlpStream, log: &RpcLog) {
    s.begin_list(3);
    s.append(&log.address);
    s.append_list::<H256, _>(&log.topics);
    s.append(&log.data.0);
}

/// Receipts of one block in their canonical encoding, with the trie root
/// computed over them
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedReceipts {
    pub receipts: Vec<Vec<u8>>,
    pub root: H256,
}

impl EncodedReceipts {
    /// SSZ `List[List[byte, 2^23], 2^14]` of the encoded receipts
    pub fn content_value(&self) -> Result<Vec<u8>, EncodingError> {
        encode_byte_lists(&self.receipts, MAX_TRANSACTION_COUNT, MAX_RECEIPT_LENGTH)
    }
}

/// Encode a block's receipts (in transaction order) under the rules of the
/// era the block belongs to
pub fn encode_receipts(
    receipts: &[RpcReceipt],
    block_number: u64,
    forks: &ForkSchedule,
) -> Result<EncodedReceipts, EncodingError> {
    let era = forks.era_at(block_number);
    let receipts = receipts
        .iter()
        .map(|r| era.encode(r))
        .collect::<Result<Vec<_>, _>>()?;
    let root = ordered_trie_root(&receipts);
    Ok(EncodedReceipts { receipts, root })
}
