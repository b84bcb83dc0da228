//! Canonical RLP encoding of execution-layer block headers.

use ethereum_types::H256;
use rlp::RlpStream;

use super::keccak256;
use crate::error::EncodingError;
use crate::types::RpcBlock;

/// Fields present in every header since genesis
const BASE_FIELD_COUNT: usize = 15;

/// A header in its network encoding together with the hash of that encoding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedHeader {
    pub rlp: Vec<u8>,
    pub hash: H256,
}

/// Encode a header exactly as the chain hashes it.
///
/// Fork-gated fields are appended in activation order and only when present.
/// A later field without all earlier ones is an error.
pub fn encode_header(block: &RpcBlock) -> Result<EncodedHeader, EncodingError> {
    let number = block.number.ok_or(EncodingError::missing("number"))?;
    let mix_hash = block.mix_hash.ok_or(EncodingError::missing("mixHash"))?;
    let nonce = block.nonce.ok_or(EncodingError::missing("nonce"))?;

    let trailing = trailing_fields(block)?;

    let mut s = RlpStream::new_list(BASE_FIELD_COUNT + trailing.len());
    s.append(&block.parent_hash);
    s.append(&block.sha3_uncles);
    s.append(&block.miner);
    s.append(&block.state_root);
    s.append(&block.transactions_root);
    s.append(&block.receipts_root);
    s.append(&block.logs_bloom);
    s.append(&block.difficulty);
    s.append(&number.as_u64());
    s.append(&block.gas_limit);
    s.append(&block.gas_used);
    s.append(&block.timestamp);
    s.append(&block.extra_data.0);
    s.append(&mix_hash);
    s.append(&nonce);
    for field in &trailing {
        s.append_raw(field, 1);
    }

    let rlp = s.out().to_vec();
    let hash = keccak256(&rlp);
    Ok(EncodedHeader { rlp, hash })
}

/// Pre-encoded optional fields, stopping at the first absent one
fn trailing_fields(block: &RpcBlock) -> Result<Vec<Vec<u8>>, EncodingError> {
    let fields: [(&'static str, Option<Vec<u8>>); 6] = [
        ("baseFeePerGas", block.base_fee_per_gas.map(|v| rlp::encode(&v).to_vec())),
        ("withdrawalsRoot", block.withdrawals_root.map(|v| rlp::encode(&v).to_vec())),
        ("blobGasUsed", block.blob_gas_used.map(|v| rlp::encode(&v).to_vec())),
        ("excessBlobGas", block.excess_blob_gas.map(|v| rlp::encode(&v).to_vec())),
        (
            "parentBeaconBlockRoot",
            block.parent_beacon_block_root.map(|v| rlp::encode(&v).to_vec()),
        ),
        ("requestsHash", block.requests_hash.map(|v| rlp::encode(&v).to_vec())),
    ];

    let mut present = Vec::new();
    let mut first_missing: Option<&'static str> = None;
    for (name, value) in fields {
        match (value, first_missing) {
            (Some(encoded), None) => present.push(encoded),
            (Some(_), Some(missing)) => {
                return Err(EncodingError::FieldGap {
                    present: name,
                    missing,
                })
            }
            (None, None) => first_missing = Some(name),
            (None, Some(_)) => {}
        }
    }
    Ok(present)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ethereum_types::U256;
    use serde_json::{json, Value};

    fn london() -> RpcBlock {
        let fixture: Value =
            serde_json::from_str(include_str!("../../tests/fixtures/london_block.json")).unwrap();
        serde_json::from_value(fixture["block"].clone()).unwrap()
    }

    fn cancun() -> RpcBlock {
        serde_json::from_str(include_str!("../../tests/fixtures/cancun_block.json")).unwrap()
    }

    fn mainnet_genesis() -> RpcBlock {
        serde_json::from_value(json!({
            "hash": "0xd4e56740f876aef8c010b86a40d5f56745a118d0906a34e69aec8c0db1cb8fa3",
            "parentHash": format!("0x{}", "00".repeat(32)),
            "sha3Uncles": "0x1dcc4de8dec75d7aab85b567b6ccd41ad312451b948a7413f0a142fd40d49347",
            "miner": format!("0x{}", "00".repeat(20)),
            "stateRoot": "0xd7f8974fb5ac78d9ac099b9ad5018bedc2ce0a72dad1827a1709da30580f0544",
            "transactionsRoot": "0x56e81f171bcc55a6ff8345e692c0f86e5b48e01b996cadc001622fb5e363b421",
            "receiptsRoot": "0x56e81f171bcc55a6ff8345e692c0f86e5b48e01b996cadc001622fb5e363b421",
            "logsBloom": format!("0x{}", "00".repeat(256)),
            "difficulty": "0x400000000",
            "number": "0x0",
            "gasLimit": "0x1388",
            "gasUsed": "0x0",
            "timestamp": "0x0",
            "extraData": "0x11bbe8db4e347b4e8c937c1c8370e4b5ed33adb3db69cbdb7a38e1e50b1b82fa",
            "mixHash": format!("0x{}", "00".repeat(32)),
            "nonce": "0x0000000000000042",
            "transactions": []
        }))
        .unwrap()
    }

    #[test]
    fn mainnet_genesis_hash() {
        let block = mainnet_genesis();
        let encoded = encode_header(&block).unwrap();
        assert_eq!(Some(encoded.hash), block.hash);
        assert_eq!(encoded.hash, keccak256(&encoded.rlp));
    }

    #[test]
    fn london_header_includes_base_fee() {
        let block = london();
        let encoded = encode_header(&block).unwrap();
        assert_eq!(encoded.rlp.len(), 536);
        assert_eq!(Some(encoded.hash), block.hash);
    }

    #[test]
    fn cancun_header_includes_blob_and_beacon_fields() {
        let block = cancun();
        let encoded = encode_header(&block).unwrap();
        assert_eq!(
            encoded.hash,
            "0x995a6cd032c33ce7e1f7dd5a264f0ef8fca258634bddfddb9d78ca0158ed0303"
                .parse::<H256>()
                .unwrap()
        );
        assert_eq!(Some(encoded.hash), block.hash);
    }

    #[test]
    fn any_field_change_changes_hash() {
        let expected = london().hash.unwrap();

        let mutations: Vec<fn(&mut RpcBlock)> = vec![
            |b| b.extra_data.0.push(0),
            |b| b.gas_used += U256::one(),
            |b| b.receipts_root = H256::repeat_byte(0x01),
            |b| b.base_fee_per_gas = Some(U256::zero()),
            |b| b.logs_bloom.0[0] ^= 0xff,
        ];
        for mutate in mutations {
            let mut block = london();
            mutate(&mut block);
            assert_ne!(encode_header(&block).unwrap().hash, expected);
        }
    }

    #[test]
    fn pending_header_is_rejected() {
        let mut block = london();
        block.nonce = None;
        assert_eq!(
            encode_header(&block).unwrap_err(),
            EncodingError::MissingField { field: "nonce" }
        );

        let mut block = london();
        block.number = None;
        assert_eq!(
            encode_header(&block).unwrap_err(),
            EncodingError::MissingField { field: "number" }
        );
    }

    #[test]
    fn gap_in_fork_fields_is_rejected() {
        let mut block = cancun();
        block.base_fee_per_gas = None;
        assert_eq!(
            encode_header(&block).unwrap_err(),
            EncodingError::FieldGap {
                present: "withdrawalsRoot",
                missing: "baseFeePerGas",
            }
        );
    }
}
