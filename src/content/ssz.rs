//! SSZ form of the history network's receipts content value:
//! `List[List[byte, MAX_RECEIPT_LENGTH], MAX_TRANSACTION_COUNT]`.

use ssz::{Decode, SszEncoder, BYTES_PER_LENGTH_OFFSET};

use crate::error::EncodingError;

/// Upper bound on transactions (and so receipts) per block
pub const MAX_TRANSACTION_COUNT: usize = 1 << 14;

/// Upper bound on a single encoded receipt
pub const MAX_RECEIPT_LENGTH: usize = 1 << 23;

/// Encode a bounded list of variable-length byte lists: one little-endian
/// u32 offset per item, then the items back to back.
pub fn encode_byte_lists(
    items: &[Vec<u8>],
    max_count: usize,
    max_item_len: usize,
) -> Result<Vec<u8>, EncodingError> {
    if items.len() > max_count {
        return Err(EncodingError::TooLarge {
            what: "item count",
            len: items.len(),
            max: max_count,
        });
    }
    if let Some(item) = items.iter().find(|i| i.len() > max_item_len) {
        return Err(EncodingError::TooLarge {
            what: "item length",
            len: item.len(),
            max: max_item_len,
        });
    }

    let mut out = Vec::new();
    let mut encoder = SszEncoder::container(&mut out, items.len() * BYTES_PER_LENGTH_OFFSET);
    for item in items {
        encoder.append(item);
    }
    encoder.finalize();
    Ok(out)
}

/// Inverse of [`encode_byte_lists`]
pub fn decode_byte_lists(raw: &[u8], max_count: usize) -> Result<Vec<Vec<u8>>, EncodingError> {
    let items = Vec::<Vec<u8>>::from_ssz_bytes(raw)
        .map_err(|e| EncodingError::malformed("ssz list", format!("{e:?}")))?;
    if items.len() > max_count {
        return Err(EncodingError::TooLarge {
            what: "item count",
            len: items.len(),
            max: max_count,
        });
    }
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets_then_payloads() {
        let out = encode_byte_lists(&[vec![0x01, 0x02], vec![0x03]], 16, 16).unwrap();
        assert_eq!(out, vec![0x08, 0, 0, 0, 0x0a, 0, 0, 0, 0x01, 0x02, 0x03]);
        assert_eq!(
            decode_byte_lists(&out, 16).unwrap(),
            vec![vec![0x01, 0x02], vec![0x03]]
        );
    }

    #[test]
    fn empty_list_is_empty_bytes() {
        assert!(encode_byte_lists(&[], 16, 16).unwrap().is_empty());
        assert!(decode_byte_lists(&[], 16).unwrap().is_empty());
    }

    #[test]
    fn limits_are_enforced() {
        let err = encode_byte_lists(&[vec![0u8; 5]], 16, 4).unwrap_err();
        assert!(matches!(err, EncodingError::TooLarge { what: "item length", .. }));

        let err = encode_byte_lists(&[vec![], vec![], vec![]], 2, 4).unwrap_err();
        assert!(matches!(err, EncodingError::TooLarge { what: "item count", .. }));

        let three = encode_byte_lists(&[vec![1], vec![2], vec![3]], 16, 4).unwrap();
        assert!(decode_byte_lists(&three, 2).is_err());
    }

    #[test]
    fn rejects_corrupt_offsets() {
        assert!(decode_byte_lists(&[0x03, 0, 0, 0], 16).is_err());
        assert!(decode_byte_lists(&[0x08, 0, 0, 0, 0x04, 0, 0, 0], 16).is_err());
    }
}
