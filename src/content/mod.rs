pub mod header;
pub mod key;
pub mod receipt;
pub mod ssz;
pub mod trie;
pub mod validate;

pub use header::{encode_header, EncodedHeader};
pub use key::{ChainId, ContentKey, ContentType};
pub use receipt::{encode_receipts, EncodedReceipts, ForkSchedule, ReceiptEra};
pub use trie::{ordered_trie_root, trie_root, EMPTY_TRIE_ROOT};
pub use validate::validate_root;

use ethereum_types::H256;
use sha3::{Digest, Keccak256};

/// General Keccak256 hash function
pub fn keccak256(bytes: impl AsRef<[u8]>) -> H256 {
    let mut h = Keccak256::new();
    h.update(bytes.as_ref());
    H256::from_slice(&h.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keccak_of_empty_input() {
        assert_eq!(
            hex::encode(keccak256([0u8; 0])),
            "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        );
    }
}
