use std::fmt;

use ethereum_types::H256;
use sha2::{Digest, Sha256};

use crate::error::EncodingError;

/// Length of a history content key: selector, uint16 chain id, block hash
pub const CONTENT_KEY_LEN: usize = 1 + 2 + 32;

/// Leading selector byte of a history content key
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ContentType {
    BlockHeader = 0x00,
    /// Reserved; bodies are not propagated
    BlockBody = 0x01,
    Receipts = 0x02,
}

impl ContentType {
    pub fn selector(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::BlockHeader => "header",
            Self::BlockBody => "body",
            Self::Receipts => "receipts",
        }
    }
}

impl TryFrom<u8> for ContentType {
    type Error = EncodingError;

    fn try_from(selector: u8) -> Result<Self, Self::Error> {
        match selector {
            0x00 => Ok(Self::BlockHeader),
            0x01 => Ok(Self::BlockBody),
            0x02 => Ok(Self::Receipts),
            other => Err(EncodingError::malformed(
                "content key",
                format!("unknown selector {other:#04x}"),
            )),
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Chain identifier as carried in content keys (SSZ uint16)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChainId(pub u16);

impl ChainId {
    pub const MAINNET: ChainId = ChainId(1);
}

impl Default for ChainId {
    fn default() -> Self {
        Self::MAINNET
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u64> for ChainId {
    type Error = std::num::TryFromIntError;

    fn try_from(id: u64) -> Result<Self, Self::Error> {
        u16::try_from(id).map(ChainId)
    }
}

/// Addressing token of one history content record
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentKey([u8; CONTENT_KEY_LEN]);

impl ContentKey {
    /// Build the key `selector ‖ ssz(uint16 chain_id, bytes32 hash)`
    pub fn new(content_type: ContentType, chain_id: ChainId, block_hash: H256) -> Self {
        let mut raw = [0u8; CONTENT_KEY_LEN];
        raw[0] = content_type.selector();
        raw[1..3].copy_from_slice(&chain_id.0.to_le_bytes());
        raw[3..].copy_from_slice(block_hash.as_bytes());
        Self(raw)
    }

    pub fn header(chain_id: ChainId, block_hash: H256) -> Self {
        Self::new(ContentType::BlockHeader, chain_id, block_hash)
    }

    pub fn receipts(chain_id: ChainId, block_hash: H256) -> Self {
        Self::new(ContentType::Receipts, chain_id, block_hash)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    pub fn content_type(&self) -> ContentType {
        // Selector validity is checked at construction
        match self.0[0] {
            0x00 => ContentType::BlockHeader,
            0x01 => ContentType::BlockBody,
            _ => ContentType::Receipts,
        }
    }

    pub fn chain_id(&self) -> ChainId {
        ChainId(u16::from_le_bytes([self.0[1], self.0[2]]))
    }

    pub fn block_hash(&self) -> H256 {
        H256::from_slice(&self.0[3..])
    }

    /// Portal content id: sha256 of the key bytes
    pub fn content_id(&self) -> H256 {
        H256::from_slice(&Sha256::digest(self.0))
    }
}

impl TryFrom<&[u8]> for ContentKey {
    type Error = EncodingError;

    fn try_from(raw: &[u8]) -> Result<Self, Self::Error> {
        if raw.len() != CONTENT_KEY_LEN {
            return Err(EncodingError::malformed(
                "content key",
                format!("expected {CONTENT_KEY_LEN} bytes, got {}", raw.len()),
            ));
        }
        ContentType::try_from(raw[0])?;
        let mut key = [0u8; CONTENT_KEY_LEN];
        key.copy_from_slice(raw);
        Ok(Self(key))
    }
}

impl fmt::Debug for ContentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentKey({})", self.to_hex())
    }
}

impl fmt::Display for ContentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn genesis_hash() -> H256 {
        "0xd4e56740f876aef8c010b86a40d5f56745a118d0906a34e69aec8c0db1cb8fa3"
            .parse()
            .unwrap()
    }

    #[test]
    fn header_key_layout() {
        let key = ContentKey::header(ChainId::MAINNET, genesis_hash());
        assert_eq!(
            key.to_hex(),
            "0x000100d4e56740f876aef8c010b86a40d5f56745a118d0906a34e69aec8c0db1cb8fa3"
        );
        assert_eq!(key.content_type(), ContentType::BlockHeader);
        assert_eq!(key.chain_id(), ChainId::MAINNET);
        assert_eq!(key.block_hash(), genesis_hash());
    }

    #[test]
    fn chain_id_is_little_endian() {
        let key = ContentKey::receipts(ChainId(0x0102), H256::zero());
        assert_eq!(&key.as_bytes()[..3], &[0x02, 0x02, 0x01]);
    }

    #[test]
    fn keys_are_deterministic_and_injective() {
        let hashes = [H256::zero(), H256::repeat_byte(0x11), genesis_hash()];
        let chains = [ChainId(1), ChainId(5), ChainId(u16::MAX)];
        let types = [ContentType::BlockHeader, ContentType::Receipts];

        let mut seen = HashSet::new();
        for t in types {
            for c in chains {
                for h in hashes {
                    let key = ContentKey::new(t, c, h);
                    assert_eq!(key, ContentKey::new(t, c, h));
                    assert!(seen.insert(key), "collision for {t} {c} {h:?}");
                }
            }
        }
    }

    #[test]
    fn parse_rejects_bad_keys() {
        let key = ContentKey::header(ChainId::MAINNET, genesis_hash());
        assert_eq!(ContentKey::try_from(key.as_bytes()).unwrap(), key);

        assert!(ContentKey::try_from(&key.as_bytes()[..34]).is_err());

        let mut raw = key.as_bytes().to_vec();
        raw[0] = 0x09;
        assert!(ContentKey::try_from(raw.as_slice()).is_err());
    }

    #[test]
    fn content_id_depends_on_selector() {
        let h = genesis_hash();
        assert_ne!(
            ContentKey::header(ChainId::MAINNET, h).content_id(),
            ContentKey::receipts(ChainId::MAINNET, h).content_id()
        );
    }
}
