//! Merkle-Patricia trie roots over keccak256, as committed in block headers.

use ethereum_types::H256;
use keccak_hasher::KeccakHasher;

/// Root of a trie with no entries: keccak256(rlp(""))
pub const EMPTY_TRIE_ROOT: H256 = H256([
    0x56, 0xe8, 0x1f, 0x17, 0x1b, 0xcc, 0x55, 0xa6, 0xff, 0x83, 0x45, 0xe6, 0x92, 0xc0, 0xf8,
    0x6e, 0x5b, 0x48, 0xe0, 0x1b, 0x99, 0x6c, 0xad, 0xc0, 0x01, 0x62, 0x2f, 0xb5, 0xe3, 0x63,
    0xb4, 0x21,
]);

/// Root of the trie keyed by `rlp(index)`, as used for transaction and
/// receipt roots.
pub fn ordered_trie_root<I, V>(items: I) -> H256
where
    I: IntoIterator<Item = V>,
    V: AsRef<[u8]>,
{
    H256::from_slice(triehash::ordered_trie_root::<KeccakHasher, _>(items).as_ref())
}

/// Root of the trie holding the given (key, value) pairs. Later duplicates of
/// a key replace earlier ones.
pub fn trie_root<K, V, I>(pairs: I) -> H256
where
    K: AsRef<[u8]> + Ord,
    V: AsRef<[u8]>,
    I: IntoIterator<Item = (K, V)>,
{
    H256::from_slice(triehash::trie_root::<KeccakHasher, _, _, _>(pairs).as_ref())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn root_of(pairs: &[(&str, &str)]) -> String {
        hex::encode(trie_root(pairs.iter().map(|(k, v)| (k.as_bytes(), v.as_bytes()))))
    }

    #[test]
    fn empty_trie() {
        let none: [&[u8]; 0] = [];
        assert_eq!(ordered_trie_root(none), EMPTY_TRIE_ROOT);
        assert_eq!(crate::content::keccak256([0x80u8]), EMPTY_TRIE_ROOT);
    }

    #[test]
    fn single_item() {
        let long = "a".repeat(50);
        assert_eq!(
            root_of(&[("A", &long)]),
            "d23786fb4a010da3ce639d66d5e904a11dbc02746d1ce25029e53290cabf28ab"
        );
    }

    #[test]
    fn extension_and_branch_values() {
        assert_eq!(
            root_of(&[("doe", "reindeer"), ("dog", "puppy"), ("dogglesworth", "cat")]),
            "8aad789dff2f538bca5d8ea56e8abe10f4c7ba3a5dea95fea4cd6e7c3a1168d3"
        );
        assert_eq!(
            root_of(&[("do", "verb"), ("horse", "stallion"), ("doge", "coin"), ("dog", "puppy")]),
            "5991bb8c6514148a29db676a14ac506cd2cd5775ace63c30a4fe457715e9ac84"
        );
        assert_eq!(
            root_of(&[("foo", "bar"), ("food", "bass")]),
            "17beaa1648bafa633cda809c90c04af50fc8aed3cb40d16efbddee6fdf63c4c3"
        );
    }

    #[test]
    fn root_is_insertion_order_independent() {
        let a = root_of(&[("be", "e"), ("dog", "puppy"), ("bed", "d")]);
        let b = root_of(&[("bed", "d"), ("be", "e"), ("dog", "puppy")]);
        assert_eq!(a, b);
        assert_eq!(a, "3f67c7a47520f79faa29255d2d3c084a7a6df0453116ed7232ff10277a8be68b");
    }

    #[test]
    fn odd_paths_under_branch() {
        let pairs: [([u8; 2], [u8; 5]); 2] = [
            ([0x00, 0x45], [0x01, 0x23, 0x45, 0x67, 0x89]),
            ([0x45, 0x00], [0x98, 0x76, 0x54, 0x32, 0x10]),
        ];
        let root = trie_root(pairs.iter().map(|(k, v)| (k, &v[..])));
        assert_eq!(
            hex::encode(root),
            "285505fcabe84badc8aa310e2aae17eddc7d120aabec8a476902c8184b3a3503"
        );
    }

    #[test]
    fn ordered_root_tracks_order_and_content() {
        let items: Vec<Vec<u8>> = (0u8..200).map(|i| vec![i; 40]).collect();
        let root = ordered_trie_root(&items);

        let mut swapped = items.clone();
        swapped.swap(3, 4);
        assert_ne!(ordered_trie_root(&swapped), root);

        let mut shorter = items.clone();
        shorter.pop();
        assert_ne!(ordered_trie_root(&shorter), root);
    }

    #[test]
    fn duplicate_keys_keep_the_last_value() {
        assert_eq!(
            root_of(&[("dog", "cat"), ("doe", "reindeer"), ("dog", "puppy")]),
            root_of(&[("doe", "reindeer"), ("dog", "puppy")])
        );
    }
}
