//! Merkle commitment over a block's transactions

use crate::error::{LedgerError, Result};
use crate::keys::sha256;
use crate::types::*;

/// MerkleRoot: 𝕊⁺ → ℍ
///
/// For serialized transactions d₀ … dₙ₋₁:
/// 1. Leaves are SHA256(dᵢ)
/// 2. A level of odd size duplicates its last node
/// 3. Each parent is SHA256(left ‖ right)
/// 4. Repeat until one node remains
pub fn merkle_root<T: AsRef<[u8]>>(data: &[T]) -> Result<Hash> {
    if data.is_empty() {
        return Err(LedgerError::CorruptData(
            "Cannot calculate merkle root for empty transaction list".to_string(),
        ));
    }

    let mut hashes: Vec<Hash> = data.iter().map(|d| sha256(d.as_ref())).collect();
    if hashes.len() % 2 != 0 {
        if let Some(last) = hashes.last().copied() {
            hashes.push(last);
        }
    }

    // Build Merkle tree bottom-up
    while hashes.len() > 1 {
        let mut next_level = Vec::with_capacity((hashes.len() + 1) / 2);

        for chunk in hashes.chunks(2) {
            let right = if chunk.len() == 2 { &chunk[1] } else { &chunk[0] };
            let mut combined = Vec::with_capacity(64);
            combined.extend_from_slice(&chunk[0]);
            combined.extend_from_slice(right);
            next_level.push(sha256(&combined));
        }

        hashes = next_level;
    }

    Ok(hashes[0])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(left: &Hash, right: &Hash) -> Hash {
        let mut combined = left.to_vec();
        combined.extend_from_slice(right);
        sha256(&combined)
    }

    #[test]
    fn test_merkle_root_empty() {
        let data: Vec<Vec<u8>> = vec![];
        assert!(merkle_root(&data).is_err());
    }

    #[test]
    fn test_merkle_root_single_duplicates_leaf() {
        let leaf = sha256(b"tx0");
        assert_eq!(merkle_root(&[b"tx0"]).unwrap(), node(&leaf, &leaf));
    }

    #[test]
    fn test_merkle_root_two_leaves() {
        let l0 = sha256(b"tx0");
        let l1 = sha256(b"tx1");
        assert_eq!(merkle_root(&[b"tx0", b"tx1"]).unwrap(), node(&l0, &l1));
    }

    #[test]
    fn test_merkle_root_three_leaves() {
        let l0 = sha256(b"tx0");
        let l1 = sha256(b"tx1");
        let l2 = sha256(b"tx2");
        let expected = node(&node(&l0, &l1), &node(&l2, &l2));
        assert_eq!(merkle_root(&[b"tx0", b"tx1", b"tx2"]).unwrap(), expected);
    }

    #[test]
    fn test_merkle_root_six_leaves_odd_inner_level() {
        let data: Vec<Vec<u8>> = (0u8..6).map(|i| vec![i]).collect();
        let leaves: Vec<Hash> = data.iter().map(|d| sha256(d)).collect();
        let a = node(&leaves[0], &leaves[1]);
        let b = node(&leaves[2], &leaves[3]);
        let c = node(&leaves[4], &leaves[5]);
        let expected = node(&node(&a, &b), &node(&c, &c));
        assert_eq!(merkle_root(&data).unwrap(), expected);
    }

    #[test]
    fn test_merkle_root_deterministic() {
        let data = [b"a".to_vec(), b"b".to_vec(), b"c".to_vec()];
        assert_eq!(merkle_root(&data).unwrap(), merkle_root(&data).unwrap());
    }

    #[test]
    fn test_merkle_root_order_matters() {
        let forward = [b"a".to_vec(), b"b".to_vec()];
        let reversed = [b"b".to_vec(), b"a".to_vec()];
        assert_ne!(merkle_root(&forward).unwrap(), merkle_root(&reversed).unwrap());
    }
}
