//! Proof of Work: nonce search and re-validation

use std::sync::atomic::{AtomicBool, Ordering};

use log::debug;

use crate::constants::*;
use crate::error::{LedgerError, Result};
use crate::keys::sha256;
use crate::types::*;

/// How many nonces are tried between two looks at the cancel flag
const CANCEL_CHECK_INTERVAL: u64 = 1 << 12;

/// ProofOfWork: fixed target T = 2^(256 - bits)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProofOfWork {
    difficulty_bits: u32,
    target: U256,
}

impl Default for ProofOfWork {
    fn default() -> Self {
        ProofOfWork::from_bits(DIFFICULTY_BITS)
    }
}

impl ProofOfWork {
    /// Create an engine for `difficulty_bits` leading zero bits.
    ///
    /// Fails with `Config` unless `difficulty_bits` lies in `1..=255`.
    pub fn new(difficulty_bits: u32) -> Result<Self> {
        if !(MIN_DIFFICULTY_BITS..=MAX_DIFFICULTY_BITS).contains(&difficulty_bits) {
            return Err(LedgerError::Config(format!(
                "difficulty_bits must be between {} and {}, got {}",
                MIN_DIFFICULTY_BITS, MAX_DIFFICULTY_BITS, difficulty_bits
            )));
        }
        Ok(ProofOfWork::from_bits(difficulty_bits))
    }

    fn from_bits(difficulty_bits: u32) -> Self {
        ProofOfWork {
            difficulty_bits,
            target: U256::one().shl(256 - difficulty_bits),
        }
    }

    pub fn difficulty_bits(&self) -> u32 {
        self.difficulty_bits
    }

    /// Header material: prev ‖ merkle ‖ BE(timestamp) ‖ BE(bits) ‖ BE(nonce)
    pub fn prepare_data(
        &self,
        prev_block_hash: &[u8],
        merkle_root: &Hash,
        timestamp: Integer,
        nonce: Natural,
    ) -> Vec<u8> {
        let mut data = Vec::with_capacity(prev_block_hash.len() + 32 + 24);
        data.extend_from_slice(prev_block_hash);
        data.extend_from_slice(merkle_root);
        data.extend_from_slice(&timestamp.to_be_bytes());
        data.extend_from_slice(&(self.difficulty_bits as i64).to_be_bytes());
        data.extend_from_slice(&(nonce as i64).to_be_bytes());
        data
    }

    /// CheckProofOfWork: ℍ → {true, false}, digest read as a big-endian integer
    pub fn meets_target(&self, hash: &Hash) -> bool {
        U256::from_be_bytes(hash) < self.target
    }

    /// Mine: find the first nonce from 0 whose header digest is below target.
    ///
    /// Runs until success; use [`ProofOfWork::run_with_cancel`] to bound it.
    pub fn run(&self, block: &Block) -> Result<(Natural, Hash)> {
        self.run_with_cancel(block, &AtomicBool::new(false))
    }

    /// Mine, giving up with `MiningCancelled` once `cancel` is raised.
    pub fn run_with_cancel(&self, block: &Block, cancel: &AtomicBool) -> Result<(Natural, Hash)> {
        let merkle_root = block.hash_transactions()?;
        debug!("Mining block at height {} with {} transactions", block.height, block.transactions.len());

        for nonce in 0..MAX_NONCE {
            if nonce % CANCEL_CHECK_INTERVAL == 0 && cancel.load(Ordering::Relaxed) {
                return Err(LedgerError::MiningCancelled);
            }

            let data = self.prepare_data(&block.prev_block_hash, &merkle_root, block.timestamp, nonce);
            let hash = sha256(&data);
            if self.meets_target(&hash) {
                debug!("Found nonce {} -> {}", nonce, hex::encode(hash));
                return Ok((nonce, hash));
            }
        }

        Err(LedgerError::NonceExhausted)
    }

    /// Recompute the header digest from the block's stored nonce and timestamp
    pub fn header_hash(&self, block: &Block) -> Result<Hash> {
        let merkle_root = block.hash_transactions()?;
        let data = self.prepare_data(&block.prev_block_hash, &merkle_root, block.timestamp, block.nonce);
        Ok(sha256(&data))
    }

    /// Validate: a single hash evaluation against the target
    pub fn validate(&self, block: &Block) -> Result<bool> {
        Ok(self.meets_target(&self.header_hash(block)?))
    }
}

/// 256-bit unsigned integer for target comparisons
#[derive(Debug, Clone, PartialEq, Eq)]
struct U256([u64; 4]); // least significant word first

impl U256 {
    fn zero() -> Self {
        U256([0; 4])
    }

    fn one() -> Self {
        U256([1, 0, 0, 0])
    }

    #[cfg(test)]
    fn is_zero(&self) -> bool {
        self.0.iter().all(|&x| x == 0)
    }

    fn shl(&self, shift: u32) -> Self {
        if shift >= 256 {
            return U256::zero();
        }

        let mut result = U256::zero();
        let word_shift = (shift / 64) as usize;
        let bit_shift = shift % 64;

        for i in 0..4 {
            if i + word_shift < 4 {
                result.0[i + word_shift] |= self.0[i] << bit_shift;
                if bit_shift > 0 && i + word_shift + 1 < 4 {
                    result.0[i + word_shift + 1] |= self.0[i] >> (64 - bit_shift);
                }
            }
        }

        result
    }

    fn from_be_bytes(bytes: &[u8; 32]) -> Self {
        let mut words = [0u64; 4];
        for (i, word) in words.iter_mut().enumerate() {
            let start = (3 - i) * 8;
            let mut chunk = [0u8; 8];
            chunk.copy_from_slice(&bytes[start..start + 8]);
            *word = u64::from_be_bytes(chunk);
        }
        U256(words)
    }
}

impl PartialOrd for U256 {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for U256 {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        for (a, b) in self.0.iter().rev().zip(other.0.iter().rev()) {
            match a.cmp(b) {
                std::cmp::Ordering::Equal => continue,
                other => return other,
            }
        }
        std::cmp::Ordering::Equal
    }
}
