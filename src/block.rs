//! Block construction, transaction commitment and encoding

use std::time::{SystemTime, UNIX_EPOCH};

use crate::codec;
use crate::error::Result;
use crate::merkle::merkle_root;
use crate::pow::ProofOfWork;
use crate::types::*;

impl Block {
    /// NewBlock: 𝒯𝒳* × ℍ × ℕ → ℬ
    ///
    /// Stamps the current time and runs the proof of work; `hash` and
    /// `nonce` come from the mining result.
    pub fn new(
        transactions: Vec<Transaction>,
        prev_block_hash: ByteString,
        height: Natural,
        pow: &ProofOfWork,
    ) -> Result<Block> {
        let mut block = Block {
            timestamp: current_timestamp(),
            transactions,
            prev_block_hash,
            hash: vec![],
            nonce: 0,
            height,
        };

        let (nonce, hash) = pow.run(&block)?;
        block.nonce = nonce;
        block.hash = hash.to_vec();
        Ok(block)
    }

    /// Genesis: the coinbase alone, no parent, height 0
    pub fn new_genesis(coinbase: Transaction, pow: &ProofOfWork) -> Result<Block> {
        Block::new(vec![coinbase], vec![], 0, pow)
    }

    /// Merkle root over the serialized transactions
    pub fn hash_transactions(&self) -> Result<Hash> {
        let serialized = self
            .transactions
            .iter()
            .map(|tx| tx.serialize())
            .collect::<Result<Vec<_>>>()?;
        merkle_root(&serialized)
    }

    /// Whether the stored nonce satisfies `pow` and reproduces the stored hash
    pub fn validate_pow(&self, pow: &ProofOfWork) -> Result<bool> {
        let hash = pow.header_hash(self)?;
        Ok(pow.meets_target(&hash) && hash.as_slice() == self.hash.as_slice())
    }

    pub fn serialize(&self) -> Result<Vec<u8>> {
        codec::encode(self)
    }

    pub fn deserialize(data: &[u8]) -> Result<Block> {
        codec::decode(data)
    }
}

/// Seconds since the Unix epoch
fn current_timestamp() -> Integer {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as Integer)
        .unwrap_or(0)
}
