//! Error types for ledger operations

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Ledger already exists")]
    LedgerExists,

    #[error("No existing ledger found, create one first")]
    LedgerNotFound,

    #[error("Previous transaction not found: {0}")]
    PreviousTransactionNotFound(String),

    #[error("Invalid transaction: {0}")]
    InvalidTransaction(String),

    #[error("Block not found: {0}")]
    BlockNotFound(String),

    #[error("Invalid proof of work for block {0}")]
    InvalidProofOfWork(String),

    #[error("Not enough funds: required {required}, available {available}")]
    InsufficientFunds { required: u64, available: u64 },

    #[error("Nonce space exhausted without meeting the target")]
    NonceExhausted,

    #[error("Mining cancelled")]
    MiningCancelled,

    #[error("Corrupt data: {0}")]
    CorruptData(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Crypto error: {0}")]
    Crypto(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl LedgerError {
    /// Integrity violations indicate caller misuse or store corruption;
    /// entry points should stop instead of continuing with inconsistent state.
    pub fn is_integrity_violation(&self) -> bool {
        matches!(
            self,
            LedgerError::PreviousTransactionNotFound(_)
                | LedgerError::InvalidTransaction(_)
                | LedgerError::BlockNotFound(_)
                | LedgerError::CorruptData(_)
                | LedgerError::Serialization(_)
                | LedgerError::Storage(_)
        )
    }
}

impl From<bincode::Error> for LedgerError {
    fn from(e: bincode::Error) -> Self {
        LedgerError::Serialization(e.to_string())
    }
}

impl From<sled::Error> for LedgerError {
    fn from(e: sled::Error) -> Self {
        LedgerError::Storage(e.to_string())
    }
}

impl From<secp256k1::Error> for LedgerError {
    fn from(e: secp256k1::Error) -> Self {
        LedgerError::Crypto(e.to_string())
    }
}

impl From<serde_json::Error> for LedgerError {
    fn from(e: serde_json::Error) -> Self {
        LedgerError::Config(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, LedgerError>;
