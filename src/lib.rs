//! # pow-ledger
//!
//! A single-node proof-of-work ledger engine.
//!
//! The crate maintains an append-only, hash-linked chain of blocks holding
//! signed value transfers, admits blocks through a hash puzzle, and keeps an
//! index of unspent outputs for balance and spend queries.
//!
//! ## Architecture
//!
//! Leaves first:
//! - `merkle`: one digest binding a block's transactions
//! - `pow`: nonce search and single-hash re-validation
//! - `transaction`: identity, coinbase, sign/verify over the spent output's locking hash
//! - `block`: mined-at-construction block records
//! - `ledger`: the chain store, append rule and backward iterator
//! - `utxo`: the unspent-output index (full rebuild and per-block update)
//!
//! Persistence goes through the `storage::KvBackend` trait, with a sled
//! implementation for disk and an in-memory one for tests.
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use pow_ledger::{keys, Ledger, MemoryBackend, ProofOfWork, Transaction, UtxoSet};
//! use secp256k1::Secp256k1;
//!
//! let secp = Secp256k1::new();
//! let (alice_sk, alice_pk) = secp.generate_keypair(&mut rand::thread_rng());
//! let (_, bob_pk) = secp.generate_keypair(&mut rand::thread_rng());
//! let alice = keys::hash_pub_key(&keys::encode_public_key(&alice_pk));
//! let bob = keys::hash_pub_key(&keys::encode_public_key(&bob_pk));
//!
//! let coinbase = Transaction::new_coinbase(&alice, Some("genesis")).unwrap();
//! let ledger = Ledger::create_genesis(Arc::new(MemoryBackend::new()), coinbase, ProofOfWork::new(8).unwrap()).unwrap();
//! let utxo_set = UtxoSet::new(&ledger);
//! utxo_set.reindex().unwrap();
//!
//! let tx = Transaction::new_utxo_transaction(&alice_sk, &bob, 4, &utxo_set).unwrap();
//! let reward = Transaction::new_coinbase(&alice, None).unwrap();
//! let block = ledger.mine_block(vec![reward, tx]).unwrap();
//! utxo_set.update(&block).unwrap();
//!
//! assert_eq!(utxo_set.balance(&alice).unwrap(), 16);
//! assert_eq!(utxo_set.balance(&bob).unwrap(), 4);
//! ```

pub mod types;
pub mod constants;
pub mod error;
pub mod codec;
pub mod keys;
pub mod merkle;
pub mod pow;
pub mod transaction;
pub mod block;
pub mod storage;
pub mod config;
pub mod ledger;
pub mod utxo;

// Re-export commonly used types
pub use types::*;
pub use constants::*;
pub use error::{LedgerError, Result};
pub use config::LedgerConfig;
pub use ledger::{Ledger, LedgerIterator};
pub use pow::ProofOfWork;
pub use storage::{KvBackend, MemoryBackend, SledBackend};
pub use transaction::PrevTransactions;
pub use utxo::UtxoSet;
