//! Core ledger types

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Hash type: 256-bit digest
pub type Hash = [u8; 32];

/// Byte string type
pub type ByteString = Vec<u8>;

/// Natural number type
pub type Natural = u64;

/// Integer type
pub type Integer = i64;

/// Transaction Output: value locked to the hash of a public key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxOutput {
    pub value: Natural,
    pub pub_key_hash: ByteString,
}

/// Transaction Input: reference to a prior output plus the spend proof.
///
/// For a coinbase input `txid` is empty, `vout` is `-1` and `pub_key`
/// carries the coinbase note instead of a key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxInput {
    pub txid: ByteString,
    pub vout: Integer,
    pub signature: Option<ByteString>,
    pub pub_key: Option<ByteString>,
}

/// Transaction: id × inputs × outputs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: ByteString,
    pub inputs: Vec<TxInput>,
    pub outputs: Vec<TxOutput>,
}

/// Block: immutable once mined
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub timestamp: Integer,
    pub transactions: Vec<Transaction>,
    pub prev_block_hash: ByteString,
    pub hash: ByteString,
    pub nonce: Natural,
    pub height: Natural,
}

/// Unspent outputs of one transaction, keyed by their position in it
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxOutputs {
    pub outputs: BTreeMap<u32, TxOutput>,
}

/// OutPoint: (transaction id, output index)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OutPoint {
    pub txid: ByteString,
    pub index: u32,
}

/// Result of selecting outputs to cover an amount
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpendableOutputs {
    pub accumulated: Natural,
    pub outpoints: Vec<OutPoint>,
}

/// UTXO map: transaction id → its unspent outputs
pub type UtxoMap = BTreeMap<ByteString, TxOutputs>;

impl TxOutput {
    pub fn new(value: Natural, pub_key_hash: ByteString) -> Self {
        TxOutput { value, pub_key_hash }
    }

    /// Whether this output can be spent by the owner of `pub_key_hash`
    pub fn is_locked_with_key(&self, pub_key_hash: &[u8]) -> bool {
        self.pub_key_hash == pub_key_hash
    }
}

impl TxOutputs {
    /// All outputs of a fresh transaction, none spent yet
    pub fn from_outputs(outputs: &[TxOutput]) -> Self {
        TxOutputs {
            outputs: outputs
                .iter()
                .enumerate()
                .map(|(i, out)| (i as u32, out.clone()))
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.outputs.is_empty()
    }

    pub fn total_value(&self) -> Natural {
        self.outputs.values().map(|o| o.value).sum()
    }
}

impl Block {
    /// Genesis is the only block without a parent
    pub fn is_genesis(&self) -> bool {
        self.prev_block_hash.is_empty()
    }
}
