//! Transactions: identity, coinbase construction and the sign/verify protocol.
//!
//! Each input is signed over the trimmed copy of the transaction in which
//! that one input's `pub_key` slot holds the locking hash of the output it
//! spends. A valid signature therefore proves both possession of the key
//! and that the claimed output is locked to it.

use std::collections::HashMap;
use std::fmt;

use log::{debug, warn};
use rand::RngCore;
use secp256k1::{PublicKey, Secp256k1, SecretKey};

use crate::codec;
use crate::constants::*;
use crate::error::{LedgerError, Result};
use crate::keys;
use crate::storage::KvBackend;
use crate::types::*;
use crate::utxo::UtxoSet;

/// Prior transactions referenced by inputs, keyed by raw transaction id
pub type PrevTransactions = HashMap<ByteString, Transaction>;

impl Transaction {
    /// NewCoinbase: one sentinel input carrying `data`, one `SUBSIDY` output to `to`.
    ///
    /// Without `data` a random note is used so two coinbases paying the
    /// same key never share an id.
    pub fn new_coinbase(to: &[u8], data: Option<&str>) -> Result<Transaction> {
        let note = match data {
            Some(d) if !d.is_empty() => d.as_bytes().to_vec(),
            _ => {
                let mut rand_data = [0u8; COINBASE_RANDOM_DATA_LEN];
                rand::thread_rng().fill_bytes(&mut rand_data);
                hex::encode(rand_data).into_bytes()
            }
        };

        let mut tx = Transaction {
            id: vec![],
            inputs: vec![TxInput {
                txid: vec![],
                vout: COINBASE_VOUT,
                signature: None,
                pub_key: Some(note),
            }],
            outputs: vec![TxOutput::new(SUBSIDY, to.to_vec())],
        };
        tx.id = tx.hash()?.to_vec();
        Ok(tx)
    }

    /// NewUTXOTransaction: pay `amount` to `to` from outputs owned by `secret_key`.
    ///
    /// Selected outputs become inputs; any overshoot returns to the sender
    /// as a change output. The result is signed against the ledger.
    pub fn new_utxo_transaction<B: KvBackend>(
        secret_key: &SecretKey,
        to: &[u8],
        amount: Natural,
        utxo_set: &UtxoSet<'_, B>,
    ) -> Result<Transaction> {
        if amount == 0 {
            return Err(LedgerError::InvalidTransaction("amount must be positive".to_string()));
        }

        let secp = Secp256k1::signing_only();
        let public_key = keys::encode_public_key(&PublicKey::from_secret_key(&secp, secret_key));
        let from = keys::hash_pub_key(&public_key);

        let spendable = utxo_set.find_spendable_outputs(&from, amount)?;
        if spendable.accumulated < amount {
            return Err(LedgerError::InsufficientFunds {
                required: amount,
                available: spendable.accumulated,
            });
        }

        let inputs = spendable
            .outpoints
            .iter()
            .map(|outpoint| TxInput {
                txid: outpoint.txid.clone(),
                vout: outpoint.index as Integer,
                signature: None,
                pub_key: Some(public_key.clone()),
            })
            .collect();

        let mut outputs = vec![TxOutput::new(amount, to.to_vec())];
        if spendable.accumulated > amount {
            outputs.push(TxOutput::new(spendable.accumulated - amount, from));
        }

        let mut tx = Transaction { id: vec![], inputs, outputs };
        tx.id = tx.hash()?.to_vec();
        utxo_set.ledger().sign_transaction(&mut tx, secret_key)?;
        Ok(tx)
    }

    /// IsCoinbase: |ins| = 1 ∧ ins[0].txid = ε ∧ ins[0].vout = -1
    pub fn is_coinbase(&self) -> bool {
        self.inputs.len() == 1 && self.inputs[0].txid.is_empty() && self.inputs[0].vout == COINBASE_VOUT
    }

    pub fn serialize(&self) -> Result<Vec<u8>> {
        codec::encode(self)
    }

    pub fn deserialize(data: &[u8]) -> Result<Transaction> {
        codec::decode(data)
    }

    /// Hash: SHA256 of the transaction serialized with `id` cleared.
    ///
    /// Only used to set `id` at creation; never recompute it after signing.
    pub fn hash(&self) -> Result<Hash> {
        let mut tx_copy = self.clone();
        tx_copy.id = vec![];
        Ok(keys::sha256(&tx_copy.serialize()?))
    }

    /// TrimmedCopy: every input's signature and public key cleared
    pub fn trimmed_copy(&self) -> Transaction {
        Transaction {
            id: self.id.clone(),
            inputs: self
                .inputs
                .iter()
                .map(|input| TxInput {
                    txid: input.txid.clone(),
                    vout: input.vout,
                    signature: None,
                    pub_key: None,
                })
                .collect(),
            outputs: self.outputs.clone(),
        }
    }

    /// Sign every input with `secret_key`.
    ///
    /// Coinbase transactions are left untouched. Every referenced prior
    /// transaction must be present in `prev_txs`.
    pub fn sign(&mut self, secret_key: &SecretKey, prev_txs: &PrevTransactions) -> Result<()> {
        if self.is_coinbase() {
            return Ok(());
        }
        check_prev_txs(&self.inputs, prev_txs)?;

        let mut tx_copy = self.trimmed_copy();
        for (in_id, input) in self.inputs.iter_mut().enumerate() {
            let locking_hash = referenced_output(input, prev_txs)?.pub_key_hash.clone();
            tx_copy.inputs[in_id].signature = None;
            tx_copy.inputs[in_id].pub_key = Some(locking_hash);

            let payload = tx_copy.serialize()?;
            input.signature = Some(keys::sign_payload(secret_key, &payload)?);

            tx_copy.inputs[in_id].pub_key = None;
        }

        debug!("Signed {} inputs of transaction {}", self.inputs.len(), hex::encode(&self.id));
        Ok(())
    }

    /// Verify every input signature; the first failure makes the whole
    /// transaction invalid. A non-coinbase transaction without inputs is
    /// invalid.
    ///
    /// Returns `Ok(false)` for bad signatures and `Err` only when a referenced
    /// prior transaction or output is missing.
    pub fn verify(&self, prev_txs: &PrevTransactions) -> Result<bool> {
        if self.is_coinbase() {
            return Ok(true);
        }
        if self.inputs.is_empty() {
            warn!("Transaction {} has no inputs", hex::encode(&self.id));
            return Ok(false);
        }
        check_prev_txs(&self.inputs, prev_txs)?;

        let mut tx_copy = self.trimmed_copy();
        for (in_id, input) in self.inputs.iter().enumerate() {
            let locking_hash = &referenced_output(input, prev_txs)?.pub_key_hash;
            tx_copy.inputs[in_id].signature = None;
            tx_copy.inputs[in_id].pub_key = Some(locking_hash.clone());

            let (signature, pub_key) = match (&input.signature, &input.pub_key) {
                (Some(sig), Some(pk)) => (sig, pk),
                _ => {
                    warn!("Input {} of transaction {} is unsigned", in_id, hex::encode(&self.id));
                    return Ok(false);
                }
            };

            if !input.uses_key(locking_hash) {
                warn!("Input {} of transaction {} spends an output locked to another key", in_id, hex::encode(&self.id));
                return Ok(false);
            }

            let payload = tx_copy.serialize()?;
            if !keys::verify_payload(pub_key, signature, &payload) {
                warn!("Bad signature on input {} of transaction {}", in_id, hex::encode(&self.id));
                return Ok(false);
            }

            tx_copy.inputs[in_id].pub_key = None;
        }

        Ok(true)
    }
}

impl TxInput {
    /// Whether this input was made with the key hashing to `pub_key_hash`
    pub fn uses_key(&self, pub_key_hash: &[u8]) -> bool {
        match &self.pub_key {
            Some(pub_key) => keys::hash_pub_key(pub_key) == pub_key_hash,
            None => false,
        }
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Transaction {}:", hex::encode(&self.id))?;
        for (i, input) in self.inputs.iter().enumerate() {
            writeln!(f, "     Input {}:", i)?;
            writeln!(f, "       TXID:      {}", hex::encode(&input.txid))?;
            writeln!(f, "       Out:       {}", input.vout)?;
            writeln!(f, "       Signature: {}", hex::encode(input.signature.as_deref().unwrap_or_default()))?;
            writeln!(f, "       PubKey:    {}", hex::encode(input.pub_key.as_deref().unwrap_or_default()))?;
        }
        for (i, output) in self.outputs.iter().enumerate() {
            writeln!(f, "     Output {}:", i)?;
            writeln!(f, "       Value:  {}", output.value)?;
            write!(f, "       Script: {}", hex::encode(&output.pub_key_hash))?;
            if i + 1 < self.outputs.len() {
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

/// Every input must reference a known prior transaction
fn check_prev_txs(inputs: &[TxInput], prev_txs: &PrevTransactions) -> Result<()> {
    for input in inputs {
        if !prev_txs.contains_key(&input.txid) {
            return Err(LedgerError::PreviousTransactionNotFound(hex::encode(&input.txid)));
        }
    }
    Ok(())
}

/// The output an input claims to spend
fn referenced_output<'a>(input: &TxInput, prev_txs: &'a PrevTransactions) -> Result<&'a TxOutput> {
    let prev_tx = prev_txs
        .get(&input.txid)
        .ok_or_else(|| LedgerError::PreviousTransactionNotFound(hex::encode(&input.txid)))?;
    let index = usize::try_from(input.vout)
        .map_err(|_| LedgerError::CorruptData(format!("Negative output index {}", input.vout)))?;
    prev_tx.outputs.get(index).ok_or_else(|| {
        LedgerError::CorruptData(format!(
            "Output {} out of range for transaction {}",
            index,
            hex::encode(&prev_tx.id)
        ))
    })
}
