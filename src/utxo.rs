//! UTXO index: a rebuildable cache of unspent outputs per transaction id.
//!
//! Entries live in the `chainstate` bucket, keyed by raw transaction id.
//! Scans run in key order, so output selection is deterministic: ascending
//! transaction id, then ascending output index.

use log::{debug, info};

use crate::codec;
use crate::constants::*;
use crate::error::{LedgerError, Result};
use crate::ledger::Ledger;
use crate::storage::{KvBackend, WriteBatch};
use crate::types::*;

/// Index view over a ledger's store
pub struct UtxoSet<'a, B: KvBackend> {
    ledger: &'a Ledger<B>,
}

impl<'a, B: KvBackend> UtxoSet<'a, B> {
    pub fn new(ledger: &'a Ledger<B>) -> Self {
        UtxoSet { ledger }
    }

    pub fn ledger(&self) -> &'a Ledger<B> {
        self.ledger
    }

    fn backend(&self) -> &B {
        self.ledger.backend().as_ref()
    }

    /// Walk every index entry in key order
    fn for_each_entry<F>(&self, mut f: F) -> Result<()>
    where
        F: FnMut(ByteString, TxOutputs) -> Result<bool>,
    {
        for item in self.backend().scan(UTXO_BUCKET)? {
            let (txid, data) = item?;
            if !f(txid, codec::decode(&data)?)? {
                break;
            }
        }
        Ok(())
    }

    /// Reindex: drop the index and rewrite it from a full chain replay.
    ///
    /// The replay runs first, so a failed replay leaves the old index in
    /// place. Dropping and rewriting are two atomic phases; the index is
    /// empty in between.
    pub fn reindex(&self) -> Result<()> {
        let utxo = self.ledger.find_all_utxo()?;
        self.backend().drop_bucket(UTXO_BUCKET)?;

        let mut batch = WriteBatch::new();
        for (txid, outs) in &utxo {
            batch.put(txid.clone(), codec::encode(outs)?);
        }
        self.backend().write_batch(UTXO_BUCKET, batch)?;

        info!("Reindexed UTXO set: {} transactions", utxo.len());
        Ok(())
    }

    /// Update: apply one newly accepted block, in chain order.
    ///
    /// Outputs created by the block enter as fresh entries; every consumed
    /// position is removed and emptied entries are deleted. All writes for
    /// the block land in one batch.
    pub fn update(&self, block: &Block) -> Result<()> {
        let mut touched = UtxoMap::new();

        for tx in &block.transactions {
            touched.insert(tx.id.clone(), TxOutputs::from_outputs(&tx.outputs));
        }

        for tx in block.transactions.iter().filter(|tx| !tx.is_coinbase()) {
            for input in &tx.inputs {
                if !touched.contains_key(&input.txid) {
                    let data = self.backend().get(UTXO_BUCKET, &input.txid)?.ok_or_else(|| {
                        LedgerError::CorruptData(format!(
                            "No unspent outputs for transaction {}",
                            hex::encode(&input.txid)
                        ))
                    })?;
                    touched.insert(input.txid.clone(), codec::decode(&data)?);
                }

                let removed = u32::try_from(input.vout)
                    .ok()
                    .and_then(|index| touched.get_mut(&input.txid)?.outputs.remove(&index));
                if removed.is_none() {
                    return Err(LedgerError::CorruptData(format!(
                        "Output {} of transaction {} is not unspent",
                        input.vout,
                        hex::encode(&input.txid)
                    )));
                }
            }
        }

        let mut batch = WriteBatch::new();
        for (txid, outs) in &touched {
            if outs.is_empty() {
                batch.delete(txid.clone());
            } else {
                batch.put(txid.clone(), codec::encode(outs)?);
            }
        }
        self.backend().write_batch(UTXO_BUCKET, batch)?;

        debug!("Applied block {} to UTXO set ({} entries touched)", hex::encode(&block.hash), touched.len());
        Ok(())
    }

    /// FindSpendableOutputs: accumulate outputs locked to `pub_key_hash`
    /// until `amount` is reached.
    ///
    /// The total may overshoot `amount`, or fall short if the key does not
    /// own enough.
    pub fn find_spendable_outputs(&self, pub_key_hash: &[u8], amount: Natural) -> Result<SpendableOutputs> {
        let mut spendable = SpendableOutputs::default();

        self.for_each_entry(|txid, outs| {
            for (index, out) in outs.outputs {
                if spendable.accumulated >= amount {
                    return Ok(false);
                }
                if out.is_locked_with_key(pub_key_hash) {
                    spendable.accumulated += out.value;
                    spendable.outpoints.push(OutPoint { txid: txid.clone(), index });
                }
            }
            Ok(spendable.accumulated < amount)
        })?;

        Ok(spendable)
    }

    /// FindUTXO: every unspent output locked to `pub_key_hash`
    pub fn find_utxo(&self, pub_key_hash: &[u8]) -> Result<Vec<TxOutput>> {
        let mut found = Vec::new();
        self.for_each_entry(|_, outs| {
            found.extend(outs.outputs.into_values().filter(|out| out.is_locked_with_key(pub_key_hash)));
            Ok(true)
        })?;
        Ok(found)
    }

    pub fn balance(&self, pub_key_hash: &[u8]) -> Result<Natural> {
        Ok(self.find_utxo(pub_key_hash)?.iter().map(|out| out.value).sum())
    }

    /// Number of transactions with at least one unspent output
    pub fn count_transactions(&self) -> Result<usize> {
        let mut count = 0;
        for item in self.backend().scan(UTXO_BUCKET)? {
            item?;
            count += 1;
        }
        Ok(count)
    }

    /// The whole index as a map
    pub fn snapshot(&self) -> Result<UtxoMap> {
        let mut map = UtxoMap::new();
        self.for_each_entry(|txid, outs| {
            map.insert(txid, outs);
            Ok(true)
        })?;
        Ok(map)
    }
}
