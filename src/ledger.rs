//! The chain store: persisted blocks, the tip pointer, the append rule and
//! backward traversal.
//!
//! Blocks live in the `blocks` bucket keyed by their own hash. The reserved
//! key `"l"` in the same bucket holds the tip hash; the tip is always read
//! from the store, so a block and its tip move are one atomic batch.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::sync::Arc;

use log::{debug, info, warn};
use secp256k1::SecretKey;

use crate::config::LedgerConfig;
use crate::constants::*;
use crate::error::{LedgerError, Result};
use crate::pow::ProofOfWork;
use crate::storage::{KvBackend, SledBackend, WriteBatch};
use crate::transaction::PrevTransactions;
use crate::types::*;

/// Append-only chain of blocks over a key-value backend.
///
/// Mutating operations assume a single writer per store.
pub struct Ledger<B: KvBackend> {
    backend: Arc<B>,
    pow: ProofOfWork,
}

impl<B: KvBackend> Ledger<B> {
    /// CreateGenesis: mine `coinbase` into a height-0 block and make it the tip.
    ///
    /// Fails with `LedgerExists` if the store already has a tip.
    pub fn create_genesis(backend: Arc<B>, coinbase: Transaction, pow: ProofOfWork) -> Result<Self> {
        if backend.exists(BLOCKS_BUCKET, TIP_KEY)? {
            return Err(LedgerError::LedgerExists);
        }
        if !coinbase.is_coinbase() {
            return Err(LedgerError::InvalidTransaction(hex::encode(&coinbase.id)));
        }

        let genesis = Block::new_genesis(coinbase, &pow)?;
        let ledger = Ledger { backend, pow };
        ledger.persist_as_tip(&genesis)?;
        info!("Created ledger with genesis block {}", hex::encode(&genesis.hash));
        Ok(ledger)
    }

    /// Open: attach to an existing ledger; fails with `LedgerNotFound` when
    /// the store has no tip.
    pub fn open(backend: Arc<B>, pow: ProofOfWork) -> Result<Self> {
        if !backend.exists(BLOCKS_BUCKET, TIP_KEY)? {
            return Err(LedgerError::LedgerNotFound);
        }
        Ok(Ledger { backend, pow })
    }

    pub fn backend(&self) -> &Arc<B> {
        &self.backend
    }

    pub fn pow(&self) -> &ProofOfWork {
        &self.pow
    }

    /// Current tip hash, read from the store
    pub fn tip_hash(&self) -> Result<ByteString> {
        self.backend
            .get(BLOCKS_BUCKET, TIP_KEY)?
            .ok_or(LedgerError::LedgerNotFound)
    }

    fn tip_block(&self) -> Result<Block> {
        let tip = self.tip_hash()?;
        self.get_block(&tip)?
            .ok_or_else(|| LedgerError::BlockNotFound(hex::encode(&tip)))
    }

    /// Store `block` and point the tip at it in one atomic batch.
    fn persist_as_tip(&self, block: &Block) -> Result<()> {
        let mut batch = WriteBatch::new();
        batch.put(block.hash.clone(), block.serialize()?);
        batch.put(TIP_KEY.to_vec(), block.hash.clone());
        self.backend.write_batch(BLOCKS_BUCKET, batch)
    }

    /// AppendBlock: store a block received from elsewhere.
    ///
    /// Already-stored hashes are a no-op. Every block with valid proof of
    /// work is stored, but the tip moves only onto a block that extends a
    /// stored parent by exactly one and is strictly higher than the current
    /// tip. Returns whether the tip moved.
    pub fn append_block(&self, block: &Block) -> Result<bool> {
        if self.backend.exists(BLOCKS_BUCKET, &block.hash)? {
            warn!("Block {} already stored, ignoring", hex::encode(&block.hash));
            return Ok(false);
        }
        if !block.validate_pow(&self.pow)? {
            return Err(LedgerError::InvalidProofOfWork(hex::encode(&block.hash)));
        }

        let tip = self.tip_block()?;
        let linked = self.extends_stored_parent(block)?;
        let advance = linked && block.height > tip.height;

        let mut batch = WriteBatch::new();
        batch.put(block.hash.clone(), block.serialize()?);
        if advance {
            batch.put(TIP_KEY.to_vec(), block.hash.clone());
        }
        self.backend.write_batch(BLOCKS_BUCKET, batch)?;

        if advance {
            info!("Tip advanced to block {} at height {}", hex::encode(&block.hash), block.height);
        } else if !linked {
            warn!(
                "Stored block {} at height {} without a stored parent at height {}",
                hex::encode(&block.hash),
                block.height,
                block.height.saturating_sub(1)
            );
        } else {
            info!(
                "Stored block {} at height {} below tip height {}",
                hex::encode(&block.hash),
                block.height,
                tip.height
            );
        }
        Ok(advance)
    }

    /// Whether `block`'s parent is stored and sits exactly one below it
    fn extends_stored_parent(&self, block: &Block) -> Result<bool> {
        if block.is_genesis() {
            return Ok(false);
        }
        Ok(match self.get_block(&block.prev_block_hash)? {
            Some(parent) => parent.height.checked_add(1) == Some(block.height),
            None => false,
        })
    }

    /// MineBlock: verify every transaction, mine on top of the tip and persist.
    ///
    /// Nothing is mined if any transaction fails verification, spends an
    /// output that is not unspent on the tip path, or spends an output
    /// already claimed earlier in the same block.
    pub fn mine_block(&self, transactions: Vec<Transaction>) -> Result<Block> {
        for tx in &transactions {
            if !self.verify_transaction(tx)? {
                return Err(LedgerError::InvalidTransaction(hex::encode(&tx.id)));
            }
        }
        self.check_unspent(&transactions)?;

        let tip = self.tip_block()?;
        let block = Block::new(transactions, tip.hash.clone(), tip.height + 1, &self.pow)?;
        self.persist_as_tip(&block)?;
        info!("Mined block {} at height {}", hex::encode(&block.hash), block.height);
        Ok(block)
    }

    /// Every input must claim a distinct outpoint that is unspent on the tip path
    fn check_unspent(&self, transactions: &[Transaction]) -> Result<()> {
        let spends: Vec<&Transaction> = transactions.iter().filter(|tx| !tx.is_coinbase()).collect();
        if spends.is_empty() {
            return Ok(());
        }

        let utxo = self.find_all_utxo()?;
        let mut claimed = BTreeSet::new();
        for tx in spends {
            for input in &tx.inputs {
                let unspent = u32::try_from(input.vout).ok().filter(|index| {
                    utxo.get(&input.txid)
                        .map_or(false, |outs| outs.outputs.contains_key(index))
                });
                let fresh = unspent.map_or(false, |index| claimed.insert((input.txid.clone(), index)));
                if !fresh {
                    warn!(
                        "Transaction {} spends output {} of {} which is not available",
                        hex::encode(&tx.id),
                        input.vout,
                        hex::encode(&input.txid)
                    );
                    return Err(LedgerError::InvalidTransaction(hex::encode(&tx.id)));
                }
            }
        }
        Ok(())
    }

    /// FindTransaction: walk from tip to genesis; `Ok(None)` when absent.
    pub fn find_transaction(&self, id: &[u8]) -> Result<Option<Transaction>> {
        for block in self.iter()? {
            if let Some(tx) = block?.transactions.into_iter().find(|tx| tx.id == id) {
                return Ok(Some(tx));
            }
        }
        Ok(None)
    }

    /// Iterate blocks from tip to genesis
    pub fn iter(&self) -> Result<LedgerIterator<'_, B>> {
        Ok(LedgerIterator {
            backend: self.backend.as_ref(),
            current_hash: Some(self.tip_hash()?),
        })
    }

    pub fn best_height(&self) -> Result<Natural> {
        Ok(self.tip_block()?.height)
    }

    pub fn get_block(&self, hash: &[u8]) -> Result<Option<Block>> {
        match self.backend.get(BLOCKS_BUCKET, hash)? {
            Some(data) => Ok(Some(Block::deserialize(&data)?)),
            None => Ok(None),
        }
    }

    /// Hashes of the tip path, tip first
    pub fn block_hashes(&self) -> Result<Vec<ByteString>> {
        self.iter()?.map(|block| block.map(|b| b.hash)).collect()
    }

    /// FindAllUTXO: rebuild the unspent outputs by replaying the tip path
    /// backwards.
    ///
    /// Within a block all inputs are marked spent before its outputs are
    /// collected, so an output is kept iff no input at or above its block
    /// references it.
    pub fn find_all_utxo(&self) -> Result<UtxoMap> {
        let mut utxo = UtxoMap::new();
        let mut spent: BTreeMap<ByteString, BTreeSet<u32>> = BTreeMap::new();

        for block in self.iter()? {
            let block = block?;

            for tx in block.transactions.iter().filter(|tx| !tx.is_coinbase()) {
                for input in &tx.inputs {
                    let index = u32::try_from(input.vout).map_err(|_| {
                        LedgerError::CorruptData(format!(
                            "Output index {} in transaction {}",
                            input.vout,
                            hex::encode(&tx.id)
                        ))
                    })?;
                    spent.entry(input.txid.clone()).or_default().insert(index);
                }
            }

            for tx in &block.transactions {
                let spent_here = spent.get(&tx.id);
                let mut outs = TxOutputs::default();
                for (index, output) in tx.outputs.iter().enumerate() {
                    let index = index as u32;
                    if spent_here.map_or(false, |s| s.contains(&index)) {
                        continue;
                    }
                    outs.outputs.insert(index, output.clone());
                }
                if !outs.is_empty() {
                    utxo.insert(tx.id.clone(), outs);
                }
            }
        }

        debug!("Replayed chain into {} UTXO entries", utxo.len());
        Ok(utxo)
    }

    /// Prior transactions referenced by `tx`'s inputs, looked up on chain
    fn prev_transactions(&self, tx: &Transaction) -> Result<PrevTransactions> {
        let mut prev_txs = PrevTransactions::new();
        for input in &tx.inputs {
            if prev_txs.contains_key(&input.txid) {
                continue;
            }
            let prev = self
                .find_transaction(&input.txid)?
                .ok_or_else(|| LedgerError::PreviousTransactionNotFound(hex::encode(&input.txid)))?;
            prev_txs.insert(prev.id.clone(), prev);
        }
        Ok(prev_txs)
    }

    pub fn sign_transaction(&self, tx: &mut Transaction, secret_key: &SecretKey) -> Result<()> {
        if tx.is_coinbase() {
            return Ok(());
        }
        let prev_txs = self.prev_transactions(tx)?;
        tx.sign(secret_key, &prev_txs)
    }

    pub fn verify_transaction(&self, tx: &Transaction) -> Result<bool> {
        if tx.is_coinbase() {
            return Ok(true);
        }
        let prev_txs = self.prev_transactions(tx)?;
        tx.verify(&prev_txs)
    }
}

impl Ledger<SledBackend> {
    /// Create a ledger on disk at `config.data_dir`, paying the genesis
    /// subsidy to `to`.
    pub fn create_with_config(config: &LedgerConfig, to: &[u8]) -> Result<Self> {
        config.validate()?;
        fs::create_dir_all(&config.data_dir)?;
        let backend = Arc::new(SledBackend::open(config.db_path())?);
        let coinbase = Transaction::new_coinbase(to, Some(&config.genesis_coinbase_data))?;
        let ledger = Ledger::create_genesis(backend, coinbase, config.proof_of_work()?)?;
        ledger.backend.flush()?;
        Ok(ledger)
    }

    /// Open the ledger stored at `config.data_dir`.
    pub fn open_with_config(config: &LedgerConfig) -> Result<Self> {
        config.validate()?;
        if !config.db_path().exists() {
            return Err(LedgerError::LedgerNotFound);
        }
        let backend = Arc::new(SledBackend::open(config.db_path())?);
        Ledger::open(backend, config.proof_of_work()?)
    }
}

/// Lazy, one-shot walk from a starting hash back to genesis.
///
/// Stops after yielding genesis, or after the first error.
pub struct LedgerIterator<'a, B: KvBackend> {
    backend: &'a B,
    current_hash: Option<ByteString>,
}

impl<'a, B: KvBackend> Iterator for LedgerIterator<'a, B> {
    type Item = Result<Block>;

    fn next(&mut self) -> Option<Self::Item> {
        let hash = self.current_hash.take()?;

        let block = match self.backend.get(BLOCKS_BUCKET, &hash) {
            Ok(Some(data)) => Block::deserialize(&data),
            Ok(None) => Err(LedgerError::BlockNotFound(hex::encode(&hash))),
            Err(e) => Err(e),
        };

        if let Ok(b) = &block {
            if !b.is_genesis() {
                self.current_hash = Some(b.prev_block_hash.clone());
            }
        }
        Some(block)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys;
    use crate::storage::MemoryBackend;
    use crate::utxo::UtxoSet;
    use secp256k1::Secp256k1;

    fn keypair() -> (SecretKey, ByteString) {
        let secp = Secp256k1::new();
        let (sk, pk) = secp.generate_keypair(&mut rand::thread_rng());
        (sk, keys::hash_pub_key(&keys::encode_public_key(&pk)))
    }

    fn new_ledger(owner: &[u8]) -> Ledger<MemoryBackend> {
        let coinbase = Transaction::new_coinbase(owner, Some("genesis")).unwrap();
        Ledger::create_genesis(Arc::new(MemoryBackend::new()), coinbase, ProofOfWork::new(8).unwrap()).unwrap()
    }

    fn mine_empty(ledger: &Ledger<MemoryBackend>, miner: &[u8]) -> Block {
        let coinbase = Transaction::new_coinbase(miner, None).unwrap();
        ledger.mine_block(vec![coinbase]).unwrap()
    }

    #[test]
    fn test_create_genesis() {
        let (_, owner) = keypair();
        let ledger = new_ledger(&owner);
        assert_eq!(ledger.best_height().unwrap(), 0);

        let tip = ledger.get_block(&ledger.tip_hash().unwrap()).unwrap().unwrap();
        assert!(tip.is_genesis());
        assert!(tip.validate_pow(ledger.pow()).unwrap());
    }

    #[test]
    fn test_create_twice_fails() {
        let backend = Arc::new(MemoryBackend::new());
        let coinbase = Transaction::new_coinbase(&[1; 20], None).unwrap();
        Ledger::create_genesis(backend.clone(), coinbase.clone(), ProofOfWork::new(8).unwrap()).unwrap();

        let again = Ledger::create_genesis(backend, coinbase, ProofOfWork::new(8).unwrap());
        assert!(matches!(again, Err(LedgerError::LedgerExists)));
    }

    #[test]
    fn test_genesis_requires_coinbase() {
        let tx = Transaction { id: vec![1], inputs: vec![], outputs: vec![] };
        let result = Ledger::create_genesis(Arc::new(MemoryBackend::new()), tx, ProofOfWork::new(8).unwrap());
        assert!(matches!(result, Err(LedgerError::InvalidTransaction(_))));
    }

    #[test]
    fn test_open_missing_fails() {
        let result = Ledger::open(Arc::new(MemoryBackend::new()), ProofOfWork::new(8).unwrap());
        assert!(matches!(result, Err(LedgerError::LedgerNotFound)));
    }

    #[test]
    fn test_open_existing() {
        let (_, owner) = keypair();
        let ledger = new_ledger(&owner);
        let reopened = Ledger::open(ledger.backend().clone(), ProofOfWork::new(8).unwrap()).unwrap();
        assert_eq!(reopened.tip_hash().unwrap(), ledger.tip_hash().unwrap());
    }

    #[test]
    fn test_mine_block_links_to_tip() {
        let (_, owner) = keypair();
        let ledger = new_ledger(&owner);
        let genesis_hash = ledger.tip_hash().unwrap();

        let block = mine_empty(&ledger, &owner);
        assert_eq!(block.height, 1);
        assert_eq!(block.prev_block_hash, genesis_hash);
        assert_eq!(ledger.tip_hash().unwrap(), block.hash);
        assert_eq!(ledger.best_height().unwrap(), 1);
    }

    #[test]
    fn test_mine_block_rejects_invalid_transaction() {
        let (sk, owner) = keypair();
        let (_, other) = keypair();
        let ledger = new_ledger(&owner);
        let tip_before = ledger.tip_hash().unwrap();

        let mut tx = {
            let utxo_set = UtxoSet::new(&ledger);
            utxo_set.reindex().unwrap();
            Transaction::new_utxo_transaction(&sk, &other, 3, &utxo_set).unwrap()
        };
        tx.outputs[0].value = 10;

        let result = ledger.mine_block(vec![tx]);
        assert!(matches!(result, Err(LedgerError::InvalidTransaction(_))));
        assert_eq!(ledger.tip_hash().unwrap(), tip_before);
    }

    #[test]
    fn test_mine_block_unknown_input_is_integrity_error() {
        let (_, owner) = keypair();
        let ledger = new_ledger(&owner);
        let tx = Transaction {
            id: vec![7; 32],
            inputs: vec![TxInput { txid: vec![9; 32], vout: 0, signature: None, pub_key: None }],
            outputs: vec![TxOutput::new(1, owner.clone())],
        };
        let err = ledger.mine_block(vec![tx]).unwrap_err();
        assert!(matches!(err, LedgerError::PreviousTransactionNotFound(_)));
        assert!(err.is_integrity_violation());
    }

    #[test]
    fn test_iterator_walks_to_genesis() {
        let (_, owner) = keypair();
        let ledger = new_ledger(&owner);
        for _ in 0..3 {
            mine_empty(&ledger, &owner);
        }

        let heights: Vec<Natural> = ledger.iter().unwrap().map(|b| b.unwrap().height).collect();
        assert_eq!(heights, vec![3, 2, 1, 0]);

        // Iterators are independent
        let mut first = ledger.iter().unwrap();
        first.next();
        assert_eq!(ledger.iter().unwrap().count(), 4);
        assert_eq!(first.count(), 3);
    }

    #[test]
    fn test_iterator_reports_missing_parent() {
        let (_, owner) = keypair();
        let ledger = new_ledger(&owner);
        let block = mine_empty(&ledger, &owner);
        ledger.backend().delete(BLOCKS_BUCKET, &block.prev_block_hash).unwrap();

        let mut iter = ledger.iter().unwrap();
        assert!(iter.next().unwrap().is_ok());
        assert!(matches!(iter.next(), Some(Err(LedgerError::BlockNotFound(_)))));
        assert!(iter.next().is_none());
    }

    #[test]
    fn test_append_block_height_rule() {
        let (_, owner) = keypair();
        let ledger = new_ledger(&owner);
        let genesis_hash = ledger.tip_hash().unwrap();
        mine_empty(&ledger, &owner);
        let tip_hash = ledger.tip_hash().unwrap();

        // A sibling at height 1 is stored but does not become tip
        let sibling = Block::new(
            vec![Transaction::new_coinbase(&owner, None).unwrap()],
            genesis_hash,
            1,
            ledger.pow(),
        )
        .unwrap();
        assert!(!ledger.append_block(&sibling).unwrap());
        assert_eq!(ledger.tip_hash().unwrap(), tip_hash);
        assert!(ledger.get_block(&sibling.hash).unwrap().is_some());

        // A child of the sibling at height 2 overtakes
        let child = Block::new(
            vec![Transaction::new_coinbase(&owner, None).unwrap()],
            sibling.hash.clone(),
            2,
            ledger.pow(),
        )
        .unwrap();
        assert!(ledger.append_block(&child).unwrap());
        assert_eq!(ledger.tip_hash().unwrap(), child.hash);
        assert_eq!(ledger.block_hashes().unwrap().len(), 3);
    }

    #[test]
    fn test_append_block_idempotent() {
        let (_, owner) = keypair();
        let ledger = new_ledger(&owner);
        let block = mine_empty(&ledger, &owner);
        assert!(!ledger.append_block(&block).unwrap());
        assert_eq!(ledger.tip_hash().unwrap(), block.hash);
    }

    #[test]
    fn test_append_block_rejects_bad_pow() {
        let (_, owner) = keypair();
        let ledger = new_ledger(&owner);
        let mut block = Block::new(
            vec![Transaction::new_coinbase(&owner, None).unwrap()],
            ledger.tip_hash().unwrap(),
            1,
            ledger.pow(),
        )
        .unwrap();
        block.nonce += 1;
        block.hash = vec![0; 32];

        let result = ledger.append_block(&block);
        assert!(matches!(result, Err(LedgerError::InvalidProofOfWork(_))));
        assert!(ledger.get_block(&block.hash).unwrap().is_none());
    }

    #[test]
    fn test_find_transaction() {
        let (_, owner) = keypair();
        let ledger = new_ledger(&owner);
        let block = mine_empty(&ledger, &owner);
        let id = &block.transactions[0].id;

        assert_eq!(ledger.find_transaction(id).unwrap().unwrap().id, *id);
        assert!(ledger.find_transaction(&[0xee; 32]).unwrap().is_none());
    }

    #[test]
    fn test_block_hashes_tip_first() {
        let (_, owner) = keypair();
        let ledger = new_ledger(&owner);
        let block = mine_empty(&ledger, &owner);
        let hashes = ledger.block_hashes().unwrap();
        assert_eq!(hashes.len(), 2);
        assert_eq!(hashes[0], block.hash);
        assert_eq!(hashes[1], block.prev_block_hash);
    }

    #[test]
    fn test_find_all_utxo_after_spend() {
        let (sk, owner) = keypair();
        let (_, other) = keypair();
        let ledger = new_ledger(&owner);
        let genesis_tx = ledger.iter().unwrap().next().unwrap().unwrap().transactions[0].clone();

        let tx = {
            let utxo_set = UtxoSet::new(&ledger);
            utxo_set.reindex().unwrap();
            Transaction::new_utxo_transaction(&sk, &other, 4, &utxo_set).unwrap()
        };
        let cb = Transaction::new_coinbase(&owner, None).unwrap();
        ledger.mine_block(vec![cb.clone(), tx.clone()]).unwrap();

        let utxo = ledger.find_all_utxo().unwrap();
        assert!(!utxo.contains_key(&genesis_tx.id));
        assert_eq!(utxo[&tx.id].total_value(), 10);
        assert_eq!(utxo[&cb.id].total_value(), 10);
        assert_eq!(utxo.len(), 2);
    }

    #[test]
    fn test_verify_transaction_coinbase() {
        let (_, owner) = keypair();
        let ledger = new_ledger(&owner);
        let cb = Transaction::new_coinbase(&owner, None).unwrap();
        assert!(ledger.verify_transaction(&cb).unwrap());
    }

    #[test]
    fn test_append_orphan_does_not_move_tip() {
        let (_, owner) = keypair();
        let ledger = new_ledger(&owner);
        let tip_hash = ledger.tip_hash().unwrap();

        let orphan = Block::new(
            vec![Transaction::new_coinbase(&owner, None).unwrap()],
            vec![0xee; 32],
            5,
            ledger.pow(),
        )
        .unwrap();
        assert!(!ledger.append_block(&orphan).unwrap());
        assert_eq!(ledger.tip_hash().unwrap(), tip_hash);
        assert!(ledger.get_block(&orphan.hash).unwrap().is_some());

        // The tip path stays walkable
        assert_eq!(ledger.iter().unwrap().count(), 1);
        assert_eq!(ledger.find_all_utxo().unwrap().len(), 1);
        assert_eq!(mine_empty(&ledger, &owner).height, 1);
    }

    #[test]
    fn test_append_height_gap_does_not_move_tip() {
        let (_, owner) = keypair();
        let ledger = new_ledger(&owner);
        let genesis_hash = ledger.tip_hash().unwrap();

        let skipped = Block::new(
            vec![Transaction::new_coinbase(&owner, None).unwrap()],
            genesis_hash.clone(),
            2,
            ledger.pow(),
        )
        .unwrap();
        assert!(!ledger.append_block(&skipped).unwrap());
        assert_eq!(ledger.tip_hash().unwrap(), genesis_hash);
        assert_eq!(ledger.best_height().unwrap(), 0);
    }

    #[test]
    fn test_mine_block_rejects_replayed_transaction() {
        let (sk, owner) = keypair();
        let (_, other) = keypair();
        let ledger = new_ledger(&owner);
        let utxo_set = UtxoSet::new(&ledger);
        utxo_set.reindex().unwrap();

        let tx = Transaction::new_utxo_transaction(&sk, &other, 4, &utxo_set).unwrap();
        let block = ledger.mine_block(vec![tx.clone()]).unwrap();
        utxo_set.update(&block).unwrap();

        let cb = Transaction::new_coinbase(&owner, None).unwrap();
        let result = ledger.mine_block(vec![cb, tx]);
        assert!(matches!(result, Err(LedgerError::InvalidTransaction(_))));
        assert_eq!(ledger.best_height().unwrap(), 1);
        assert_eq!(utxo_set.snapshot().unwrap(), ledger.find_all_utxo().unwrap());
    }

    #[test]
    fn test_mine_block_rejects_double_spend_within_block() {
        let (sk, owner) = keypair();
        let (_, other) = keypair();
        let ledger = new_ledger(&owner);
        let utxo_set = UtxoSet::new(&ledger);
        utxo_set.reindex().unwrap();

        let first = Transaction::new_utxo_transaction(&sk, &other, 4, &utxo_set).unwrap();
        let second = Transaction::new_utxo_transaction(&sk, &other, 5, &utxo_set).unwrap();
        assert_eq!(first.inputs[0].txid, second.inputs[0].txid);
        assert!(ledger.verify_transaction(&first).unwrap());
        assert!(ledger.verify_transaction(&second).unwrap());

        let result = ledger.mine_block(vec![first, second]);
        assert!(matches!(result, Err(LedgerError::InvalidTransaction(_))));
        assert_eq!(ledger.best_height().unwrap(), 0);
    }

    #[test]
    fn test_mine_block_rejects_inputless_transaction() {
        let (_, owner) = keypair();
        let ledger = new_ledger(&owner);
        let mut mint = Transaction {
            id: vec![],
            inputs: vec![],
            outputs: vec![TxOutput::new(1_000_000, owner.clone())],
        };
        mint.id = mint.hash().unwrap().to_vec();

        assert!(!ledger.verify_transaction(&mint).unwrap());
        let result = ledger.mine_block(vec![mint]);
        assert!(matches!(result, Err(LedgerError::InvalidTransaction(_))));
        assert_eq!(ledger.best_height().unwrap(), 0);
    }
}
