//! Ledger configuration
//!
//! Loaded from JSON; every field is optional and falls back to its default.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::error::Result;
use crate::pow::ProofOfWork;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Directory holding the block database
    pub data_dir: PathBuf,
    /// Leading zero bits required of a block hash
    pub difficulty_bits: u32,
    /// Note carried by the genesis coinbase
    pub genesis_coinbase_data: String,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        LedgerConfig {
            data_dir: PathBuf::from("./ledger-data"),
            difficulty_bits: DIFFICULTY_BITS,
            genesis_coinbase_data: GENESIS_COINBASE_DATA.to_string(),
        }
    }
}

impl LedgerConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: LedgerConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn validate(&self) -> Result<()> {
        self.proof_of_work().map(|_| ())
    }

    /// Location of the sled database
    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join(DB_FILE_NAME)
    }

    pub fn proof_of_work(&self) -> Result<ProofOfWork> {
        ProofOfWork::new(self.difficulty_bits)
    }
}
