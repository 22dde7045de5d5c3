//! Ledger constants

/// Proof-of-work difficulty: the target is 2^(256 - DIFFICULTY_BITS)
pub const DIFFICULTY_BITS: u32 = 16;

/// Smallest accepted difficulty
pub const MIN_DIFFICULTY_BITS: u32 = 1;

/// Largest accepted difficulty; the target must stay non-zero
pub const MAX_DIFFICULTY_BITS: u32 = 255;

/// Reward carried by every coinbase transaction, genesis included
pub const SUBSIDY: u64 = 10;

/// Note embedded in the genesis coinbase
pub const GENESIS_COINBASE_DATA: &str =
    "The Times 03/Jan/2009 Chancellor on brink of second bailout for banks";

/// Reserved key in the blocks bucket holding the tip hash
pub const TIP_KEY: &[u8] = b"l";

/// Bucket holding block hash → serialized block, plus the tip pointer
pub const BLOCKS_BUCKET: &str = "blocks";

/// Bucket holding transaction id → unspent outputs
pub const UTXO_BUCKET: &str = "chainstate";

/// Output index carried by the single coinbase input
pub const COINBASE_VOUT: i64 = -1;

/// Random bytes used as coinbase note when none is given
pub const COINBASE_RANDOM_DATA_LEN: usize = 20;

/// Upper bound of the nonce search
pub const MAX_NONCE: u64 = i64::MAX as u64;

/// File name of the sled database inside the data directory
pub const DB_FILE_NAME: &str = "blocks.db";
