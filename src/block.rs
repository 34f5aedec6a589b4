use crate::payload::Payload;
use chrono::{DateTime, Utc};
use sha3::{Digest, Sha3_512};
use std::fmt;

/// SHA3-512 digest as a lowercase hex string (128 chars).
pub type BlockHash = String;

/// `previous_hash` value of every genesis block.
pub const GENESIS_PREVIOUS_HASH: &str = "0";

/// One entry in the ledger. `hash` always covers the other four fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub(crate) index: u64,
    pub(crate) timestamp: DateTime<Utc>,
    pub(crate) data: Payload,
    pub(crate) previous_hash: BlockHash,
    pub(crate) hash: BlockHash,
}

impl Block {
    /// Create a block; its hash is computed from the given fields.
    pub fn new(
        index: u64,
        timestamp: DateTime<Utc>,
        data: Payload,
        previous_hash: impl Into<BlockHash>,
    ) -> Self {
        let mut block = Self {
            index,
            timestamp,
            data,
            previous_hash: previous_hash.into(),
            hash: BlockHash::new(),
        };
        block.hash = block.compute_hash();
        block
    }

    /// Digest of the block's current fields, independent of the stored hash.
    pub fn compute_hash(&self) -> BlockHash {
        let payload = format!(
            "index:{}\ntime:{}\ndata:{}\nprev:{}",
            self.index,
            self.timestamp.to_rfc3339(),
            self.data.canonical(),
            self.previous_hash,
        );
        compute_hash(payload.as_bytes())
    }

    /// Whether the stored hash still matches the block's contents.
    pub fn verify(&self) -> bool {
        self.compute_hash() == self.hash
    }

    /// Point the block at a new predecessor and rehash.
    pub(crate) fn relink(&mut self, previous_hash: &str) {
        self.previous_hash = previous_hash.to_string();
        self.hash = self.compute_hash();
    }

    pub fn index(&self) -> u64 {
        self.index
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn data(&self) -> &Payload {
        &self.data
    }

    pub fn previous_hash(&self) -> &str {
        &self.previous_hash
    }

    pub fn hash(&self) -> &str {
        &self.hash
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Block: {}", self.index)?;
        writeln!(f, "Timestamp: {}", self.timestamp.format("%Y-%m-%d %H:%M:%S%.6f"))?;
        writeln!(f, "Data: {}", self.data)?;
        writeln!(f, "Hash: {}", self.hash)?;
        writeln!(f, "Previous Hash: {}", self.previous_hash)?;
        writeln!(f, "{}", "-----".repeat(20))?;
        Ok(())
    }
}

/// Compute the SHA3-512 hex digest of some data.
pub fn compute_hash(data: &[u8]) -> BlockHash {
    let mut hasher = Sha3_512::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}
