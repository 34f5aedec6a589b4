use crate::block::{Block, GENESIS_PREVIOUS_HASH};
use crate::error::{LedgerError, Result};
use crate::payload::Payload;
use chrono::{DateTime, Utc};
use std::fmt;
use tracing::{debug, info, warn};

/// Append-only, hash-linked sequence of blocks. Index 0 is always the genesis block.
#[derive(Debug, Clone)]
pub struct Chain {
    blocks: Vec<Block>,
}

impl Chain {
    /// Create a chain holding only a fresh genesis block.
    pub fn new() -> Self {
        let genesis = Self::create_genesis_block();
        info!(hash = %&genesis.hash[..16], "created chain");
        Self {
            blocks: vec![genesis],
        }
    }

    /// The first block: index 0, sentinel payload, previous hash `"0"`.
    pub fn create_genesis_block() -> Block {
        Block::new(0, Utc::now(), Payload::genesis(), GENESIS_PREVIOUS_HASH)
    }

    // ── Append ────────────────────────────────────────────────

    /// Append a new block carrying `data`, stamped with the current time.
    pub fn append(&mut self, data: Payload) -> Result<&Block> {
        self.append_with_timestamp(data, Utc::now())
    }

    /// Append with an explicit timestamp. Index and link come from the tail.
    pub fn append_with_timestamp(
        &mut self,
        data: Payload,
        timestamp: DateTime<Utc>,
    ) -> Result<&Block> {
        let index = self.next_index();
        Self::check_payload(index, &data)?;
        let block = Block::new(index, timestamp, data, self.latest().hash.clone());
        Ok(self.push(block))
    }

    /// Append a caller-built block, relinking it to the current tail.
    ///
    /// Whatever `previous_hash` the block carries is replaced by the tail's
    /// hash. The block's index must equal the chain length; otherwise the
    /// block is rejected and the chain is left untouched.
    pub fn append_block(&mut self, mut block: Block) -> Result<&Block> {
        let expected = self.next_index();
        if block.index != expected {
            warn!(expected, found = block.index, "rejected out-of-order block");
            return Err(LedgerError::IndexMismatch {
                expected,
                found: block.index,
            });
        }
        Self::check_payload(expected, &block.data)?;
        block.relink(&self.latest().hash);
        Ok(self.push(block))
    }

    /// Only block 0 may carry the genesis sentinel.
    fn check_payload(index: u64, data: &Payload) -> Result<()> {
        if data.is_genesis() {
            warn!(index, "rejected genesis payload after block 0");
            return Err(LedgerError::MisplacedGenesis { index });
        }
        Ok(())
    }

    fn push(&mut self, block: Block) -> &Block {
        debug!(index = block.index, hash = %&block.hash[..16], "appended block");
        self.blocks.push(block);
        self.latest()
    }

    fn next_index(&self) -> u64 {
        self.blocks.len() as u64
    }

    // ── Validation ────────────────────────────────────────────

    /// Whether every block is intact and linked to its predecessor.
    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// Walk the chain and report the first inconsistency found.
    pub fn validate(&self) -> Result<()> {
        let result = self.check_genesis().and_then(|_| self.check_links());
        if let Err(e) = &result {
            warn!("chain validation failed: {}", e);
        }
        result
    }

    fn check_genesis(&self) -> Result<()> {
        let genesis = &self.blocks[0];
        if genesis.index != 0 {
            return Err(LedgerError::BadGenesis(format!(
                "index is {}",
                genesis.index
            )));
        }
        if genesis.previous_hash != GENESIS_PREVIOUS_HASH {
            return Err(LedgerError::BadGenesis(format!(
                "previous hash is {:?}",
                genesis.previous_hash
            )));
        }
        if !genesis.verify() {
            return Err(LedgerError::BadGenesis("hash does not match contents".into()));
        }
        Ok(())
    }

    fn check_links(&self) -> Result<()> {
        // Errors name the block's position, not its (possibly forged) stored index.
        for (position, pair) in self.blocks.windows(2).enumerate() {
            let (previous, current) = (&pair[0], &pair[1]);
            let index = position as u64 + 1;
            if !current.verify() {
                return Err(LedgerError::Tampered { index });
            }
            if current.previous_hash != previous.hash {
                return Err(LedgerError::BrokenLink { index });
            }
        }
        Ok(())
    }

    // ── Queries ───────────────────────────────────────────────

    /// All blocks, genesis first.
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Block> {
        self.blocks.iter()
    }

    pub fn get(&self, index: u64) -> Option<&Block> {
        usize::try_from(index).ok().and_then(|i| self.blocks.get(i))
    }

    /// The current tail.
    pub fn latest(&self) -> &Block {
        // Never empty: constructed with a genesis block and only grows.
        &self.blocks[self.blocks.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Always false.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// One line per block showing only its payload.
    pub fn data_lines(&self) -> impl Iterator<Item = String> + '_ {
        self.blocks
            .iter()
            .map(|b| format!("Block {} data: {}", b.index, b.data))
    }

    pub fn stats(&self) -> ChainStats {
        ChainStats {
            length: self.len(),
            transactions: self.blocks.iter().filter(|b| !b.data.is_genesis()).count(),
            valid: self.is_valid(),
        }
    }
}

impl Default for Chain {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> IntoIterator for &'a Chain {
    type Item = &'a Block;
    type IntoIter = std::slice::Iter<'a, Block>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Chain summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainStats {
    pub length: usize,
    pub transactions: usize,
    pub valid: bool,
}

impl fmt::Display for ChainStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Blocks:       {}", self.length)?;
        writeln!(f, "Transactions: {}", self.transactions)?;
        writeln!(f, "Valid:        {}", self.valid)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn book() -> Payload {
        Payload::transaction("Book", "US$10", "A", "B")
    }

    fn pen() -> Payload {
        Payload::transaction("Pen", "US$1", "C", "D")
    }

    fn two_sales() -> Chain {
        let mut chain = Chain::new();
        chain.append(book()).unwrap();
        chain.append(pen()).unwrap();
        chain
    }

    #[test]
    fn fresh_chain_has_genesis() {
        let chain = Chain::new();
        assert_eq!(chain.len(), 1);
        assert!(!chain.is_empty());
        let genesis = &chain.blocks()[0];
        assert_eq!(genesis.index(), 0);
        assert_eq!(genesis.previous_hash(), "0");
        assert_eq!(genesis.data(), &Payload::Genesis("Genesis Block".into()));
        assert_eq!(genesis.hash(), genesis.compute_hash());
        assert!(chain.is_valid());
    }

    #[test]
    fn append_preserves_validity() {
        let mut chain = Chain::new();
        for i in 0..10 {
            chain
                .append(Payload::transaction(format!("item{}", i), "US$1", "x", "y"))
                .unwrap();
            assert!(chain.is_valid());
        }
        assert_eq!(chain.len(), 11);
        for (i, b) in chain.iter().enumerate() {
            assert_eq!(b.index(), i as u64);
        }
    }

    #[test]
    fn end_to_end_two_sales() {
        let chain = two_sales();
        assert!(chain.is_valid());
        assert_eq!(chain.len(), 3);
        assert_eq!(chain.blocks()[2].previous_hash(), chain.blocks()[1].hash());
        assert_eq!(chain.blocks()[1].previous_hash(), chain.blocks()[0].hash());
        assert_eq!(chain.latest().data(), &pen());
    }

    #[test]
    fn payload_tamper_detected() {
        let mut chain = two_sales();
        chain.blocks[1].data = Payload::transaction("Hacked", "", "", "");
        assert!(!chain.is_valid());
        assert!(matches!(
            chain.validate(),
            Err(LedgerError::Tampered { index: 1 })
        ));
    }

    fn assert_tampered_at_one(chain: &Chain) {
        assert!(!chain.is_valid());
        assert!(matches!(
            chain.validate(),
            Err(LedgerError::Tampered { index: 1 })
        ));
    }

    #[test]
    fn single_payload_field_tamper_detected() {
        let mut chain = two_sales();
        if let Payload::Transaction(tx) = &mut chain.blocks[1].data {
            tx.value = "US$1000".into();
        }
        assert_tampered_at_one(&chain);
    }

    #[test]
    fn stored_index_tamper_detected() {
        let mut chain = two_sales();
        chain.blocks[1].index = 7;
        assert_tampered_at_one(&chain);
    }

    #[test]
    fn stored_timestamp_tamper_detected() {
        let mut chain = two_sales();
        chain.blocks[1].timestamp = chain.blocks[1].timestamp + chrono::Duration::seconds(1);
        assert_tampered_at_one(&chain);
    }

    #[test]
    fn genesis_payload_rejected_after_block_zero() {
        let mut chain = Chain::new();
        let err = chain.append(Payload::genesis()).unwrap_err();
        assert!(matches!(err, LedgerError::MisplacedGenesis { index: 1 }));

        let block = Block::new(1, Utc::now(), Payload::Genesis("again".into()), "x");
        let err = chain.append_block(block).unwrap_err();
        assert!(matches!(err, LedgerError::MisplacedGenesis { index: 1 }));

        assert_eq!(chain.len(), 1);
        assert_eq!(chain.stats().transactions, 0);
    }

    #[test]
    fn tamper_with_rehash_breaks_link() {
        let mut chain = two_sales();
        chain.blocks[1].data = Payload::transaction("Hacked", "", "", "");
        chain.blocks[1].hash = chain.blocks[1].compute_hash();
        assert!(matches!(
            chain.validate(),
            Err(LedgerError::BrokenLink { index: 2 })
        ));
    }

    #[test]
    fn link_tamper_detected() {
        let mut chain = two_sales();
        chain.blocks[2].previous_hash = "deadbeef".into();
        assert!(!chain.is_valid());

        // Even with a consistent hash, the link itself is wrong.
        chain.blocks[2].hash = chain.blocks[2].compute_hash();
        assert!(matches!(
            chain.validate(),
            Err(LedgerError::BrokenLink { index: 2 })
        ));
    }

    #[test]
    fn removed_block_detected() {
        let mut chain = two_sales();
        chain.blocks.remove(1);
        assert!(!chain.is_valid());
    }

    #[test]
    fn genesis_self_consistency_enforced() {
        let mut chain = Chain::new();
        chain.blocks[0].data = Payload::Genesis("Other".into());
        assert!(matches!(chain.validate(), Err(LedgerError::BadGenesis(_))));

        let mut chain = Chain::new();
        chain.blocks[0].relink("1");
        assert!(matches!(chain.validate(), Err(LedgerError::BadGenesis(_))));
    }

    #[test]
    fn append_block_relinks_placeholder() {
        let mut chain = Chain::new();
        let ts = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let block = Block::new(1, ts, book(), "placeholder");
        let appended = chain.append_block(block).unwrap();
        assert_ne!(appended.previous_hash(), "placeholder");
        assert!(appended.verify());
        assert_eq!(chain.blocks()[1].previous_hash(), chain.blocks()[0].hash());
        assert!(chain.is_valid());
    }

    #[test]
    fn append_block_rejects_wrong_index() {
        let mut chain = Chain::new();
        let block = Block::new(5, Utc::now(), book(), "x");
        let err = chain.append_block(block).unwrap_err();
        assert!(matches!(
            err,
            LedgerError::IndexMismatch {
                expected: 1,
                found: 5
            }
        ));
        assert_eq!(chain.len(), 1);
    }

    #[test]
    fn explicit_timestamp_is_kept() {
        let mut chain = Chain::new();
        let ts = Utc.with_ymd_and_hms(2023, 7, 9, 8, 30, 0).unwrap();
        let block = chain.append_with_timestamp(pen(), ts).unwrap();
        assert_eq!(block.timestamp(), ts);
        assert_eq!(block.index(), 1);
    }

    #[test]
    fn queries_and_stats() {
        let chain = two_sales();
        assert_eq!(chain.get(1).map(|b| b.data()), Some(&book()));
        assert!(chain.get(3).is_none());
        assert_eq!((&chain).into_iter().count(), 3);

        let lines: Vec<_> = chain.data_lines().collect();
        assert_eq!(lines[0], "Block 0 data: Genesis Block");
        assert_eq!(
            lines[2],
            "Block 2 data: {Item: Pen, Valor: US$1, Comprador: C, Vendedor: D}"
        );

        let stats = chain.stats();
        assert_eq!(
            stats,
            ChainStats {
                length: 3,
                transactions: 2,
                valid: true
            }
        );
    }
}
