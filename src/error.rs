use thiserror::Error;

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Index mismatch: expected block {expected}, got {found}")]
    IndexMismatch { expected: u64, found: u64 },

    #[error("Genesis payload is only allowed at index 0, not at block {index}")]
    MisplacedGenesis { index: u64 },

    #[error("Block {index} was tampered with: stored hash does not match its contents")]
    Tampered { index: u64 },

    #[error("Broken link at block {index}: previous hash does not match its predecessor")]
    BrokenLink { index: u64 },

    #[error("Invalid genesis block: {0}")]
    BadGenesis(String),
}

pub type Result<T> = std::result::Result<T, LedgerError>;
