//! A minimal in-memory hash-chain ledger.
//!
//! Every [`Block`] stores the SHA3-512 hash of its predecessor and of its own
//! fields; a [`Chain`] appends blocks and walks the links to detect tampering.

pub mod block;
pub mod chain;
pub mod error;
pub mod logging;
pub mod menu;
pub mod payload;
pub mod prices;

pub use block::{compute_hash, Block, BlockHash};
pub use chain::{Chain, ChainStats};
pub use error::{LedgerError, Result};
pub use payload::{Payload, Transaction};
pub use prices::{CoinGeckoFeed, PriceFeed, SnapshotFeed};
