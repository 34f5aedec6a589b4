//! USD price lookup for the menu's price screen.
//!
//! Price sources are best-effort: any failure reads as "unavailable" and is
//! never surfaced as an error, so a dead price source cannot affect the ledger.

use crate::error::Result;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, warn};

/// Public CoinGecko API root.
pub const COINGECKO_API: &str = "https://api.coingecko.com/api/v3";

/// Coins shown by the menu: (CoinGecko id, display name).
pub const DEFAULT_COINS: &[(&str, &str)] = &[
    ("bitcoin", "Bitcoin"),
    ("ethereum", "Ethereum"),
    ("solana", "Solana"),
    ("near", "Near"),
    ("bnb", "Binance Coin"),
];

/// Something that can quote a coin's price in USD.
pub trait PriceFeed {
    /// `None` means the price is unavailable right now.
    fn price_usd(&self, coin: &str) -> Option<f64>;
}

/// Extract `coin`'s USD price from a CoinGecko `simple/price` response body,
/// e.g. `{"bitcoin":{"usd":64000.5}}`.
pub fn parse_simple_price(body: &str, coin: &str) -> Option<f64> {
    let value: Value = serde_json::from_str(body).ok()?;
    value.get(coin)?.get("usd")?.as_f64()
}

/// Live quotes from CoinGecko's `simple/price` endpoint, one request per coin.
pub struct CoinGeckoFeed {
    agent: ureq::Agent,
    base_url: String,
}

impl CoinGeckoFeed {
    pub fn new() -> Self {
        Self::with_base_url(COINGECKO_API)
    }

    /// Point the feed at another API root (mirrors, local stubs).
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(10))
            .build();
        Self {
            agent,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url_for(&self, coin: &str) -> String {
        format!(
            "{}/simple/price?ids={}&vs_currencies=usd",
            self.base_url, coin
        )
    }

    fn fetch(&self, coin: &str) -> std::result::Result<String, Box<dyn std::error::Error>> {
        let response = self.agent.get(&self.url_for(coin)).call()?;
        Ok(response.into_string()?)
    }
}

impl Default for CoinGeckoFeed {
    fn default() -> Self {
        Self::new()
    }
}

impl PriceFeed for CoinGeckoFeed {
    fn price_usd(&self, coin: &str) -> Option<f64> {
        let body = match self.fetch(coin) {
            Ok(body) => body,
            Err(e) => {
                warn!(coin, "price request failed: {}", e);
                return None;
            }
        };
        let price = parse_simple_price(&body, coin);
        if price.is_none() {
            warn!(coin, "no usd quote in price response");
        }
        price
    }
}

/// Prices captured at one point in time, held in memory.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SnapshotFeed {
    prices: BTreeMap<String, f64>,
}

impl SnapshotFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a snapshot file written in the `simple/price` response format.
    pub fn load(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)?;
        let feed = Self::from_json(&data)?;
        debug!(path = %path.display(), coins = feed.len(), "loaded price snapshot");
        Ok(feed)
    }

    /// Like [`SnapshotFeed::load`], but an unreadable file yields an empty feed.
    pub fn load_or_empty(path: &Path) -> Self {
        Self::load(path).unwrap_or_else(|e| {
            warn!(path = %path.display(), "price snapshot unavailable: {}", e);
            Self::default()
        })
    }

    /// Parse a `simple/price` body. Entries without a numeric `usd` field are skipped.
    pub fn from_json(body: &str) -> Result<Self> {
        let raw: BTreeMap<String, Value> = serde_json::from_str(body)?;
        let prices = raw
            .into_iter()
            .filter_map(|(coin, quote)| quote.get("usd")?.as_f64().map(|p| (coin, p)))
            .collect();
        Ok(Self { prices })
    }

    pub fn with_price(mut self, coin: impl Into<String>, usd: f64) -> Self {
        self.prices.insert(coin.into(), usd);
        self
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }
}

impl PriceFeed for SnapshotFeed {
    fn price_usd(&self, coin: &str) -> Option<f64> {
        self.prices.get(coin).copied()
    }
}
