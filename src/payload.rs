use serde::Serialize;
use std::fmt;

/// Sentinel text carried by every chain's first block.
pub const GENESIS_DATA: &str = "Genesis Block";

/// What a block records.
///
/// The encoding fed into the block hash is the JSON form of this enum. Struct
/// fields serialize in declaration order, so the same payload always encodes
/// to the same bytes.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub enum Payload {
    /// Fixed marker for the genesis block.
    Genesis(String),
    /// A purchase between two parties.
    Transaction(Transaction),
}

/// A single sale recorded on the ledger.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Transaction {
    #[serde(rename = "Item")]
    pub item: String,
    /// Price including the currency prefix, e.g. `US$10`.
    #[serde(rename = "Valor")]
    pub value: String,
    #[serde(rename = "Comprador")]
    pub buyer: String,
    #[serde(rename = "Vendedor")]
    pub seller: String,
}

impl Transaction {
    pub fn new(
        item: impl Into<String>,
        value: impl Into<String>,
        buyer: impl Into<String>,
        seller: impl Into<String>,
    ) -> Self {
        Self {
            item: item.into(),
            value: value.into(),
            buyer: buyer.into(),
            seller: seller.into(),
        }
    }
}

impl Payload {
    /// The payload every genesis block carries.
    pub fn genesis() -> Self {
        Payload::Genesis(GENESIS_DATA.into())
    }

    pub fn transaction(
        item: impl Into<String>,
        value: impl Into<String>,
        buyer: impl Into<String>,
        seller: impl Into<String>,
    ) -> Self {
        Payload::Transaction(Transaction::new(item, value, buyer, seller))
    }

    /// Canonical string form used as hash input.
    pub fn canonical(&self) -> String {
        // Plain strings in fixed-order structs cannot fail to serialize.
        serde_json::to_string(self).unwrap_or_default()
    }

    pub fn is_genesis(&self) -> bool {
        matches!(self, Payload::Genesis(_))
    }
}

impl From<Transaction> for Payload {
    fn from(tx: Transaction) -> Self {
        Payload::Transaction(tx)
    }
}

impl fmt::Display for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Payload::Genesis(text) => write!(f, "{}", text),
            Payload::Transaction(tx) => write!(
                f,
                "{{Item: {}, Valor: {}, Comprador: {}, Vendedor: {}}}",
                tx.item, tx.value, tx.buyer, tx.seller
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_uses_declared_field_order() {
        let p = Payload::transaction("Book", "US$10", "A", "B");
        assert_eq!(
            p.canonical(),
            r#"{"Transaction":{"Item":"Book","Valor":"US$10","Comprador":"A","Vendedor":"B"}}"#
        );
    }

    #[test]
    fn genesis_and_transaction_encode_differently() {
        let genesis = Payload::Genesis("Book".into());
        let tx = Payload::transaction("Book", "", "", "");
        assert_ne!(genesis.canonical(), tx.canonical());
        assert!(genesis.is_genesis());
        assert!(!tx.is_genesis());
    }

    #[test]
    fn newlines_are_escaped() {
        let p = Payload::transaction("a\nprev:0", "US$1", "C", "D");
        assert!(!p.canonical().contains('\n'));
    }

    #[test]
    fn display_matches_menu_output() {
        let p = Payload::transaction("Pen", "US$1", "C", "D");
        assert_eq!(
            p.to_string(),
            "{Item: Pen, Valor: US$1, Comprador: C, Vendedor: D}"
        );
        assert_eq!(Payload::genesis().to_string(), "Genesis Block");
    }
}
