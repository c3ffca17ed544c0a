//! Domain entities: core data structures

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Classification of a recorded sale. Informational only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArticleType {
    Stamps,
    Envelopes,
    Parcels,
    #[default]
    Other,
}

impl fmt::Display for ArticleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ArticleType::Stamps => "stamps",
            ArticleType::Envelopes => "envelopes",
            ArticleType::Parcels => "parcels",
            ArticleType::Other => "other",
        };
        write!(f, "{}", s)
    }
}

/// A sale recorded directly against one office.
///
/// Only `amount` takes part in distribution; `id` and `category` are carried
/// for the caller's bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: u64,
    #[serde(default)]
    pub category: ArticleType,
    pub amount: Decimal,
}

impl Transaction {
    pub fn new(id: u64, category: ArticleType, amount: Decimal) -> Self {
        Self {
            id,
            category,
            amount,
        }
    }
}

/// Declarative description of an office subtree, as read from a hierarchy file.
///
/// Child order is preserved when the spec is turned into an arena.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfficeSpec {
    pub name: String,
    #[serde(default)]
    pub commission_rate: Decimal,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
    #[serde(default)]
    pub children: Vec<OfficeSpec>,
}

impl OfficeSpec {
    pub fn new(name: impl Into<String>, commission_rate: Decimal) -> Self {
        Self {
            name: name.into(),
            commission_rate,
            transactions: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_transaction(mut self, transaction: Transaction) -> Self {
        self.transactions.push(transaction);
        self
    }

    pub fn with_child(mut self, child: OfficeSpec) -> Self {
        self.children.push(child);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn given_transaction_without_category_when_deserializing_then_defaults_to_other() {
        let tx: Transaction = serde_json::from_str(r#"{"id": 7, "amount": "12.50"}"#).unwrap();
        assert_eq!(tx.category, ArticleType::Other);
        assert_eq!(tx.amount, dec!(12.50));
    }

    #[test]
    fn given_numeric_amount_when_deserializing_then_keeps_exact_value() {
        let tx: Transaction =
            serde_json::from_str(r#"{"id": 1, "category": "stamps", "amount": 0.1}"#).unwrap();
        assert_eq!(tx.amount, dec!(0.1));
        assert_eq!(tx.category, ArticleType::Stamps);
    }
}
