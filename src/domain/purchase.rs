//! Immutable purchase records produced at checkout.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::cart::CartLine;
use crate::domain::category::Category;
use crate::error::{PosError, Result};

const LOCAL_ID_PREFIX: &str = "local-";

/// Whether an id is a locally-generated placeholder awaiting the
/// store-assigned id.
pub fn is_local_id(id: &str) -> bool {
    id.starts_with(LOCAL_ID_PREFIX)
}

pub fn new_local_id() -> String {
    format!("{LOCAL_ID_PREFIX}{}", Uuid::new_v4())
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseItem {
    pub id: String,
    pub name: String,
    pub price: Decimal,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
}

impl From<&CartLine> for PurchaseItem {
    fn from(line: &CartLine) -> Self {
        Self {
            id: line.id.as_key(),
            name: line.name.clone(),
            price: line.price,
            quantity: line.quantity,
            image: line.image.clone(),
            category: Some(line.category.clone()),
        }
    }
}

/// One completed sale. Never user-mutated after creation; the only change
/// allowed is swapping a local placeholder id for the store-assigned one.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseRecord {
    pub id: String,
    pub date: DateTime<Utc>,
    pub items: Vec<PurchaseItem>,
    pub total: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    /// True while the record has not been confirmed by a remote write.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub unsynced: bool,
}

impl PurchaseRecord {
    pub fn from_cart(lines: &[CartLine], session_id: Option<String>) -> Result<Self> {
        if lines.is_empty() {
            return Err(PosError::Validation(
                "cannot check out an empty cart".into(),
            ));
        }
        let items: Vec<PurchaseItem> = lines.iter().map(PurchaseItem::from).collect();
        let total = lines.iter().map(CartLine::line_total).sum();
        Ok(Self {
            id: new_local_id(),
            date: Utc::now(),
            items,
            total,
            session_id,
            unsynced: false,
        })
    }

    pub fn is_confirmed(&self) -> bool {
        !is_local_id(&self.id)
    }

    pub fn validate(&self) -> Result<()> {
        if self.items.is_empty() {
            return Err(PosError::Validation(
                "purchase must have at least one item".into(),
            ));
        }
        let expected: Decimal = self
            .items
            .iter()
            .map(|i| i.price * Decimal::from(i.quantity))
            .sum();
        if expected != self.total {
            return Err(PosError::Validation(format!(
                "purchase total {} does not match item sum {}",
                self.total, expected
            )));
        }
        Ok(())
    }

    /// Wire shape for the remote write: same fields minus the local-only id
    /// and sync flag.
    pub fn to_draft(&self) -> PurchaseDraft {
        PurchaseDraft {
            date: self.date,
            items: self.items.clone(),
            total: self.total,
            session_id: self.session_id.clone(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseDraft {
    pub date: DateTime<Utc>,
    pub items: Vec<PurchaseItem>,
    pub total: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

impl PurchaseDraft {
    pub fn validate(&self) -> Result<()> {
        if self.items.is_empty() {
            return Err(PosError::Validation(
                "purchase must have at least one item".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cart::Cart;
    use crate::domain::product::Product;

    #[test]
    fn from_cart_rejects_empty() {
        assert!(matches!(
            PurchaseRecord::from_cart(&[], None),
            Err(PosError::Validation(_))
        ));
    }

    #[test]
    fn from_cart_snapshots_lines_and_total() {
        let mut cart = Cart::new();
        let chippy = Product::new(1u32, "Chippy", "Snacks", Decimal::from(10));
        cart.add(&chippy);
        cart.add(&chippy);
        let record = PurchaseRecord::from_cart(cart.lines(), None).unwrap();
        assert_eq!(record.items.len(), 1);
        assert_eq!(record.items[0].quantity, 2);
        assert_eq!(record.total, Decimal::from(20));
        assert!(is_local_id(&record.id));
        assert!(!record.is_confirmed());
        record.validate().unwrap();
    }

    #[test]
    fn validate_catches_total_drift() {
        let mut cart = Cart::new();
        cart.add(&Product::new(1u32, "Chippy", "Snacks", Decimal::from(10)));
        let mut record = PurchaseRecord::from_cart(cart.lines(), None).unwrap();
        record.total = Decimal::from(99);
        assert!(matches!(record.validate(), Err(PosError::Validation(_))));
    }
}
