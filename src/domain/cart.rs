//! Shopping cart: ordered product snapshots with quantities, kept in sync
//! with the live catalog.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::category::Category;
use crate::domain::product::{Product, ProductId};
use crate::store::cache::{keys, LocalCache};

/// A materialized copy of a product at add-time, plus a quantity.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub id: ProductId,
    pub name: String,
    pub category: Category,
    pub price: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub quantity: u32,
}

impl CartLine {
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

#[derive(Clone, Debug, Default)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restore the cart snapshot from the local cache.
    pub fn load(cache: &LocalCache) -> Self {
        Self {
            lines: cache.get(keys::CART).unwrap_or_default(),
        }
    }

    /// Persist the cart snapshot. The cart key is owned by this type.
    pub fn save(&self, cache: &LocalCache) -> crate::Result<()> {
        cache.put(keys::CART, &self.lines)
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn total(&self) -> Decimal {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    /// Add a product; an existing line for the same product gains one unit
    /// instead of duplicating.
    pub fn add(&mut self, product: &Product) {
        if let Some(line) = self.lines.iter_mut().find(|l| l.id == product.id) {
            line.quantity += 1;
            return;
        }
        self.lines.push(CartLine {
            id: product.id.clone(),
            name: product.name.clone(),
            category: product.category.clone(),
            price: product.price,
            image: product.image.clone(),
            quantity: 1,
        });
    }

    /// Set a line's quantity; zero or below removes the line.
    pub fn update_quantity(&mut self, id: &ProductId, quantity: i64) {
        if quantity <= 0 {
            self.remove(id);
            return;
        }
        if let Some(line) = self.lines.iter_mut().find(|l| l.id == *id) {
            line.quantity = quantity as u32;
        }
    }

    pub fn remove(&mut self, id: &ProductId) {
        self.lines.retain(|l| l.id != *id);
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Refresh line snapshots from the current catalog. Lines are matched by
    /// id first, then by trimmed case-insensitive name; matched lines take
    /// the catalog's name/price/category/image but keep their quantity.
    /// Unmatched lines are left in place so the user can notice and remove
    /// them.
    pub fn sync_with(&mut self, catalog: &[Product]) {
        for line in &mut self.lines {
            let current = catalog
                .iter()
                .find(|p| p.id == line.id)
                .or_else(|| catalog.iter().find(|p| p.name_matches(&line.name)));
            if let Some(product) = current {
                line.id = product.id.clone();
                line.name = product.name.clone();
                line.category = product.category.clone();
                line.price = product.price;
                line.image = product.image.clone();
            }
        }
    }
}
