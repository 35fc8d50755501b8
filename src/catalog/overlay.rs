//! Overlay state layered on top of the baseline catalog: tombstones, edits
//! and user-added products. The overlays are what gets persisted; the merged
//! list is always re-derived from them.

use std::collections::{BTreeMap, BTreeSet};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::product::{Product, ProductId, ProductPatch};
use crate::store::cache::{keys, LocalCache};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct OverlaySet {
    /// Ids the user deleted; excluded from every layer, permanently.
    pub tombstones: BTreeSet<ProductId>,
    /// Baseline id -> field overrides for surviving baseline items.
    pub edits: BTreeMap<u32, ProductPatch>,
    /// User-added products, in add order.
    pub custom: Vec<Product>,
    /// Legacy price-only override map, kept alongside `edits` for snapshots
    /// written by older releases. Only holds prices differing from baseline.
    pub price_overrides: BTreeMap<u32, Decimal>,
}

impl OverlaySet {
    pub fn load(cache: &LocalCache) -> Self {
        Self {
            tombstones: cache.get(keys::DELETED_IDS).unwrap_or_default(),
            edits: cache.get(keys::EDITED_PRODUCTS).unwrap_or_default(),
            custom: cache.get(keys::CUSTOM_PRODUCTS).unwrap_or_default(),
            price_overrides: cache.get(keys::PRICE_OVERRIDES).unwrap_or_default(),
        }
    }

    /// Persist all overlay keys. The reconciler owns these keys.
    pub fn persist(&self, cache: &LocalCache) -> crate::Result<()> {
        cache.put(keys::DELETED_IDS, &self.tombstones)?;
        cache.put(keys::EDITED_PRODUCTS, &self.edits)?;
        cache.put(keys::CUSTOM_PRODUCTS, &self.custom)?;
        cache.put(keys::PRICE_OVERRIDES, &self.price_overrides)?;
        Ok(())
    }

    pub fn is_tombstoned(&self, id: &ProductId) -> bool {
        self.tombstones.contains(id)
    }

    /// Record the state of an edited baseline item. When the edit restores
    /// the item to its exact baseline values the entry is pruned, keeping
    /// the overlay minimal.
    pub fn record_edit(&mut self, baseline: &Product, current: &Product) {
        let ProductId::Local(id) = baseline.id else {
            return;
        };
        let matches_baseline = current.name == baseline.name
            && current.category == baseline.category
            && current.price == baseline.price;
        if matches_baseline {
            self.edits.remove(&id);
        } else {
            self.edits.insert(
                id,
                ProductPatch {
                    name: Some(current.name.clone()),
                    category: Some(current.category.clone()),
                    price: Some(current.price),
                    image: None,
                },
            );
        }
        if current.price == baseline.price {
            self.price_overrides.remove(&id);
        } else {
            self.price_overrides.insert(id, current.price);
        }
    }

    pub fn add_custom(&mut self, product: Product) {
        self.custom.push(product);
    }

    /// Apply a patch to a custom item in place. Returns the updated product.
    pub fn patch_custom(&mut self, id: &ProductId, patch: &ProductPatch) -> Option<Product> {
        let item = self.custom.iter_mut().find(|p| p.id == *id)?;
        patch.apply_to(item);
        Some(item.clone())
    }

    /// Delete an id: custom entries are removed outright, and the id is
    /// tombstoned so it can never resurface from any layer. Any edit or
    /// price override for it is dropped.
    pub fn delete(&mut self, id: &ProductId) {
        self.custom.retain(|p| p.id != *id);
        self.tombstones.insert(id.clone());
        if let ProductId::Local(n) = id {
            self.edits.remove(n);
            self.price_overrides.remove(n);
        }
    }
}
