//! Catalog reconciliation: merges the baseline seed, local overlays and the
//! remote catalog into one ordered, de-duplicated product list.

use crate::catalog::baseline::{baseline, is_baseline_id, BASELINE_MAX_ID};
use crate::catalog::overlay::OverlaySet;
use crate::domain::category::Category;
use crate::domain::product::{Product, ProductDraft, ProductId, ProductPatch};
use crate::error::{PosError, Result};
use crate::remote::facade::RemoteFacade;
use crate::store::cache::LocalCache;
use rust_decimal::Decimal;

/// Stable sort by (category rank, case-insensitive name). This is the order
/// remote-backed lists are displayed in.
pub fn sorted(mut items: Vec<Product>) -> Vec<Product> {
    items.sort_by(|a, b| a.ordering_key().cmp(&b.ordering_key()));
    items
}

/// Position for a new or re-categorized item: right after the last existing
/// item of the same category; failing that, before the first item of a
/// later-ranked category; failing that, at the end.
pub fn insertion_index(items: &[Product], category: &Category) -> usize {
    if let Some(pos) = items.iter().rposition(|p| p.category == *category) {
        return pos + 1;
    }
    let rank = category.rank();
    items
        .iter()
        .position(|p| p.category.rank() > rank)
        .unwrap_or(items.len())
}

/// Pure merge of the four local layers, or of the remote list when one is
/// available. Re-derivable identically on every process start; only the
/// overlay inputs are ever persisted.
pub fn reconcile(
    baseline: &[Product],
    overlays: &OverlaySet,
    remote: Option<Vec<Product>>,
) -> Vec<Product> {
    if let Some(remote) = remote {
        // Remote is the source of truth; local overlays only cover the
        // window before it is reachable. Tombstones still apply.
        return sorted(
            remote
                .into_iter()
                .filter(|p| !overlays.is_tombstoned(&p.id))
                .collect(),
        );
    }

    let mut items: Vec<Product> = baseline
        .iter()
        .filter(|p| !overlays.is_tombstoned(&p.id))
        .cloned()
        .collect();

    for item in &mut items {
        if let ProductId::Local(id) = item.id {
            if let Some(edit) = overlays.edits.get(&id) {
                edit.apply_to(item);
            }
        }
    }

    for custom in overlays
        .custom
        .iter()
        .filter(|p| !overlays.is_tombstoned(&p.id))
    {
        let at = insertion_index(&items, &custom.category);
        items.insert(at, custom.clone());
    }

    // Legacy price-only overrides, applied last so older snapshots that
    // never wrote the edits map still restore their prices.
    for item in &mut items {
        if let ProductId::Local(id) = item.id {
            if let Some(price) = overlays.price_overrides.get(&id) {
                item.price = *price;
            }
        }
    }

    items
}

/// An applied product update: the state the remote store still knows
/// (`before`, used for composite addressing) and the new state.
#[derive(Clone, Debug)]
pub struct UpdateOutcome {
    pub before: Product,
    pub after: Product,
}

/// The merged, ordered catalog plus the overlay state it was derived from.
/// All catalog mutations go through this type.
pub struct Catalog {
    cache: LocalCache,
    baseline: Vec<Product>,
    overlays: OverlaySet,
    items: Vec<Product>,
    remote_backed: bool,
    generation: u64,
}

impl Catalog {
    /// Restore overlays from the cache and derive the merged list.
    pub fn open(cache: LocalCache) -> Self {
        let baseline = baseline();
        let overlays = OverlaySet::load(&cache);
        let items = reconcile(&baseline, &overlays, None);
        Self {
            cache,
            baseline,
            overlays,
            items,
            remote_backed: false,
            generation: 0,
        }
    }

    pub fn products(&self) -> &[Product] {
        &self.items
    }

    pub fn find(&self, id: &ProductId) -> Option<&Product> {
        self.items.iter().find(|p| p.id == *id)
    }

    /// Whether the current list came from the remote store rather than from
    /// local overlays alone.
    pub fn is_remote_backed(&self) -> bool {
        self.remote_backed
    }

    fn bump(&mut self) -> Result<()> {
        self.generation += 1;
        self.overlays.persist(&self.cache)
    }

    fn next_local_id(&self) -> u32 {
        self.items
            .iter()
            .chain(self.overlays.custom.iter())
            .filter_map(|p| match p.id {
                ProductId::Local(n) => Some(n),
                ProductId::Remote(_) => None,
            })
            .max()
            .unwrap_or(BASELINE_MAX_ID)
            + 1
    }

    /// Add a user-defined product. Rejects duplicates by
    /// (trimmed case-insensitive name, category) without mutating anything.
    pub fn add(&mut self, draft: ProductDraft) -> Result<Product> {
        draft.validate()?;
        let duplicate = self
            .items
            .iter()
            .any(|p| p.name_matches(&draft.name) && p.category == draft.category);
        if duplicate {
            return Err(PosError::Conflict(format!(
                "a product named \"{}\" already exists in the {} category",
                draft.name.trim(),
                draft.category
            )));
        }

        let mut product = Product::new(
            self.next_local_id(),
            draft.name.trim(),
            draft.category,
            draft.price,
        );
        if let Some(image) = draft.image {
            product.image = Some(image);
        }

        let at = insertion_index(&self.items, &product.category);
        self.items.insert(at, product.clone());
        self.overlays.add_custom(product.clone());
        self.bump()?;
        tracing::info!(name = %product.name, category = %product.category, "product added");
        Ok(product)
    }

    /// Apply a partial update. Category changes re-group the item by the
    /// insertion rule; edits to baseline items are recorded in the overlay
    /// (and pruned again when they restore baseline values).
    pub fn update(&mut self, id: &ProductId, patch: &ProductPatch) -> Result<UpdateOutcome> {
        if patch.is_empty() {
            return Err(PosError::Validation("empty product update".into()));
        }
        if let Some(price) = patch.price {
            if price < Decimal::ZERO {
                return Err(PosError::Validation(format!(
                    "price must not be negative, got {price}"
                )));
            }
        }
        let pos = self
            .items
            .iter()
            .position(|p| p.id == *id)
            .ok_or_else(|| PosError::NotFound(format!("product {id}")))?;

        let before = self.items[pos].clone();
        let mut after = before.clone();
        patch.apply_to(&mut after);
        after.touch();

        let recategorized = after.category != before.category;
        if recategorized {
            self.items.remove(pos);
            let at = insertion_index(&self.items, &after.category);
            self.items.insert(at, after.clone());
        } else {
            self.items[pos] = after.clone();
        }

        if let Some(seed) = self.baseline.iter().find(|p| p.id == *id) {
            let seed = seed.clone();
            self.overlays.record_edit(&seed, &after);
        } else if self.overlays.patch_custom(id, patch).is_none() && id.is_local() {
            // A local id that is neither seeded nor custom should not exist.
            tracing::warn!(%id, "updated product missing from overlay state");
        }
        self.bump()?;
        Ok(UpdateOutcome { before, after })
    }

    pub fn update_price(&mut self, id: &ProductId, price: Decimal) -> Result<UpdateOutcome> {
        self.update(id, &ProductPatch::price(price))
    }

    /// Delete a product: a permanent tombstone for baseline items, outright
    /// removal for custom ones. Returns the removed product.
    pub fn delete(&mut self, id: &ProductId) -> Result<Product> {
        let pos = self
            .items
            .iter()
            .position(|p| p.id == *id)
            .ok_or_else(|| PosError::NotFound(format!("product {id}")))?;
        let removed = self.items.remove(pos);
        self.overlays.delete(id);
        self.bump()?;
        tracing::info!(name = %removed.name, "product deleted");
        Ok(removed)
    }

    /// Generation marker taken before starting a remote fetch; used to
    /// discard the fetch if a local mutation lands while it is in flight.
    pub fn begin_fetch(&self) -> u64 {
        self.generation
    }

    /// Adopt a remote catalog fetched at `fetch_generation`. Returns false
    /// (and changes nothing) when local mutations have happened since the
    /// fetch started.
    pub fn adopt_remote(&mut self, remote: Vec<Product>, fetch_generation: u64) -> bool {
        if fetch_generation != self.generation {
            return false;
        }
        self.items = reconcile(&self.baseline, &self.overlays, Some(remote));
        self.remote_backed = true;
        true
    }

    /// Fetch the remote catalog through the façade and adopt it. Never
    /// fails: on error the previously computed local list stays in place and
    /// the catalog is marked not remote-backed.
    pub async fn sync_remote(&mut self, facade: &RemoteFacade) -> bool {
        let fetch_generation = self.begin_fetch();
        match facade.list_products().await {
            Ok(remote) => {
                let adopted = self.adopt_remote(remote, fetch_generation);
                if !adopted {
                    tracing::debug!("discarded stale remote catalog fetch");
                }
                adopted
            }
            Err(err) => {
                tracing::warn!(%err, "remote catalog unavailable, keeping local list");
                self.remote_backed = false;
                false
            }
        }
    }

    /// Push a local update to the remote store, addressing by store id when
    /// the product has one and by (name, category) composite lookup when it
    /// still carries a numeric id. The composite path must not create a
    /// record on a miss; the façade propagates `NotFound` as-is.
    pub async fn push_update(
        &self,
        facade: &RemoteFacade,
        outcome: &UpdateOutcome,
    ) -> Result<Product> {
        let patch = ProductPatch {
            name: Some(outcome.after.name.clone()),
            category: Some(outcome.after.category.clone()),
            price: Some(outcome.after.price),
            image: outcome.after.image.clone(),
        };
        match &outcome.before.id {
            ProductId::Remote(id) => facade.update_product(id, &patch).await,
            ProductId::Local(_) => {
                facade
                    .update_product_by_lookup(
                        &outcome.before.name,
                        &outcome.before.category,
                        &patch,
                    )
                    .await
            }
        }
    }

    /// Push a locally-added product to the remote store.
    pub async fn push_add(&self, facade: &RemoteFacade, product: &Product) -> Result<Product> {
        facade
            .add_product(&ProductDraft {
                name: product.name.clone(),
                category: product.category.clone(),
                price: product.price,
                image: product.image.clone(),
            })
            .await
    }

    /// Push a deletion. Products that only ever existed locally have no
    /// remote record to delete.
    pub async fn push_delete(&self, facade: &RemoteFacade, removed: &Product) -> Result<()> {
        match &removed.id {
            ProductId::Remote(id) => facade.delete_product(id).await,
            ProductId::Local(_) => Ok(()),
        }
    }

    #[cfg(test)]
    pub(crate) fn overlays(&self) -> &OverlaySet {
        &self.overlays
    }
}
