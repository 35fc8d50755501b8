//! Configurable in-memory transport used by façade and engine tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::category::Category;
use crate::domain::product::{Product, ProductDraft, ProductPatch};
use crate::domain::purchase::{PurchaseDraft, PurchaseRecord};
use crate::domain::session::SessionSummary;
use crate::error::{PosError, Result};
use crate::remote::transport::RemoteTransport;
use crate::TransportKind;

#[derive(Default)]
pub struct StubTransport {
    name: &'static str,
    fail: bool,
    hang: bool,
    unhealthy: bool,
    missing: bool,
    products: Mutex<Vec<Product>>,
    pub purchases: Mutex<Vec<PurchaseRecord>>,
    pub sessions: Mutex<Vec<SessionSummary>>,
    data_calls: AtomicUsize,
    health_probes: AtomicUsize,
    next_id: AtomicUsize,
}

impl StubTransport {
    pub fn named(name: &'static str) -> Self {
        Self {
            name,
            ..Self::default()
        }
    }

    /// Every data operation fails with a transport error.
    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    /// Every data operation blocks until the caller's timeout fires.
    pub fn hanging(mut self) -> Self {
        self.hang = true;
        self
    }

    /// The health probe fails; data operations still work.
    pub fn unhealthy(mut self) -> Self {
        self.unhealthy = true;
        self
    }

    /// Composite lookups miss.
    pub fn missing_products(mut self) -> Self {
        self.missing = true;
        self
    }

    pub fn with_products(self, products: Vec<Product>) -> Self {
        *self.products.lock().unwrap() = products;
        self
    }

    /// Number of data operations attempted (health probes not included).
    pub fn calls(&self) -> usize {
        self.data_calls.load(Ordering::SeqCst)
    }

    pub fn health_calls(&self) -> usize {
        self.health_probes.load(Ordering::SeqCst)
    }

    async fn gate(&self) -> Result<()> {
        self.data_calls.fetch_add(1, Ordering::SeqCst);
        if self.hang {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        }
        if self.fail {
            return Err(PosError::transport(self.name, TransportKind::Unavailable));
        }
        Ok(())
    }

    fn assign(&self, prefix: &str) -> String {
        format!("{prefix}-{}", self.next_id.fetch_add(1, Ordering::SeqCst) + 1)
    }
}

#[async_trait]
impl RemoteTransport for StubTransport {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn health(&self) -> Result<()> {
        self.health_probes.fetch_add(1, Ordering::SeqCst);
        if self.unhealthy {
            return Err(PosError::transport(self.name, TransportKind::Unavailable));
        }
        Ok(())
    }

    async fn list_products(&self) -> Result<Vec<Product>> {
        self.gate().await?;
        Ok(self.products.lock().unwrap().clone())
    }

    async fn add_product(&self, draft: &ProductDraft) -> Result<Product> {
        self.gate().await?;
        let mut product = Product::new(
            self.assign("prod").as_str(),
            draft.name.clone(),
            draft.category.clone(),
            draft.price,
        );
        if let Some(image) = &draft.image {
            product.image = Some(image.clone());
        }
        self.products.lock().unwrap().push(product.clone());
        Ok(product)
    }

    async fn update_product(&self, id: &str, patch: &ProductPatch) -> Result<Product> {
        self.gate().await?;
        let mut products = self.products.lock().unwrap();
        let product = products
            .iter_mut()
            .find(|p| p.id.as_key() == id)
            .ok_or_else(|| PosError::NotFound(format!("product {id}")))?;
        patch.apply_to(product);
        Ok(product.clone())
    }

    async fn update_product_by_lookup(
        &self,
        name: &str,
        category: &Category,
        patch: &ProductPatch,
    ) -> Result<Product> {
        self.gate().await?;
        if self.missing {
            return Err(PosError::NotFound(format!(
                "product not found: {name} ({category})"
            )));
        }
        let mut products = self.products.lock().unwrap();
        let product = products
            .iter_mut()
            .find(|p| p.name == name && p.category == *category)
            .ok_or_else(|| {
                PosError::NotFound(format!("product not found: {name} ({category})"))
            })?;
        let mut identity_free = patch.clone();
        identity_free.name = None;
        identity_free.category = None;
        identity_free.apply_to(product);
        Ok(product.clone())
    }

    async fn delete_product(&self, id: &str) -> Result<()> {
        self.gate().await?;
        let mut products = self.products.lock().unwrap();
        let before = products.len();
        products.retain(|p| p.id.as_key() != id);
        if products.len() == before {
            return Err(PosError::NotFound(format!("product {id}")));
        }
        Ok(())
    }

    async fn add_purchase(&self, draft: &PurchaseDraft) -> Result<PurchaseRecord> {
        self.gate().await?;
        draft.validate()?;
        let record = PurchaseRecord {
            id: self.assign("purch"),
            date: draft.date,
            items: draft.items.clone(),
            total: draft.total,
            session_id: draft.session_id.clone(),
            unsynced: false,
        };
        self.purchases.lock().unwrap().push(record.clone());
        Ok(record)
    }

    async fn list_purchases(&self) -> Result<Vec<PurchaseRecord>> {
        self.gate().await?;
        Ok(self.purchases.lock().unwrap().clone())
    }

    async fn purchases_for_session(&self, session_id: &str) -> Result<Vec<PurchaseRecord>> {
        self.gate().await?;
        Ok(self
            .purchases
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.session_id.as_deref() == Some(session_id))
            .cloned()
            .collect())
    }

    async fn save_session(&self, summary: &SessionSummary) -> Result<SessionSummary> {
        self.gate().await?;
        let mut saved = summary.clone();
        if saved.id.is_none() {
            saved.id = Some(self.assign("sess"));
        }
        self.sessions.lock().unwrap().push(saved.clone());
        Ok(saved)
    }
}
