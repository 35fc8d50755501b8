//! The uniform operation set both remote backends implement. Callers go
//! through [`crate::remote::RemoteFacade`] and never branch on transport
//! identity.

use async_trait::async_trait;

use crate::domain::category::Category;
use crate::domain::product::{Product, ProductDraft, ProductPatch};
use crate::domain::purchase::{PurchaseDraft, PurchaseRecord};
use crate::domain::session::SessionSummary;
use crate::error::Result;

#[async_trait]
pub trait RemoteTransport: Send + Sync {
    /// Short transport name used in logs and error messages.
    fn name(&self) -> &'static str;

    /// Cheap liveness probe.
    async fn health(&self) -> Result<()>;

    async fn list_products(&self) -> Result<Vec<Product>>;
    async fn add_product(&self, draft: &ProductDraft) -> Result<Product>;
    async fn update_product(&self, id: &str, patch: &ProductPatch) -> Result<Product>;
    /// Update addressed by exact (name, category). Exactly one match is
    /// required; a miss is `NotFound` and must never create a record. The
    /// name and category in the patch are ignored here, they only identify.
    async fn update_product_by_lookup(
        &self,
        name: &str,
        category: &Category,
        patch: &ProductPatch,
    ) -> Result<Product>;
    async fn delete_product(&self, id: &str) -> Result<()>;

    async fn add_purchase(&self, draft: &PurchaseDraft) -> Result<PurchaseRecord>;
    async fn list_purchases(&self) -> Result<Vec<PurchaseRecord>>;
    async fn purchases_for_session(&self, session_id: &str) -> Result<Vec<PurchaseRecord>>;

    /// Create the session when it has no id yet, update it otherwise.
    /// Returns the summary with its store-assigned id.
    async fn save_session(&self, summary: &SessionSummary) -> Result<SessionSummary>;
}
