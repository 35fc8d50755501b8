//! Transport A: direct document-store access. Also the backing service for
//! the REST relay, which exposes these same operations over HTTP.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::catalog::sorted;
use crate::domain::category::Category;
use crate::domain::product::{derive_image, Product, ProductDraft, ProductPatch};
use crate::domain::purchase::{PurchaseDraft, PurchaseRecord};
use crate::domain::session::SessionSummary;
use crate::error::{PosError, Result};
use crate::remote::transport::RemoteTransport;
use crate::store::{collections, Document, DocumentStore, Fields};

#[derive(Clone)]
pub struct StoreClient {
    store: Arc<dyn DocumentStore>,
}

fn now_iso() -> Value {
    Value::String(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true))
}

fn to_fields<T: Serialize>(value: &T) -> Result<Fields> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(PosError::Storage(format!(
            "expected a JSON object, got {other}"
        ))),
    }
}

fn parse<T: DeserializeOwned>(doc: Document) -> Result<T> {
    Ok(serde_json::from_value(doc.into_json())?)
}

/// Parse a list, skipping documents that don't decode instead of failing
/// the whole read.
fn parse_all<T: DeserializeOwned>(docs: Vec<Document>, what: &str) -> Vec<T> {
    docs.into_iter()
        .filter_map(|doc| {
            let id = doc.id.clone();
            match parse(doc) {
                Ok(item) => Some(item),
                Err(err) => {
                    tracing::warn!(%id, what, %err, "skipping undecodable document");
                    None
                }
            }
        })
        .collect()
}

impl StoreClient {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    async fn require(&self, collection: &str, id: &str) -> Result<Document> {
        self.store
            .get(collection, id)
            .await?
            .ok_or_else(|| PosError::NotFound(format!("{collection}/{id}")))
    }

    // ---- product operations beyond the transport trait -----------------

    pub async fn get_product(&self, id: &str) -> Result<Product> {
        parse(self.require(collections::PRODUCTS, id).await?)
    }

    pub async fn products_by_category(&self, category: &Category) -> Result<Vec<Product>> {
        let docs = self
            .store
            .query_eq(
                collections::PRODUCTS,
                "category",
                &Value::String(category.name().to_string()),
            )
            .await?;
        Ok(parse_all(docs, "product"))
    }

    /// Seed several products in one call; used by catalog migration.
    pub async fn add_products_batch(&self, drafts: &[ProductDraft]) -> Result<usize> {
        for draft in drafts {
            self.add_product(draft).await?;
        }
        Ok(drafts.len())
    }

    // ---- purchase operations beyond the transport trait ----------------

    pub async fn get_purchase(&self, id: &str) -> Result<PurchaseRecord> {
        parse(self.require(collections::PURCHASES, id).await?)
    }

    pub async fn delete_purchase(&self, id: &str) -> Result<()> {
        self.require(collections::PURCHASES, id).await?;
        self.store.delete(collections::PURCHASES, id).await
    }

    // ---- session operations beyond the transport trait -----------------

    pub async fn list_sessions(&self) -> Result<Vec<SessionSummary>> {
        let docs = self
            .store
            .order_by(collections::SESSIONS, "createdAt", true)
            .await?;
        Ok(parse_all(docs, "session"))
    }

    pub async fn get_session(&self, id: &str) -> Result<SessionSummary> {
        parse(self.require(collections::SESSIONS, id).await?)
    }

    pub async fn update_session(&self, id: &str, fields: Fields) -> Result<SessionSummary> {
        self.require(collections::SESSIONS, id).await?;
        let mut fields = fields;
        fields.insert("updatedAt".into(), now_iso());
        parse(
            self.store
                .update(collections::SESSIONS, id, fields)
                .await?,
        )
    }

    pub async fn delete_session(&self, id: &str) -> Result<()> {
        self.require(collections::SESSIONS, id).await?;
        self.store.delete(collections::SESSIONS, id).await
    }
}

#[async_trait]
impl RemoteTransport for StoreClient {
    fn name(&self) -> &'static str {
        "store"
    }

    /// Write self-test: add a probe document and immediately delete it, so
    /// permission problems surface before a real write does.
    async fn health(&self) -> Result<()> {
        let mut fields = Fields::new();
        fields.insert("_probe".into(), Value::Bool(true));
        fields.insert("timestamp".into(), now_iso());
        let doc = self.store.add(collections::PURCHASES, fields).await?;
        self.store.delete(collections::PURCHASES, &doc.id).await
    }

    async fn list_products(&self) -> Result<Vec<Product>> {
        let docs = self.store.get_all(collections::PRODUCTS).await?;
        Ok(sorted(parse_all(docs, "product")))
    }

    async fn add_product(&self, draft: &ProductDraft) -> Result<Product> {
        draft.validate()?;
        let mut fields = to_fields(draft)?;
        if draft.image.is_none() {
            fields.insert("image".into(), Value::String(derive_image(&draft.name)));
        }
        fields.insert("createdAt".into(), now_iso());
        fields.insert("updatedAt".into(), now_iso());
        parse(self.store.add(collections::PRODUCTS, fields).await?)
    }

    async fn update_product(&self, id: &str, patch: &ProductPatch) -> Result<Product> {
        self.require(collections::PRODUCTS, id).await?;
        let mut fields = to_fields(patch)?;
        fields.insert("updatedAt".into(), now_iso());
        parse(self.store.update(collections::PRODUCTS, id, fields).await?)
    }

    async fn update_product_by_lookup(
        &self,
        name: &str,
        category: &Category,
        patch: &ProductPatch,
    ) -> Result<Product> {
        let matches = self
            .store
            .query_eq(
                collections::PRODUCTS,
                "name",
                &Value::String(name.to_string()),
            )
            .await?;
        let hit = matches
            .into_iter()
            .find(|doc| {
                doc.field("category").and_then(Value::as_str) == Some(category.name())
            })
            .ok_or_else(|| {
                PosError::NotFound(format!("product not found: {name} ({category})"))
            })?;

        // Name and category only identify the record here.
        let mut fields = to_fields(patch)?;
        fields.remove("name");
        fields.remove("category");
        fields.insert("updatedAt".into(), now_iso());
        parse(
            self.store
                .update(collections::PRODUCTS, &hit.id, fields)
                .await?,
        )
    }

    async fn delete_product(&self, id: &str) -> Result<()> {
        self.require(collections::PRODUCTS, id).await?;
        self.store.delete(collections::PRODUCTS, id).await
    }

    async fn add_purchase(&self, draft: &PurchaseDraft) -> Result<PurchaseRecord> {
        draft.validate()?;
        let mut fields = to_fields(draft)?;
        fields.insert("createdAt".into(), now_iso());
        parse(self.store.add(collections::PURCHASES, fields).await?)
    }

    async fn list_purchases(&self) -> Result<Vec<PurchaseRecord>> {
        let docs = self
            .store
            .order_by(collections::PURCHASES, "date", true)
            .await?;
        Ok(parse_all(docs, "purchase"))
    }

    async fn purchases_for_session(&self, session_id: &str) -> Result<Vec<PurchaseRecord>> {
        let docs = self
            .store
            .query_eq(
                collections::PURCHASES,
                "sessionId",
                &Value::String(session_id.to_string()),
            )
            .await?;
        let mut purchases: Vec<PurchaseRecord> = parse_all(docs, "purchase");
        purchases.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(purchases)
    }

    async fn save_session(&self, summary: &SessionSummary) -> Result<SessionSummary> {
        match &summary.id {
            Some(id) => {
                let mut fields = to_fields(summary)?;
                fields.remove("id");
                self.update_session(id, fields).await
            }
            None => {
                let mut fields = to_fields(summary)?;
                fields.insert("createdAt".into(), now_iso());
                fields.insert("updatedAt".into(), now_iso());
                parse(self.store.add(collections::SESSIONS, fields).await?)
            }
        }
    }
}
