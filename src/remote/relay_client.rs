//! Transport B: the REST relay, spoken over HTTP.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::time::Duration;

use crate::domain::category::Category;
use crate::domain::product::{Product, ProductDraft, ProductPatch};
use crate::domain::purchase::{PurchaseDraft, PurchaseRecord};
use crate::domain::session::SessionSummary;
use crate::error::{PosError, Result};
use crate::remote::transport::RemoteTransport;

#[derive(Clone)]
pub struct RelayClient {
    http: reqwest::Client,
    base: String,
}

impl RelayClient {
    /// `base` includes the `/api` prefix, e.g. `http://localhost:3000/api`.
    pub fn new(base: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(PosError::from)?;
        Ok(Self {
            http,
            base: base.into().trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base)
    }

    /// Map non-2xx responses onto the error taxonomy, pulling the relay's
    /// `{error, details?}` body into the message when present.
    async fn checked(&self, response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body: Value = response.json().await.unwrap_or(Value::Null);
        let message = body
            .get("error")
            .and_then(Value::as_str)
            .unwrap_or("relay request failed")
            .to_string();
        Err(match status.as_u16() {
            400 => PosError::Validation(message),
            404 => PosError::NotFound(message),
            409 => PosError::Conflict(message),
            code => PosError::transport("relay", crate::TransportKind::Status(code)),
        })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self.http.get(self.url(path)).send().await?;
        Ok(self.checked(response).await?.json().await?)
    }
}

#[async_trait]
impl RemoteTransport for RelayClient {
    fn name(&self) -> &'static str {
        "relay"
    }

    async fn health(&self) -> Result<()> {
        let body: Value = self.get_json("/health").await?;
        match body.get("status").and_then(Value::as_str) {
            Some("ok") => Ok(()),
            _ => Err(PosError::transport(
                "relay",
                crate::TransportKind::Unavailable,
            )),
        }
    }

    async fn list_products(&self) -> Result<Vec<Product>> {
        self.get_json("/products").await
    }

    async fn add_product(&self, draft: &ProductDraft) -> Result<Product> {
        let response = self
            .http
            .post(self.url("/products"))
            .json(draft)
            .send()
            .await?;
        Ok(self.checked(response).await?.json().await?)
    }

    async fn update_product(&self, id: &str, patch: &ProductPatch) -> Result<Product> {
        let response = self
            .http
            .put(self.url(&format!("/products/{id}")))
            .json(patch)
            .send()
            .await?;
        Ok(self.checked(response).await?.json().await?)
    }

    async fn update_product_by_lookup(
        &self,
        name: &str,
        category: &Category,
        patch: &ProductPatch,
    ) -> Result<Product> {
        // The name and category fields address the record; the rest of the
        // body is the update.
        let mut body = serde_json::to_value(patch)?;
        if let Value::Object(map) = &mut body {
            map.insert("name".into(), json!(name));
            map.insert("category".into(), json!(category.name()));
        }
        let response = self
            .http
            .put(self.url("/products/find/update"))
            .json(&body)
            .send()
            .await?;
        Ok(self.checked(response).await?.json().await?)
    }

    async fn delete_product(&self, id: &str) -> Result<()> {
        let response = self
            .http
            .delete(self.url(&format!("/products/{id}")))
            .send()
            .await?;
        self.checked(response).await?;
        Ok(())
    }

    async fn add_purchase(&self, draft: &PurchaseDraft) -> Result<PurchaseRecord> {
        let response = self
            .http
            .post(self.url("/purchases"))
            .json(draft)
            .send()
            .await?;
        Ok(self.checked(response).await?.json().await?)
    }

    async fn list_purchases(&self) -> Result<Vec<PurchaseRecord>> {
        self.get_json("/purchases").await
    }

    async fn purchases_for_session(&self, session_id: &str) -> Result<Vec<PurchaseRecord>> {
        self.get_json(&format!("/purchases/session/{session_id}"))
            .await
    }

    async fn save_session(&self, summary: &SessionSummary) -> Result<SessionSummary> {
        let response = self
            .http
            .post(self.url("/sessions"))
            .json(summary)
            .send()
            .await?;
        Ok(self.checked(response).await?.json().await?)
    }
}
