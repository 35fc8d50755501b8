//! Two-tier remote access: try the document store, fall back to the REST
//! relay. Every call carries a bounded timeout, and relay reachability is
//! probed once and cached for a while instead of being re-checked per call.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::config::Config;
use crate::domain::category::Category;
use crate::domain::product::{Product, ProductDraft, ProductPatch};
use crate::domain::purchase::{PurchaseDraft, PurchaseRecord};
use crate::domain::session::SessionSummary;
use crate::error::{PosError, Result};
use crate::remote::transport::RemoteTransport;

#[derive(Clone, Copy)]
struct Probe {
    reachable: bool,
    at: Instant,
}

pub struct RemoteFacade {
    primary: Arc<dyn RemoteTransport>,
    fallback: Arc<dyn RemoteTransport>,
    primary_timeout: Duration,
    fallback_timeout: Duration,
    health_timeout: Duration,
    liveness_ttl: Duration,
    liveness: Mutex<Option<Probe>>,
}

impl RemoteFacade {
    pub fn new(
        primary: Arc<dyn RemoteTransport>,
        fallback: Arc<dyn RemoteTransport>,
        config: &Config,
    ) -> Self {
        Self {
            primary,
            fallback,
            primary_timeout: config.primary_timeout,
            fallback_timeout: config.relay_timeout,
            health_timeout: config.health_timeout,
            liveness_ttl: config.liveness_ttl,
            liveness: Mutex::new(None),
        }
    }

    /// Cached relay liveness. The probe result is reused until its TTL
    /// expires, so a dead relay costs one short probe per window instead of
    /// one per failed call.
    async fn fallback_reachable(&self) -> bool {
        let mut guard = self.liveness.lock().await;
        if let Some(probe) = *guard {
            if probe.at.elapsed() < self.liveness_ttl {
                return probe.reachable;
            }
        }
        let reachable =
            match tokio::time::timeout(self.health_timeout, self.fallback.health()).await {
                Ok(Ok(())) => true,
                Ok(Err(err)) => {
                    tracing::warn!(%err, "fallback transport health probe failed");
                    false
                }
                Err(_) => {
                    tracing::warn!("fallback transport health probe timed out");
                    false
                }
            };
        *guard = Some(Probe {
            reachable,
            at: Instant::now(),
        });
        reachable
    }

    /// Run `primary`, falling back to `fallback` on transport-class
    /// failures. Validation, not-found and conflict answers are real
    /// answers and propagate as-is.
    async fn call<T, P, F, PFut, FFut>(&self, op: &'static str, primary: P, fallback: F) -> Result<T>
    where
        P: FnOnce() -> PFut,
        F: FnOnce() -> FFut,
        PFut: Future<Output = Result<T>>,
        FFut: Future<Output = Result<T>>,
    {
        let primary_err = match tokio::time::timeout(self.primary_timeout, primary()).await {
            Ok(Ok(value)) => return Ok(value),
            Ok(Err(err)) if !err.is_retriable() => return Err(err),
            Ok(Err(err)) => err,
            Err(_) => PosError::timeout(self.primary.name()),
        };
        tracing::warn!(op, %primary_err, "primary transport failed, considering fallback");

        if !self.fallback_reachable().await {
            return Err(primary_err);
        }
        match tokio::time::timeout(self.fallback_timeout, fallback()).await {
            Ok(result) => result,
            Err(_) => Err(PosError::timeout(self.fallback.name())),
        }
    }

    pub async fn list_products(&self) -> Result<Vec<Product>> {
        self.call(
            "list_products",
            || self.primary.list_products(),
            || self.fallback.list_products(),
        )
        .await
    }

    pub async fn add_product(&self, draft: &ProductDraft) -> Result<Product> {
        self.call(
            "add_product",
            || self.primary.add_product(draft),
            || self.fallback.add_product(draft),
        )
        .await
    }

    pub async fn update_product(&self, id: &str, patch: &ProductPatch) -> Result<Product> {
        self.call(
            "update_product",
            || self.primary.update_product(id, patch),
            || self.fallback.update_product(id, patch),
        )
        .await
    }

    pub async fn update_product_by_lookup(
        &self,
        name: &str,
        category: &Category,
        patch: &ProductPatch,
    ) -> Result<Product> {
        self.call(
            "update_product_by_lookup",
            || self.primary.update_product_by_lookup(name, category, patch),
            || self.fallback.update_product_by_lookup(name, category, patch),
        )
        .await
    }

    pub async fn delete_product(&self, id: &str) -> Result<()> {
        self.call(
            "delete_product",
            || self.primary.delete_product(id),
            || self.fallback.delete_product(id),
        )
        .await
    }

    pub async fn add_purchase(&self, draft: &PurchaseDraft) -> Result<PurchaseRecord> {
        self.call(
            "add_purchase",
            || self.primary.add_purchase(draft),
            || self.fallback.add_purchase(draft),
        )
        .await
    }

    pub async fn list_purchases(&self) -> Result<Vec<PurchaseRecord>> {
        self.call(
            "list_purchases",
            || self.primary.list_purchases(),
            || self.fallback.list_purchases(),
        )
        .await
    }

    pub async fn purchases_for_session(&self, session_id: &str) -> Result<Vec<PurchaseRecord>> {
        self.call(
            "purchases_for_session",
            || self.primary.purchases_for_session(session_id),
            || self.fallback.purchases_for_session(session_id),
        )
        .await
    }

    pub async fn save_session(&self, summary: &SessionSummary) -> Result<SessionSummary> {
        self.call(
            "save_session",
            || self.primary.save_session(summary),
            || self.fallback.save_session(summary),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::testing::StubTransport;
    use rust_decimal::Decimal;

    fn config() -> Config {
        Config {
            primary_timeout: Duration::from_millis(200),
            relay_timeout: Duration::from_millis(200),
            health_timeout: Duration::from_millis(100),
            liveness_ttl: Duration::from_secs(60),
            ..Config::default()
        }
    }

    fn product() -> Product {
        Product::new("r1", "Chippy", "Snacks", Decimal::from(10))
    }

    #[tokio::test]
    async fn primary_success_never_touches_fallback() {
        let primary = Arc::new(StubTransport::named("store").with_products(vec![product()]));
        let fallback = Arc::new(StubTransport::named("relay"));
        let facade = RemoteFacade::new(primary, fallback.clone(), &config());

        let products = facade.list_products().await.unwrap();
        assert_eq!(products.len(), 1);
        assert_eq!(fallback.calls(), 0);
    }

    #[tokio::test]
    async fn transport_failure_falls_back_when_relay_is_alive() {
        let primary = Arc::new(StubTransport::named("store").failing());
        let fallback = Arc::new(StubTransport::named("relay").with_products(vec![product()]));
        let facade = RemoteFacade::new(primary, fallback, &config());

        let products = facade.list_products().await.unwrap();
        assert_eq!(products.len(), 1);
    }

    #[tokio::test]
    async fn unreachable_fallback_returns_the_primary_error() {
        let primary = Arc::new(StubTransport::named("store").failing());
        let fallback = Arc::new(StubTransport::named("relay").unhealthy());
        let facade = RemoteFacade::new(primary, fallback.clone(), &config());

        let err = facade.list_products().await.unwrap_err();
        assert!(matches!(err, PosError::Transport { transport: "store", .. }));
        // Only the health probe reached the fallback.
        assert_eq!(fallback.calls(), 0);
    }

    #[tokio::test]
    async fn liveness_probe_is_cached_per_process_run() {
        let primary = Arc::new(StubTransport::named("store").failing());
        let fallback = Arc::new(StubTransport::named("relay").unhealthy());
        let facade = RemoteFacade::new(primary, fallback.clone(), &config());

        let _ = facade.list_products().await;
        let _ = facade.list_purchases().await;
        assert_eq!(fallback.health_calls(), 1);
    }

    #[tokio::test]
    async fn not_found_does_not_trigger_fallback() {
        let primary = Arc::new(StubTransport::named("store").missing_products());
        let fallback = Arc::new(StubTransport::named("relay").with_products(vec![product()]));
        let facade = RemoteFacade::new(primary, fallback.clone(), &config());

        let err = facade
            .update_product_by_lookup(
                "Yakult",
                &Category::Drinks,
                &ProductPatch::price(Decimal::from(15)),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, PosError::NotFound(_)));
        assert_eq!(fallback.calls(), 0);
    }

    #[tokio::test]
    async fn hung_primary_times_out_and_falls_back() {
        let primary = Arc::new(StubTransport::named("store").hanging());
        let fallback = Arc::new(StubTransport::named("relay").with_products(vec![product()]));
        let facade = RemoteFacade::new(primary, fallback, &config());

        let products = facade.list_products().await.unwrap();
        assert_eq!(products.len(), 1);
    }
}
