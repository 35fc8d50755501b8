//! Checkout and session accounting. The sale is committed locally before any
//! remote write is attempted; remote failures flag the record for a later
//! retry instead of rolling the sale back.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::domain::cart::Cart;
use crate::domain::purchase::{is_local_id, PurchaseRecord};
use crate::domain::session::{SessionStatus, SessionSummary};
use crate::engine::notify::Notification;
use crate::error::Result;
use crate::remote::RemoteFacade;
use crate::store::cache::{keys, LocalCache};

/// Session summaries waiting for a remote retry beyond this count drop the
/// oldest entry.
pub const PENDING_SESSION_CAP: usize = 8;

pub struct CheckoutOutcome {
    pub record: PurchaseRecord,
    /// Present when the remote write failed and the sale stayed local-only.
    pub notification: Option<Notification>,
}

/// Owns the purchase history and running earnings of the current session.
/// The `purchase-history`, `session-earnings` and `pending-sessions` cache
/// keys belong to this type.
pub struct SessionEngine {
    cache: LocalCache,
    start_time: DateTime<Utc>,
    earnings: Decimal,
    /// Newest first.
    history: Vec<PurchaseRecord>,
}

impl SessionEngine {
    /// Restore the running session from the local cache; a fresh cache
    /// starts a session with zero earnings.
    pub fn open(cache: LocalCache) -> Self {
        let earnings = cache.get(keys::SESSION_EARNINGS).unwrap_or(Decimal::ZERO);
        let history = cache.get(keys::PURCHASE_HISTORY).unwrap_or_default();
        Self {
            cache,
            start_time: Utc::now(),
            earnings,
            history,
        }
    }

    pub fn earnings(&self) -> Decimal {
        self.earnings
    }

    pub fn history(&self) -> &[PurchaseRecord] {
        &self.history
    }

    pub fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    fn persist(&self) -> Result<()> {
        self.cache.put(keys::SESSION_EARNINGS, &self.earnings)?;
        self.cache.put(keys::PURCHASE_HISTORY, &self.history)
    }

    /// Convert the cart into a purchase record. The record is appended to
    /// history, earnings incremented and the cart cleared before the remote
    /// write is attempted; a failed write leaves the record flagged
    /// `unsynced` but never undoes the sale.
    pub async fn checkout(
        &mut self,
        cart: &mut Cart,
        remote: &RemoteFacade,
    ) -> Result<CheckoutOutcome> {
        let record = PurchaseRecord::from_cart(cart.lines(), None)?;
        let local_id = record.id.clone();

        self.history.insert(0, record.clone());
        self.earnings += record.total;
        self.persist()?;
        cart.clear();
        cart.save(&self.cache)?;

        let notification = match remote.add_purchase(&record.to_draft()).await {
            Ok(saved) => {
                if let Some(entry) = self.history.iter_mut().find(|p| p.id == local_id) {
                    entry.id = saved.id;
                    entry.unsynced = false;
                }
                self.persist()?;
                None
            }
            Err(err) => {
                tracing::warn!(%err, "purchase not persisted remotely, keeping local copy");
                if let Some(entry) = self.history.iter_mut().find(|p| p.id == local_id) {
                    entry.unsynced = true;
                }
                self.persist()?;
                Some(Notification::from_error(&err))
            }
        };

        let record = self
            .history
            .first()
            .cloned()
            .unwrap_or(record);
        Ok(CheckoutOutcome {
            record,
            notification,
        })
    }

    /// Close the current session. Counters are always zeroed and a new
    /// session opened; when the remote write fails the summary joins the
    /// pending retry queue instead of being lost.
    pub async fn end_session(
        &mut self,
        remote: &RemoteFacade,
    ) -> Result<(SessionSummary, Option<Notification>)> {
        let summary = SessionSummary {
            id: None,
            start_time: self.start_time,
            end_time: Utc::now(),
            earnings: self.earnings,
            purchase_count: self.history.len(),
            purchase_ids: self
                .history
                .iter()
                .filter(|p| !is_local_id(&p.id))
                .map(|p| p.id.clone())
                .collect(),
            status: SessionStatus::Ended,
        };

        let (saved, notification) = match remote.save_session(&summary).await {
            Ok(saved) => (saved, None),
            Err(err) => {
                tracing::warn!(%err, "session summary not persisted, queueing for retry");
                self.queue_pending(summary.clone())?;
                (summary, Some(Notification::from_error(&err)))
            }
        };

        self.earnings = Decimal::ZERO;
        self.history.clear();
        self.start_time = Utc::now();
        self.persist()?;
        Ok((saved, notification))
    }

    fn queue_pending(&self, summary: SessionSummary) -> Result<()> {
        let mut queue: Vec<SessionSummary> =
            self.cache.get(keys::PENDING_SESSIONS).unwrap_or_default();
        queue.push(summary);
        while queue.len() > PENDING_SESSION_CAP {
            queue.remove(0);
        }
        self.cache.put(keys::PENDING_SESSIONS, &queue)
    }

    /// Retry queued session summaries. Summaries that persist are removed
    /// from the queue; the rest stay for the next attempt. Returns the
    /// number flushed.
    pub async fn retry_pending_sessions(&self, remote: &RemoteFacade) -> Result<usize> {
        let queue: Vec<SessionSummary> =
            self.cache.get(keys::PENDING_SESSIONS).unwrap_or_default();
        if queue.is_empty() {
            return Ok(0);
        }
        let mut remaining = Vec::new();
        let mut flushed = 0;
        for summary in queue {
            match remote.save_session(&summary).await {
                Ok(_) => flushed += 1,
                Err(err) => {
                    tracing::warn!(%err, "pending session still not persisted");
                    remaining.push(summary);
                }
            }
        }
        self.cache.put(keys::PENDING_SESSIONS, &remaining)?;
        Ok(flushed)
    }

    /// Retry purchases that never reached the remote store. Successful
    /// writes patch the store-assigned id into history.
    pub async fn retry_unsynced(&mut self, remote: &RemoteFacade) -> Result<usize> {
        let pending: Vec<String> = self
            .history
            .iter()
            .filter(|p| p.unsynced)
            .map(|p| p.id.clone())
            .collect();
        let mut flushed = 0;
        for local_id in pending {
            let Some(record) = self.history.iter().find(|p| p.id == local_id).cloned() else {
                continue;
            };
            match remote.add_purchase(&record.to_draft()).await {
                Ok(saved) => {
                    if let Some(entry) = self.history.iter_mut().find(|p| p.id == local_id) {
                        entry.id = saved.id;
                        entry.unsynced = false;
                    }
                    flushed += 1;
                }
                Err(err) => {
                    tracing::warn!(%err, "unsynced purchase still not persisted");
                }
            }
        }
        if flushed > 0 {
            self.persist()?;
        }
        Ok(flushed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::domain::product::Product;
    use crate::remote::testing::StubTransport;
    use std::sync::Arc;
    use std::time::Duration;

    fn fast_config() -> Config {
        Config {
            primary_timeout: Duration::from_millis(200),
            relay_timeout: Duration::from_millis(200),
            health_timeout: Duration::from_millis(100),
            ..Config::default()
        }
    }

    fn online_facade() -> (Arc<StubTransport>, RemoteFacade) {
        let primary = Arc::new(StubTransport::named("store"));
        let facade = RemoteFacade::new(
            primary.clone(),
            Arc::new(StubTransport::named("relay")),
            &fast_config(),
        );
        (primary, facade)
    }

    fn offline_facade() -> RemoteFacade {
        RemoteFacade::new(
            Arc::new(StubTransport::named("store").failing()),
            Arc::new(StubTransport::named("relay").failing().unhealthy()),
            &fast_config(),
        )
    }

    fn cart_with(name: &str, price: i64, quantity: i64) -> Cart {
        let mut cart = Cart::new();
        let p = Product::new(1u32, name, "Snacks", Decimal::from(price));
        cart.add(&p);
        cart.update_quantity(&p.id, quantity);
        cart
    }

    #[tokio::test]
    async fn checkout_rejects_empty_cart() {
        let mut engine = SessionEngine::open(LocalCache::in_memory());
        let (_, facade) = online_facade();
        let mut cart = Cart::new();
        assert!(engine.checkout(&mut cart, &facade).await.is_err());
        assert!(engine.history().is_empty());
        assert_eq!(engine.earnings(), Decimal::ZERO);
    }

    #[tokio::test]
    async fn checkout_commits_and_patches_the_store_id() {
        let mut engine = SessionEngine::open(LocalCache::in_memory());
        let (primary, facade) = online_facade();
        let mut cart = cart_with("Chippy", 10, 2);

        let outcome = engine.checkout(&mut cart, &facade).await.unwrap();
        assert!(outcome.notification.is_none());
        assert!(outcome.record.is_confirmed());
        assert_eq!(outcome.record.total, Decimal::from(20));
        assert!(cart.is_empty());
        assert_eq!(engine.earnings(), Decimal::from(20));
        assert_eq!(engine.history().len(), 1);
        assert!(!engine.history()[0].unsynced);
        assert_eq!(primary.purchases.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn offline_checkout_keeps_the_sale_flagged_unsynced() {
        let mut engine = SessionEngine::open(LocalCache::in_memory());
        let facade = offline_facade();
        let mut cart = cart_with("Chippy", 10, 2);

        let outcome = engine.checkout(&mut cart, &facade).await.unwrap();
        let notification = outcome.notification.expect("sync failure notification");
        assert_eq!(notification.display_for, crate::engine::notify::SYNC_DISPLAY);
        assert!(cart.is_empty());
        assert_eq!(engine.earnings(), Decimal::from(20));
        assert!(engine.history()[0].unsynced);
        assert!(is_local_id(&engine.history()[0].id));
    }

    #[tokio::test]
    async fn session_survives_engine_reopen() {
        let cache = LocalCache::in_memory();
        let facade = offline_facade();
        let mut engine = SessionEngine::open(cache.clone());
        let mut cart = cart_with("Chippy", 10, 1);
        engine.checkout(&mut cart, &facade).await.unwrap();

        let reopened = SessionEngine::open(cache);
        assert_eq!(reopened.earnings(), Decimal::from(10));
        assert_eq!(reopened.history().len(), 1);
    }

    #[tokio::test]
    async fn end_session_zeroes_counters_even_when_persistence_fails() {
        let mut engine = SessionEngine::open(LocalCache::in_memory());
        let facade = offline_facade();
        let mut cart = cart_with("Chippy", 10, 3);
        engine.checkout(&mut cart, &facade).await.unwrap();

        let (summary, notification) = engine.end_session(&facade).await.unwrap();
        assert!(notification.is_some());
        assert_eq!(summary.earnings, Decimal::from(30));
        assert_eq!(summary.purchase_count, 1);
        // The unsynced purchase only had a local placeholder id.
        assert!(summary.purchase_ids.is_empty());
        assert_eq!(engine.earnings(), Decimal::ZERO);
        assert!(engine.history().is_empty());
    }

    #[tokio::test]
    async fn session_reset_then_checkout_starts_earnings_fresh() {
        let mut engine = SessionEngine::open(LocalCache::in_memory());
        let (_, facade) = online_facade();
        let mut cart = cart_with("Chippy", 10, 2);
        engine.checkout(&mut cart, &facade).await.unwrap();
        engine.end_session(&facade).await.unwrap();

        let mut cart = cart_with("Nova", 12, 1);
        engine.checkout(&mut cart, &facade).await.unwrap();
        assert_eq!(engine.earnings(), Decimal::from(12));
        assert_eq!(engine.history().len(), 1);
    }

    #[tokio::test]
    async fn ended_session_records_confirmed_purchase_ids() {
        let mut engine = SessionEngine::open(LocalCache::in_memory());
        let (primary, facade) = online_facade();
        let mut cart = cart_with("Chippy", 10, 1);
        engine.checkout(&mut cart, &facade).await.unwrap();

        let (summary, notification) = engine.end_session(&facade).await.unwrap();
        assert!(notification.is_none());
        assert!(summary.id.is_some());
        assert_eq!(summary.purchase_ids.len(), 1);
        assert!(!is_local_id(&summary.purchase_ids[0]));
        assert_eq!(primary.sessions.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn pending_queue_is_bounded_and_drops_oldest() {
        let cache = LocalCache::in_memory();
        let mut engine = SessionEngine::open(cache.clone());
        let facade = offline_facade();

        for i in 0..(PENDING_SESSION_CAP + 2) {
            let mut cart = cart_with("Chippy", (i as i64) + 1, 1);
            engine.checkout(&mut cart, &facade).await.unwrap();
            engine.end_session(&facade).await.unwrap();
        }
        let queue: Vec<SessionSummary> = cache.get(keys::PENDING_SESSIONS).unwrap();
        assert_eq!(queue.len(), PENDING_SESSION_CAP);
        // The two oldest summaries (earnings 1 and 2) fell off.
        assert_eq!(queue[0].earnings, Decimal::from(3));
    }

    #[tokio::test]
    async fn retry_flushes_pending_sessions_once_online() {
        let cache = LocalCache::in_memory();
        let mut engine = SessionEngine::open(cache.clone());
        let offline = offline_facade();
        let mut cart = cart_with("Chippy", 10, 1);
        engine.checkout(&mut cart, &offline).await.unwrap();
        engine.end_session(&offline).await.unwrap();

        let (primary, online) = online_facade();
        let flushed = engine.retry_pending_sessions(&online).await.unwrap();
        assert_eq!(flushed, 1);
        assert_eq!(primary.sessions.lock().unwrap().len(), 1);
        let queue: Vec<SessionSummary> = cache.get(keys::PENDING_SESSIONS).unwrap();
        assert!(queue.is_empty());
    }

    #[tokio::test]
    async fn retry_unsynced_patches_ids() {
        let mut engine = SessionEngine::open(LocalCache::in_memory());
        let offline = offline_facade();
        let mut cart = cart_with("Chippy", 10, 1);
        engine.checkout(&mut cart, &offline).await.unwrap();
        assert!(engine.history()[0].unsynced);

        let (primary, online) = online_facade();
        let flushed = engine.retry_unsynced(&online).await.unwrap();
        assert_eq!(flushed, 1);
        assert!(!engine.history()[0].unsynced);
        assert!(engine.history()[0].is_confirmed());
        assert_eq!(primary.purchases.lock().unwrap().len(), 1);
    }
}
