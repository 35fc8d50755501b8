//! File-backed local cache: a small key/value store that survives process
//! restarts. Holds the catalog overlays, cart snapshot and session counters
//! so the app works fully offline.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::Result;

/// Cache keys. Each key is logically owned by exactly one component.
pub mod keys {
    /// Reconciler: legacy price-only override map (baseline id -> price).
    pub const PRICE_OVERRIDES: &str = "price-overrides";
    /// Reconciler: user-added products.
    pub const CUSTOM_PRODUCTS: &str = "custom-products";
    /// Reconciler: permanently deleted product ids.
    pub const DELETED_IDS: &str = "deleted-ids";
    /// Reconciler: baseline id -> field overrides.
    pub const EDITED_PRODUCTS: &str = "edited-products";
    /// Checkout engine: purchases of the current session, newest first.
    pub const PURCHASE_HISTORY: &str = "purchase-history";
    /// Checkout engine: running earnings counter.
    pub const SESSION_EARNINGS: &str = "session-earnings";
    /// Cart manager: cart line snapshot.
    pub const CART: &str = "cart";
    /// Checkout engine: session summaries awaiting a remote retry.
    pub const PENDING_SESSIONS: &str = "pending-sessions";
}

struct Inner {
    path: Option<PathBuf>,
    entries: BTreeMap<String, Value>,
}

/// Cheap-to-clone handle; every `put`/`remove` rewrites the snapshot file
/// atomically (write-temp-then-rename).
#[derive(Clone)]
pub struct LocalCache {
    inner: Arc<Mutex<Inner>>,
}

impl LocalCache {
    /// Open the cache at `path`, loading any existing snapshot. A corrupt
    /// snapshot is logged and treated as empty rather than failing startup.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let entries = match std::fs::read(&path) {
            Ok(bytes) => match serde_json::from_slice(&bytes) {
                Ok(entries) => entries,
                Err(err) => {
                    tracing::warn!(path = %path.display(), %err, "discarding corrupt cache snapshot");
                    BTreeMap::new()
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => return Err(err.into()),
        };
        Ok(Self {
            inner: Arc::new(Mutex::new(Inner {
                path: Some(path),
                entries,
            })),
        })
    }

    /// A cache that never touches disk; used in tests and by the relay
    /// binary, which has no overlays of its own.
    pub fn in_memory() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                path: None,
                entries: BTreeMap::new(),
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Read a typed value. A missing or undecodable entry yields `None`; a
    /// bad entry never takes the app down.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let guard = self.lock();
        let value = guard.entries.get(key)?.clone();
        drop(guard);
        match serde_json::from_value(value) {
            Ok(decoded) => Some(decoded),
            Err(err) => {
                tracing::warn!(key, %err, "ignoring undecodable cache entry");
                None
            }
        }
    }

    pub fn put<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let mut guard = self.lock();
        guard
            .entries
            .insert(key.to_string(), serde_json::to_value(value)?);
        flush(&guard)
    }

    pub fn remove(&self, key: &str) -> Result<()> {
        let mut guard = self.lock();
        guard.entries.remove(key);
        flush(&guard)
    }
}

fn flush(inner: &Inner) -> Result<()> {
    let Some(path) = &inner.path else {
        return Ok(());
    };
    let bytes = serde_json::to_vec_pretty(&inner.entries)?;
    let tmp = path.with_extension("tmp");
    std::fs::write(&tmp, bytes)?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}
