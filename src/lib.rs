//! Sari-Pos
//!
//! Point-of-sale backend for a small sari-sari store.
//!
//! ## Features
//! - Local-first product catalog with overlay reconciliation
//! - Shopping cart kept in sync with the live catalog
//! - Checkout and session-earnings tracking
//! - Two-tier remote access (document store, then REST relay)
//! - File-backed local cache for offline operation

pub mod api;
pub mod catalog;
pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
pub mod remote;
pub mod store;

pub use error::{PosError, Result, TransportKind};
