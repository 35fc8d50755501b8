//! Checkout and session accounting.

pub mod checkout;
pub mod notify;

pub use checkout::{CheckoutOutcome, SessionEngine};
pub use notify::Notification;
