//! Non-blocking user notifications. Sync-class failures (timeouts,
//! permissions, unreachable backends) stay on screen longer than ordinary
//! errors so the user notices the store is running offline.

use std::time::Duration;

use crate::error::PosError;

pub const SYNC_DISPLAY: Duration = Duration::from_secs(15);
pub const DEFAULT_DISPLAY: Duration = Duration::from_secs(5);

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub display_for: Duration,
}

impl Notification {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            display_for: DEFAULT_DISPLAY,
        }
    }

    pub fn from_error(err: &PosError) -> Self {
        Self {
            message: err.to_string(),
            display_for: if err.is_sync_class() {
                SYNC_DISPLAY
            } else {
                DEFAULT_DISPLAY
            },
        }
    }
}
