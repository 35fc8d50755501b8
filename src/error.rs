//! Error taxonomy shared across the catalog, cart, checkout and transport
//! layers.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PosError {
    /// Bad or missing input, rejected before any write happens.
    #[error("validation failed: {0}")]
    Validation(String),

    /// An id or (name, category) lookup matched nothing.
    #[error("not found: {0}")]
    NotFound(String),

    /// Network, timeout or permission failure from a remote backend.
    #[error("transport failure via {transport}: {kind}")]
    Transport {
        transport: &'static str,
        kind: TransportKind,
    },

    /// A product with the same (name, category) already exists.
    #[error("duplicate product: {0}")]
    Conflict(String),

    /// Local persistence failure (cache file, in-process store).
    #[error("storage error: {0}")]
    Storage(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportKind {
    Timeout,
    PermissionDenied,
    Unavailable,
    Status(u16),
    Network(String),
}

impl std::fmt::Display for TransportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Timeout => write!(f, "timed out"),
            Self::PermissionDenied => write!(f, "permission denied"),
            Self::Unavailable => write!(f, "backend unavailable"),
            Self::Status(code) => write!(f, "unexpected status {code}"),
            Self::Network(msg) => write!(f, "network error: {msg}"),
        }
    }
}

impl PosError {
    pub fn transport(transport: &'static str, kind: TransportKind) -> Self {
        Self::Transport { transport, kind }
    }

    pub fn timeout(transport: &'static str) -> Self {
        Self::Transport {
            transport,
            kind: TransportKind::Timeout,
        }
    }

    /// Whether this error should trigger the fallback transport instead of
    /// being surfaced to the caller as-is.
    pub fn is_retriable(&self) -> bool {
        matches!(self, Self::Transport { .. } | Self::Storage(_))
    }

    /// Sync/permission/timeout-class failures get a longer notification than
    /// plain errors.
    pub fn is_sync_class(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }
}

impl From<std::io::Error> for PosError {
    fn from(err: std::io::Error) -> Self {
        Self::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for PosError {
    fn from(err: serde_json::Error) -> Self {
        Self::Storage(err.to_string())
    }
}

impl From<reqwest::Error> for PosError {
    fn from(err: reqwest::Error) -> Self {
        let kind = if err.is_timeout() {
            TransportKind::Timeout
        } else if let Some(status) = err.status() {
            TransportKind::Status(status.as_u16())
        } else {
            TransportKind::Network(err.to_string())
        };
        Self::Transport {
            transport: "relay",
            kind,
        }
    }
}

pub type Result<T> = std::result::Result<T, PosError>;
