// ── Core error types ──
//
// Every repository operation reports failure through `CoreError`.
// Nothing in the core panics on ordinary misuse: unknown ids, missing
// permissions and malformed drafts all come back as values.

use thiserror::Error;

use crate::model::{NetworkId, Uid};

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Rejected input ───────────────────────────────────────────────
    #[error("Network not found: {id}")]
    NetworkNotFound { id: NetworkId },

    #[error("Invalid {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Profile store has not been loaded yet")]
    StoreNotLoaded,

    // ── Authorization ────────────────────────────────────────────────
    #[error("uid {uid} is not permitted to {operation}")]
    PermissionDenied { uid: Uid, operation: String },

    // ── Dependent subsystems ─────────────────────────────────────────
    #[error("Key store rejected credentials for {config_key}")]
    KeyStoreUpdateFailed { config_key: String },

    #[error("Persistence gateway failed: {message}")]
    Persistence { message: String },

    // ── Service transport ────────────────────────────────────────────
    #[error("Profile service has stopped")]
    ServiceStopped,

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    pub(crate) fn invalid(field: &str, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn denied(uid: Uid, operation: &str) -> Self {
        Self::PermissionDenied {
            uid,
            operation: operation.into(),
        }
    }

    /// Whether callers should treat this as "no effect" rather than a hard
    /// failure. Authorization and lookup failures are indistinguishable at
    /// the API boundary.
    pub fn is_no_effect(&self) -> bool {
        matches!(
            self,
            Self::NetworkNotFound { .. } | Self::PermissionDenied { .. }
        )
    }
}
