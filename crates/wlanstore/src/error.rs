//! CLI error type with miette diagnostics and process exit codes.

use miette::Diagnostic;
use thiserror::Error;

use wlanstore_config::ConfigError;
use wlanstore_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const NOT_FOUND: i32 = 4;
    pub const PERMISSION: i32 = 5;
    pub const STORE: i32 = 6;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Lookup ───────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(wlanstore::not_found),
        help("Run: wlanstore {list_command} to see what exists.")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    // ── Input ────────────────────────────────────────────────────────
    #[error("Invalid {field}: {reason}")]
    #[diagnostic(code(wlanstore::validation))]
    Validation { field: String, reason: String },

    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(wlanstore::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── Repository ───────────────────────────────────────────────────
    #[error("Not permitted: {operation}")]
    #[diagnostic(code(wlanstore::permission_denied))]
    PermissionDenied { operation: String },

    #[error("Profile store error: {message}")]
    #[diagnostic(
        code(wlanstore::store),
        help("Check that the store file is readable JSON, or pass --store to use another one.")
    )]
    Store { message: String },

    #[error(transparent)]
    #[diagnostic(code(wlanstore::core))]
    Core(CoreError),

    // ── Config ───────────────────────────────────────────────────────
    #[error(transparent)]
    #[diagnostic(
        code(wlanstore::config),
        help("Run: wlanstore config path to find the file being read.")
    )]
    Config(#[from] ConfigError),

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to render output: {0}")]
    #[diagnostic(code(wlanstore::render))]
    Render(String),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Validation { .. } | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            Self::PermissionDenied { .. } => exit_code::PERMISSION,
            Self::Store { .. } => exit_code::STORE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::NetworkNotFound { id } => CliError::NotFound {
                resource_type: "network".into(),
                identifier: id.to_string(),
                list_command: "networks list".into(),
            },
            CoreError::InvalidInput { field, reason } => CliError::Validation { field, reason },
            CoreError::PermissionDenied { operation, .. } => {
                CliError::PermissionDenied { operation }
            }
            CoreError::Persistence { message } => CliError::Store { message },
            other => CliError::Core(other),
        }
    }
}
