//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and a stable exit code.

use miette::Diagnostic;
use thiserror::Error;

use wayfarer_config::ConfigError;
use wayfarer_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const PERMISSION: i32 = 5;
    pub const CONFLICT: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach the trip backend at {url}")]
    #[diagnostic(
        code(wayfarer::connection_failed),
        help(
            "Check that the backend is running and reachable.\n\
             Reason: {reason}"
        )
    )]
    ConnectionFailed { url: String, reason: String },

    #[error("Request to {url} timed out")]
    #[diagnostic(
        code(wayfarer::timeout),
        help("Increase the timeout with --timeout or check backend responsiveness.")
    )]
    Timeout { url: String },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Not signed in to profile '{profile}'")]
    #[diagnostic(
        code(wayfarer::not_signed_in),
        help(
            "Store a token with: wayfarer config set-token\n\
             Or set the WAYFARER_TOKEN environment variable."
        )
    )]
    NotSignedIn { profile: String },

    #[error("Authentication rejected: {detail}")]
    #[diagnostic(
        code(wayfarer::auth_failed),
        help("The token may have expired. Store a fresh one with: wayfarer config set-token")
    )]
    AuthFailed { detail: String },

    #[error("Permission denied: {detail}")]
    #[diagnostic(code(wayfarer::forbidden))]
    Forbidden { detail: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("Not found: {detail}")]
    #[diagnostic(code(wayfarer::not_found))]
    NotFound { detail: String },

    #[error("Conflict: {detail}")]
    #[diagnostic(
        code(wayfarer::conflict),
        help("The item may already be held or its quote may have expired. Refresh the trip and retry.")
    )]
    Conflict { detail: String },

    #[error("Hold could not be placed (HTTP {status}): {detail}")]
    #[diagnostic(
        code(wayfarer::reservation_failed),
        help(
            "Retrying with the same --idempotency-key cannot create a duplicate hold.\n\
             Fetch fresh quotes with: wayfarer trips alternatives"
        )
    )]
    ReservationFailed { status: u16, detail: String },

    #[error("No hold placed: reservation {reservation_id} is already {state}")]
    #[diagnostic(
        code(wayfarer::hold_not_active),
        help(
            "The backend answered with an earlier reservation for the same items.\n\
             Pass a new --idempotency-key to place a fresh hold."
        )
    )]
    HoldNotActive {
        reservation_id: String,
        state: String,
    },

    // ── API ──────────────────────────────────────────────────────────
    #[error("Request rejected (HTTP {status}): {detail}")]
    #[diagnostic(code(wayfarer::api_error))]
    ApiError { status: u16, detail: String },

    #[error("Server did not confirm {action}: {message}")]
    #[diagnostic(
        code(wayfarer::not_acknowledged),
        help("Nothing was changed locally. Check the current state and retry.")
    )]
    NotAcknowledged { action: String, message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(wayfarer::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(wayfarer::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: wayfarer config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No backend configured")]
    #[diagnostic(
        code(wayfarer::no_config),
        help(
            "Create a profile with: wayfarer config init\n\
             Or pass --api-url. Expected config at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(wayfarer::config))]
    Config(ConfigError),

    // ── Interactive ──────────────────────────────────────────────────
    #[error("Operation '{action}' requires confirmation")]
    #[diagnostic(
        code(wayfarer::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── Internal ─────────────────────────────────────────────────────
    #[error("{0}")]
    #[diagnostic(code(wayfarer::internal))]
    Internal(String),

    // ── IO / Serialization ────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON payload: {0}")]
    #[diagnostic(code(wayfarer::json), help("Check the JSON file contents and try again."))]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::NotSignedIn { .. } | Self::AuthFailed { .. } => exit_code::AUTH,
            Self::Forbidden { .. } => exit_code::PERMISSION,
            Self::NotFound { .. } | Self::ProfileNotFound { .. } => exit_code::NOT_FOUND,
            Self::Conflict { .. } | Self::HoldNotActive { .. } => exit_code::CONFLICT,
            Self::ReservationFailed { status, .. } if *status == 409 => exit_code::CONFLICT,
            Self::Validation { .. } | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::NotAuthenticated => Self::NotSignedIn {
                profile: "current".into(),
            },
            CoreError::AuthenticationFailed { detail } => Self::AuthFailed { detail },
            CoreError::Forbidden { detail } => Self::Forbidden { detail },
            CoreError::Validation { field, reason } => Self::Validation { field, reason },
            CoreError::NotFound { detail } => Self::NotFound { detail },
            CoreError::Conflict { detail } => Self::Conflict { detail },
            CoreError::ReservationFailed { status, detail } => {
                Self::ReservationFailed { status, detail }
            }
            CoreError::HoldNotActive {
                reservation_id,
                state,
            } => Self::HoldNotActive {
                reservation_id,
                state,
            },
            CoreError::Rejected { status, detail } => Self::ApiError { status, detail },
            CoreError::Network {
                url,
                timed_out: true,
                ..
            } => Self::Timeout { url },
            CoreError::Network { url, reason, .. } => Self::ConnectionFailed { url, reason },
            CoreError::Config { message } => Self::Validation {
                field: "config".into(),
                reason: message,
            },
            CoreError::Internal(message) => Self::Internal(message),
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            ConfigError::Io(e) => Self::Io(e),
            other => Self::Config(other),
        }
    }
}
