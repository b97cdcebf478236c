// ── Core error types ──
//
// User-facing errors from wayfarer-core. The `From<wayfarer_api::Error>`
// impl translates transport-layer errors into domain variants; HTTP status
// is kept only where callers act on it (conflicts, reservation failures).

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Session ──────────────────────────────────────────────────────
    #[error("Not signed in")]
    NotAuthenticated,

    #[error("Authentication rejected: {detail}")]
    AuthenticationFailed { detail: String },

    #[error("Permission denied: {detail}")]
    Forbidden { detail: String },

    // ── Request ──────────────────────────────────────────────────────
    #[error("Invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("Not found: {detail}")]
    NotFound { detail: String },

    #[error("Conflict: {detail}")]
    Conflict { detail: String },

    /// A hold could not be placed. Status is the server's, unchanged.
    #[error("Reservation failed (HTTP {status}): {detail}")]
    ReservationFailed { status: u16, detail: String },

    /// The server answered a reserve with a reservation that no longer
    /// holds inventory, e.g. an idempotent replay of a released hold.
    #[error("Reservation {reservation_id} is {state}, not an active hold")]
    HoldNotActive {
        reservation_id: String,
        state: String,
    },

    #[error("Rejected by server (HTTP {status}): {detail}")]
    Rejected { status: u16, detail: String },

    // ── Transport ────────────────────────────────────────────────────
    #[error("Cannot reach {url}: {reason}")]
    Network {
        url: String,
        reason: String,
        timed_out: bool,
    },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// HTTP status behind this error, when the server answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::AuthenticationFailed { .. } => Some(401),
            Self::Forbidden { .. } => Some(403),
            Self::NotFound { .. } => Some(404),
            Self::Conflict { .. } => Some(409),
            Self::ReservationFailed { status, .. } | Self::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_conflict(&self) -> bool {
        self.status() == Some(409)
    }

    /// Translate an error from `reserve_items`: every server rejection
    /// becomes `ReservationFailed` with its status preserved.
    pub fn from_reservation(err: wayfarer_api::Error) -> Self {
        match err {
            wayfarer_api::Error::Request { status, detail } => {
                Self::ReservationFailed { status, detail }
            }
            other => other.into(),
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<wayfarer_api::Error> for CoreError {
    fn from(err: wayfarer_api::Error) -> Self {
        match err {
            wayfarer_api::Error::Validation { field, reason } => Self::Validation { field, reason },
            wayfarer_api::Error::NotAuthenticated => Self::NotAuthenticated,
            wayfarer_api::Error::Request { status, detail } => match status {
                401 => Self::AuthenticationFailed { detail },
                403 => Self::Forbidden { detail },
                404 => Self::NotFound { detail },
                409 => Self::Conflict { detail },
                _ => Self::Rejected { status, detail },
            },
            wayfarer_api::Error::Network(e) => Self::Network {
                url: e
                    .url()
                    .map_or_else(|| "<unknown>".into(), ToString::to_string),
                timed_out: e.is_timeout(),
                reason: e.to_string(),
            },
            wayfarer_api::Error::InvalidUrl(e) => Self::Config {
                message: format!("Invalid URL: {e}"),
            },
            wayfarer_api::Error::Tls(msg) => Self::Config {
                message: format!("TLS error: {msg}"),
            },
            wayfarer_api::Error::Deserialization { message, body: _ } => {
                Self::Internal(format!("Unexpected response: {message}"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(status: u16, detail: &str) -> wayfarer_api::Error {
        wayfarer_api::Error::Request {
            status,
            detail: detail.into(),
        }
    }

    #[test]
    fn status_codes_map_to_domain_variants() {
        assert!(matches!(
            CoreError::from(request(404, "Trip not found")),
            CoreError::NotFound { .. }
        ));
        assert!(matches!(
            CoreError::from(request(403, "Not allowed")),
            CoreError::Forbidden { .. }
        ));
        assert!(CoreError::from(request(409, "busy")).is_conflict());
        assert!(matches!(
            CoreError::from(request(500, "boom")),
            CoreError::Rejected { status: 500, .. }
        ));
        assert!(matches!(
            CoreError::from(wayfarer_api::Error::NotAuthenticated),
            CoreError::NotAuthenticated
        ));
    }

    #[test]
    fn reservation_failures_keep_status() {
        let err = CoreError::from_reservation(request(409, "Item no longer available"));
        assert!(matches!(
            err,
            CoreError::ReservationFailed { status: 409, ref detail } if detail == "Item no longer available"
        ));
        assert!(err.is_conflict());

        let err = CoreError::from_reservation(wayfarer_api::Error::NotAuthenticated);
        assert!(matches!(err, CoreError::NotAuthenticated));
    }
}
