use thiserror::Error;

/// Top-level error type for the `wayfarer-api` crate.
///
/// Every failure is scoped to a single operation. Nothing here is retried
/// or compensated locally; `wayfarer-core` maps these into domain errors.
#[derive(Debug, Error)]
pub enum Error {
    // ── Request well-formedness ─────────────────────────────────────
    /// A required field was missing or malformed before dispatch.
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    // ── Authentication ──────────────────────────────────────────────
    /// The token provider had no token for the current session.
    #[error("not signed in -- no bearer token available")]
    NotAuthenticated,

    // ── Server ──────────────────────────────────────────────────────
    /// Non-2xx response. `detail` is the server's `{"detail": ...}` payload
    /// when present, otherwise the raw body or the status reason.
    #[error("request failed (HTTP {status}): {detail}")]
    Request { status: u16, detail: String },

    // ── Transport ───────────────────────────────────────────────────
    /// Connection refused, DNS failure, timeout, etc. No response was received.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS configuration or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    pub(crate) fn validation(field: &str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.to_owned(),
            reason: reason.into(),
        }
    }

    /// HTTP status of a server rejection, if this is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Request { status, .. } => Some(*status),
            Self::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Server-provided detail message, if this is a server rejection.
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Request { detail, .. } => Some(detail),
            _ => None,
        }
    }

    /// Returns `true` if the session token is missing or was rejected.
    pub fn is_auth_expired(&self) -> bool {
        matches!(self, Self::NotAuthenticated | Self::Request { status: 401, .. })
    }

    /// Returns `true` for 409 responses (hold conflict, item no longer available).
    pub fn is_conflict(&self) -> bool {
        self.status() == Some(409)
    }

    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Returns `true` if resubmitting the same request might succeed.
    ///
    /// Informational only: this crate never retries on its own.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Network(e) => e.is_timeout() || e.is_connect(),
            Self::Request { status, .. } => matches!(status, 502..=504),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_error_keeps_status_and_detail() {
        let err = Error::Request {
            status: 409,
            detail: "hold conflict".into(),
        };
        assert_eq!(err.status(), Some(409));
        assert_eq!(err.detail(), Some("hold conflict"));
        assert!(err.is_conflict());
        assert!(!err.is_not_found());
        assert_eq!(err.to_string(), "request failed (HTTP 409): hold conflict");
    }

    #[test]
    fn auth_expired_covers_missing_token_and_401() {
        assert!(Error::NotAuthenticated.is_auth_expired());
        let rejected = Error::Request {
            status: 401,
            detail: "Invalid token".into(),
        };
        assert!(rejected.is_auth_expired());
        assert!(!Error::validation("trip_id", "must not be empty").is_auth_expired());
    }

    #[test]
    fn gateway_errors_are_transient() {
        let err = Error::Request {
            status: 502,
            detail: "Weather provider error".into(),
        };
        assert!(err.is_transient());
        let err = Error::Request {
            status: 400,
            detail: "bad".into(),
        };
        assert!(!err.is_transient());
    }
}
