// ── Runtime planner configuration ──
//
// Describes how to reach the backend and which defaults the Planner applies.
// Carries credential data but never touches disk; wayfarer-config builds one
// from a profile and hands it in.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use url::Url;
use wayfarer_api::{DEFAULT_CURRENCY, DEFAULT_HOLD_TTL_MINUTES, IdempotencyKey};

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// Bundled web PKI roots.
    #[default]
    SystemDefaults,
    /// Additional CA certificate (PEM).
    CustomCa(PathBuf),
    /// Skip verification. Local development backends only.
    DangerAcceptInvalid,
}

/// Everything the Planner needs to talk to one backend.
#[derive(Debug, Clone)]
pub struct PlannerConfig {
    /// Backend root, e.g. `https://api.example.com` (`/api/v1` is appended).
    pub api_url: Url,
    /// Bearer token. `None` makes every call fail with `NotAuthenticated`.
    pub token: Option<SecretString>,
    pub tls: TlsVerification,
    pub timeout: Duration,
    /// Currency used when a reservation item or checkout omits one.
    pub currency: String,
    /// Hold TTL used when `hold` is called without one.
    pub hold_ttl_minutes: u32,
    /// Width of the time bucket for derived idempotency keys.
    pub idempotency_window: Duration,
}

impl PlannerConfig {
    pub fn new(api_url: Url) -> Self {
        Self {
            api_url,
            token: None,
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(30),
            currency: DEFAULT_CURRENCY.to_owned(),
            hold_ttl_minutes: DEFAULT_HOLD_TTL_MINUTES,
            idempotency_window: IdempotencyKey::DEFAULT_WINDOW,
        }
    }

    pub fn with_token(mut self, token: SecretString) -> Self {
        self.token = Some(token);
        self
    }
}
