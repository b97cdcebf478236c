//! Shared configuration for Wayfarer tools.
//!
//! TOML profiles, token resolution (env + keyring + plaintext), and
//! translation to `wayfarer_core::PlannerConfig`. The CLI layers its
//! flag overrides on top of this crate.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use wayfarer_core::{PlannerConfig, TlsVerification};

/// Keyring service name; entries are keyed `{profile}/token`.
pub const KEYRING_SERVICE: &str = "wayfarer";
/// Environment variable consulted for a token after the profile's own.
pub const TOKEN_ENV: &str = "WAYFARER_TOKEN";
const ENV_PREFIX: &str = "WAYFARER_";
const MAX_HOLD_TTL_MINUTES: u32 = 720;

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{name}' not found")]
    UnknownProfile { name: String },

    #[error("keyring error: {0}")]
    Keyring(String),

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named backend profiles.
    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Profile name to use: explicit override, then `default_profile`,
    /// then `"default"`.
    pub fn active_profile_name(&self, requested: Option<&str>) -> String {
        requested
            .map(str::to_owned)
            .or_else(|| self.default_profile.clone())
            .unwrap_or_else(|| "default".into())
    }

    pub fn profile(&self, name: &str) -> Result<&Profile, ConfigError> {
        self.profiles
            .get(name)
            .ok_or_else(|| ConfigError::UnknownProfile { name: name.into() })
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    #[serde(default = "default_timeout")]
    pub timeout: u64,

    #[serde(default = "default_currency")]
    pub currency: String,

    #[serde(default = "default_hold_ttl")]
    pub hold_ttl_minutes: u32,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            timeout: default_timeout(),
            currency: default_currency(),
            hold_ttl_minutes: default_hold_ttl(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    30
}
fn default_currency() -> String {
    "INR".into()
}
fn default_hold_ttl() -> u32 {
    30
}

/// A named backend profile.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Profile {
    /// Backend root URL (e.g., "https://api.wayfarer.travel"). `/api/v1`
    /// is appended when missing.
    pub api_url: String,

    /// Bearer token (plaintext -- prefer keyring or env var).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Environment variable name containing the token.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_env: Option<String>,

    /// Path to custom CA certificate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ca_cert: Option<PathBuf>,

    /// Skip TLS verification.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insecure: Option<bool>,

    /// Override timeout (seconds).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,

    /// Override default currency.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,

    /// Override default hold TTL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hold_ttl_minutes: Option<u32>,
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("travel", "wayfarer", "wayfarer").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("wayfarer");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from `path` (missing file is fine) with `WAYFARER_*` overrides.
///
/// Nested keys use `__`: `WAYFARER_PROFILES__PROD__API_URL`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    debug!(path = %path.display(), "loading config");
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist or is invalid.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(&path, cfg)?;
    Ok(path)
}

pub fn save_config_to(path: &Path, cfg: &Config) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Token resolution ────────────────────────────────────────────────

/// Resolve the bearer token for a profile. `None` means "not signed in".
///
/// Order: the profile's `token_env` variable, `WAYFARER_TOKEN`, the system
/// keyring, then the plaintext `token` field.
pub fn resolve_token(profile: &Profile, profile_name: &str) -> Option<SecretString> {
    resolve_token_with(
        profile,
        profile_name,
        |name| std::env::var(name).ok(),
        keyring_token,
    )
}

fn resolve_token_with(
    profile: &Profile,
    profile_name: &str,
    env: impl Fn(&str) -> Option<String>,
    keyring: impl Fn(&str) -> Option<String>,
) -> Option<SecretString> {
    let non_empty = |s: String| (!s.trim().is_empty()).then_some(s);

    // 1. Profile's token_env → env var lookup
    if let Some(token) = profile.token_env.as_deref().and_then(&env).and_then(non_empty) {
        return Some(SecretString::from(token));
    }

    // 2. Global env var
    if let Some(token) = env(TOKEN_ENV).and_then(non_empty) {
        return Some(SecretString::from(token));
    }

    // 3. System keyring
    if let Some(token) = keyring(profile_name).and_then(non_empty) {
        return Some(SecretString::from(token));
    }

    // 4. Plaintext in config
    profile
        .token
        .clone()
        .and_then(non_empty)
        .map(SecretString::from)
}

fn keyring_token(profile_name: &str) -> Option<String> {
    keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/token"))
        .ok()?
        .get_password()
        .ok()
}

/// Store a token in the system keyring for `profile_name`.
pub fn store_token(profile_name: &str, token: &SecretString) -> Result<(), ConfigError> {
    let entry = keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/token"))
        .map_err(|e| ConfigError::Keyring(e.to_string()))?;
    entry
        .set_password(token.expose_secret())
        .map_err(|e| ConfigError::Keyring(e.to_string()))
}

// ── Profile → PlannerConfig ─────────────────────────────────────────

/// Validate the profile's URL and build a `PlannerConfig`.
///
/// Profile values win over `defaults`. A missing token is not an error
/// here; requests fail with `NotAuthenticated` instead.
pub fn profile_to_planner_config(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
) -> Result<PlannerConfig, ConfigError> {
    let url = parse_api_url(&profile.api_url)?;

    let tls = if profile.insecure.unwrap_or(false) {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else {
        TlsVerification::SystemDefaults
    };

    let hold_ttl_minutes = profile.hold_ttl_minutes.unwrap_or(defaults.hold_ttl_minutes);
    if !(1..=MAX_HOLD_TTL_MINUTES).contains(&hold_ttl_minutes) {
        return Err(ConfigError::Validation {
            field: "hold_ttl_minutes".into(),
            reason: format!("must be between 1 and {MAX_HOLD_TTL_MINUTES}, got {hold_ttl_minutes}"),
        });
    }

    let currency = profile
        .currency
        .as_deref()
        .unwrap_or(&defaults.currency)
        .trim()
        .to_ascii_uppercase();
    if currency.is_empty() {
        return Err(ConfigError::Validation {
            field: "currency".into(),
            reason: "must not be empty".into(),
        });
    }

    let mut config = PlannerConfig::new(url);
    config.token = resolve_token(profile, profile_name);
    config.tls = tls;
    config.timeout = Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout));
    config.currency = currency;
    config.hold_ttl_minutes = hold_ttl_minutes;
    Ok(config)
}

/// Parse an http(s) API URL.
pub fn parse_api_url(raw: &str) -> Result<url::Url, ConfigError> {
    let url: url::Url = raw.trim().parse().map_err(|_| ConfigError::Validation {
        field: "api_url".into(),
        reason: format!("invalid URL: {raw}"),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::Validation {
            field: "api_url".into(),
            reason: format!("expected http or https, got '{}'", url.scheme()),
        });
    }
    Ok(url)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use figment::Jail;

    use super::*;

    fn profile() -> Profile {
        Profile {
            api_url: "https://api.example.com".into(),
            ..Profile::default()
        }
    }

    #[test]
    fn loads_profiles_with_env_overrides() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "config.toml",
                r#"
                default_profile = "prod"

                [defaults]
                currency = "USD"

                [profiles.prod]
                api_url = "https://api.example.com"
                hold_ttl_minutes = 45
                "#,
            )?;
            jail.set_env("WAYFARER_PROFILES__PROD__TIMEOUT", "5");
            jail.set_env("WAYFARER_DEFAULTS__OUTPUT", "json");

            let cfg = load_config_from(Path::new("config.toml")).unwrap();
            assert_eq!(cfg.active_profile_name(None), "prod");
            assert_eq!(cfg.active_profile_name(Some("staging")), "staging");
            assert_eq!(cfg.defaults.output, "json");
            assert_eq!(cfg.defaults.currency, "USD");
            assert_eq!(cfg.defaults.hold_ttl_minutes, 30);

            let prod = cfg.profile("prod").unwrap();
            assert_eq!(prod.timeout, Some(5));
            assert_eq!(prod.hold_ttl_minutes, Some(45));
            assert!(matches!(
                cfg.profile("nope"),
                Err(ConfigError::UnknownProfile { .. })
            ));
            Ok(())
        });
    }

    #[test]
    fn missing_file_yields_defaults() {
        Jail::expect_with(|_| {
            let cfg = load_config_from(Path::new("absent.toml")).unwrap();
            assert_eq!(cfg.default_profile.as_deref(), Some("default"));
            assert!(cfg.profiles.is_empty());
            assert_eq!(cfg.defaults.timeout, 30);
            Ok(())
        });
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::default();
        cfg.profiles.insert("default".into(), profile());
        save_config_to(&path, &cfg).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("api_url = \"https://api.example.com\""));
        assert!(!written.contains("token"));

        let loaded = load_config_from(&path).unwrap();
        assert_eq!(loaded.profiles["default"].api_url, "https://api.example.com");
    }

    #[test]
    fn token_chain_order() {
        let mut p = profile();
        p.token = Some("plain".into());
        p.token_env = Some("MY_TRIP_TOKEN".into());

        let env = |name: &str| match name {
            "MY_TRIP_TOKEN" => Some("from-profile-env".to_owned()),
            TOKEN_ENV => Some("from-global-env".to_owned()),
            _ => None,
        };
        let no_env = |_: &str| None;
        let keyring = |_: &str| Some("from-keyring".to_owned());
        let no_keyring = |_: &str| None;

        let resolved = |env: &dyn Fn(&str) -> Option<String>,
                        keyring: &dyn Fn(&str) -> Option<String>,
                        p: &Profile| {
            resolve_token_with(p, "default", env, keyring).map(|t| t.expose_secret().to_owned())
        };

        assert_eq!(resolved(&env, &keyring, &p).as_deref(), Some("from-profile-env"));
        p.token_env = None;
        assert_eq!(resolved(&env, &keyring, &p).as_deref(), Some("from-global-env"));
        assert_eq!(resolved(&no_env, &keyring, &p).as_deref(), Some("from-keyring"));
        assert_eq!(resolved(&no_env, &no_keyring, &p).as_deref(), Some("plain"));
        p.token = Some("   ".into());
        assert_eq!(resolved(&no_env, &no_keyring, &p), None);
    }

    #[test]
    fn planner_config_from_profile() {
        let mut p = profile();
        p.ca_cert = Some(PathBuf::from("/etc/ssl/dev-ca.pem"));
        p.currency = Some("eur".into());
        p.timeout = Some(10);

        let cfg = profile_to_planner_config(&p, "default", &Defaults::default()).unwrap();
        assert_eq!(cfg.api_url.as_str(), "https://api.example.com/");
        assert_eq!(
            cfg.tls,
            TlsVerification::CustomCa(PathBuf::from("/etc/ssl/dev-ca.pem"))
        );
        assert_eq!(cfg.currency, "EUR");
        assert_eq!(cfg.timeout, Duration::from_secs(10));
        assert_eq!(cfg.hold_ttl_minutes, 30);

        p.insecure = Some(true);
        let cfg = profile_to_planner_config(&p, "default", &Defaults::default()).unwrap();
        assert_eq!(cfg.tls, TlsVerification::DangerAcceptInvalid);
    }

    #[test]
    fn invalid_profiles_are_rejected() {
        let mut p = profile();
        p.api_url = "ftp://files.example.com".into();
        assert!(matches!(
            profile_to_planner_config(&p, "default", &Defaults::default()),
            Err(ConfigError::Validation { ref field, .. }) if field == "api_url"
        ));

        let mut p = profile();
        p.hold_ttl_minutes = Some(0);
        assert!(profile_to_planner_config(&p, "default", &Defaults::default()).is_err());
    }
}
