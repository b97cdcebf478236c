//! Flag overrides on top of `wayfarer-config` profiles.
//!
//! This is the single boundary where CLI flags cross into a
//! `wayfarer_core::PlannerConfig`.

use std::time::Duration;

use secrecy::SecretString;

use wayfarer_config::{self as wcfg, Config, Profile};
use wayfarer_core::{PlannerConfig, TlsVerification};

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// Resolve the active profile and apply flag overrides.
///
/// Precedence per field: flag, then profile, then `[defaults]`. With
/// `--api-url` no profile is needed at all.
pub fn resolve(global: &GlobalOpts, config: &Config) -> Result<PlannerConfig, CliError> {
    let name = config.active_profile_name(global.profile.as_deref());

    let mut planner = match (config.profiles.get(&name), global.api_url.as_deref()) {
        (Some(profile), _) => wcfg::profile_to_planner_config(profile, &name, &config.defaults)?,
        (None, Some(url)) => {
            let adhoc = Profile {
                api_url: url.to_owned(),
                ..Profile::default()
            };
            wcfg::profile_to_planner_config(&adhoc, &name, &config.defaults)?
        }
        (None, None) if global.profile.is_some() => {
            return Err(CliError::ProfileNotFound {
                name,
                available: available_profiles(config),
            });
        }
        (None, None) => {
            return Err(CliError::NoConfig {
                path: wcfg::config_path().display().to_string(),
            });
        }
    };

    if let Some(url) = global.api_url.as_deref() {
        planner.api_url = wcfg::parse_api_url(url)?;
    }
    if let Some(token) = global.token.as_deref().filter(|t| !t.trim().is_empty()) {
        planner.token = Some(SecretString::from(token.to_owned()));
    }
    if global.insecure {
        planner.tls = TlsVerification::DangerAcceptInvalid;
    }
    if let Some(secs) = global.timeout {
        planner.timeout = Duration::from_secs(secs);
    }

    tracing::debug!(profile = %name, api_url = %planner.api_url, "resolved planner config");
    Ok(planner)
}

pub fn available_profiles(config: &Config) -> String {
    if config.profiles.is_empty() {
        return "(none)".into();
    }
    config
        .profiles
        .keys()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}
