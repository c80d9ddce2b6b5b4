//! CLI configuration: a thin layer over `restcrud_config`.
//!
//! Adds resolution that respects `GlobalOpts` flag overrides (--base-url,
//! --timeout, --resource, --token, --config).

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;

use restcrud_api::{BearerAuth, EndpointConfig, HttpTransport, ResourceClient};
use restcrud_core::ItemService;

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use restcrud_config::{Config, DEFAULT_PROFILE, Preset, Profile};

// ── CLI-specific helpers ────────────────────────────────────────────

/// Config file in effect: `--config` if given, else the platform default.
pub fn config_file(global: &GlobalOpts) -> PathBuf {
    global
        .config
        .clone()
        .unwrap_or_else(restcrud_config::config_path)
}

pub fn load(global: &GlobalOpts) -> Result<Config, CliError> {
    Ok(restcrud_config::load_config_from(&config_file(global))?)
}

pub fn save(global: &GlobalOpts, cfg: &Config) -> Result<(), CliError> {
    restcrud_config::save_config_to(cfg, &config_file(global))?;
    Ok(())
}

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| DEFAULT_PROFILE.into())
}

/// The active profile.
///
/// An implicit profile that is not configured falls back to an empty one
/// (the JSONPlaceholder preset); a profile named with `--profile` must exist.
pub fn active_profile(global: &GlobalOpts, config: &Config) -> Result<(String, Profile), CliError> {
    let name = active_profile_name(global, config);
    match config.profiles.get(&name) {
        Some(profile) => Ok((name, profile.clone())),
        None if global.profile.is_none() => Ok((name, Profile::default())),
        None => Err(CliError::ProfileNotFound {
            available: config.profile_names(),
            name,
        }),
    }
}

/// Translate a `Profile` + global flags into an `EndpointConfig`.
///
/// CLI flag overrides take priority over profile values.
pub fn resolve_endpoint(profile: &Profile, global: &GlobalOpts) -> Result<EndpointConfig, CliError> {
    let mut builder = profile.endpoint_builder()?;
    if let Some(ref url) = global.base_url {
        builder = builder.base_url(url.clone());
    }
    if let Some(ms) = global.timeout {
        if ms == 0 {
            return Err(CliError::Validation {
                field: "timeout".into(),
                reason: "must be greater than 0 ms".into(),
            });
        }
        builder = builder.timeout(Duration::from_millis(ms));
    }
    Ok(builder.build()?)
}

/// Bearer token: `--token`, then the shared resolution chain.
pub fn resolve_token(profile: &Profile, profile_name: &str, global: &GlobalOpts) -> Option<SecretString> {
    if let Some(ref token) = global.token {
        return Some(SecretString::from(token.clone()));
    }
    restcrud_config::resolve_token(profile, profile_name)
}

/// Build the item service for the active profile and flags.
pub fn build_service(global: &GlobalOpts) -> Result<ItemService, CliError> {
    let cfg = load(global)?;
    let (profile_name, profile) = active_profile(global, &cfg)?;
    let endpoint = resolve_endpoint(&profile, global)?;
    let resource = global
        .resource
        .clone()
        .unwrap_or_else(|| profile.resource_name());

    let mut transport = HttpTransport::new(&endpoint)?;
    if let Some(token) = resolve_token(&profile, &profile_name, global) {
        transport = transport.with_middleware(BearerAuth::new(token));
    }
    let client = ResourceClient::new(transport, &endpoint, &resource)?;

    tracing::debug!(
        profile = %profile_name,
        base_url = %endpoint.base_url(),
        resource = %resource,
        "item service configured"
    );

    let service = ItemService::new(client);
    Ok(if global.no_cache {
        service.without_cache()
    } else {
        service.with_cache_ttl(cfg.cache_ttl(Some(&profile)))
    })
}
