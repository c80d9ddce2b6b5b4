//! Shared configuration for the restcrud CLI.
//!
//! TOML profiles with an environment overlay, built-in backend presets,
//! bearer-token resolution (env + keyring + plaintext), and translation to
//! `restcrud_api::EndpointConfig`. The CLI adds flag-aware wrappers on top.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use restcrud_api::{EndpointConfig, EndpointConfigBuilder, EndpointSpec, FieldMapping, ResponseSpec};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Keyring service name; entries are keyed `<profile>/token`.
pub const KEYRING_SERVICE: &str = "restcrud";

/// Environment prefix for the config overlay (`RESTCRUD_PROFILES__X__RESOURCE`).
pub const ENV_PREFIX: &str = "RESTCRUD_";

pub const DEFAULT_PROFILE: &str = "default";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("profile '{name}' not found (available: {available})")]
    ProfileNotFound { name: String, available: String },

    #[error(transparent)]
    Endpoint(#[from] restcrud_api::ConfigError),

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

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

// ── Presets ─────────────────────────────────────────────────────────

/// Built-in backend shapes a profile can start from.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Preset {
    /// Public JSONPlaceholder demo API.
    #[default]
    Jsonplaceholder,
    /// Conventional REST backend under `/api/v1`.
    Rest,
    /// Laravel resource routes: `data` wrapper, snake_case fields.
    Laravel,
    /// Local Node/Express server.
    Express,
    /// Wrapped responses with renamed fields.
    Custom,
}

impl Preset {
    pub fn description(self) -> &'static str {
        match self {
            Self::Jsonplaceholder => "JSONPlaceholder demo API (posts, users, comments)",
            Self::Rest => "Plain REST API under /api/v1",
            Self::Laravel => "Laravel API: `data` wrapper, body as `content`, snake_case user id",
            Self::Express => "Local Express server on port 3000",
            Self::Custom => "Wrapped responses with title/body renamed to name/description",
        }
    }

    /// Logical resource a profile on this preset operates on by default.
    pub fn default_resource(self) -> &'static str {
        match self {
            Self::Jsonplaceholder => "posts",
            Self::Rest | Self::Laravel | Self::Express | Self::Custom => "items",
        }
    }

    /// Endpoint options for this preset.
    pub fn spec(self) -> EndpointSpec {
        let (base_url, timeout_ms, endpoints): (&str, u64, &[(&str, &str)]) = match self {
            Self::Jsonplaceholder => (
                "https://jsonplaceholder.typicode.com",
                10_000,
                &[("posts", "/posts"), ("users", "/users"), ("comments", "/comments")],
            ),
            Self::Rest => (
                "https://example.com/api/v1",
                10_000,
                &[("items", "/items"), ("users", "/users"), ("auth", "/auth")],
            ),
            Self::Laravel => (
                "https://example.com/api",
                15_000,
                &[("items", "/posts"), ("users", "/users"), ("auth", "/auth")],
            ),
            Self::Express => (
                "http://localhost:3000/api",
                10_000,
                &[("items", "/items"), ("users", "/users"), ("auth", "/auth/login")],
            ),
            Self::Custom => (
                "https://api.example.com/v2",
                12_000,
                &[("items", "/posts"), ("users", "/members"), ("auth", "/authenticate")],
            ),
        };

        let (response_structure, headers) = match self {
            Self::Laravel => (
                Some(ResponseSpec {
                    data_wrapper: Some("data".into()),
                    field_mapping: Some(
                        FieldMapping::new()
                            .with("id", "id")
                            .with("title", "title")
                            .with("body", "content")
                            .with("userId", "user_id"),
                    ),
                }),
                vec![("Accept", "application/json")],
            ),
            Self::Custom => (
                Some(ResponseSpec {
                    data_wrapper: Some("data".into()),
                    field_mapping: Some(
                        FieldMapping::new()
                            .with("id", "id")
                            .with("title", "name")
                            .with("body", "description")
                            .with("userId", "author_id"),
                    ),
                }),
                Vec::new(),
            ),
            Self::Jsonplaceholder | Self::Rest | Self::Express => (None, Vec::new()),
        };

        EndpointSpec {
            base_url: Some(base_url.into()),
            timeout_ms: Some(timeout_ms),
            endpoints: endpoints
                .iter()
                .map(|(name, path)| ((*name).to_owned(), (*path).to_owned()))
                .collect(),
            response_structure,
            headers: headers
                .into_iter()
                .map(|(k, v)| (k.to_owned(), v.to_owned()))
                .collect(),
        }
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Profile used when `--profile` is not given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_profile: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    /// Named backend profiles.
    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some(DEFAULT_PROFILE.into()),
            defaults: Defaults::default(),
            profiles: BTreeMap::new(),
        }
    }
}

impl Config {
    pub fn profile(&self, name: &str) -> Result<&Profile, ConfigError> {
        self.profiles
            .get(name)
            .ok_or_else(|| ConfigError::ProfileNotFound {
                name: name.to_owned(),
                available: self.profile_names(),
            })
    }

    /// Comma-separated profile names, or `(none)`.
    pub fn profile_names(&self) -> String {
        if self.profiles.is_empty() {
            return "(none)".into();
        }
        self.profiles.keys().cloned().collect::<Vec<_>>().join(", ")
    }

    /// Cache TTL for `profile`, falling back to the global default.
    pub fn cache_ttl(&self, profile: Option<&Profile>) -> Duration {
        let secs = profile
            .and_then(|p| p.cache_ttl_secs)
            .unwrap_or(self.defaults.cache_ttl_secs);
        Duration::from_secs(secs)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_secs: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            cache_ttl_secs: default_cache_ttl(),
        }
    }
}

fn default_cache_ttl() -> u64 {
    300
}

/// A named backend profile.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Profile {
    /// Built-in backend to start from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preset: Option<Preset>,

    /// Endpoint options layered over the preset (`BASE_URL`, `TIMEOUT`, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api: Option<EndpointSpec>,

    /// Logical resource name to operate on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<String>,

    /// Bearer token in plaintext. Keyring or `token_env` is preferred.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Environment variable holding the bearer token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_env: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_ttl_secs: Option<u64>,
}

impl Profile {
    pub fn from_preset(preset: Preset) -> Self {
        Self {
            preset: Some(preset),
            ..Self::default()
        }
    }

    /// Resource name, defaulting to the preset's.
    pub fn resource_name(&self) -> String {
        self.resource.clone().unwrap_or_else(|| {
            self.preset
                .unwrap_or_default()
                .default_resource()
                .to_owned()
        })
    }

    /// Builder for this profile's endpoint config, ready for overrides.
    ///
    /// The preset (JSONPlaceholder when none is set and `api` names no base
    /// URL) supplies the starting options; the `api` table is layered on top.
    pub fn endpoint_builder(&self) -> Result<EndpointConfigBuilder, ConfigError> {
        let api = self.api.clone().unwrap_or_default();
        let base = match self.preset {
            Some(preset) => preset.spec(),
            None if api.base_url.is_some() => EndpointSpec::default(),
            None => Preset::default().spec(),
        };

        let base_url = api
            .base_url
            .clone()
            .or_else(|| base.base_url.clone())
            .ok_or(restcrud_api::ConfigError::MissingBaseUrl)?;

        Ok(EndpointConfig::builder(base_url).merge_spec(base).merge_spec(api))
    }

    pub fn endpoint_config(&self) -> Result<EndpointConfig, ConfigError> {
        Ok(self.endpoint_builder()?.build()?)
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "restcrud", "restcrud").map_or_else(
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
    p.push("restcrud");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Defaults, then the TOML file at `path`, then `RESTCRUD_*` variables.
pub fn figment_for(path: &Path) -> Figment {
    Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
}

pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    debug!(path = %path.display(), "loading config");
    Ok(figment_for(path).extract()?)
}

// ── Config saving ───────────────────────────────────────────────────

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Token resolution ────────────────────────────────────────────────

fn keyring_entry(profile_name: &str) -> Result<keyring::Entry, ConfigError> {
    Ok(keyring::Entry::new(
        KEYRING_SERVICE,
        &format!("{profile_name}/token"),
    )?)
}

/// Resolve a bearer token from the chain (no CLI flag step).
///
/// `token_env` variable, then the system keyring, then the plaintext
/// `token`. `None` means anonymous access.
pub fn resolve_token(profile: &Profile, profile_name: &str) -> Option<SecretString> {
    // 1. Profile's token_env → env var lookup
    if let Some(ref env_name) = profile.token_env {
        if let Ok(val) = std::env::var(env_name) {
            return Some(SecretString::from(val));
        }
    }

    // 2. System keyring
    if let Ok(entry) = keyring_entry(profile_name) {
        if let Ok(secret) = entry.get_password() {
            return Some(SecretString::from(secret));
        }
    }

    // 3. Plaintext in config
    profile
        .token
        .as_ref()
        .map(|token| SecretString::from(token.clone()))
}

pub fn store_token(profile_name: &str, token: &SecretString) -> Result<(), ConfigError> {
    keyring_entry(profile_name)?.set_password(token.expose_secret())?;
    Ok(())
}

/// Remove the keyring token. Returns `false` if none was stored.
pub fn clear_token(profile_name: &str) -> Result<bool, ConfigError> {
    match keyring_entry(profile_name)?.delete_credential() {
        Ok(()) => Ok(true),
        Err(keyring::Error::NoEntry) => Ok(false),
        Err(e) => Err(e.into()),
    }
}
