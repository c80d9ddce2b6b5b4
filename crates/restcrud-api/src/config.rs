// ── Endpoint configuration ──
//
// Immutable description of one backend: where it lives, how long to wait,
// which path each logical resource uses, and how its bodies are shaped.
// Built once; pointing at a different backend means building a new one.

use std::time::Duration;

use indexmap::IndexMap;
use reqwest::header::{HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::ConfigError;
use crate::mapping::{FieldMapping, ResponseStructure};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_USER_AGENT: &str = concat!("restcrud/", env!("CARGO_PKG_VERSION"));

/// Validated, immutable backend description.
#[derive(Debug, Clone)]
pub struct EndpointConfig {
    base_url: Url,
    timeout: Duration,
    endpoints: IndexMap<String, String>,
    response: ResponseStructure,
    headers: IndexMap<String, String>,
    user_agent: String,
}

impl EndpointConfig {
    pub fn builder(base_url: impl Into<String>) -> EndpointConfigBuilder {
        EndpointConfigBuilder::new(base_url)
    }

    /// Build from a deserialized spec. `BASE_URL` is required.
    pub fn from_spec(spec: EndpointSpec) -> Result<Self, ConfigError> {
        let base_url = spec.base_url.clone().ok_or(ConfigError::MissingBaseUrl)?;
        Self::builder(base_url).merge_spec(spec).build()
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn endpoints(&self) -> &IndexMap<String, String> {
        &self.endpoints
    }

    /// Path for a logical resource name.
    pub fn endpoint(&self, name: &str) -> Result<&str, ConfigError> {
        self.endpoints
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| ConfigError::UnknownEndpoint {
                name: name.to_owned(),
                known: self
                    .endpoints
                    .keys()
                    .map(String::as_str)
                    .collect::<Vec<_>>()
                    .join(", "),
            })
    }

    pub fn response(&self) -> &ResponseStructure {
        &self.response
    }

    pub fn headers(&self) -> &IndexMap<String, String> {
        &self.headers
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }
}

// ── Builder ─────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct EndpointConfigBuilder {
    base_url: String,
    timeout: Duration,
    endpoints: IndexMap<String, String>,
    response: ResponseStructure,
    headers: IndexMap<String, String>,
    user_agent: String,
}

impl EndpointConfigBuilder {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: DEFAULT_TIMEOUT,
            endpoints: IndexMap::new(),
            response: ResponseStructure::default(),
            headers: IndexMap::new(),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }

    #[must_use]
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn endpoint(mut self, name: impl Into<String>, path: impl Into<String>) -> Self {
        self.endpoints.insert(name.into(), path.into());
        self
    }

    #[must_use]
    pub fn data_wrapper(mut self, key: impl Into<String>) -> Self {
        self.response = self.response.with_data_wrapper(key);
        self
    }

    #[must_use]
    pub fn field_mapping(mut self, mapping: FieldMapping) -> Self {
        self.response = self.response.with_field_mapping(mapping);
        self
    }

    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = agent.into();
        self
    }

    /// Overlay every option the spec sets; unset options keep their value.
    #[must_use]
    pub fn merge_spec(mut self, spec: EndpointSpec) -> Self {
        if let Some(base_url) = spec.base_url {
            self.base_url = base_url;
        }
        if let Some(ms) = spec.timeout_ms {
            self.timeout = Duration::from_millis(ms);
        }
        self.endpoints.extend(spec.endpoints);
        self.headers.extend(spec.headers);
        if let Some(response) = spec.response_structure {
            if let Some(key) = response.data_wrapper {
                self.response = self.response.with_data_wrapper(key);
            }
            if let Some(mapping) = response.field_mapping {
                self.response = self.response.with_field_mapping(mapping);
            }
        }
        self
    }

    pub fn build(self) -> Result<EndpointConfig, ConfigError> {
        let base_url = Url::parse(&self.base_url).map_err(|source| ConfigError::InvalidBaseUrl {
            url: self.base_url.clone(),
            source,
        })?;

        if self.timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout);
        }

        for (name, value) in &self.headers {
            HeaderName::from_bytes(name.as_bytes()).map_err(|e| ConfigError::InvalidHeader {
                name: name.clone(),
                reason: e.to_string(),
            })?;
            HeaderValue::from_str(value).map_err(|e| ConfigError::InvalidHeader {
                name: name.clone(),
                reason: e.to_string(),
            })?;
        }

        Ok(EndpointConfig {
            base_url,
            timeout: self.timeout,
            endpoints: self.endpoints,
            response: self.response,
            headers: self.headers,
            user_agent: self.user_agent,
        })
    }
}

// ── Serialized form ─────────────────────────────────────────────────

/// Endpoint options as they appear in configuration files.
///
/// Accepts both the upper-case option names (`BASE_URL`, `TIMEOUT`,
/// `ENDPOINTS`, `RESPONSE_STRUCTURE`) and their snake_case equivalents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointSpec {
    #[serde(default, alias = "BASE_URL", skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Per-request timeout in milliseconds.
    #[serde(
        default,
        alias = "TIMEOUT",
        alias = "timeout",
        skip_serializing_if = "Option::is_none"
    )]
    pub timeout_ms: Option<u64>,

    #[serde(default, alias = "ENDPOINTS", skip_serializing_if = "IndexMap::is_empty")]
    pub endpoints: IndexMap<String, String>,

    #[serde(
        default,
        alias = "RESPONSE_STRUCTURE",
        skip_serializing_if = "Option::is_none"
    )]
    pub response_structure: Option<ResponseSpec>,

    #[serde(default, alias = "HEADERS", skip_serializing_if = "IndexMap::is_empty")]
    pub headers: IndexMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseSpec {
    #[serde(default, alias = "DATA_WRAPPER", skip_serializing_if = "Option::is_none")]
    pub data_wrapper: Option<String>,

    #[serde(default, alias = "FIELD_MAPPING", skip_serializing_if = "Option::is_none")]
    pub field_mapping: Option<FieldMapping>,
}
