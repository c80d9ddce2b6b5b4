// HTTP transport: one configured `reqwest::Client`, a fixed base URL, and
// an ordered middleware list run around every call.
//
// The transport never interprets bodies beyond JSON decoding and never
// retries. Non-2xx answers come back as `TransportFailure::Status`; the
// resource client decides what they mean.

use std::future::Future;
use std::sync::Arc;

use reqwest::Method;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use serde_json::Value;
use thiserror::Error;
use url::Url;

use crate::config::EndpointConfig;
use crate::error::ConfigError;
use crate::middleware::{LoggingMiddleware, Middleware, StaticHeaders};

// ── Request / response ──────────────────────────────────────────────

/// A request relative to the transport's base URL.
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    /// Path appended verbatim to the base URL (e.g. `/posts/1`).
    pub path: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl Request {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            headers: Vec::new(),
            body: None,
        }
    }

    #[must_use]
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    #[must_use]
    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Add or replace a header (case-insensitive name match).
    pub fn set_header(&mut self, name: &str, value: impl Into<String>) {
        self.headers.retain(|(existing, _)| !existing.eq_ignore_ascii_case(name));
        self.headers.push((name.to_owned(), value.into()));
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// A successful (2xx) answer.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub status: u16,
    /// Decoded JSON body. Empty bodies are `Null`; non-JSON text is a `String`.
    pub body: Value,
}

impl Response {
    pub fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }
}

/// Why a transport call did not produce a 2xx response.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransportFailure {
    /// The backend answered with a non-success status.
    #[error("HTTP {status}")]
    Status { status: u16, body: Value },

    /// The backend was never reached: DNS, connect, timeout.
    #[error("network error: {reason}")]
    Network { reason: String },

    /// The request could not be issued for any other reason.
    #[error("request failed: {reason}")]
    Other { reason: String },
}

impl TransportFailure {
    pub fn has_response(&self) -> bool {
        matches!(self, Self::Status { .. })
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Network { .. } | Self::Other { .. } => None,
        }
    }

    pub fn response_body(&self) -> Option<&Value> {
        match self {
            Self::Status { body, .. } => Some(body),
            Self::Network { .. } | Self::Other { .. } => None,
        }
    }

    pub fn is_network_error(&self) -> bool {
        matches!(self, Self::Network { .. })
    }

    fn from_reqwest(err: &reqwest::Error) -> Self {
        if err.is_timeout() || err.is_connect() || err.is_request() {
            Self::Network {
                reason: err.to_string(),
            }
        } else {
            Self::Other {
                reason: err.to_string(),
            }
        }
    }
}

// ── Transport trait ─────────────────────────────────────────────────

/// Anything that can carry a `Request` to a backend.
///
/// `HttpTransport` is the production implementation; tests substitute
/// in-memory stubs.
pub trait Transport: Send + Sync {
    fn send(
        &self,
        request: Request,
    ) -> impl Future<Output = Result<Response, TransportFailure>> + Send;
}

impl<T: Transport> Transport for Arc<T> {
    fn send(
        &self,
        request: Request,
    ) -> impl Future<Output = Result<Response, TransportFailure>> + Send {
        (**self).send(request)
    }
}

// ── HTTP transport ──────────────────────────────────────────────────

/// `reqwest`-backed transport with a fixed base URL and timeout.
pub struct HttpTransport {
    http: reqwest::Client,
    base_url: Url,
    middleware: Vec<Arc<dyn Middleware>>,
}

impl HttpTransport {
    /// Build from an endpoint config.
    ///
    /// Applies the configured timeout and user agent, sets
    /// `Content-Type: application/json` on every request, and installs the
    /// logging middleware followed by the config's static headers.
    pub fn new(config: &EndpointConfig) -> Result<Self, ConfigError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent())
            .default_headers(headers)
            .build()?;

        let static_headers = config
            .headers()
            .iter()
            .fold(StaticHeaders::new(), |acc, (name, value)| acc.with(name, value));

        Ok(Self::from_reqwest(config.base_url().clone(), http)
            .with_middleware(LoggingMiddleware)
            .with_middleware(static_headers))
    }

    /// Wrap an existing `reqwest::Client` (no middleware installed).
    pub fn from_reqwest(base_url: Url, http: reqwest::Client) -> Self {
        Self {
            http,
            base_url,
            middleware: Vec::new(),
        }
    }

    /// Append a middleware; it runs after every middleware added before it.
    #[must_use]
    pub fn with_middleware(mut self, middleware: impl Middleware + 'static) -> Self {
        self.middleware.push(Arc::new(middleware));
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Join a request path onto the base URL, keeping any base path prefix.
    fn url(&self, path: &str) -> Result<Url, TransportFailure> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let full = if path.starts_with('/') {
            format!("{base}{path}")
        } else {
            format!("{base}/{path}")
        };
        Url::parse(&full).map_err(|e| TransportFailure::Other {
            reason: format!("invalid URL '{full}': {e}"),
        })
    }

    async fn execute(&self, request: &Request) -> Result<Response, TransportFailure> {
        let url = self.url(&request.path)?;

        let mut builder = self.http.request(request.method.clone(), url);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(ref body) = request.body {
            builder = builder.json(body);
        }

        let resp = builder
            .send()
            .await
            .map_err(|e| TransportFailure::from_reqwest(&e))?;
        let status = resp.status();

        let text = match resp.text().await {
            Ok(text) => text,
            Err(e) if status.is_success() => return Err(TransportFailure::from_reqwest(&e)),
            Err(_) => String::new(),
        };
        let body = decode_body(&text);

        if status.is_success() {
            Ok(Response::new(status.as_u16(), body))
        } else {
            Err(TransportFailure::Status {
                status: status.as_u16(),
                body,
            })
        }
    }
}

impl Transport for HttpTransport {
    async fn send(&self, mut request: Request) -> Result<Response, TransportFailure> {
        for middleware in &self.middleware {
            middleware.on_request(&mut request);
        }

        let outcome = self.execute(&request).await;

        match &outcome {
            Ok(response) => {
                for middleware in &self.middleware {
                    middleware.on_response(&request, response);
                }
            }
            Err(failure) => {
                for middleware in &self.middleware {
                    middleware.on_failure(&request, failure);
                }
            }
        }

        outcome
    }
}

fn decode_body(text: &str) -> Value {
    if text.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_owned()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn transport(base: &str) -> HttpTransport {
        HttpTransport::from_reqwest(Url::parse(base).unwrap(), reqwest::Client::new())
    }

    #[test]
    fn url_keeps_base_path_prefix() {
        let t = transport("https://api.example.com/v2/");
        assert_eq!(
            t.url("/posts/1").unwrap().as_str(),
            "https://api.example.com/v2/posts/1"
        );
        assert_eq!(
            t.url("posts").unwrap().as_str(),
            "https://api.example.com/v2/posts"
        );
    }

    #[test]
    fn decode_body_variants() {
        assert_eq!(decode_body(""), Value::Null);
        assert_eq!(decode_body("  \n"), Value::Null);
        assert_eq!(decode_body(r#"{"id":1}"#), json!({"id": 1}));
        assert_eq!(decode_body("Forbidden"), json!("Forbidden"));
    }

    #[test]
    fn failure_accessors() {
        let status = TransportFailure::Status {
            status: 404,
            body: json!({"message": "gone"}),
        };
        assert!(status.has_response());
        assert_eq!(status.status_code(), Some(404));
        assert_eq!(status.response_body(), Some(&json!({"message": "gone"})));
        assert!(!status.is_network_error());

        let network = TransportFailure::Network {
            reason: "refused".into(),
        };
        assert!(!network.has_response());
        assert!(network.is_network_error());
        assert_eq!(network.status_code(), None);
    }

    #[test]
    fn set_header_replaces_case_insensitively() {
        let mut request = Request::new(Method::GET, "/posts").with_header("authorization", "old");
        request.set_header("Authorization", "new");
        assert_eq!(request.headers.len(), 1);
        assert_eq!(request.header("AUTHORIZATION"), Some("new"));
    }
}
