// Ordered hooks run by `HttpTransport` around each call.
//
// `on_request` may rewrite the outgoing request (headers, query). The two
// completion hooks only observe: they cannot change the outcome.

use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, info, warn};

use crate::transport::{Request, Response, TransportFailure};

/// A pre-request transform plus post-response observers.
pub trait Middleware: Send + Sync {
    fn on_request(&self, _request: &mut Request) {}

    fn on_response(&self, _request: &Request, _response: &Response) {}

    fn on_failure(&self, _request: &Request, _failure: &TransportFailure) {}
}

// ── Logging ─────────────────────────────────────────────────────────

/// Emits one record before and one after every call.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingMiddleware;

impl Middleware for LoggingMiddleware {
    fn on_request(&self, request: &mut Request) {
        debug!(method = %request.method, path = %request.path, "API request");
    }

    fn on_response(&self, request: &Request, response: &Response) {
        debug!(status = response.status, path = %request.path, "API response");
    }

    fn on_failure(&self, request: &Request, failure: &TransportFailure) {
        warn!(
            status = ?failure.status_code(),
            method = %request.method,
            path = %request.path,
            error = %failure,
            "API error"
        );
        match failure.status_code() {
            Some(401) => info!("unauthorized access -- credentials missing or expired"),
            Some(500) => info!("server error -- backend failed to handle the request"),
            _ => {}
        }
    }
}

// ── Auth ────────────────────────────────────────────────────────────

/// Adds `Authorization: Bearer <token>` to every request.
pub struct BearerAuth {
    token: SecretString,
}

impl BearerAuth {
    pub fn new(token: SecretString) -> Self {
        Self { token }
    }
}

impl std::fmt::Debug for BearerAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BearerAuth").finish_non_exhaustive()
    }
}

impl Middleware for BearerAuth {
    fn on_request(&self, request: &mut Request) {
        request.set_header(
            "Authorization",
            format!("Bearer {}", self.token.expose_secret()),
        );
    }
}

// ── Static headers ──────────────────────────────────────────────────

/// Adds fixed headers unless the request already sets them.
#[derive(Debug, Clone, Default)]
pub struct StaticHeaders {
    headers: Vec<(String, String)>,
}

impl StaticHeaders {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

impl Middleware for StaticHeaders {
    fn on_request(&self, request: &mut Request) {
        for (name, value) in &self.headers {
            if request.header(name).is_none() {
                request.headers.push((name.clone(), value.clone()));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use reqwest::Method;

    use super::*;

    #[test]
    fn bearer_auth_sets_header() {
        let auth = BearerAuth::new(SecretString::from("abc123".to_owned()));
        let mut request = Request::new(Method::GET, "/posts");
        auth.on_request(&mut request);
        assert_eq!(request.header("authorization"), Some("Bearer abc123"));
    }

    #[test]
    fn bearer_auth_debug_hides_token() {
        let auth = BearerAuth::new(SecretString::from("abc123".to_owned()));
        assert!(!format!("{auth:?}").contains("abc123"));
    }

    #[test]
    fn static_headers_do_not_override_request() {
        let headers = StaticHeaders::new()
            .with("Accept", "application/json")
            .with("X-Client", "restcrud");
        let mut request = Request::new(Method::GET, "/posts").with_header("accept", "text/plain");
        headers.on_request(&mut request);
        assert_eq!(request.header("Accept"), Some("text/plain"));
        assert_eq!(request.header("x-client"), Some("restcrud"));
    }
}
