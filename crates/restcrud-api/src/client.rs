// Typed CRUD + search over one logical resource.
//
// Each operation issues exactly one request, and every transport failure
// leaves through `classify` as exactly one typed `Error`. Successful bodies
// are unwrapped and field-mapped per the endpoint's response structure.

use reqwest::Method;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::EndpointConfig;
use crate::error::{ConfigError, Error, ErrorKind, classify};
use crate::mapping::ResponseStructure;
use crate::resource::{Resource, ResourceId};
use crate::transport::{HttpTransport, Request, Response, Transport};

/// Query parameter used by [`ResourceClient::search`].
pub const SEARCH_PARAM: &str = "q";

/// Async client for a single resource collection (e.g. `/posts`).
///
/// Generic over the transport so tests can swap in stubs; production code
/// uses the default [`HttpTransport`].
pub struct ResourceClient<T = HttpTransport> {
    transport: T,
    path: String,
    response: ResponseStructure,
}

impl ResourceClient<HttpTransport> {
    /// Build an HTTP-backed client for the endpoint named `resource`.
    pub fn connect(config: &EndpointConfig, resource: &str) -> Result<Self, ConfigError> {
        let transport = HttpTransport::new(config)?;
        Self::new(transport, config, resource)
    }
}

impl<T: Transport> ResourceClient<T> {
    pub fn new(transport: T, config: &EndpointConfig, resource: &str) -> Result<Self, ConfigError> {
        let path = config.endpoint(resource)?.to_owned();
        Ok(Self::with_path(transport, path, config.response().clone()))
    }

    /// Build against an explicit collection path.
    pub fn with_path(transport: T, path: impl Into<String>, response: ResponseStructure) -> Self {
        Self {
            transport,
            path: path.into(),
            response,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn response_structure(&self) -> &ResponseStructure {
        &self.response
    }

    // ── Operations ───────────────────────────────────────────────────

    /// Every record, in backend order.
    ///
    /// A 2xx answer never fails here: an array yields its records, a single
    /// object yields one record and an empty body yields none. Elements that
    /// are not objects are skipped with a warning.
    pub async fn list_all(&self) -> Result<Vec<Resource>, Error> {
        let request = Request::new(Method::GET, self.path.clone());
        let response = self.call(request, "fetch resources").await?;
        Ok(self.decode_many(response))
    }

    pub async fn get_by_id(&self, id: &ResourceId) -> Result<Resource, Error> {
        let request = Request::new(Method::GET, self.item_path(id));
        let response = self.call(request, "fetch resource").await?;
        self.decode_one(response)
    }

    /// Create a record; returns the backend's canonical form.
    ///
    /// Fails with `Unknown` if the backend's answer carries no `id`.
    pub async fn create(&self, data: &Resource) -> Result<Resource, Error> {
        let request = Request::new(Method::POST, self.path.clone()).with_body(self.encode(data));
        let response = self.call(request, "create resource").await?;
        let status = response.status;
        let created = self.decode_one(response)?;
        if created.id().is_none() {
            warn!(path = %self.path, "backend returned a created record without an id");
            return Err(
                Error::with_message(ErrorKind::Unknown, "created resource has no id")
                    .with_status(status),
            );
        }
        Ok(created)
    }

    /// Full replace (`PUT`). Returns the backend's answer as sent, after
    /// unwrapping; record bodies are field-mapped, anything else (including
    /// the `Null` of an empty `204`) passes through.
    pub async fn update(&self, id: &ResourceId, data: &Resource) -> Result<Value, Error> {
        let request = Request::new(Method::PUT, self.item_path(id)).with_body(self.encode(data));
        let response = self.call(request, "update resource").await?;
        Ok(self.decode_value(response))
    }

    /// Partial update (`PATCH`). Same reply handling as [`Self::update`].
    pub async fn patch(&self, id: &ResourceId, data: &Resource) -> Result<Value, Error> {
        let request = Request::new(Method::PATCH, self.item_path(id)).with_body(self.encode(data));
        let response = self.call(request, "patch resource").await?;
        Ok(self.decode_value(response))
    }

    /// Delete a record; returns whatever confirmation the backend sends.
    pub async fn delete(&self, id: &ResourceId) -> Result<Value, Error> {
        let request = Request::new(Method::DELETE, self.item_path(id));
        let response = self.call(request, "delete resource").await?;
        Ok(self.response.unwrap_body(response.body))
    }

    /// Backend-side search via `?q=<query>`.
    ///
    /// No local matching happens: a backend that ignores `q` returns its
    /// full, unfiltered list.
    pub async fn search(&self, query: &str) -> Result<Vec<Resource>, Error> {
        let request = Request::new(Method::GET, self.path.clone()).with_query(SEARCH_PARAM, query);
        let response = self.call(request, "search resources").await?;
        Ok(self.decode_many(response))
    }

    // ── Plumbing ─────────────────────────────────────────────────────

    fn item_path(&self, id: &ResourceId) -> String {
        format!("{}/{id}", self.path.trim_end_matches('/'))
    }

    async fn call(&self, request: Request, action: &'static str) -> Result<Response, Error> {
        match self.transport.send(request).await {
            Ok(response) => Ok(response),
            Err(failure) => {
                let err = classify(&failure);
                warn!(
                    kind = %err.kind(),
                    status = ?err.status(),
                    cause = %failure,
                    "failed to {action}: {err}"
                );
                Err(err)
            }
        }
    }

    fn encode(&self, data: &Resource) -> Value {
        Value::Object(self.response.outbound(data.as_map()))
    }

    fn decode_one(&self, response: Response) -> Result<Resource, Error> {
        let status = response.status;
        match self.response.unwrap_body(response.body) {
            Value::Object(record) => Ok(Resource::from(self.response.inbound(record))),
            other => Err(unexpected_shape("a record", &other, status)),
        }
    }

    fn decode_value(&self, response: Response) -> Value {
        match self.response.unwrap_body(response.body) {
            Value::Object(record) => Value::Object(self.response.inbound(record)),
            other => other,
        }
    }

    fn decode_many(&self, response: Response) -> Vec<Resource> {
        let values = match self.response.unwrap_body(response.body) {
            Value::Array(items) => items,
            Value::Null => Vec::new(),
            single => vec![single],
        };

        let total = values.len();
        let records: Vec<Resource> = values
            .into_iter()
            .filter_map(|value| match value {
                Value::Object(record) => Some(Resource::from(self.response.inbound(record))),
                _ => None,
            })
            .collect();

        if records.len() < total {
            warn!(
                path = %self.path,
                skipped = total - records.len(),
                "backend list held entries that are not records"
            );
        }
        debug!(path = %self.path, count = records.len(), "decoded records");
        records
    }
}

fn unexpected_shape(expected: &str, got: &Value, status: u16) -> Error {
    let kind = match got {
        Value::Null => "an empty body",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "text",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    };
    Error::with_message(
        ErrorKind::Unknown,
        format!("expected {expected} from the backend, got {kind}"),
    )
    .with_status(status)
}
