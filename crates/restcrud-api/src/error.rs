// Typed error taxonomy for resource operations.
//
// Every failed transport call becomes exactly one `Error` through
// `classify`, a total function over `TransportFailure`. Status codes are
// resolved through a static lookup table so the set of recognised codes
// stays checkable in one place. Construction-time problems (bad base URL,
// unknown endpoint name) are `ConfigError`s and never reach this taxonomy.

use serde_json::Value;
use thiserror::Error;

use crate::transport::TransportFailure;

// ── Kinds ───────────────────────────────────────────────────────────

/// Closed set of classified failure reasons.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumIter,
    strum::IntoStaticStr,
)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    BadRequest,
    Unauthorized,
    Forbidden,
    NotFound,
    ValidationFailed,
    ServerError,
    NetworkUnreachable,
    Unknown,
}

/// Status codes with a dedicated kind. Anything else is `Unknown`.
const STATUS_KINDS: &[(u16, ErrorKind)] = &[
    (400, ErrorKind::BadRequest),
    (401, ErrorKind::Unauthorized),
    (403, ErrorKind::Forbidden),
    (404, ErrorKind::NotFound),
    (422, ErrorKind::ValidationFailed),
    (500, ErrorKind::ServerError),
];

const GENERIC_STATUS_MESSAGE: &str = "An error occurred";

impl ErrorKind {
    /// Look up the dedicated kind for an HTTP status, if it has one.
    pub fn from_status(status: u16) -> Option<Self> {
        STATUS_KINDS
            .iter()
            .find(|(code, _)| *code == status)
            .map(|(_, kind)| *kind)
    }

    /// User-facing message used when nothing more specific is known.
    pub fn default_message(self) -> &'static str {
        match self {
            Self::BadRequest => "Invalid request. Please check your input.",
            Self::Unauthorized => "Unauthorized. Please log in again.",
            Self::Forbidden => "Access denied.",
            Self::NotFound => "Resource not found.",
            Self::ValidationFailed => "Validation error. Please check your input.",
            Self::ServerError => "Server error. Please try again later.",
            Self::NetworkUnreachable => "Network error. Please check your connection.",
            Self::Unknown => "An unexpected error occurred.",
        }
    }
}

// ── Typed error ─────────────────────────────────────────────────────

/// Classified failure returned by every `ResourceClient` operation.
///
/// Carries the kind, a human-readable message, the HTTP status (when the
/// backend answered) and the backend's own `message` field if it sent one.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct Error {
    kind: ErrorKind,
    message: String,
    status: Option<u16>,
    server_message: Option<String>,
}

impl Error {
    /// An error of `kind` with its default message.
    pub fn new(kind: ErrorKind) -> Self {
        Self::with_message(kind, kind.default_message())
    }

    pub fn with_message(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status: None,
            server_message: None,
        }
    }

    #[must_use]
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// HTTP status of the failed response, if the backend answered at all.
    pub fn status(&self) -> Option<u16> {
        self.status
    }

    /// The backend's `message` field, when its error body carried one.
    pub fn server_message(&self) -> Option<&str> {
        self.server_message.as_deref()
    }

    pub fn is_not_found(&self) -> bool {
        self.kind == ErrorKind::NotFound
    }

    /// Returns `true` for credential problems (401 / 403).
    pub fn is_auth(&self) -> bool {
        matches!(self.kind, ErrorKind::Unauthorized | ErrorKind::Forbidden)
    }

    /// Returns `true` if the backend was never reached.
    pub fn is_transient(&self) -> bool {
        self.kind == ErrorKind::NetworkUnreachable
    }
}

// ── Classification ──────────────────────────────────────────────────

/// Map a transport outcome to its typed error.
///
/// | outcome                         | kind                |
/// |---------------------------------|---------------------|
/// | status with a dedicated kind    | that kind           |
/// | any other status                | `Unknown` (body `message` or generic) |
/// | no response, network failure    | `NetworkUnreachable`|
/// | no response, anything else      | `Unknown`           |
pub fn classify(failure: &TransportFailure) -> Error {
    match failure {
        TransportFailure::Status { status, body } => {
            let server_message = body_message(body);
            let error = match ErrorKind::from_status(*status) {
                Some(kind) => Error::new(kind),
                None => Error::with_message(
                    ErrorKind::Unknown,
                    server_message.as_deref().unwrap_or(GENERIC_STATUS_MESSAGE),
                ),
            };
            Error {
                server_message,
                ..error.with_status(*status)
            }
        }
        TransportFailure::Network { .. } => Error::new(ErrorKind::NetworkUnreachable),
        TransportFailure::Other { .. } => Error::new(ErrorKind::Unknown),
    }
}

impl From<TransportFailure> for Error {
    fn from(failure: TransportFailure) -> Self {
        classify(&failure)
    }
}

fn body_message(body: &Value) -> Option<String> {
    body.get("message")
        .and_then(Value::as_str)
        .filter(|msg| !msg.is_empty())
        .map(str::to_owned)
}

// ── Construction errors ─────────────────────────────────────────────

/// Failures while building an endpoint configuration or client.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("No base URL configured")]
    MissingBaseUrl,

    #[error("Invalid base URL '{url}': {source}")]
    InvalidBaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Timeout must be greater than zero")]
    ZeroTimeout,

    #[error("No endpoint named '{name}' (configured: {known})")]
    UnknownEndpoint { name: String, known: String },

    #[error("Invalid header '{name}': {reason}")]
    InvalidHeader { name: String, reason: String },

    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}
