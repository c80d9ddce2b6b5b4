// ── Core error types ──
//
// Classified backend failures pass through untouched; the core only adds
// the failures it can detect itself (local validation, undecodable records).

use restcrud_api::ErrorKind;
use thiserror::Error;

use crate::validate::FieldErrors;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Api(#[from] restcrud_api::Error),

    /// Rejected locally; no request was sent.
    #[error("Validation failed: {}", summarize(.0))]
    Invalid(FieldErrors),

    #[error("Cannot read {what} from the backend response: {source}")]
    Decode {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl CoreError {
    /// Kind of the underlying backend error, if this is one.
    pub fn api_kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Api(err) => Some(err.kind()),
            _ => None,
        }
    }

    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            Self::Invalid(errors) => Some(errors),
            _ => None,
        }
    }
}

fn summarize(errors: &FieldErrors) -> String {
    errors
        .iter()
        .map(|(field, message)| format!("{field}: {message}"))
        .collect::<Vec<_>>()
        .join("; ")
}
