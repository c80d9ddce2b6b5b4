//! CLI error types with miette diagnostics.
//!
//! Maps classified backend errors and local failures into user-facing
//! errors with actionable help text and a process exit code.

use miette::Diagnostic;
use thiserror::Error;

use restcrud_api::ErrorKind;
use restcrud_core::{CoreError, FieldErrors};

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const PERMISSION: i32 = 5;
    pub const CONNECTION: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Backend ──────────────────────────────────────────────────────

    #[error("{message}")]
    #[diagnostic(
        code(restcrud::network),
        help(
            "The backend could not be reached or did not answer in time.\n\
             Check the base URL, or raise the limit with --timeout <MS>."
        )
    )]
    Unreachable { message: String },

    #[error("{message}")]
    #[diagnostic(
        code(restcrud::unauthorized),
        help(
            "Pass a bearer token with --token, or store one with:\n\
             restcrud config set-token --profile <name>"
        )
    )]
    Unauthorized { message: String },

    #[error("{message}")]
    #[diagnostic(
        code(restcrud::forbidden),
        help("The token was accepted but does not grant access to this resource.")
    )]
    Forbidden { message: String },

    #[error("{message}")]
    #[diagnostic(
        code(restcrud::not_found),
        help("Run: restcrud items list to see available IDs")
    )]
    NotFound { message: String },

    #[error("{message}")]
    #[diagnostic(code(restcrud::rejected))]
    Rejected {
        message: String,
        /// The backend's own explanation, when it sent one.
        #[help]
        detail: Option<String>,
    },

    #[error("{message}")]
    #[diagnostic(code(restcrud::backend))]
    Backend {
        message: String,
        /// Status line for replies that carried one.
        #[help]
        detail: Option<String>,
    },

    // ── Local validation ─────────────────────────────────────────────

    #[error("Item is not valid")]
    #[diagnostic(code(restcrud::invalid_item), help("{details}"))]
    InvalidItem { details: String },

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(restcrud::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(restcrud::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: restcrud config init --profile {name}"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error(transparent)]
    #[diagnostic(code(restcrud::config))]
    Config(restcrud_config::ConfigError),

    #[error(transparent)]
    #[diagnostic(code(restcrud::endpoint), help("Check the profile's `api` table and --base-url."))]
    Endpoint(#[from] restcrud_api::ConfigError),

    // ── Interactive ──────────────────────────────────────────────────

    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(restcrud::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── IO / Serialization ────────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON payload: {0}")]
    #[diagnostic(code(restcrud::json), help("Check the JSON file contents and try again."))]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Unreachable { .. } => exit_code::CONNECTION,
            Self::Unauthorized { .. } => exit_code::AUTH,
            Self::Forbidden { .. } => exit_code::PERMISSION,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Rejected { .. }
            | Self::InvalidItem { .. }
            | Self::Validation { .. }
            | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

/// One `field: message` line per invalid field.
pub fn format_field_errors(errors: &FieldErrors) -> String {
    errors
        .iter()
        .map(|(field, message)| format!("{field}: {message}"))
        .collect::<Vec<_>>()
        .join("\n")
}

// ── Conversions ──────────────────────────────────────────────────────

impl From<restcrud_api::Error> for CliError {
    fn from(err: restcrud_api::Error) -> Self {
        let message = err.message().to_owned();
        match err.kind() {
            ErrorKind::NetworkUnreachable => Self::Unreachable { message },
            ErrorKind::Unauthorized => Self::Unauthorized { message },
            ErrorKind::Forbidden => Self::Forbidden { message },
            ErrorKind::NotFound => Self::NotFound { message },
            ErrorKind::BadRequest | ErrorKind::ValidationFailed => Self::Rejected {
                message,
                detail: err.server_message().map(str::to_owned),
            },
            ErrorKind::ServerError | ErrorKind::Unknown => Self::Backend {
                message,
                detail: err
                    .status()
                    .map(|status| format!("The backend answered with HTTP {status}.")),
            },
        }
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Api(err) => err.into(),
            CoreError::Invalid(errors) => Self::InvalidItem {
                details: format_field_errors(&errors),
            },
            decode @ CoreError::Decode { .. } => Self::Backend {
                message: decode.to_string(),
                detail: None,
            },
        }
    }
}

impl From<restcrud_config::ConfigError> for CliError {
    fn from(err: restcrud_config::ConfigError) -> Self {
        match err {
            restcrud_config::ConfigError::ProfileNotFound { name, available } => {
                Self::ProfileNotFound { name, available }
            }
            restcrud_config::ConfigError::Endpoint(err) => Self::Endpoint(err),
            other => Self::Config(other),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn api(kind: ErrorKind) -> CliError {
        restcrud_api::Error::new(kind).into()
    }

    #[test]
    fn exit_codes_follow_error_kind() {
        assert_eq!(api(ErrorKind::NetworkUnreachable).exit_code(), exit_code::CONNECTION);
        assert_eq!(api(ErrorKind::Unauthorized).exit_code(), exit_code::AUTH);
        assert_eq!(api(ErrorKind::Forbidden).exit_code(), exit_code::PERMISSION);
        assert_eq!(api(ErrorKind::NotFound).exit_code(), exit_code::NOT_FOUND);
        assert_eq!(api(ErrorKind::ValidationFailed).exit_code(), exit_code::USAGE);
        assert_eq!(api(ErrorKind::ServerError).exit_code(), exit_code::GENERAL);
        assert_eq!(api(ErrorKind::Unknown).exit_code(), exit_code::GENERAL);
    }

    #[test]
    fn local_validation_is_a_usage_error() {
        let err = CliError::from(CoreError::Invalid(FieldErrors::from([(
            "title".to_owned(),
            "Title is required".to_owned(),
        )])));
        assert_eq!(err.exit_code(), exit_code::USAGE);
        assert!(matches!(err, CliError::InvalidItem { ref details } if details == "title: Title is required"));
    }

    #[test]
    fn backend_failure_names_its_status() {
        let err = CliError::from(restcrud_api::Error::new(ErrorKind::ServerError).with_status(503));
        assert_eq!(err.to_string(), "Server error. Please try again later.");
        let help = err.help().unwrap().to_string();
        assert_eq!(help, "The backend answered with HTTP 503.");

        let silent = api(ErrorKind::Unknown);
        assert!(silent.help().is_none());
    }
}
