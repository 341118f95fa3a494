//! Error handling for the Buen Sabor client
//!
//! Every failed call normalizes to [`ApiError`] `{ message, status, details }`
//! for display. Status 0 means no response was received.

use reqwest::StatusCode;
use serde::Serialize;
use serde_json::Value;
use shared::validation::FormErrors;
use thiserror::Error;

/// Client error types
#[derive(Error, Debug)]
pub enum ClientError {
    // Transport errors
    #[error("Connection error. Check your network connection.")]
    Network(String),

    #[error("Could not read the server response: {0}")]
    Decode(String),

    // HTTP errors
    #[error("Unauthorized. Please sign in again.")]
    Unauthorized { details: Option<Value> },

    #[error("You do not have permission to perform this action.")]
    Forbidden { details: Option<Value> },

    #[error("Resource not found.")]
    NotFound { details: Option<Value> },

    #[error("Validation error.")]
    Validation { details: Option<Value> },

    #[error("{message}")]
    Client {
        status: u16,
        message: String,
        details: Option<Value>,
    },

    #[error("Internal server error.")]
    Server { status: u16, details: Option<Value> },

    // Local errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid form: {0}")]
    InvalidForm(FormErrors),

    #[error("{0}")]
    Rejected(String),
}

/// Normalized error shown to the user
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiError {
    pub message: String,
    pub status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl ClientError {
    /// Build the error for a non-success response.
    ///
    /// `body` is the raw response text; it becomes `details` when it parses
    /// as JSON, and its `message` field is used for statuses without a
    /// dedicated variant. Only 5xx responses become `Server`.
    pub fn from_response(status: StatusCode, body: &str) -> Self {
        let details: Option<Value> = serde_json::from_str(body).ok();

        match status.as_u16() {
            401 => ClientError::Unauthorized { details },
            403 => ClientError::Forbidden { details },
            404 => ClientError::NotFound { details },
            422 => ClientError::Validation { details },
            code @ 500..=599 => ClientError::Server {
                status: code,
                details,
            },
            code => {
                let message = details
                    .as_ref()
                    .and_then(|d| d.get("message"))
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .or_else(|| status.canonical_reason().map(str::to_string))
                    .unwrap_or_else(|| format!("Request failed ({})", code));
                ClientError::Client {
                    status: code,
                    message,
                    details,
                }
            }
        }
    }

    /// HTTP status of the failure, 0 when there was no usable response
    pub fn status(&self) -> u16 {
        match self {
            ClientError::Network(_) | ClientError::Decode(_) | ClientError::Configuration(_) => 0,
            ClientError::Unauthorized { .. } => 401,
            ClientError::Forbidden { .. } => 403,
            ClientError::NotFound { .. } => 404,
            ClientError::Validation { .. } | ClientError::InvalidForm(_) => 422,
            ClientError::Client { status, .. } | ClientError::Server { status, .. } => *status,
            ClientError::Rejected(_) => 409,
        }
    }

    pub fn details(&self) -> Option<Value> {
        match self {
            ClientError::Unauthorized { details }
            | ClientError::Forbidden { details }
            | ClientError::NotFound { details }
            | ClientError::Validation { details }
            | ClientError::Client { details, .. }
            | ClientError::Server { details, .. } => details.clone(),
            ClientError::InvalidForm(errors) => serde_json::to_value(errors).ok(),
            _ => None,
        }
    }

    pub fn to_api_error(&self) -> ApiError {
        ApiError {
            message: self.to_string(),
            status: self.status(),
            details: self.details(),
        }
    }

    /// Raised locally, before any request was sent
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            ClientError::InvalidForm(_) | ClientError::Rejected(_) | ClientError::Configuration(_)
        )
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ClientError::Decode(err.to_string())
        } else {
            ClientError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Decode(err.to_string())
    }
}

impl From<FormErrors> for ClientError {
    fn from(errors: FormErrors) -> Self {
        ClientError::InvalidForm(errors)
    }
}

/// Result type alias for client calls
pub type ClientResult<T> = Result<T, ClientError>;
