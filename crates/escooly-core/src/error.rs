//! Error types for the escooly client.
//!
//! Every failure the session flow can produce maps onto one variant of
//! [`Error`], so callers can tell a dropped connection from an expired
//! session from a rejected form without string matching.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::field_errors::FieldErrors;

/// Message carried by every [`NetworkError`].
pub const NETWORK_ERROR_MESSAGE: &str =
    "Network Error: Unable to connect to the server. Please check your internet connection.";

/// The unified error type for escooly operations.
#[derive(Debug, Error)]
pub enum Error {
    /// No response was received (connection failure, timeout).
    #[error("network error: {0}")]
    Network(#[from] NetworkError),

    /// The server answered 401; the stored session has been discarded.
    #[error("session expired: {0}")]
    AuthExpired(ErrorPayload),

    /// The server answered 422 with a field-errors map.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// The server answered with any other non-success status.
    #[error("server error: {0}")]
    Server(#[from] ServerError),

    /// A required input was missing before any request was made.
    #[error("precondition failed: {0}")]
    Precondition(#[from] PreconditionError),

    /// Reading or writing the persistent session store failed.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Malformed input or an undecodable response body.
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInputError),
}

impl Error {
    /// Returns true if this error means the session is no longer valid.
    pub fn is_auth_expired(&self) -> bool {
        matches!(self, Error::AuthExpired(_))
    }

    /// Returns the flattened field errors of a validation failure.
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            Error::Validation(err) => Some(&err.errors),
            _ => None,
        }
    }

    /// Returns the server payload for errors that carry one.
    pub fn payload(&self) -> Option<&ErrorPayload> {
        match self {
            Error::AuthExpired(payload) => Some(payload),
            Error::Validation(err) => Some(&err.payload),
            Error::Server(err) => Some(&err.payload),
            _ => None,
        }
    }
}

/// Why no response was received.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkErrorKind {
    /// The connection could not be established.
    Connect,
    /// The request exceeded the configured timeout.
    Timeout,
    /// Any other transport failure.
    Other,
}

/// Normalized error for requests that never got a response.
///
/// Serializes as `{"message": ..., "status": "error"}`.
#[derive(Debug, Clone, Serialize, Error)]
#[error("{message}")]
pub struct NetworkError {
    /// User-facing message, always [`NETWORK_ERROR_MESSAGE`].
    pub message: String,
    /// Always `"error"`.
    pub status: &'static str,
    #[serde(skip)]
    pub kind: NetworkErrorKind,
    /// Transport detail, for logs only.
    #[serde(skip)]
    pub detail: String,
}

impl NetworkError {
    /// Create a network error of the given kind.
    pub fn new(kind: NetworkErrorKind, detail: impl Into<String>) -> Self {
        Self {
            message: NETWORK_ERROR_MESSAGE.to_string(),
            status: "error",
            kind,
            detail: detail.into(),
        }
    }
}

/// A server error response body.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorPayload {
    /// HTTP status code.
    pub status: u16,
    /// The `message` field of the body, if present.
    pub message: Option<String>,
    /// The full decoded body (`null` if it was empty or not JSON).
    pub body: serde_json::Value,
}

impl ErrorPayload {
    /// Build a payload from a status and decoded body.
    pub fn new(status: u16, body: serde_json::Value) -> Self {
        let message = body
            .get("message")
            .and_then(|m| m.as_str())
            .map(str::to_string);
        Self {
            status,
            message,
            body,
        }
    }
}

impl fmt::Display for ErrorPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP {}", self.status)?;
        if let Some(ref message) = self.message {
            write!(f, ": {}", message)?;
        }
        Ok(())
    }
}

/// A 422 response with its field errors flattened to one message each.
#[derive(Debug, Clone, Error)]
#[error("{payload}")]
pub struct ValidationError {
    /// The response payload, with `errors` replaced by the flattened map.
    pub payload: ErrorPayload,
    /// Field name to first error message.
    pub errors: FieldErrors,
}

/// Any non-success response that is neither 401 nor a 422 field map.
#[derive(Debug, Clone, Error)]
#[error("{payload}")]
pub struct ServerError {
    pub payload: ErrorPayload,
}

impl ServerError {
    /// HTTP status code of the response.
    pub fn status(&self) -> u16 {
        self.payload.status
    }
}

/// Local input checks that fail before any request is sent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PreconditionError {
    /// Login was attempted without an email.
    #[error("email must be provided")]
    MissingEmail,

    /// The email is not a well-formed address.
    #[error("email address is not valid")]
    InvalidEmail,

    /// Login was attempted without a password.
    #[error("password must be provided")]
    MissingPassword,

    /// The password is shorter than the backend accepts.
    #[error("password must be at least {min} characters")]
    PasswordTooShort { min: usize },

    /// An operation needed a stored session but none exists.
    #[error("no active session")]
    NoSession,
}

impl PreconditionError {
    /// The login form field this error belongs to, if any.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            PreconditionError::MissingEmail | PreconditionError::InvalidEmail => Some("email"),
            PreconditionError::MissingPassword | PreconditionError::PasswordTooShort { .. } => {
                Some("password")
            }
            PreconditionError::NoSession => None,
        }
    }
}

/// Persistent store failures.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backing medium could not be read or written.
    #[error("{operation} failed: {message}")]
    Io { operation: String, message: String },

    /// A stored value could not be decoded.
    #[error("corrupt value for '{key}': {reason}")]
    Corrupt { key: String, reason: String },
}

impl StorageError {
    /// Wrap an I/O error with the operation that produced it.
    pub fn io(operation: impl Into<String>, err: impl fmt::Display) -> Self {
        StorageError::Io {
            operation: operation.into(),
            message: err.to_string(),
        }
    }
}

/// Input validation errors.
#[derive(Debug, Error)]
pub enum InvalidInputError {
    /// Invalid API base URL.
    #[error("invalid API URL '{value}': {reason}")]
    ApiUrl { value: String, reason: String },

    /// A success response did not have the expected shape.
    #[error("unexpected response: {message}")]
    Response { message: String },

    /// Generic invalid input.
    #[error("invalid input: {message}")]
    Other { message: String },
}
