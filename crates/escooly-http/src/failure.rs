//! Classification of failed requests.
//!
//! Every failure lands in exactly one bucket: no response, 401, 422 with a
//! field map, or anything else. Each bucket decides the error the caller
//! gets and the notification the user sees.

use serde_json::Value;

use escooly_core::error::{
    Error, ErrorPayload, NetworkError, NetworkErrorKind, ServerError, ValidationError,
};
use escooly_core::{FieldErrors, Notification};

pub(crate) const NETWORK_TITLE: &str = "Network Error";
pub(crate) const NETWORK_DESCRIPTION: &str =
    "Unable to connect to the server. Please check your internet connection.";
pub(crate) const EXPIRED_TITLE: &str = "Authentication Error";
pub(crate) const EXPIRED_DESCRIPTION: &str = "Your session has expired. Please log in again.";
pub(crate) const VALIDATION_TITLE: &str = "Validation Error";
pub(crate) const GENERIC_TITLE: &str = "Error";
pub(crate) const GENERIC_DESCRIPTION: &str = "An unexpected error occurred.";

/// Outcome of a failed request.
#[derive(Debug)]
pub(crate) struct Failure {
    pub error: Error,
    pub notification: Notification,
    /// The stored session must be discarded.
    pub expires_session: bool,
}

/// Classify a transport failure where no response arrived.
pub(crate) fn from_transport(err: &reqwest::Error) -> Failure {
    let kind = if err.is_timeout() {
        NetworkErrorKind::Timeout
    } else if err.is_connect() {
        NetworkErrorKind::Connect
    } else {
        NetworkErrorKind::Other
    };

    Failure {
        error: Error::Network(NetworkError::new(kind, err.to_string())),
        notification: Notification::error(NETWORK_TITLE, NETWORK_DESCRIPTION),
        expires_session: false,
    }
}

/// Classify a non-success response.
pub(crate) fn from_response(status: u16, body: Value) -> Failure {
    match status {
        401 => Failure {
            error: Error::AuthExpired(ErrorPayload::new(status, body)),
            notification: Notification::error(EXPIRED_TITLE, EXPIRED_DESCRIPTION),
            expires_session: true,
        },
        422 => match body.get("errors").and_then(FieldErrors::flatten) {
            Some(errors) => validation(body, errors),
            None => generic(status, body),
        },
        _ => generic(status, body),
    }
}

fn validation(mut body: Value, errors: FieldErrors) -> Failure {
    if let Some(object) = body.as_object_mut() {
        object.insert("errors".to_string(), errors.to_value());
    }

    let description = errors.first_message().unwrap_or_default().to_string();

    Failure {
        error: Error::Validation(ValidationError {
            payload: ErrorPayload::new(422, body),
            errors,
        }),
        notification: Notification::error(VALIDATION_TITLE, description),
        expires_session: false,
    }
}

fn generic(status: u16, body: Value) -> Failure {
    let payload = ErrorPayload::new(status, body);
    let description = payload
        .message
        .clone()
        .filter(|message| !message.is_empty())
        .unwrap_or_else(|| GENERIC_DESCRIPTION.to_string());

    Failure {
        error: Error::Server(ServerError { payload }),
        notification: Notification::error(GENERIC_TITLE, description),
        expires_session: false,
    }
}
