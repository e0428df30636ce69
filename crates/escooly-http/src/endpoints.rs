//! Endpoint paths and request/response types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use escooly_core::{AccessToken, TokenType, UserProfile};

/// POST, `{email, password}`.
pub const LOGIN: &str = "/api/login";

/// POST, no body.
pub const LOGOUT: &str = "/api/logout";

/// POST, `{}`; authorized with the current access token.
pub const REFRESH: &str = "/api/refresh";

/// GET; the signed-in user's profile.
pub const ME: &str = "/api/me";

/// Token payload returned by login and refresh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthResponse {
    pub access_token: AccessToken,
    #[serde(default)]
    pub token_type: TokenType,
    #[serde(default)]
    pub user: Option<UserProfile>,
}

/// Token responses arrive either wrapped as `{"data": ...}` or bare.
///
/// Only for payloads with required fields. A type that accepts any JSON
/// would match the wrapped arm for any object carrying a `data` key.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum Envelope<T> {
    Wrapped { data: T },
    Bare(T),
}

impl<T> Envelope<T> {
    pub(crate) fn into_inner(self) -> T {
        match self {
            Envelope::Wrapped { data } => data,
            Envelope::Bare(value) => value,
        }
    }
}

/// Take the profile out of a `/api/me` body.
///
/// The body is unwrapped only when `data` is its sole key and holds an
/// object. Anything else is the profile itself, including a profile with
/// its own `data` field.
pub(crate) fn profile_from(body: Value) -> UserProfile {
    match body {
        Value::Object(mut map)
            if map.len() == 1 && map.get("data").is_some_and(Value::is_object) =>
        {
            UserProfile::new(map.remove("data").unwrap_or_default())
        }
        other => UserProfile::new(other),
    }
}
