//! Session data model.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::tokens::{AccessToken, TokenType};

/// The signed-in user's profile as returned by the server.
///
/// The record is opaque to the session flow: it is stored and restored
/// verbatim, so a profile that went through a login and a restart compares
/// equal to the original. A few read accessors cover what callers display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserProfile(Value);

impl UserProfile {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// Numeric or string id, rendered as a string.
    pub fn id(&self) -> Option<String> {
        match self.0.get("id")? {
            Value::Number(n) => Some(n.to_string()),
            Value::String(s) => Some(s.clone()),
            _ => None,
        }
    }

    pub fn email(&self) -> Option<&str> {
        self.str_field("email")
    }

    /// `first_name last_name`, falling back to `name`, then to the email.
    pub fn display_name(&self) -> Option<String> {
        let first = self.str_field("first_name").unwrap_or("").trim();
        let last = self.str_field("last_name").unwrap_or("").trim();
        let full = format!("{first} {last}");
        let full = full.trim();
        if !full.is_empty() {
            return Some(full.to_string());
        }
        self.str_field("name")
            .or_else(|| self.email())
            .map(str::to_string)
    }

    /// Role names, if the profile lists any.
    pub fn roles(&self) -> Vec<&str> {
        self.0
            .get("roles")
            .and_then(Value::as_array)
            .map(|roles| {
                roles
                    .iter()
                    .filter_map(|role| role.get("name").and_then(Value::as_str))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }

    fn str_field(&self, name: &str) -> Option<&str> {
        self.0.get(name).and_then(Value::as_str)
    }
}

/// Everything persisted for a signed-in user.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub access_token: AccessToken,
    pub token_type: TokenType,
    pub user: Option<UserProfile>,
}

impl Session {
    pub fn new(access_token: AccessToken, token_type: TokenType, user: Option<UserProfile>) -> Self {
        Self {
            access_token,
            token_type,
            user,
        }
    }
}

/// In-memory view of whether someone is signed in.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum AuthState {
    /// Startup, before the stored session has been checked.
    #[default]
    Unknown,
    /// A session exists.
    Authenticated { user: Option<UserProfile> },
    /// No session.
    Unauthenticated,
}

impl AuthState {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthState::Authenticated { .. })
    }

    pub fn user(&self) -> Option<&UserProfile> {
        match self {
            AuthState::Authenticated { user } => user.as_ref(),
            _ => None,
        }
    }
}
